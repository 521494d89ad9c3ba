use std::cmp::Ordering;

use chrono::{NaiveDate, TimeDelta};
#[cfg(feature = "parallel-mapping")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::context::AxisContext;
use crate::core::coordinate_set::{
    ComputationKind, CoordinateSet, CoordinateSetComputation, DEFAULT_NUMBER_OF_VALUES,
};
use crate::core::dimension::Dimension;
use crate::core::interval::{StepGrid, nice_numeric_step};
use crate::core::mapping::TargetMapping;
use crate::core::value::{Value, ValueKind};
use crate::error::{ChartError, ChartResult};

/// Lower bound of every axis' intermediate coordinate system.
pub const MIN_VALUE_ICS: f64 = 0.0;
pub const DEFAULT_MAX_VALUE_ICS: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AxisRole {
    #[default]
    X,
    Y,
    Z,
}

/// Logarithmic mode as configured by the series bound to an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogScale {
    base: u32,
}

impl LogScale {
    pub fn new(base: u32) -> ChartResult<Self> {
        if base < 2 {
            return Err(ChartError::InvalidArgument(format!(
                "logarithm base must be >= 2, got {base}"
            )));
        }
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(self) -> u32 {
        self.base
    }
}

impl Default for LogScale {
    fn default() -> Self {
        Self { base: 10 }
    }
}

/// Axis data a coordinate-set evaluation reads: dimension, range, role and the
/// modes that change tick layout.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisState {
    role: AxisRole,
    dimension: Dimension,
    min_value: Value,
    max_value: Value,
    reference_value: Option<Value>,
    log_scale: Option<LogScale>,
    scale: f64,
}

impl AxisState {
    pub fn new(role: AxisRole, dimension: Dimension, min: Value, max: Value) -> ChartResult<Self> {
        let min_value = dimension.convert_to_right_type(min)?;
        let max_value = dimension.convert_to_right_type(max)?;
        Ok(Self {
            role,
            dimension,
            min_value,
            max_value,
            reference_value: None,
            log_scale: None,
            scale: 1.0,
        })
    }

    pub fn with_reference_value(mut self, reference: Option<Value>) -> ChartResult<Self> {
        self.reference_value = reference
            .map(|value| self.dimension.convert_to_right_type(value))
            .transpose()?;
        Ok(self)
    }

    #[must_use]
    pub fn with_log_scale(mut self, log_scale: Option<LogScale>) -> Self {
        self.log_scale = log_scale;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> ChartResult<Self> {
        self.scale = checked_scale(scale)?;
        Ok(self)
    }

    #[must_use]
    pub fn role(&self) -> AxisRole {
        self.role
    }

    #[must_use]
    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    #[must_use]
    pub fn min_value(&self) -> &Value {
        &self.min_value
    }

    #[must_use]
    pub fn max_value(&self) -> &Value {
        &self.max_value
    }

    #[must_use]
    pub fn reference_value(&self) -> Option<&Value> {
        self.reference_value.as_ref()
    }

    #[must_use]
    pub fn log_scale(&self) -> Option<LogScale> {
        self.log_scale
    }

    /// Display unit multiplier of linear numeric axes.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Log mode only applies to numeric dimensions.
    fn is_logarithmic(&self) -> bool {
        self.log_scale.is_some() && matches!(self.dimension, Dimension::Numeric)
    }
}

/// One coordinate-system axis.
///
/// Holds the data range in the data coordinate system and maps values through
/// the logical (LCS) and intermediate (ICS) coordinate systems. The axis owns
/// its default [`CoordinateSetComputation`]; any change to the range or modes
/// makes the cached ticks stale.
///
/// All mutation goes through `&mut self`: an axis has a single writer and is
/// not meant to be shared for concurrent mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    state: AxisState,
    reverse: bool,
    max_value_ics: f64,
    default_computation: CoordinateSetComputation,
}

impl Axis {
    /// Creates an axis with a placeholder range suited to the dimension.
    pub fn new(role: AxisRole, dimension: Dimension) -> ChartResult<Self> {
        let (min, max) = default_range(&dimension)?;
        Self::with_range(role, dimension, min, max)
    }

    pub fn with_range(
        role: AxisRole,
        dimension: Dimension,
        min: Value,
        max: Value,
    ) -> ChartResult<Self> {
        Ok(Self {
            state: AxisState::new(role, dimension, min, max)?,
            reverse: false,
            max_value_ics: DEFAULT_MAX_VALUE_ICS,
            default_computation: CoordinateSetComputation::new(),
        })
    }

    #[must_use]
    pub fn state(&self) -> &AxisState {
        &self.state
    }

    #[must_use]
    pub fn role(&self) -> AxisRole {
        self.state.role
    }

    #[must_use]
    pub fn dimension(&self) -> &Dimension {
        &self.state.dimension
    }

    /// Mutable access for growing enumerated dimensions; the range must remain
    /// valid in the updated dimension.
    pub fn dimension_mut(&mut self) -> &mut Dimension {
        self.default_computation.invalidate();
        &mut self.state.dimension
    }

    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        self.state.dimension.kind()
    }

    #[must_use]
    pub fn min_value(&self) -> &Value {
        &self.state.min_value
    }

    #[must_use]
    pub fn max_value(&self) -> &Value {
        &self.state.max_value
    }

    pub fn set_min_value(&mut self, value: Value) -> ChartResult<()> {
        self.state.min_value = self.state.dimension.convert_to_right_type(value)?;
        self.default_computation.invalidate();
        Ok(())
    }

    pub fn set_max_value(&mut self, value: Value) -> ChartResult<()> {
        self.state.max_value = self.state.dimension.convert_to_right_type(value)?;
        self.default_computation.invalidate();
        Ok(())
    }

    pub fn set_range(&mut self, min: Value, max: Value) -> ChartResult<()> {
        let min = self.state.dimension.convert_to_right_type(min)?;
        let max = self.state.dimension.convert_to_right_type(max)?;
        self.state.min_value = min;
        self.state.max_value = max;
        self.default_computation.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    /// Display unit multiplier; range rounding and tick steps are chosen in
    /// `value / scale` units. Explicit steps are given in display units too.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    pub fn set_scale(&mut self, scale: f64) -> ChartResult<()> {
        self.state.scale = checked_scale(scale)?;
        self.default_computation.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn log_scale(&self) -> Option<LogScale> {
        self.state.log_scale
    }

    #[must_use]
    pub fn is_logarithmic(&self) -> bool {
        self.state.is_logarithmic()
    }

    /// Synced from the series bound to this axis.
    pub fn set_log_scale(&mut self, log_scale: Option<LogScale>) {
        self.state.log_scale = log_scale;
        self.default_computation.invalidate();
    }

    #[must_use]
    pub fn reference_value(&self) -> Option<&Value> {
        self.state.reference_value.as_ref()
    }

    /// Anchor value (e.g. the base of bars and areas) that Y-axis tick ranges
    /// always include.
    pub fn set_reference_value(&mut self, reference: Option<Value>) -> ChartResult<()> {
        self.state.reference_value = reference
            .map(|value| self.state.dimension.convert_to_right_type(value))
            .transpose()?;
        self.default_computation.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn round_value_range(&self) -> bool {
        self.default_computation.round_value_range()
    }

    pub fn set_round_value_range(&mut self, round: bool) {
        self.default_computation.set_round_value_range(round);
    }

    #[must_use]
    pub fn min_value_ics(&self) -> f64 {
        MIN_VALUE_ICS
    }

    #[must_use]
    pub fn max_value_ics(&self) -> f64 {
        self.max_value_ics
    }

    pub fn set_max_value_ics(&mut self, max_value_ics: f64) -> ChartResult<()> {
        if !max_value_ics.is_finite() || max_value_ics <= MIN_VALUE_ICS {
            return Err(ChartError::InvalidArgument(
                "axis ICS extent must be finite and > 0".to_owned(),
            ));
        }
        self.max_value_ics = max_value_ics;
        Ok(())
    }

    #[must_use]
    pub fn default_computation(&self) -> &CoordinateSetComputation {
        &self.default_computation
    }

    pub fn default_computation_mut(&mut self) -> &mut CoordinateSetComputation {
        &mut self.default_computation
    }

    pub fn min_value_lcs(&self) -> ChartResult<f64> {
        self.lcoordinate(&self.state.min_value)
    }

    /// Upper logical bound; includes the slot width of the last value.
    pub fn max_value_lcs(&self) -> ChartResult<f64> {
        let max = &self.state.max_value;
        Ok(self.lcoordinate(max)? + self.lwidth(max)?)
    }

    pub fn lcoordinate(&self, value: &Value) -> ChartResult<f64> {
        self.state.dimension.coordinate(value)
    }

    pub fn lwidth(&self, value: &Value) -> ChartResult<f64> {
        self.state.dimension.width(value)
    }

    /// Maps a logical coordinate into `[min_value_ics, max_value_ics]`.
    pub fn lcs_to_ics(&self, lc: f64) -> ChartResult<f64> {
        if !lc.is_finite() {
            return Err(ChartError::InvalidArgument(
                "logical coordinate must be finite".to_owned(),
            ));
        }
        let min_lcs = self.min_value_lcs()?;
        let max_lcs = self.max_value_lcs()?;

        let fraction = if self.is_logarithmic() {
            if lc <= 0.0 || min_lcs <= 0.0 {
                return Err(ChartError::InvalidArgument(format!(
                    "logarithmic axis cannot map {lc} with minimum {min_lcs}; values must be > 0"
                )));
            }
            (lc.ln() - min_lcs.ln()) / checked_span(max_lcs.ln() - min_lcs.ln())?
        } else {
            (lc - min_lcs) / checked_span(max_lcs - min_lcs)?
        };
        let fraction = if self.reverse { 1.0 - fraction } else { fraction };
        Ok(fraction * self.max_value_ics + (1.0 - fraction) * MIN_VALUE_ICS)
    }

    /// Inverse of [`lcs_to_ics`](Self::lcs_to_ics).
    pub fn ics_to_lcs(&self, ic: f64) -> ChartResult<f64> {
        if !ic.is_finite() {
            return Err(ChartError::InvalidArgument(
                "intermediate coordinate must be finite".to_owned(),
            ));
        }
        let min_lcs = self.min_value_lcs()?;
        let max_lcs = self.max_value_lcs()?;
        let fraction = (ic - MIN_VALUE_ICS) / (self.max_value_ics - MIN_VALUE_ICS);
        let fraction = if self.reverse { 1.0 - fraction } else { fraction };

        if self.is_logarithmic() {
            if min_lcs <= 0.0 || max_lcs <= 0.0 {
                return Err(ChartError::InvalidArgument(
                    "logarithmic axis range must be > 0".to_owned(),
                ));
            }
            Ok((min_lcs.ln() + fraction * (max_lcs.ln() - min_lcs.ln())).exp())
        } else {
            Ok(min_lcs + fraction * (max_lcs - min_lcs))
        }
    }

    pub fn icoordinate(&self, value: &Value) -> ChartResult<f64> {
        self.lcs_to_ics(self.lcoordinate(value)?)
    }

    /// Maps a batch of values into ICS, failing on the first unmappable value.
    pub fn icoordinates(&self, values: &[Value]) -> ChartResult<Vec<f64>> {
        #[cfg(feature = "parallel-mapping")]
        {
            values
                .par_iter()
                .map(|value| self.icoordinate(value))
                .collect()
        }

        #[cfg(not(feature = "parallel-mapping"))]
        {
            values.iter().map(|value| self.icoordinate(value)).collect()
        }
    }

    /// Extent of a value's slot in ICS units.
    pub fn iwidth(&self, value: &Value) -> ChartResult<f64> {
        let width = self.lwidth(value)?;
        if width == 0.0 {
            return Ok(0.0);
        }
        let start = self.lcoordinate(value)?;
        Ok((self.lcs_to_ics(start + width)? - self.lcs_to_ics(start)?).abs())
    }

    /// Pixel position and pixel width of a value along `mapping`.
    pub fn get_pixel_position(
        &self,
        value: &Value,
        mapping: &TargetMapping,
    ) -> ChartResult<(f64, f64)> {
        let position =
            mapping.ics_to_pixel(self.icoordinate(value)?, MIN_VALUE_ICS, self.max_value_ics)?;
        let width =
            mapping.ics_length_to_pixels(self.iwidth(value)?, MIN_VALUE_ICS, self.max_value_ics)?;
        Ok((position, width))
    }

    /// Default tick set, recomputed only when stale.
    pub fn coordinate_set(&mut self, ctx: &mut AxisContext) -> ChartResult<&CoordinateSet> {
        self.default_computation.coordinate_set(&self.state, ctx)
    }

    /// Evaluates a transient computation against this axis.
    pub fn create_coordinate_set(
        &self,
        mut computation: CoordinateSetComputation,
        ctx: &mut AxisContext,
    ) -> ChartResult<CoordinateSet> {
        computation.recompute(&self.state, ctx).cloned()
    }

    /// Default ticks mapped into ICS.
    pub fn tick_positions_ics(&mut self, ctx: &mut AxisContext) -> ChartResult<Vec<f64>> {
        let ticks = self
            .default_computation
            .coordinate_set(&self.state, ctx)?
            .clone();
        ticks.iter().map(|tick| self.icoordinate(tick)).collect()
    }

    pub fn get_adjusted_value(
        &mut self,
        value: &Value,
        adjust_upwards: bool,
        ctx: &mut AxisContext,
    ) -> ChartResult<Value> {
        self.default_computation
            .get_adjusted_value(value, adjust_upwards, &self.state, ctx)
    }

    /// Sets the range to the extremes of the bound series values.
    pub fn data_bind<I>(&mut self, values: I) -> ChartResult<()>
    where
        I: IntoIterator<Item = Value>,
    {
        let dimension = &self.state.dimension;
        let mut extremes: Option<(Value, Value)> = None;
        for value in values {
            let value = dimension.convert_to_right_type(value)?;
            extremes = Some(match extremes {
                None => (value.clone(), value),
                Some((min, max)) => {
                    let min = if dimension.compare(&value, &min)? == Ordering::Less {
                        value.clone()
                    } else {
                        min
                    };
                    let max = if dimension.compare(&value, &max)? == Ordering::Greater {
                        value
                    } else {
                        max
                    };
                    (min, max)
                }
            });
        }
        let (min, max) = extremes.ok_or_else(|| {
            ChartError::InvalidData("axis cannot be bound to empty data".to_owned())
        })?;
        debug!(role = ?self.state.role, %min, %max, "bound axis range");
        self.state.min_value = min;
        self.state.max_value = max;
        self.default_computation.invalidate();
        Ok(())
    }

    /// Normalizes and rounds the range after data binding.
    pub fn adjust_range(&mut self, ctx: &mut AxisContext) -> ChartResult<()> {
        let dimension = &self.state.dimension;
        if dimension.compare(&self.state.min_value, &self.state.max_value)? == Ordering::Greater {
            std::mem::swap(&mut self.state.min_value, &mut self.state.max_value);
        }

        match self.state.dimension {
            Dimension::DateTime => self.adjust_date_time_range(ctx)?,
            Dimension::Numeric => self.adjust_numeric_range(ctx)?,
            Dimension::Index | Dimension::Enumerated(_) => {}
        }
        self.default_computation.invalidate();
        debug!(
            role = ?self.state.role,
            min = %self.state.min_value,
            max = %self.state.max_value,
            "adjusted axis range"
        );
        Ok(())
    }

    fn adjust_date_time_range(&mut self, ctx: &mut AxisContext) -> ChartResult<()> {
        let min = self.state.min_value.expect_datetime()?;
        let max = self.state.max_value.expect_datetime()?;
        if min == max {
            let half_day = TimeDelta::hours(12);
            let expanded = min
                .checked_sub_signed(half_day)
                .zip(max.checked_add_signed(half_day))
                .ok_or_else(|| {
                    ChartError::InvalidData("date/time range is out of calendar range".to_owned())
                })?;
            self.state.min_value = Value::DateTime(expanded.0);
            self.state.max_value = Value::DateTime(expanded.1);
            return Ok(());
        }
        if self.round_value_range() {
            self.apply_rounded_bounds(self.bounds_probe(), ctx)?;
        }
        Ok(())
    }

    fn adjust_numeric_range(&mut self, ctx: &mut AxisContext) -> ChartResult<()> {
        let mut min = self.state.min_value.expect_f64()?;
        let mut max = self.state.max_value.expect_f64()?;
        if min == max {
            match self.state.log_scale {
                Some(log_scale) if min > 0.0 => {
                    let base = f64::from(log_scale.base());
                    min /= base;
                    max *= base;
                }
                _ => {
                    min -= 0.5;
                    max += 0.5;
                }
            }
            self.state.min_value = Value::Double(min);
            self.state.max_value = Value::Double(max);
        }
        if !self.round_value_range() {
            return Ok(());
        }

        if self.state.log_scale.is_some() {
            let mut probe = self.bounds_probe();
            probe.set_number_of_values(DEFAULT_NUMBER_OF_VALUES)?;
            return self.apply_rounded_bounds(probe, ctx);
        }

        // Round in display units so the ticks stay round after scaling back.
        let scale = self.state.scale;
        let descaled_min = min / scale;
        let descaled_max = max / scale;
        let computation = &self.default_computation;
        let grid = match (computation.computation_kind(), computation.step()) {
            (ComputationKind::ByStep, Some(step)) => StepGrid::new(step)?,
            _ => StepGrid::from_nice(nice_numeric_step(
                descaled_min,
                descaled_max,
                computation.number_of_values(),
            )),
        };
        self.state.min_value = Value::Double(grid.floor(descaled_min) * scale);
        self.state.max_value = Value::Double(grid.ceil(descaled_max) * scale);
        Ok(())
    }

    /// Copy of the default computation without explicit bounds, used to derive
    /// rounded axis bounds.
    fn bounds_probe(&self) -> CoordinateSetComputation {
        let mut probe = self.default_computation.clone();
        probe.set_min_value(None);
        probe.set_max_value(None);
        probe.set_round_value_range(true);
        probe
    }

    fn apply_rounded_bounds(
        &mut self,
        mut probe: CoordinateSetComputation,
        ctx: &mut AxisContext,
    ) -> ChartResult<()> {
        probe.recompute(&self.state, ctx)?;
        let (min, max) = probe.evaluated_range().ok_or_else(|| {
            ChartError::InvalidData("rounded axis bounds are unavailable".to_owned())
        })?;
        let (min, max) = (min.clone(), max.clone());
        self.state.min_value = min;
        self.state.max_value = max;
        Ok(())
    }

    /// Floors the minimum to a multiple of `step` (ceils it on reversed axes).
    pub fn adjust_minimum_value(&mut self, step: f64) -> ChartResult<()> {
        let grid = adjustment_grid(step)?;
        let value = self.state.min_value.expect_f64()?;
        let adjusted = if self.reverse {
            grid.ceil(value)
        } else {
            grid.floor(value)
        };
        self.state.min_value = Value::Double(adjusted);
        self.default_computation.invalidate();
        Ok(())
    }

    /// Ceils the maximum to a multiple of `step` (floors it on reversed axes).
    pub fn adjust_maximum_value(&mut self, step: f64) -> ChartResult<()> {
        let grid = adjustment_grid(step)?;
        let value = self.state.max_value.expect_f64()?;
        let adjusted = if self.reverse {
            grid.floor(value)
        } else {
            grid.ceil(value)
        };
        self.state.max_value = Value::Double(adjusted);
        self.default_computation.invalidate();
        Ok(())
    }
}

fn adjustment_grid(step: f64) -> ChartResult<StepGrid> {
    if step == 0.0 || !step.is_finite() {
        return Err(ChartError::InvalidArgument(
            "adjustment step must be finite and non-zero".to_owned(),
        ));
    }
    StepGrid::new(step.abs())
}

fn checked_scale(scale: f64) -> ChartResult<f64> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ChartError::InvalidArgument(
            "axis scale must be finite and > 0".to_owned(),
        ));
    }
    Ok(scale)
}

fn checked_span(span: f64) -> ChartResult<f64> {
    if span == 0.0 || !span.is_finite() {
        return Err(ChartError::InvalidData(
            "axis logical range must be finite and non-empty".to_owned(),
        ));
    }
    Ok(span)
}

fn default_range(dimension: &Dimension) -> ChartResult<(Value, Value)> {
    match dimension {
        Dimension::Numeric => Ok((Value::Double(0.0), Value::Double(1.0))),
        Dimension::DateTime => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .ok_or_else(|| ChartError::InvalidData("invalid epoch".to_owned()))?;
            let next_day = epoch + TimeDelta::days(1);
            Ok((Value::DateTime(epoch), Value::DateTime(next_day)))
        }
        Dimension::Index => Ok((Value::Index(0), Value::Index(1))),
        Dimension::Enumerated(categories) => {
            let first = categories.leaf_at(0);
            let last = categories
                .leaf_count()
                .checked_sub(1)
                .and_then(|position| categories.leaf_at(position));
            match first.zip(last) {
                Some((first, last)) => Ok((Value::category(first), Value::category(last))),
                None => Err(ChartError::InvalidData(
                    "enumerated axis requires at least one category".to_owned(),
                )),
            }
        }
    }
}
