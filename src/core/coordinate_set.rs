use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::axis::{AxisRole, AxisState, LogScale};
use crate::core::context::AxisContext;
use crate::core::dimension::{Dimension, EnumeratedDimension};
use crate::core::interval::{
    DateTimeStep, DateTimeUnit, StepGrid, ceil_div, nice_numeric_step, select_date_time_step,
    select_index_step,
};
use crate::core::primitives::naive_to_unix_seconds;
use crate::core::value::{Value, ValueKind};
use crate::error::{ChartError, ChartResult};

pub const DEFAULT_NUMBER_OF_VALUES: usize = 5;
/// Label density default for index and enumerated axes.
pub const DEFAULT_CATEGORICAL_NUMBER_OF_VALUES: usize = 50;
const LOG_STEP_NUMBER_OF_VALUES: usize = 5;
const MAX_TICKS: usize = 100_000;

/// How the tick interval is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComputationKind {
    /// Derive a round step from a requested number of points.
    #[default]
    ByNumberOfPoints,
    /// Use an explicit step (plus a calendar unit on date/time axes).
    ByStep,
}

/// Ordered axis tick values, tagged with the dimension's value kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSet {
    kind: ValueKind,
    values: SmallVec<[Value; 16]>,
}

impl CoordinateSet {
    fn new(kind: ValueKind, values: SmallVec<[Value; 16]>) -> Self {
        Self { kind, values }
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Numeric tick values, or `None` for non-numeric sets.
    #[must_use]
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Maps every tick into the logical coordinate system.
    pub fn to_coordinates(&self, dimension: &Dimension) -> ChartResult<Vec<f64>> {
        self.values
            .iter()
            .map(|value| dimension.coordinate(value))
            .collect()
    }
}

impl<'a> IntoIterator for &'a CoordinateSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Step resolved for one evaluation, per dimension kind.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StepPlan {
    /// Grid in display units (`value / scale`).
    Linear { grid: StepGrid, scale: f64 },
    /// Grid over `log_base(value)` exponents.
    Logarithmic { grid: StepGrid, base: f64 },
    Calendar {
        step: DateTimeStep,
        anchor: NaiveDateTime,
    },
    Index(i64),
    Enumerated(usize),
}

impl StepPlan {
    fn effective_step(self) -> f64 {
        match self {
            Self::Linear { grid, scale } => grid.step() * scale,
            Self::Logarithmic { grid, .. } => grid.step(),
            Self::Calendar { step, .. } => f64::from(step.step),
            Self::Index(step) => step as f64,
            Self::Enumerated(stride) => stride as f64,
        }
    }

    fn effective_unit(self) -> Option<DateTimeUnit> {
        match self {
            Self::Calendar { step, .. } => Some(step.unit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Evaluation {
    source: AxisState,
    plan: StepPlan,
    min: Value,
    max: Value,
    set: CoordinateSet,
}

/// Tick computation settings plus the cached result of the last evaluation.
///
/// The cache is considered stale when any setting changes, when
/// [`invalidate`](Self::invalidate) is called, or when the axis state passed to
/// [`coordinate_set`](Self::coordinate_set) differs from the one the cache was
/// built from. Evaluation is deterministic, so recomputing with unchanged inputs
/// yields an identical set.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSetComputation {
    kind: ComputationKind,
    number_of_values: usize,
    number_of_values_explicit: bool,
    step: Option<f64>,
    unit: Option<DateTimeUnit>,
    min_value: Option<Value>,
    max_value: Option<Value>,
    always_include_min_value: bool,
    always_include_max_value: bool,
    round_value_range: bool,
    dirty: bool,
    cache: Option<Evaluation>,
}

impl Default for CoordinateSetComputation {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateSetComputation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            kind: ComputationKind::ByNumberOfPoints,
            number_of_values: DEFAULT_NUMBER_OF_VALUES,
            number_of_values_explicit: false,
            step: None,
            unit: None,
            min_value: None,
            max_value: None,
            always_include_min_value: true,
            always_include_max_value: true,
            round_value_range: true,
            dirty: true,
            cache: None,
        }
    }

    /// Builds a computation that asks for at least `number_of_values` points.
    pub fn by_number_of_points(number_of_values: usize) -> ChartResult<Self> {
        let mut computation = Self::new();
        computation.set_number_of_values(number_of_values)?;
        Ok(computation)
    }

    /// Builds a computation with an explicit step.
    pub fn by_step(step: f64, unit: Option<DateTimeUnit>) -> ChartResult<Self> {
        let mut computation = Self::new();
        computation.set_step(step, unit)?;
        Ok(computation)
    }

    #[must_use]
    pub fn computation_kind(&self) -> ComputationKind {
        self.kind
    }

    pub fn set_computation_kind(&mut self, kind: ComputationKind) {
        self.kind = kind;
        self.invalidate();
    }

    #[must_use]
    pub fn number_of_values(&self) -> usize {
        self.number_of_values
    }

    #[must_use]
    pub fn is_number_of_values_explicit(&self) -> bool {
        self.number_of_values_explicit
    }

    pub fn set_number_of_values(&mut self, number_of_values: usize) -> ChartResult<()> {
        if number_of_values == 0 {
            return Err(ChartError::InvalidArgument(
                "number of values must be >= 1".to_owned(),
            ));
        }
        self.number_of_values = number_of_values;
        self.number_of_values_explicit = true;
        self.kind = ComputationKind::ByNumberOfPoints;
        self.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn step(&self) -> Option<f64> {
        self.step
    }

    #[must_use]
    pub fn unit(&self) -> Option<DateTimeUnit> {
        self.unit
    }

    pub fn set_step(&mut self, step: f64, unit: Option<DateTimeUnit>) -> ChartResult<()> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ChartError::InvalidArgument(
                "step must be finite and > 0".to_owned(),
            ));
        }
        self.step = Some(step);
        self.unit = unit;
        self.kind = ComputationKind::ByStep;
        self.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn min_value(&self) -> Option<&Value> {
        self.min_value.as_ref()
    }

    /// Overrides the axis minimum for this computation; `None` restores it.
    pub fn set_min_value(&mut self, value: Option<Value>) {
        self.min_value = value;
        self.invalidate();
    }

    #[must_use]
    pub fn max_value(&self) -> Option<&Value> {
        self.max_value.as_ref()
    }

    pub fn set_max_value(&mut self, value: Option<Value>) {
        self.max_value = value;
        self.invalidate();
    }

    #[must_use]
    pub fn always_include_min_value(&self) -> bool {
        self.always_include_min_value
    }

    pub fn set_always_include_min_value(&mut self, include: bool) {
        self.always_include_min_value = include;
        self.invalidate();
    }

    #[must_use]
    pub fn always_include_max_value(&self) -> bool {
        self.always_include_max_value
    }

    pub fn set_always_include_max_value(&mut self, include: bool) {
        self.always_include_max_value = include;
        self.invalidate();
    }

    #[must_use]
    pub fn round_value_range(&self) -> bool {
        self.round_value_range
    }

    pub fn set_round_value_range(&mut self, round: bool) {
        self.round_value_range = round;
        self.invalidate();
    }

    /// Marks the cached result stale.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the cache must be rebuilt before serving `axis`.
    #[must_use]
    pub fn needs_recompute(&self, axis: &AxisState) -> bool {
        match &self.cache {
            Some(evaluation) => self.dirty || evaluation.source != *axis,
            None => true,
        }
    }

    /// Last computed set, without evaluating.
    #[must_use]
    pub fn cached_coordinate_set(&self) -> Option<&CoordinateSet> {
        self.cache.as_ref().map(|evaluation| &evaluation.set)
    }

    /// Step used by the last evaluation: value units for linear axes, exponent
    /// units for logarithmic axes, unit count for date/time axes and position
    /// stride for index and enumerated axes.
    #[must_use]
    pub fn effective_step(&self) -> Option<f64> {
        self.cache
            .as_ref()
            .map(|evaluation| evaluation.plan.effective_step())
    }

    #[must_use]
    pub fn effective_unit(&self) -> Option<DateTimeUnit> {
        self.cache
            .as_ref()
            .and_then(|evaluation| evaluation.plan.effective_unit())
    }

    /// Range the last evaluation covered, after rounding.
    #[must_use]
    pub fn evaluated_range(&self) -> Option<(&Value, &Value)> {
        self.cache
            .as_ref()
            .map(|evaluation| (&evaluation.min, &evaluation.max))
    }

    /// Returns the coordinate set for `axis`, evaluating only when stale.
    ///
    /// In design mode a cached set is served even when stale.
    pub fn coordinate_set(
        &mut self,
        axis: &AxisState,
        ctx: &mut AxisContext,
    ) -> ChartResult<&CoordinateSet> {
        let serve_cached = self.cache.is_some() && ctx.design_mode();
        if self.needs_recompute(axis) && !serve_cached {
            return self.recompute(axis, ctx);
        }
        trace!(role = ?axis.role(), "coordinate set cache hit");
        self.cached_coordinate_set().ok_or_else(|| {
            ChartError::InvalidData("coordinate set has not been evaluated".to_owned())
        })
    }

    /// Evaluates unconditionally and replaces the cache.
    pub fn recompute(
        &mut self,
        axis: &AxisState,
        ctx: &mut AxisContext,
    ) -> ChartResult<&CoordinateSet> {
        let evaluation = self.evaluate(axis, ctx)?;
        debug!(
            role = ?axis.role(),
            kind = ?self.kind,
            points = evaluation.set.len(),
            step = evaluation.plan.effective_step(),
            "recomputed coordinate set"
        );
        self.dirty = false;
        Ok(&self.cache.insert(evaluation).set)
    }

    /// Rounds `value` to a multiple of the effective step, towards +inf when
    /// `adjust_upwards` and towards -inf otherwise.
    pub fn get_adjusted_value(
        &mut self,
        value: &Value,
        adjust_upwards: bool,
        axis: &AxisState,
        ctx: &mut AxisContext,
    ) -> ChartResult<Value> {
        self.coordinate_set(axis, ctx)?;
        let plan = self
            .cache
            .as_ref()
            .map(|evaluation| evaluation.plan)
            .ok_or_else(|| {
                ChartError::InvalidData("coordinate set has not been evaluated".to_owned())
            })?;
        let value = axis.dimension().convert_to_right_type(value.clone())?;
        adjust_value(plan, axis.dimension(), &value, adjust_upwards)
    }

    fn effective_number_of_values(&self, kind: ValueKind) -> usize {
        if self.number_of_values_explicit {
            return self.number_of_values;
        }
        match kind {
            ValueKind::Index | ValueKind::Category => DEFAULT_CATEGORICAL_NUMBER_OF_VALUES,
            ValueKind::Double | ValueKind::DateTime => self.number_of_values,
        }
    }

    fn configured_step(&self) -> ChartResult<f64> {
        self.step.ok_or_else(|| {
            ChartError::InvalidArgument("step computation requires a step".to_owned())
        })
    }

    fn reject_unit(&self, kind: ValueKind) -> ChartResult<()> {
        match self.unit {
            Some(unit) if self.kind == ComputationKind::ByStep => {
                Err(ChartError::InvalidArgument(format!(
                    "{unit:?} step unit is only valid on date/time axes, not {kind}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn resolve_range(&self, axis: &AxisState) -> ChartResult<(Value, Value)> {
        let dimension = axis.dimension();
        let min = self.min_value.clone().unwrap_or_else(|| axis.min_value().clone());
        let max = self.max_value.clone().unwrap_or_else(|| axis.max_value().clone());
        let mut min = dimension.convert_to_right_type(min)?;
        let mut max = dimension.convert_to_right_type(max)?;
        if dimension.compare(&min, &max)? == Ordering::Greater {
            std::mem::swap(&mut min, &mut max);
        }

        let reference = match axis.reference_value() {
            Some(reference) if axis.role() == AxisRole::Y => reference,
            _ => return Ok((min, max)),
        };
        let reference = dimension.convert_to_right_type(reference.clone())?;
        if self.min_value.is_none() && dimension.compare(&reference, &min)? == Ordering::Less {
            min = reference;
        } else if self.max_value.is_none()
            && dimension.compare(&reference, &max)? == Ordering::Greater
        {
            max = reference;
        }
        Ok((min, max))
    }

    fn evaluate(&self, axis: &AxisState, ctx: &mut AxisContext) -> ChartResult<Evaluation> {
        let (min, max) = self.resolve_range(axis)?;
        let dimension = axis.dimension();
        if axis.log_scale().is_some() && !matches!(dimension, Dimension::Numeric) {
            return Err(ChartError::Unsupported(format!(
                "logarithmic scale on a {} dimension",
                dimension.kind()
            )));
        }

        let (plan, min, max, values) = match dimension {
            Dimension::Numeric => {
                let (lo, hi) = (min.expect_f64()?, max.expect_f64()?);
                match axis.log_scale() {
                    Some(log_scale) if hi > 0.0 => self.logarithmic_ticks(lo, hi, log_scale)?,
                    Some(log_scale) => {
                        ctx.register_error_message(format!(
                            "logarithmic axis (base {}) has no positive values in [{lo}, {hi}]; \
                             using a linear layout",
                            log_scale.base()
                        ));
                        self.linear_ticks(lo, hi, axis.scale())?
                    }
                    None => self.linear_ticks(lo, hi, axis.scale())?,
                }
            }
            Dimension::DateTime => {
                self.date_time_ticks(min.expect_datetime()?, max.expect_datetime()?)?
            }
            Dimension::Index => self.index_ticks(min.expect_index()?, max.expect_index()?)?,
            Dimension::Enumerated(categories) => {
                self.enumerated_ticks(categories, min.expect_category()?, max.expect_category()?)?
            }
        };

        Ok(Evaluation {
            source: axis.clone(),
            plan,
            min,
            max,
            set: CoordinateSet::new(dimension.kind(), values),
        })
    }

    fn rounds_min(&self) -> bool {
        self.round_value_range && self.min_value.is_none()
    }

    fn rounds_max(&self) -> bool {
        self.round_value_range && self.max_value.is_none()
    }

    /// Picks and rounds the step in display units, then scales the grid back
    /// into axis values.
    fn linear_ticks(
        &self,
        lo: f64,
        hi: f64,
        scale: f64,
    ) -> ChartResult<(StepPlan, Value, Value, SmallVec<[Value; 16]>)> {
        self.reject_unit(ValueKind::Double)?;
        let (lo, hi) = (lo / scale, hi / scale);
        let grid = match self.kind {
            ComputationKind::ByNumberOfPoints => StepGrid::from_nice(nice_numeric_step(
                lo,
                hi,
                self.effective_number_of_values(ValueKind::Double),
            )),
            ComputationKind::ByStep => StepGrid::new(self.configured_step()?)?,
        };
        let lo = if self.rounds_min() { grid.floor(lo) } else { lo };
        let hi = if self.rounds_max() { grid.ceil(hi) } else { hi };
        check_tick_budget(hi - lo, grid.step())?;

        let mut ticks: SmallVec<[f64; 16]> = SmallVec::new();
        if self.always_include_min_value {
            ticks.push(lo);
        }
        let last_index = grid.ceil_index(hi);
        for index in grid.ceil_index(lo)..last_index {
            push_increasing(&mut ticks, grid.value_at(index), hi);
        }
        if self.always_include_max_value || grid.is_on_grid(hi) {
            push_increasing(&mut ticks, hi, f64::INFINITY);
        }

        let values = ticks
            .into_iter()
            .map(|tick| Value::Double(tick * scale))
            .collect();
        Ok((
            StepPlan::Linear { grid, scale },
            Value::Double(lo * scale),
            Value::Double(hi * scale),
            values,
        ))
    }

    fn logarithmic_ticks(
        &self,
        lo: f64,
        hi: f64,
        log_scale: LogScale,
    ) -> ChartResult<(StepPlan, Value, Value, SmallVec<[Value; 16]>)> {
        self.reject_unit(ValueKind::Double)?;
        let base = f64::from(log_scale.base());
        let mut lo = lo;
        if lo <= 0.0 {
            lo = 1.0;
            while lo >= hi {
                lo /= base;
            }
        }

        let number_of_values = match self.kind {
            ComputationKind::ByNumberOfPoints => self.number_of_values,
            ComputationKind::ByStep => LOG_STEP_NUMBER_OF_VALUES,
        };
        let (mut exp_lo, mut exp_hi) = (lo.log(base), hi.log(base));
        let grid = StepGrid::from_nice(nice_numeric_step(exp_lo, exp_hi, number_of_values));
        if self.rounds_min() {
            exp_lo = grid.floor(exp_lo);
            lo = log_power(base, exp_lo);
        }
        if self.rounds_max() {
            exp_hi = grid.ceil(exp_hi);
        }
        let hi = if self.rounds_max() {
            log_power(base, exp_hi)
        } else {
            hi
        };
        check_tick_budget(exp_hi - exp_lo, grid.step())?;

        let mut ticks: SmallVec<[f64; 16]> = grid_indices(grid, exp_lo, exp_hi)
            .map(|index| log_power(base, grid.value_at(index)))
            .collect();
        if self.always_include_min_value
            && ticks.first().is_none_or(|first| !approx_equal(*first, lo))
        {
            ticks.insert(0, lo);
        }
        if self.always_include_max_value
            && ticks.last().is_none_or(|last| !approx_equal(*last, hi))
        {
            ticks.push(hi);
        }

        let values = ticks.into_iter().map(Value::Double).collect();
        Ok((
            StepPlan::Logarithmic { grid, base },
            Value::Double(lo),
            Value::Double(hi),
            values,
        ))
    }

    fn date_time_ticks(
        &self,
        lo: NaiveDateTime,
        hi: NaiveDateTime,
    ) -> ChartResult<(StepPlan, Value, Value, SmallVec<[Value; 16]>)> {
        let step = match self.kind {
            ComputationKind::ByNumberOfPoints => {
                let span = naive_to_unix_seconds(hi) - naive_to_unix_seconds(lo);
                select_date_time_step(span, self.effective_number_of_values(ValueKind::DateTime))
            }
            ComputationKind::ByStep => {
                let unit = self.unit.ok_or_else(|| {
                    ChartError::InvalidArgument(
                        "date/time step computation requires a unit".to_owned(),
                    )
                })?;
                let count = self.configured_step()?;
                if count.fract() != 0.0 || count > f64::from(u32::MAX) {
                    return Err(ChartError::InvalidArgument(format!(
                        "date/time step must be a whole number of {unit:?} units"
                    )));
                }
                DateTimeStep::new(count as u32, unit)
            }
        };
        // Range rounding, tick generation and value adjustment all count steps
        // from this anchor.
        let anchor = step.anchor(lo)?;
        let lo = if self.rounds_min() { anchor } else { lo };
        let hi = if self.rounds_max() {
            step.snap(anchor, hi, true)?
        } else {
            hi
        };
        let span = naive_to_unix_seconds(hi) - naive_to_unix_seconds(lo);
        check_tick_budget(span, step.nominal_seconds())?;

        let mut ticks: SmallVec<[NaiveDateTime; 16]> = SmallVec::new();
        if self.always_include_min_value {
            ticks.push(lo);
        }
        let mut index = step.floor_index(anchor, lo)?;
        let landed = loop {
            let tick = step.nth(anchor, index)?;
            if tick >= hi {
                break tick == hi;
            }
            if tick >= lo && ticks.last().is_none_or(|last| tick > *last) {
                ticks.push(tick);
            }
            index += 1;
        };
        if (self.always_include_max_value || landed) && ticks.last().is_none_or(|last| hi > *last)
        {
            ticks.push(hi);
        }

        let values = ticks.into_iter().map(Value::DateTime).collect();
        Ok((
            StepPlan::Calendar { step, anchor },
            Value::DateTime(lo),
            Value::DateTime(hi),
            values,
        ))
    }

    fn integer_stride(&self, kind: ValueKind, lo: i64, hi: i64) -> ChartResult<i64> {
        self.reject_unit(kind)?;
        match self.kind {
            ComputationKind::ByNumberOfPoints => Ok(select_index_step(
                lo,
                hi,
                self.effective_number_of_values(kind),
                self.always_include_min_value,
                self.always_include_max_value,
            )),
            ComputationKind::ByStep => Ok((self.configured_step()?.round() as i64).max(1)),
        }
    }

    fn index_ticks(
        &self,
        lo: i64,
        hi: i64,
    ) -> ChartResult<(StepPlan, Value, Value, SmallVec<[Value; 16]>)> {
        let step = self.integer_stride(ValueKind::Index, lo, hi)?;
        let values = self
            .stride_positions(lo, hi, step)?
            .into_iter()
            .map(Value::Index)
            .collect();
        Ok((StepPlan::Index(step), Value::Index(lo), Value::Index(hi), values))
    }

    fn enumerated_ticks(
        &self,
        categories: &EnumeratedDimension,
        min: &str,
        max: &str,
    ) -> ChartResult<(StepPlan, Value, Value, SmallVec<[Value; 16]>)> {
        let first = categories.position_of(min)?;
        let last = last_leaf_position(categories, max)?;
        let stride = self.integer_stride(ValueKind::Category, first as i64, last as i64)?;
        let mut values = SmallVec::new();
        for position in self.stride_positions(first as i64, last as i64, stride)? {
            let name = usize::try_from(position)
                .ok()
                .and_then(|position| categories.leaf_at(position))
                .ok_or_else(|| {
                    ChartError::InvalidData(format!("no category at position {position}"))
                })?;
            values.push(Value::Category(name.to_owned()));
        }
        Ok((
            StepPlan::Enumerated(stride as usize),
            Value::Category(min.to_owned()),
            Value::Category(max.to_owned()),
            values,
        ))
    }

    fn stride_positions(&self, lo: i64, hi: i64, step: i64) -> ChartResult<SmallVec<[i64; 16]>> {
        check_tick_budget((hi - lo) as f64, step as f64)?;
        let mut positions: SmallVec<[i64; 16]> = SmallVec::new();
        if self.always_include_min_value {
            positions.push(lo);
        }
        let mut position = ceil_div(lo, step) * step;
        while position < hi {
            if positions.last().is_none_or(|last| position > *last) {
                positions.push(position);
            }
            position += step;
        }
        if (self.always_include_max_value || hi.rem_euclid(step) == 0)
            && positions.last().is_none_or(|last| hi > *last)
        {
            positions.push(hi);
        }
        Ok(positions)
    }
}

fn adjust_value(
    plan: StepPlan,
    dimension: &Dimension,
    value: &Value,
    adjust_upwards: bool,
) -> ChartResult<Value> {
    match plan {
        StepPlan::Linear { grid, scale } => {
            let value = value.expect_f64()? / scale;
            let adjusted = if adjust_upwards {
                grid.ceil(value)
            } else {
                grid.floor(value)
            };
            Ok(Value::Double(adjusted * scale))
        }
        StepPlan::Logarithmic { grid, base } => {
            let value = value.expect_f64()?;
            if value <= 0.0 {
                return Err(ChartError::InvalidArgument(
                    "logarithmic axis values must be > 0".to_owned(),
                ));
            }
            let exponent = value.log(base);
            let exponent = if adjust_upwards {
                grid.ceil(exponent)
            } else {
                grid.floor(exponent)
            };
            Ok(Value::Double(log_power(base, exponent)))
        }
        StepPlan::Calendar { step, anchor } => step
            .snap(anchor, value.expect_datetime()?, adjust_upwards)
            .map(Value::DateTime),
        StepPlan::Index(step) => {
            let value = value.expect_index()?;
            Ok(Value::Index(if adjust_upwards {
                ceil_div(value, step) * step
            } else {
                value.div_euclid(step) * step
            }))
        }
        StepPlan::Enumerated(stride) => {
            let Some(categories) = dimension.as_enumerated() else {
                return Err(ChartError::Unsupported(format!(
                    "enumerated step applied to a {} dimension",
                    dimension.kind()
                )));
            };
            let coordinate = dimension.coordinate(value)?;
            let leaf = categories.leaf_at_coordinate(coordinate).ok_or_else(|| {
                ChartError::InvalidData("enumerated dimension has no categories".to_owned())
            })?;
            let position = categories.position_of(leaf)? as i64;
            let stride = stride.max(1) as i64;
            let rounded = if adjust_upwards {
                ceil_div(position, stride) * stride
            } else {
                position.div_euclid(stride) * stride
            };
            let clamped = rounded.clamp(0, categories.leaf_count().saturating_sub(1) as i64);
            categories
                .leaf_at(clamped as usize)
                .map(Value::category)
                .ok_or_else(|| ChartError::InvalidData("category position out of range".to_owned()))
        }
    }
}

fn last_leaf_position(categories: &EnumeratedDimension, name: &str) -> ChartResult<usize> {
    let end = categories.offset_of(name)? + categories.width_of(name)?;
    let leaf = categories
        .leaf_at_coordinate(end - f64::EPSILON * end.abs().max(1.0))
        .ok_or_else(|| {
            ChartError::InvalidData("enumerated dimension has no categories".to_owned())
        })?;
    categories.position_of(leaf)
}

fn grid_indices(grid: StepGrid, lo: f64, hi: f64) -> std::ops::RangeInclusive<i64> {
    grid.ceil_index(lo)..=grid.floor_index(hi)
}

fn push_increasing(ticks: &mut SmallVec<[f64; 16]>, value: f64, upper: f64) {
    if value < upper && ticks.last().is_none_or(|last| value > *last) {
        ticks.push(value);
    }
}

fn check_tick_budget(span: f64, step: f64) -> ChartResult<()> {
    if span / step > MAX_TICKS as f64 {
        return Err(ChartError::InvalidArgument(format!(
            "step {step} yields more than {MAX_TICKS} ticks"
        )));
    }
    Ok(())
}

/// `base^exponent`, exact for whole exponents.
pub(crate) fn log_power(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= f64::from(i32::MAX) {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

fn approx_equal(lhs: f64, rhs: f64) -> bool {
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    (lhs - rhs).abs() <= scale * 1e-12
}

#[cfg(test)]
mod tests {
    use super::{approx_equal, log_power};

    #[test]
    fn whole_exponents_are_exact() {
        assert_eq!(log_power(10.0, 3.0), 1000.0);
        assert_eq!(log_power(2.0, -2.0), 0.25);
    }

    #[test]
    fn approx_equal_is_relative() {
        assert!(approx_equal(1e15, 1e15 + 0.1));
        assert!(!approx_equal(1.0, 1.0 + 1e-9));
    }
}
