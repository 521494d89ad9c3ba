//! Interval selection for axis tick generation.
//!
//! Numeric axes step by "nice" values `{1, 2, 5} x 10^k`, index axes by integer
//! buckets of the same family, and date/time axes by calendar units.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

static NICE_MANTISSAS: [u32; 3] = [1, 2, 5];
const GRID_TOLERANCE: f64 = 1e-9;
const MIN_STEP_EXPONENT: i32 = -307;
const MAX_STEP_EXPONENT: i32 = 307;

/// A candidate step of the form `mantissa x 10^exponent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NiceStep {
    mantissa: u32,
    exponent: i32,
}

impl NiceStep {
    #[must_use]
    pub fn mantissa(self) -> u32 {
        self.mantissa
    }

    #[must_use]
    pub fn exponent(self) -> i32 {
        self.exponent
    }

    #[must_use]
    pub fn value(self) -> f64 {
        decimal_value(i64::from(self.mantissa), self.exponent)
    }

    fn decade_start(exponent: i32) -> Self {
        Self {
            mantissa: 1,
            exponent,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        match self.mantissa {
            1 => Self {
                mantissa: 2,
                exponent: self.exponent,
            },
            2 => Self {
                mantissa: 5,
                exponent: self.exponent,
            },
            _ => Self::decade_start(self.exponent + 1),
        }
    }
}

fn decimal_value(mantissa: i64, exponent: i32) -> f64 {
    if exponent >= 0 {
        mantissa as f64 * 10_f64.powi(exponent)
    } else {
        mantissa as f64 / 10_f64.powi(-exponent)
    }
}

/// Number of step-sized intervals needed to cover `span`.
#[must_use]
pub fn point_count(span: f64, step: f64) -> f64 {
    (span / step - GRID_TOLERANCE).ceil()
}

/// Picks the nice step with the fewest points that still yields at least
/// `min_points` intervals over `[min, max]`.
///
/// Candidates are scanned in increasing order; the scan stops at the first
/// candidate that falls below `min_points` and returns its predecessor.
#[must_use]
pub fn nice_numeric_step(min: f64, max: f64, min_points: usize) -> NiceStep {
    let span = match (max - min).abs() {
        span if span.is_finite() && span > 0.0 => span,
        _ => 1.0,
    };
    let min_points = min_points.max(1) as f64;
    // Exponents are clamped so every candidate stays a normal, non-zero double.
    let start_exponent = ((span.log10() - min_points.log10()).floor() - 1.0)
        .clamp(f64::from(MIN_STEP_EXPONENT), f64::from(MAX_STEP_EXPONENT))
        as i32;

    let mut best = NiceStep::decade_start(start_exponent);
    let mut candidate = best.next();
    while point_count(span, candidate.value()) >= min_points {
        best = candidate;
        candidate = candidate.next();
    }
    best
}

/// Precise multiples of a numeric step.
///
/// Steps that are decimal fractions are kept as `mantissa x 10^exponent` so grid
/// values such as `0.3` come out as the nearest double instead of `3 * 0.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepGrid {
    step: f64,
    decimal: Option<(i64, i32)>,
}

impl StepGrid {
    pub fn new(step: f64) -> ChartResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(ChartError::InvalidArgument(
                "step must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            step,
            decimal: decompose_decimal(step),
        })
    }

    #[must_use]
    pub fn from_nice(step: NiceStep) -> Self {
        Self {
            step: step.value(),
            decimal: Some((i64::from(step.mantissa), step.exponent)),
        }
    }

    #[must_use]
    pub fn step(self) -> f64 {
        self.step
    }

    /// The `n`-th multiple of the step.
    #[must_use]
    pub fn value_at(self, n: i64) -> f64 {
        match self.decimal {
            Some((mantissa, exponent)) => match n.checked_mul(mantissa) {
                Some(scaled) => decimal_value(scaled, exponent),
                None => n as f64 * self.step,
            },
            None => n as f64 * self.step,
        }
    }

    #[must_use]
    pub fn floor_index(self, value: f64) -> i64 {
        let quotient = value / self.step;
        snap(quotient).unwrap_or_else(|| quotient.floor()) as i64
    }

    #[must_use]
    pub fn ceil_index(self, value: f64) -> i64 {
        let quotient = value / self.step;
        snap(quotient).unwrap_or_else(|| quotient.ceil()) as i64
    }

    #[must_use]
    pub fn floor(self, value: f64) -> f64 {
        self.value_at(self.floor_index(value))
    }

    #[must_use]
    pub fn ceil(self, value: f64) -> f64 {
        self.value_at(self.ceil_index(value))
    }

    #[must_use]
    pub fn is_on_grid(self, value: f64) -> bool {
        snap(value / self.step).is_some()
    }
}

fn snap(quotient: f64) -> Option<f64> {
    let rounded = quotient.round();
    ((quotient - rounded).abs() <= GRID_TOLERANCE * rounded.abs().max(1.0)).then_some(rounded)
}

fn decompose_decimal(step: f64) -> Option<(i64, i32)> {
    for digits in 0..=12 {
        let scaled = step * 10_f64.powi(digits);
        if scaled >= 9.0e15 {
            return None;
        }
        let rounded = scaled.round();
        if rounded >= 1.0 && (scaled - rounded).abs() <= GRID_TOLERANCE * rounded {
            return Some((rounded as i64, -digits));
        }
    }
    None
}

/// Picks an integer step for index axes.
///
/// Bucket boundaries are grown outward at an end whose `grow_*` flag is set and
/// pulled inward otherwise. The scan returns the first step in `1, 2, 5, 10, ...`
/// whose bucket count does not exceed `max_buckets`.
#[must_use]
pub fn select_index_step(
    min: i64,
    max: i64,
    max_buckets: usize,
    grow_min: bool,
    grow_max: bool,
) -> i64 {
    let (min, max) = (min.min(max), min.max(max));
    let max_buckets = max_buckets.max(1) as i64;
    let mut candidate = NiceStep::decade_start(0);
    loop {
        let Some(step) = integer_step(candidate) else {
            return i64::MAX;
        };
        let first = if grow_min {
            min.div_euclid(step) * step
        } else {
            ceil_div(min, step) * step
        };
        let last = if grow_max {
            ceil_div(max, step) * step
        } else {
            max.div_euclid(step) * step
        };
        let buckets = (last - first) / step;
        if buckets <= max_buckets {
            return step;
        }
        candidate = candidate.next();
    }
}

fn integer_step(step: NiceStep) -> Option<i64> {
    let exponent = u32::try_from(step.exponent).ok()?;
    10_i64
        .checked_pow(exponent)
        .and_then(|decade| decade.checked_mul(i64::from(step.mantissa)))
}

pub(crate) fn ceil_div(value: i64, step: i64) -> i64 {
    let floor = value.div_euclid(step);
    if value.rem_euclid(step) == 0 {
        floor
    } else {
        floor + 1
    }
}

/// Calendar unit used to step date/time axes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum DateTimeUnit {
    Second,
    Minute,
    Hour,
    #[default]
    Day,
    Month,
    Year,
}

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

impl DateTimeUnit {
    /// Nominal length used when comparing units against an elapsed span.
    #[must_use]
    pub fn nominal_seconds(self) -> f64 {
        match self {
            Self::Second => 1.0,
            Self::Minute => SECONDS_PER_MINUTE as f64,
            Self::Hour => SECONDS_PER_HOUR as f64,
            Self::Day => SECONDS_PER_DAY as f64,
            Self::Month => 30.436_875 * SECONDS_PER_DAY as f64,
            Self::Year => 365.2425 * SECONDS_PER_DAY as f64,
        }
    }

    /// Calendar addition; month and year steps clamp to the last day of the month.
    pub fn add(self, time: NaiveDateTime, amount: i64) -> ChartResult<NaiveDateTime> {
        let shifted = match self {
            Self::Year => amount
                .checked_mul(12)
                .and_then(|months| add_months(time, months)),
            Self::Month => add_months(time, amount),
            Self::Day => add_seconds(time, amount, SECONDS_PER_DAY),
            Self::Hour => add_seconds(time, amount, SECONDS_PER_HOUR),
            Self::Minute => add_seconds(time, amount, SECONDS_PER_MINUTE),
            Self::Second => add_seconds(time, amount, 1),
        };
        shifted.ok_or_else(|| {
            ChartError::InvalidData(format!("{time} + {amount} {self:?} is out of calendar range"))
        })
    }

    /// Truncates to the start of the unit, aligned to a multiple of `step` within
    /// the enclosing unit (days within the month, hours within the day, ...).
    pub fn truncate(self, time: NaiveDateTime, step: u32) -> ChartResult<NaiveDateTime> {
        let step = step.max(1);
        let align = |value: u32| value - value % step;
        let date = time.date();
        let truncated = match self {
            Self::Year => {
                let year = time.year().div_euclid(step as i32) * step as i32;
                NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
            Self::Month => NaiveDate::from_ymd_opt(time.year(), align(time.month0()) + 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::Day => NaiveDate::from_ymd_opt(time.year(), time.month(), align(time.day0()) + 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Self::Hour => date.and_hms_opt(align(time.hour()), 0, 0),
            Self::Minute => date.and_hms_opt(time.hour(), align(time.minute()), 0),
            Self::Second => date.and_hms_opt(time.hour(), time.minute(), align(time.second())),
        };
        truncated.ok_or_else(|| {
            ChartError::InvalidData(format!("{time} cannot be truncated to {self:?}"))
        })
    }
}

fn add_months(time: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        time.checked_add_months(magnitude)
    } else {
        time.checked_sub_months(magnitude)
    }
}

fn add_seconds(time: NaiveDateTime, amount: i64, unit_seconds: i64) -> Option<NaiveDateTime> {
    let delta = TimeDelta::try_seconds(amount.checked_mul(unit_seconds)?)?;
    time.checked_add_signed(delta)
}

/// A calendar step: `step` units of `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeStep {
    pub step: u32,
    pub unit: DateTimeUnit,
}

impl DateTimeStep {
    #[must_use]
    pub fn new(step: u32, unit: DateTimeUnit) -> Self {
        Self {
            step: step.max(1),
            unit,
        }
    }

    #[must_use]
    pub fn nominal_seconds(self) -> f64 {
        f64::from(self.step) * self.unit.nominal_seconds()
    }

    /// Start of the step grid containing `time`.
    pub fn anchor(self, time: NaiveDateTime) -> ChartResult<NaiveDateTime> {
        self.unit.truncate(time, self.step)
    }

    /// The `n`-th tick counted from `anchor`.
    pub fn nth(self, anchor: NaiveDateTime, n: i64) -> ChartResult<NaiveDateTime> {
        let amount = n.checked_mul(i64::from(self.step)).ok_or_else(|| {
            ChartError::InvalidData(format!("{n} x {self:?} overflows the calendar"))
        })?;
        self.unit.add(anchor, amount)
    }

    /// Index of the last tick from `anchor` that is not after `time`.
    pub fn floor_index(self, anchor: NaiveDateTime, time: NaiveDateTime) -> ChartResult<i64> {
        let elapsed = (time - anchor).num_seconds() as f64;
        let mut index = (elapsed / self.nominal_seconds()).floor() as i64;
        while self.nth(anchor, index)? > time {
            index -= 1;
        }
        while self.nth(anchor, index + 1)? <= time {
            index += 1;
        }
        Ok(index)
    }

    /// Rounds `time` onto the tick grid that starts at `anchor`.
    pub fn snap(
        self,
        anchor: NaiveDateTime,
        time: NaiveDateTime,
        upwards: bool,
    ) -> ChartResult<NaiveDateTime> {
        let index = self.floor_index(anchor, time)?;
        let floor = self.nth(anchor, index)?;
        if upwards && floor < time {
            self.nth(anchor, index + 1)
        } else {
            Ok(floor)
        }
    }
}

static SUB_DAY_STEPS: [u32; 6] = [1, 2, 5, 10, 15, 30];
static HOUR_STEPS: [u32; 5] = [1, 2, 3, 6, 12];
static DAY_STEPS: [u32; 6] = [1, 2, 5, 7, 10, 15];
static MONTH_STEPS: [u32; 4] = [1, 2, 3, 6];

fn date_time_candidates() -> impl Iterator<Item = DateTimeStep> {
    let fixed = SUB_DAY_STEPS
        .iter()
        .map(|step| DateTimeStep::new(*step, DateTimeUnit::Second))
        .chain(
            SUB_DAY_STEPS
                .iter()
                .map(|step| DateTimeStep::new(*step, DateTimeUnit::Minute)),
        )
        .chain(
            HOUR_STEPS
                .iter()
                .map(|step| DateTimeStep::new(*step, DateTimeUnit::Hour)),
        )
        .chain(
            DAY_STEPS
                .iter()
                .map(|step| DateTimeStep::new(*step, DateTimeUnit::Day)),
        )
        .chain(
            MONTH_STEPS
                .iter()
                .map(|step| DateTimeStep::new(*step, DateTimeUnit::Month)),
        );
    let years = (0..7).flat_map(|exponent| {
        NICE_MANTISSAS.iter().map(move |mantissa| {
            DateTimeStep::new(mantissa * 10_u32.pow(exponent), DateTimeUnit::Year)
        })
    });
    fixed.chain(years)
}

/// Picks the calendar step with the fewest points that still yields at least
/// `min_points` intervals over `span_seconds`.
#[must_use]
pub fn select_date_time_step(span_seconds: f64, min_points: usize) -> DateTimeStep {
    let span = if span_seconds.is_finite() && span_seconds > 0.0 {
        span_seconds
    } else {
        SECONDS_PER_DAY as f64
    };
    let min_points = min_points.max(1) as f64;

    let mut best = DateTimeStep::new(1, DateTimeUnit::Second);
    for candidate in date_time_candidates() {
        if point_count(span, candidate.nominal_seconds()) < min_points {
            break;
        }
        best = candidate;
    }
    best
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::{
        DateTimeStep, DateTimeUnit, StepGrid, decompose_decimal, nice_numeric_step,
        select_index_step,
    };

    fn day(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn decimal_steps_are_decomposed() {
        assert_eq!(decompose_decimal(0.25), Some((25, -2)));
        assert_eq!(decompose_decimal(3.0), Some((3, 0)));
        assert_eq!(decompose_decimal(0.125), Some((125, -3)));
    }

    #[test]
    fn grid_multiples_avoid_accumulated_error() {
        let grid = StepGrid::from_nice(nice_numeric_step(0.0, 1.0, 10));
        assert_eq!(grid.step(), 0.1);
        assert_eq!(grid.value_at(3), 0.3);
        assert_eq!(grid.floor_index(0.6), 6);
        assert_eq!(grid.ceil_index(0.6), 6);
    }

    #[test]
    fn index_step_respects_inward_boundaries() {
        assert_eq!(select_index_step(3, 97, 10, false, false), 10);
        assert_eq!(select_index_step(0, 9, 10, true, true), 1);
    }

    #[test]
    fn subnormal_spans_still_get_a_positive_step() {
        let step = nice_numeric_step(0.0, 5e-324, 5).value();
        assert!(step > 0.0);
        assert!(step.is_normal());
        assert!(nice_numeric_step(-f64::MAX, f64::MAX, 1).value() > 0.0);
    }

    #[test]
    fn week_grid_continues_across_months() {
        let step = DateTimeStep::new(7, DateTimeUnit::Day);
        let anchor = step.anchor(day(1, 1)).expect("anchor");

        assert_eq!(step.nth(anchor, 9).expect("tick"), day(3, 4));
        assert_eq!(step.snap(anchor, day(3, 4), false).expect("snap"), day(3, 4));
        assert_eq!(step.snap(anchor, day(3, 10), true).expect("snap"), day(3, 11));
        assert_eq!(step.floor_index(anchor, day(3, 10)).expect("index"), 9);
    }

    #[test]
    fn month_grid_snaps_before_its_anchor() {
        let step = DateTimeStep::new(3, DateTimeUnit::Month);
        let anchor = step.anchor(day(5, 20)).expect("anchor");
        assert_eq!(anchor, day(4, 1));

        assert_eq!(step.snap(anchor, day(2, 15), false).expect("snap"), day(1, 1));
        assert_eq!(step.snap(anchor, day(2, 15), true).expect("snap"), day(4, 1));
    }
}
