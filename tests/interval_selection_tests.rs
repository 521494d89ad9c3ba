use chart_axes::core::{
    DateTimeStep, DateTimeUnit, StepGrid, nice_numeric_step, point_count, select_date_time_step,
    select_index_step,
};
use chrono::{NaiveDate, NaiveDateTime};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid date")
}

#[test]
fn numeric_step_prefers_fewest_points_meeting_bound() {
    let step = nice_numeric_step(0.0, 97.0, 5);
    assert_eq!(step.value(), 20.0);
    assert_eq!(point_count(97.0, 20.0), 5.0);
    assert!(point_count(97.0, step.next().value()) < 5.0);
}

#[test]
fn numeric_step_handles_fractional_spans() {
    assert_eq!(nice_numeric_step(0.0, 1.0, 10).value(), 0.1);
    assert_eq!(nice_numeric_step(-0.03, 0.07, 5).value(), 0.02);
}

#[test]
fn equal_bounds_use_unit_span() {
    assert_eq!(nice_numeric_step(5.0, 5.0, 5).value(), 0.2);
}

#[test]
fn step_grid_rejects_non_positive_steps() {
    assert!(StepGrid::new(0.0).is_err());
    assert!(StepGrid::new(-1.0).is_err());
    assert!(StepGrid::new(f64::NAN).is_err());
}

#[test]
fn step_grid_rounds_to_multiples() {
    let grid = StepGrid::new(0.25).expect("valid step");
    assert_eq!(grid.floor(1.3), 1.25);
    assert_eq!(grid.ceil(1.3), 1.5);
    assert_eq!(grid.ceil(1.5), 1.5);
    assert!(grid.is_on_grid(0.75));
    assert!(!grid.is_on_grid(0.8));
}

#[test]
fn index_step_grows_buckets_outward() {
    assert_eq!(select_index_step(0, 237, 10, true, true), 50);
    assert_eq!(select_index_step(0, 100, 10, true, true), 10);
    assert_eq!(select_index_step(0, 2, 2, true, true), 1);
}

#[test]
fn index_step_for_single_position_is_one() {
    assert_eq!(select_index_step(4, 4, 1, true, true), 1);
}

#[test]
fn date_time_step_picks_calendar_candidates() {
    let month_span = 30.0 * DateTimeUnit::Day.nominal_seconds();
    assert_eq!(
        select_date_time_step(month_span, 5),
        DateTimeStep::new(7, DateTimeUnit::Day)
    );
    assert_eq!(
        select_date_time_step(3_600.0, 5),
        DateTimeStep::new(10, DateTimeUnit::Minute)
    );
    let decade = 10.0 * DateTimeUnit::Year.nominal_seconds();
    assert_eq!(
        select_date_time_step(decade, 5),
        DateTimeStep::new(2, DateTimeUnit::Year)
    );
}

#[test]
fn date_time_step_falls_back_to_one_second() {
    assert_eq!(
        select_date_time_step(2.0, 10),
        DateTimeStep::new(1, DateTimeUnit::Second)
    );
}

#[test]
fn truncation_aligns_within_enclosing_unit() {
    let truncated = DateTimeUnit::Day
        .truncate(at(2024, 1, 31, 13), 7)
        .expect("truncate");
    assert_eq!(truncated, at(2024, 1, 29, 0));

    let truncated = DateTimeUnit::Hour
        .truncate(at(2024, 1, 31, 13), 6)
        .expect("truncate");
    assert_eq!(truncated, at(2024, 1, 31, 12));

    let truncated = DateTimeUnit::Month
        .truncate(at(2024, 8, 17, 5), 3)
        .expect("truncate");
    assert_eq!(truncated, at(2024, 7, 1, 0));
}

#[test]
fn month_addition_clamps_to_month_end() {
    let shifted = DateTimeUnit::Month
        .add(at(2024, 1, 31, 0), 1)
        .expect("add");
    assert_eq!(shifted, at(2024, 2, 29, 0));

    let shifted = DateTimeUnit::Year.add(at(2024, 2, 29, 0), 1).expect("add");
    assert_eq!(shifted, at(2025, 2, 28, 0));
}
