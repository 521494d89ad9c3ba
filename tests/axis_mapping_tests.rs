use approx::assert_relative_eq;
use chart_axes::ChartError;
use chart_axes::core::{
    Axis, AxisContext, AxisRole, Dimension, EnumeratedDimension, LogScale, ScreenDirection,
    TargetMapping, Value, Viewport,
};
use chrono::NaiveDate;

fn numeric_axis(min: f64, max: f64) -> Axis {
    Axis::with_range(
        AxisRole::X,
        Dimension::Numeric,
        Value::Double(min),
        Value::Double(max),
    )
    .expect("valid axis")
}

#[test]
fn linear_mapping_spans_ics_extent() {
    let mut axis = numeric_axis(0.0, 100.0);
    assert_eq!(axis.min_value_ics(), 0.0);
    assert_eq!(axis.max_value_ics(), 100.0);
    assert_eq!(axis.lcs_to_ics(25.0).expect("map"), 25.0);

    axis.set_max_value_ics(200.0).expect("valid extent");
    assert_eq!(axis.lcs_to_ics(25.0).expect("map"), 50.0);
    assert!(axis.set_max_value_ics(0.0).is_err());
}

#[test]
fn reverse_flips_mapping() {
    let mut axis = numeric_axis(0.0, 100.0);
    axis.set_reverse(true);

    assert_eq!(axis.lcs_to_ics(25.0).expect("map"), 75.0);
    assert_eq!(axis.icoordinate(&Value::Double(0.0)).expect("map"), 100.0);
}

#[test]
fn ics_to_lcs_inverts_mapping() {
    let mut axis = numeric_axis(-50.0, 150.0);
    axis.set_reverse(true);

    let ics = axis.lcs_to_ics(42.0).expect("map");
    assert_relative_eq!(axis.ics_to_lcs(ics).expect("inverse"), 42.0, epsilon = 1e-9);
}

#[test]
fn index_values_occupy_unit_slots() {
    let axis = Axis::with_range(
        AxisRole::X,
        Dimension::Index,
        Value::Index(0),
        Value::Index(9),
    )
    .expect("valid axis");

    assert_eq!(axis.min_value_lcs().expect("min"), 0.0);
    assert_eq!(axis.max_value_lcs().expect("max"), 10.0);
    assert_eq!(axis.icoordinate(&Value::Index(5)).expect("map"), 50.0);
    assert_eq!(axis.iwidth(&Value::Index(5)).expect("width"), 10.0);
}

#[test]
fn categories_map_by_offset_and_width() {
    let categories = EnumeratedDimension::from_names(["A", "B", "C", "D"]).expect("dimension");
    let axis = Axis::new(AxisRole::X, Dimension::Enumerated(categories)).expect("valid axis");

    assert_eq!(axis.max_value_lcs().expect("max"), 4.0);
    assert_eq!(axis.icoordinate(&Value::category("B")).expect("map"), 25.0);
    assert_eq!(axis.iwidth(&Value::category("B")).expect("width"), 25.0);
    assert!(axis.icoordinate(&Value::category("Z")).is_err());
}

#[test]
fn date_time_maps_by_elapsed_seconds() {
    let day = |d: u32| {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    };
    let axis = Axis::with_range(
        AxisRole::X,
        Dimension::DateTime,
        Value::DateTime(day(1)),
        Value::DateTime(day(3)),
    )
    .expect("valid axis");

    assert_relative_eq!(
        axis.icoordinate(&Value::DateTime(day(2))).expect("map"),
        50.0,
        epsilon = 1e-9
    );
    assert_eq!(axis.iwidth(&Value::DateTime(day(2))).expect("width"), 0.0);
}

#[test]
fn logarithmic_mapping_uses_log_distances() {
    let mut axis = numeric_axis(1.0, 1000.0);
    axis.set_log_scale(Some(LogScale::new(10).expect("valid base")));

    assert_relative_eq!(
        axis.lcs_to_ics(10.0).expect("map"),
        100.0 / 3.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        axis.ics_to_lcs(200.0 / 3.0).expect("inverse"),
        100.0,
        max_relative = 1e-9
    );
}

#[test]
fn logarithmic_mapping_rejects_non_positive_values() {
    let mut axis = numeric_axis(1.0, 1000.0);
    axis.set_log_scale(Some(LogScale::default()));
    let err = axis.lcs_to_ics(0.0).expect_err("zero on log axis");
    assert!(matches!(err, ChartError::InvalidArgument(_)));

    axis.set_min_value(Value::Double(-5.0)).expect("valid min");
    let err = axis.lcs_to_ics(10.0).expect_err("negative minimum on log axis");
    assert!(matches!(err, ChartError::InvalidArgument(_)));
}

#[test]
fn empty_logical_range_cannot_be_mapped() {
    let axis = numeric_axis(5.0, 5.0);
    let err = axis.lcs_to_ics(5.0).expect_err("empty range");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn wrongly_typed_values_are_rejected() {
    let axis = numeric_axis(0.0, 100.0);
    let err = axis
        .icoordinate(&Value::category("A"))
        .expect_err("category on numeric axis");
    assert!(matches!(err, ChartError::TypeMismatch { .. }));
    assert!(!err.is_programming_error());

    assert!(axis.lcs_to_ics(f64::NAN).is_err());
}

#[test]
fn pixel_positions_follow_screen_direction() {
    let viewport = Viewport::new(1000, 500);
    let axis = numeric_axis(0.0, 100.0);

    let horizontal =
        TargetMapping::new(viewport, ScreenDirection::Horizontal).expect("valid mapping");
    let (x, width) = axis
        .get_pixel_position(&Value::Double(25.0), &horizontal)
        .expect("position");
    assert_eq!(x, 250.0);
    assert_eq!(width, 0.0);

    let vertical = TargetMapping::new(viewport, ScreenDirection::Vertical).expect("valid mapping");
    let (y, _) = axis
        .get_pixel_position(&Value::Double(25.0), &vertical)
        .expect("position");
    assert_eq!(y, 375.0);
}

#[test]
fn pixel_width_of_index_slot() {
    let viewport = Viewport::new(1000, 500);
    let axis = Axis::with_range(
        AxisRole::X,
        Dimension::Index,
        Value::Index(0),
        Value::Index(9),
    )
    .expect("valid axis");
    let mapping = TargetMapping::new(viewport, ScreenDirection::Horizontal)
        .expect("valid mapping")
        .with_margins(50.0, 50.0)
        .expect("valid margins");

    let (x, width) = axis
        .get_pixel_position(&Value::Index(5), &mapping)
        .expect("position");
    assert_relative_eq!(x, 500.0, epsilon = 1e-9);
    assert_relative_eq!(width, 90.0, epsilon = 1e-9);
}

#[test]
fn invalid_targets_are_rejected() {
    assert!(TargetMapping::new(Viewport::new(0, 0), ScreenDirection::Horizontal).is_err());
    let mapping = TargetMapping::new(Viewport::new(100, 100), ScreenDirection::Vertical)
        .expect("valid mapping");
    assert!(mapping.with_margins(60.0, 40.0).is_err());
    assert!(mapping.with_margins(-1.0, 0.0).is_err());
}

#[test]
fn tick_positions_cover_adjusted_range() {
    let mut axis = numeric_axis(3.0, 97.0);
    let mut ctx = AxisContext::new();
    axis.adjust_range(&mut ctx).expect("adjust");

    let positions = axis.tick_positions_ics(&mut ctx).expect("positions");
    assert_eq!(positions, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
}

#[test]
fn batch_mapping_matches_single_mapping() {
    let axis = numeric_axis(0.0, 200.0);
    let values: Vec<Value> = (0..50).map(|i| Value::Double(f64::from(i) * 4.0)).collect();

    let batch = axis.icoordinates(&values).expect("batch");
    for (value, ics) in values.iter().zip(batch) {
        assert_eq!(axis.icoordinate(value).expect("single"), ics);
    }
    assert!(axis.icoordinates(&[Value::Index(1), Value::category("A")]).is_err());
}
