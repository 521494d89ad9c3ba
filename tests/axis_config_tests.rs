use chart_axes::core::{
    Axis, AxisContext, AxisRole, ComputationKind, DateTimeUnit, Dimension, Value,
};
use chart_axes::{AxisConfig, ChartError, CoordinateSetConfig};

#[test]
fn axis_config_json_round_trip() {
    let config = AxisConfig::new(AxisRole::Y)
        .with_range(Value::Double(0.0), Value::Double(97.0))
        .with_reverse(true)
        .with_scale(1_000.0)
        .with_log_base(Some(10))
        .with_reference_value(Some(Value::Double(1.0)))
        .with_max_value_ics(250.0)
        .with_coordinates(
            CoordinateSetConfig::new()
                .with_number_of_values(8)
                .with_always_include(true, false),
        );

    let json = config.to_json_pretty().expect("serialize");
    let restored = AxisConfig::from_json_str(&json).expect("deserialize");
    assert_eq!(restored, config);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config = AxisConfig::from_json_str(r#"{ "role": "X" }"#).expect("deserialize");
    assert_eq!(config, AxisConfig::new(AxisRole::X));
    assert_eq!(config.scale, 1.0);
    assert_eq!(config.max_value_ics, 100.0);
    assert!(config.coordinates.round_value_range);
    assert!(config.coordinates.always_include_max_value);
    assert_eq!(config.coordinates.kind, ComputationKind::ByNumberOfPoints);
}

#[test]
fn malformed_json_is_invalid_data() {
    let err = AxisConfig::from_json_str("{ not json").expect_err("parse error");
    assert!(matches!(err, ChartError::InvalidData(_)));
}

#[test]
fn axis_builds_from_config() {
    let config = AxisConfig::new(AxisRole::Y)
        .with_range(Value::Double(3.0), Value::Double(97.0))
        .with_reverse(true)
        .with_coordinates(CoordinateSetConfig::new().with_step(25.0, None));

    let mut axis = Axis::from_config(&config, Dimension::Numeric).expect("axis");
    assert!(axis.reverse());
    assert_eq!(axis.role(), AxisRole::Y);
    assert_eq!(
        axis.default_computation().computation_kind(),
        ComputationKind::ByStep
    );

    let mut ctx = AxisContext::new();
    let ticks = axis
        .coordinate_set(&mut ctx)
        .expect("ticks")
        .as_f64()
        .expect("numeric");
    assert_eq!(ticks, vec![0.0, 25.0, 50.0, 75.0, 100.0]);
}

#[test]
fn axis_config_snapshot_restores_equivalent_axis() {
    let mut axis = Axis::with_range(
        AxisRole::X,
        Dimension::DateTime,
        Value::Double(0.0),
        Value::Double(864_000.0),
    )
    .expect("axis");
    axis.default_computation_mut()
        .set_step(2.0, Some(DateTimeUnit::Day))
        .expect("valid step");

    let config = axis.config();
    assert_eq!(config.coordinates.unit, Some(DateTimeUnit::Day));
    assert_eq!(config.coordinates.number_of_values, None);

    let rebuilt = Axis::from_config(&config, Dimension::DateTime).expect("rebuilt");
    assert_eq!(rebuilt.config(), config);
    assert_eq!(rebuilt.min_value(), axis.min_value());
    assert_eq!(rebuilt.max_value(), axis.max_value());
}

#[test]
fn invalid_config_values_are_rejected() {
    let step_without_value = CoordinateSetConfig {
        kind: ComputationKind::ByStep,
        ..CoordinateSetConfig::new()
    };
    assert!(matches!(
        step_without_value.build(),
        Err(ChartError::InvalidArgument(_))
    ));
    assert!(
        CoordinateSetConfig::new()
            .with_number_of_values(0)
            .build()
            .is_err()
    );

    let bad_scale = AxisConfig::new(AxisRole::X).with_scale(0.0);
    assert!(Axis::from_config(&bad_scale, Dimension::Numeric).is_err());

    let bad_base = AxisConfig::new(AxisRole::Y).with_log_base(Some(1));
    assert!(Axis::from_config(&bad_base, Dimension::Numeric).is_err());

    let mistyped =
        AxisConfig::new(AxisRole::X).with_range(Value::category("A"), Value::Double(1.0));
    let err = Axis::from_config(&mistyped, Dimension::Numeric).expect_err("mistyped range");
    assert!(matches!(err, ChartError::TypeMismatch { .. }));
}
