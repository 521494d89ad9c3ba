use approx::assert_relative_eq;
use chart_axes::core::{
    AxisContext, AxisRole, CoordinateSystem, Dimension, EnumeratedDimension, ParallelProjection,
    Value, Viewport, WorldPoint,
};

fn bar_chart() -> CoordinateSystem {
    let categories = EnumeratedDimension::from_names(["A", "B", "C", "D"]).expect("dimension");
    let mut system = CoordinateSystem::new(Dimension::Enumerated(categories), Dimension::Numeric)
        .expect("system");
    system
        .axis_mut(AxisRole::Y)
        .data_bind([3.0, 97.0].map(Value::Double))
        .expect("bind");
    system
}

#[test]
fn axes_keep_their_roles() {
    let system = bar_chart();
    assert_eq!(system.axis(AxisRole::X).role(), AxisRole::X);
    assert_eq!(system.axis(AxisRole::Y).role(), AxisRole::Y);
    assert_eq!(system.axis(AxisRole::Z).role(), AxisRole::Z);
}

#[test]
fn world_point_combines_axis_ics() {
    let mut system = bar_chart();
    let mut ctx = AxisContext::new();
    system.adjust_ranges(&mut ctx).expect("adjust");

    let point = system
        .world_point(&Value::category("B"), &Value::Double(50.0), None)
        .expect("world point");
    assert_eq!(point, WorldPoint::new(25.0, 50.0, 0.0));
}

#[test]
fn swapped_unit_vectors_lay_chart_sideways() {
    let mut system = bar_chart();
    let mut ctx = AxisContext::new();
    system.adjust_ranges(&mut ctx).expect("adjust");
    system
        .set_unit_vector(AxisRole::X, WorldPoint::new(0.0, 1.0, 0.0))
        .expect("x unit");
    system
        .set_unit_vector(AxisRole::Y, WorldPoint::new(1.0, 0.0, 0.0))
        .expect("y unit");

    let point = system
        .world_point(&Value::category("B"), &Value::Double(50.0), None)
        .expect("world point");
    assert_eq!(point, WorldPoint::new(50.0, 25.0, 0.0));
    assert_eq!(system.plane_extent(), (100.0, 100.0));
}

#[test]
fn non_finite_unit_vectors_are_rejected() {
    let mut system = bar_chart();
    assert!(
        system
            .set_unit_vector(AxisRole::Z, WorldPoint::new(f64::NAN, 0.0, 0.0))
            .is_err()
    );
    assert_eq!(
        system.unit_vector(AxisRole::Z),
        WorldPoint::new(0.0, 0.0, 1.0)
    );
}

#[test]
fn projection_maps_world_onto_viewport() {
    let mut system = bar_chart();
    let mut ctx = AxisContext::new();
    system.adjust_ranges(&mut ctx).expect("adjust");
    let projection = system
        .projection(Viewport::new(800, 400))
        .expect("projection");

    let point = system
        .world_point(&Value::category("C"), &Value::Double(25.0), None)
        .expect("world point");
    let (x, y) = projection.project(point).expect("pixel");
    assert_relative_eq!(x, 400.0);
    assert_relative_eq!(y, 300.0);
}

#[test]
fn depth_offsets_shift_projected_points() {
    let projection = ParallelProjection::new(Viewport::new(100, 100), 100.0, 100.0)
        .expect("projection")
        .with_depth_offset(0.5, 0.25)
        .expect("depth");

    let (x, y) = projection
        .project(WorldPoint::new(10.0, 20.0, 8.0))
        .expect("pixel");
    assert_relative_eq!(x, 14.0);
    assert_relative_eq!(y, 78.0);
}

#[test]
fn projection_rejects_degenerate_input() {
    assert!(ParallelProjection::new(Viewport::new(0, 10), 1.0, 1.0).is_err());
    assert!(ParallelProjection::new(Viewport::new(10, 10), 0.0, 1.0).is_err());
    let projection =
        ParallelProjection::new(Viewport::new(10, 10), 1.0, 1.0).expect("projection");
    assert!(projection.with_depth_offset(f64::INFINITY, 0.0).is_err());
    assert!(projection.project(WorldPoint::new(f64::NAN, 0.0, 0.0)).is_err());
}
