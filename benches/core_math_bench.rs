use chart_axes::core::{
    Axis, AxisContext, AxisRole, CoordinateSetComputation, Dimension, LinearScale, Value,
    nice_numeric_step,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let scale = LinearScale::new(0.0, 10_000.0).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale
                .domain_to_range(4_321.123, 0.0, 1920.0)
                .expect("to pixel");
            let _ = scale.range_to_domain(px, 0.0, 1920.0).expect("from pixel");
        })
    });
}

fn bench_nice_numeric_step(c: &mut Criterion) {
    c.bench_function("nice_numeric_step", |b| {
        b.iter(|| {
            let _ = nice_numeric_step(black_box(-13.7), black_box(98_765.4), black_box(7));
        })
    });
}

fn bench_coordinate_set_recompute(c: &mut Criterion) {
    let axis = Axis::with_range(
        AxisRole::Y,
        Dimension::Numeric,
        Value::Double(-3.2),
        Value::Double(1_234.5),
    )
    .expect("valid axis");
    let mut ctx = AxisContext::new();
    let mut computation = CoordinateSetComputation::by_number_of_points(10).expect("valid count");

    c.bench_function("coordinate_set_recompute", |b| {
        b.iter(|| {
            let _ = computation
                .recompute(black_box(axis.state()), &mut ctx)
                .expect("recompute should succeed");
        })
    });
}

fn bench_icoordinates_10k(c: &mut Criterion) {
    let axis = Axis::with_range(
        AxisRole::X,
        Dimension::Numeric,
        Value::Double(0.0),
        Value::Double(10_000.0),
    )
    .expect("valid axis");
    let values: Vec<Value> = (0..10_000).map(|i| Value::Double(f64::from(i))).collect();

    c.bench_function("icoordinates_10k", |b| {
        b.iter(|| {
            let _ = axis
                .icoordinates(black_box(&values))
                .expect("mapping should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_nice_numeric_step,
    bench_coordinate_set_recompute,
    bench_icoordinates_10k
);
criterion_main!(benches);
