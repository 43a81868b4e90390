//! Criterion micro-benchmarks for collective scheduling and fluid stepping.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowstate_geom::BoxGenerator;
use flowstate_physics::{CollectiveState, Fluid, Inflow, Obstacle, State};
use flowstate_test_utils::{chain, square_domain, tagged_state};

/// Benchmark: 64 independent static states, resolved in a single sweep.
fn bench_flat_64(c: &mut Criterion) {
    let states: Vec<State> = (0..64).map(|i| tagged_state(&[format!("s{i}").as_str()])).collect();
    let collective = CollectiveState::from_states(states).unwrap();
    let physics = collective.default_physics();

    c.bench_function("flat_64", |b| {
        b.iter(|| {
            let next = physics.step(&collective, 1.0).unwrap();
            black_box(&next);
        });
    });
}

/// Benchmark: a 64-link blocking chain listed downstream first.
///
/// Worst case for the sweep scheduler: one link per sweep.
fn bench_reversed_chain_64(c: &mut Criterion) {
    let (mut states, physics) = chain(64);
    states.reverse();
    let collective = CollectiveState::from_states(states).unwrap();

    c.bench_function("reversed_chain_64", |b| {
        b.iter(|| {
            let next = physics.step(&collective, 1.0).unwrap();
            black_box(&next);
        });
    });
}

/// Benchmark: one tick of a 32x32 fluid with an inflow and an obstacle.
fn bench_fluid_32x32(c: &mut Criterion) {
    let smoke: State = Fluid::new(square_domain(32), 0.0f32, 0.0f32, None).unwrap().into();
    let source: State = Inflow::new(BoxGenerator::parse("2:6, 14:18").unwrap().into(), 1.0).into();
    let wall: State = Obstacle::new(BoxGenerator::parse("20:24, 8:24").unwrap().into()).into();
    let collective = CollectiveState::from_states([smoke, source, wall]).unwrap();
    let physics = collective.default_physics();

    c.bench_function("fluid_32x32", |b| {
        b.iter(|| {
            let next = physics.step(&collective, 1.0).unwrap();
            black_box(&next);
        });
    });
}

criterion_group!(benches, bench_flat_64, bench_reversed_chain_64, bench_fluid_32x32);
criterion_main!(benches);
