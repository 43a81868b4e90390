//! Integration test: small smoke scenarios driven through a `World`.

use std::sync::{Arc, Mutex};

use flowstate_core::Tensor;
use flowstate_field::{Domain, Initializer};
use flowstate_geom::{BoxGenerator, Geometry, Sphere};
use flowstate_physics::{Effect, GeometryMovement, StepError};
use flowstate_world::{World, WorldConfig, WorldError};
use proptest::prelude::*;

fn sphere(center: [f32; 2], radius: f32) -> Geometry {
    Sphere::new(center.to_vec(), radius).unwrap().into()
}

fn density_sum(world: &World, key: flowstate_core::TrajectoryKey) -> f32 {
    world
        .get(key)
        .and_then(|s| s.as_fluid())
        .map(|f| f.density().data().sum())
        .unwrap()
}

#[test]
fn fluid_fed_by_inflow_ages_with_the_world() {
    let mut world = World::default();
    let smoke = world
        .add_fluid(Domain::new(&[16, 16]).unwrap(), 0.0f32, 0.0f32)
        .unwrap();
    let inflow = world.add_inflow(sphere([8.0, 8.0], 4.0), 0.2).unwrap();

    world.step(None, 1.0).unwrap();
    world.step(None, 1.0).unwrap();

    assert_eq!(world.age(), 2.0);
    assert_eq!(world.get(smoke).unwrap().age(), 2.0);
    assert_eq!(world.get(inflow).unwrap().age(), 2.0);
    assert!(density_sum(&world, smoke) > 0.0);
    assert_eq!(world.last_metrics().sweeps, 1);
    assert_eq!(world.last_metrics().states_stepped, 2);
}

#[test]
fn simple_plume_with_manual_smoke_step() {
    let mut world = World::new(WorldConfig {
        batch_size: Some(3),
        ..WorldConfig::default()
    })
    .unwrap();
    let smoke = world
        .add_fluid(Domain::new(&[16, 16]).unwrap(), 0.0f32, 0.0f32)
        .unwrap();
    let inflow = world.add_inflow(sphere([8.0, 8.0], 4.0), 0.2).unwrap();

    world.step(None, 1.0).unwrap();
    world.step(Some(smoke), 1.0).unwrap();

    assert_eq!(world.age(), 2.0);
    assert_eq!(world.get(smoke).unwrap().age(), 2.0);
    assert_eq!(world.get(inflow).unwrap().age(), 1.0);
    let state = world.get(smoke).unwrap();
    assert_eq!(state.batch_size(), Some(3));
    assert_eq!(state.as_fluid().unwrap().density().batch_size(), 3);
}

#[test]
fn effects_run_alongside_smoke() {
    let mut world = World::default();
    let smoke = world
        .add_fluid(Domain::new(&[16, 16]).unwrap(), 0.0f32, 0.0f32)
        .unwrap();
    world.add_inflow(sphere([8.0, 8.0], 4.0), 0.2).unwrap();
    let pinned: Geometry = BoxGenerator::parse("[0:2, 6:10]").unwrap().into();
    world
        .add(Effect::constant_density(pinned.clone(), 1.0).into(), None)
        .unwrap();
    world
        .add(Effect::fan(sphere([10.0, 8.0], 5.0), vec![-1.0, 0.0]).into(), None)
        .unwrap();

    world.step_default().unwrap();
    world.step_default().unwrap();

    let density = world.get(smoke).unwrap().as_fluid().unwrap().density().clone();
    // cell (1, 7) is inside the pinned box
    let pinned_value = density.data().get(&[0, 1, 7, 0]).unwrap();
    assert!((pinned_value - 1.0).abs() < 1e-6, "pinned cell holds {pinned_value}");
    assert_eq!(world.age(), 2.0);
}

#[test]
fn box_spec_selects_cells() {
    let region: Geometry = BoxGenerator::parse("[0:2, 6:10]").unwrap().into();
    let inside = region.value_at(&Tensor::vector(&[1.0, 7.0])).unwrap();
    let outside = region.value_at(&Tensor::vector(&[5.0, 5.0])).unwrap();
    assert_eq!(inside.data(), &[1.0]);
    assert_eq!(outside.data(), &[0.0]);
}

#[test]
fn staggered_components_are_face_offset() {
    let mut world = World::default();
    let smoke = world
        .add_fluid(Domain::new(&[4, 4]).unwrap(), Initializer::randn(7), Initializer::randn(8))
        .unwrap();
    let fluid = world.get(smoke).unwrap().as_fluid().unwrap();
    assert_eq!(fluid.density().data().shape(), &[1, 4, 4, 1]);
    assert_eq!(fluid.velocity().resolution(), vec![4, 4]);
    assert_eq!(fluid.velocity().components()[0].resolution(), &[5, 4]);
    assert_eq!(fluid.velocity().components()[1].resolution(), &[4, 5]);
}

#[test]
fn obstacle_blocks_inflow() {
    let mut world = World::default();
    let smoke = world
        .add_fluid(Domain::new(&[8, 8]).unwrap(), 0.0f32, 0.0f32)
        .unwrap();
    let source: Geometry = BoxGenerator::parse("0:4, 0:4").unwrap().into();
    world.add_inflow(source.clone(), 1.0).unwrap();
    world.add_obstacle(source).unwrap();

    world.step_default().unwrap();
    assert_eq!(world.last_metrics().sweeps, 2);
    assert_eq!(density_sum(&world, smoke), 0.0);
    assert!(world.obstacle_mask().unwrap().is_some());
}

#[test]
fn moving_obstacle_follows_its_path() {
    let mut world = World::default();
    let path = GeometryMovement::new(|t| {
        BoxGenerator::parse("0:2, 0:2")
            .ok()
            .and_then(|b| Geometry::from(b).shifted(&[t as f32, 0.0]).ok())
            .unwrap_or(Geometry::Union(Vec::new()))
    });
    let wall = world
        .add(
            flowstate_physics::Obstacle::new(path.geometry_at(0.0)).into(),
            Some(Arc::new(path)),
        )
        .unwrap();
    world.step(None, 1.0).unwrap();
    world.step(None, 1.0).unwrap();
    let obstacle = world.get(wall).unwrap().as_obstacle().unwrap();
    assert_eq!(obstacle.geometry().center(), vec![3.0, 1.0]);
    assert!((obstacle.velocity()[0] - 1.0).abs() < 1e-3);
}

#[test]
fn marker_rides_on_the_fluid() {
    let mut world = World::default();
    world
        .add_fluid(Domain::new(&[8, 8]).unwrap(), 0.0f32, 0.0f32)
        .unwrap();
    let dye = world.add_marker(Domain::new(&[8, 8]).unwrap(), 1.0f32).unwrap();
    world.step_default().unwrap();
    assert_eq!(world.last_metrics().sweeps, 2);
    assert_eq!(world.get(dye).unwrap().age(), 1.0);
}

#[test]
fn observers_track_a_run() {
    let mut world = World::default();
    let ages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ages);
    world.on_change(move |c| sink.lock().unwrap().push(c.age()));

    world
        .add_fluid(Domain::new(&[4, 4]).unwrap(), 0.0f32, 0.0f32)
        .unwrap();
    world.step(None, 0.5).unwrap();
    world.step(None, 0.5).unwrap();
    assert_eq!(*ages.lock().unwrap(), vec![0.0, 0.5, 1.0]);
}

#[test]
fn stepping_an_unknown_trajectory_fails() {
    let mut world = World::default();
    let mut elsewhere = World::default();
    let stranger = elsewhere.add_inflow(sphere([0.0, 0.0], 1.0), 1.0).unwrap();
    match world.step(Some(stranger), 1.0) {
        Err(WorldError::Step(StepError::UnknownTrajectory(key))) => assert_eq!(key, stranger),
        other => panic!("expected UnknownTrajectory, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn repeated_steps_accumulate_age_and_keep_order(
        sources in 1usize..6,
        steps in 1usize..5,
        dt in 0.1f64..2.0,
    ) {
        let mut world = World::default();
        let keys: Vec<_> = (0..sources)
            .map(|i| world.add_inflow(sphere([i as f32, 0.0], 1.0), 1.0).unwrap())
            .collect();
        for _ in 0..steps {
            world.step(None, dt).unwrap();
        }
        let expected = steps as f64 * dt;
        prop_assert!((world.age() - expected).abs() < 1e-9);
        let order: Vec<_> = world.state().keys().collect();
        prop_assert_eq!(&order, &keys);
        for key in keys {
            prop_assert!((world.get(key).unwrap().age() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn removing_any_entity_keeps_the_rest_in_order(n in 2usize..8, victim in 0usize..8) {
        let victim = victim % n;
        let mut world = World::default();
        let mut keys: Vec<_> = (0..n)
            .map(|i| world.add_obstacle(sphere([i as f32, i as f32], 0.5)).unwrap())
            .collect();
        world.remove(keys[victim]).unwrap();
        keys.remove(victim);
        let order: Vec<_> = world.state().keys().collect();
        prop_assert_eq!(order, keys);
    }
}
