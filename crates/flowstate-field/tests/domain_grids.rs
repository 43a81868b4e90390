use flowstate_core::Tensor;
use flowstate_field::{
    unstack_staggered_tensor, CenteredGrid, Domain, Field, FieldError, GridData, Initializer,
    StaggeredGrid,
};
use flowstate_geom::{BoxGenerator, CenterPoints, Geometry};
use proptest::prelude::*;

fn assert_smoke_layout(density: &CenteredGrid, velocity: &StaggeredGrid) {
    assert_eq!(density.data().shape(), &[1, 4, 4, 1]);
    assert_eq!(velocity.resolution(), vec![4, 4]);
    assert_eq!(velocity.components()[0].resolution(), &[5, 4]);
    assert_eq!(velocity.components()[1].resolution(), &[4, 5]);
}

#[test]
fn every_data_source_yields_domain_shaped_grids() {
    let domain = Domain::new(&[4, 4]).unwrap();
    let sources: Vec<(GridData, GridData)> = vec![
        (0.0f32.into(), 0.0f32.into()),
        (1.0f32.into(), 1.0f32.into()),
        (Initializer::Zeros.into(), Initializer::Zeros.into()),
        (Initializer::randn(1).into(), Initializer::randn(2).into()),
        (
            Tensor::zeros(&[1, 4, 4, 1]).into(),
            Tensor::zeros(&[1, 5, 5, 2]).into(),
        ),
        (
            GridData::generator(Tensor::zeros),
            GridData::generator(Tensor::ones),
        ),
    ];
    for (density, velocity) in sources {
        let d = domain.centered_grid(density, 1, None).unwrap();
        let v = domain.staggered_grid(velocity, None).unwrap();
        assert_smoke_layout(&d, &v);
    }
}

#[test]
fn staggered_grid_from_existing_grid_is_reused() {
    let domain = Domain::new(&[4, 4]).unwrap();
    let v = domain.staggered_grid(Initializer::randn(5), None).unwrap();
    let again = domain.staggered_grid(v.clone(), None).unwrap();
    assert_eq!(again, v);
}

#[test]
fn batch_size_applies_to_fills() {
    let domain = Domain::new(&[8, 8]).unwrap();
    let d = domain.centered_grid(0.5f32, 1, Some(3)).unwrap();
    assert_eq!(d.batch_size(), 3);
    let v = domain.staggered_grid(0.0f32, Some(3)).unwrap();
    assert_eq!(v.batch_size(), 3);
}

#[test]
fn wrong_tensor_resolution_rejected() {
    let domain = Domain::new(&[4, 4]).unwrap();
    match domain.centered_grid(Tensor::zeros(&[1, 3, 4, 1]), 1, None) {
        Err(FieldError::ResolutionMismatch { expected, found }) => {
            assert_eq!(expected, vec![4, 4]);
            assert_eq!(found, vec![3, 4]);
        }
        other => panic!("expected ResolutionMismatch, got {other:?}"),
    }
}

#[test]
fn geometry_field_rasterizes_onto_domain() {
    let domain = Domain::new(&[16, 16]).unwrap();
    let region: Geometry = BoxGenerator::parse("0:2, 6:10").unwrap().into();
    let mask = domain.centered_grid(Field::from(region.clone()), 1, None).unwrap();
    assert_eq!(mask.data(), &region.at(&domain).unwrap());
    // centers 0.5, 1.5 by 6.5..9.5
    assert_eq!(mask.data().sum(), 8.0);
}

#[test]
fn padded_layout_splits_per_axis() {
    let mut tensor = Tensor::zeros(&[1, 5, 5, 2]);
    tensor.set(&[0, 0, 0, 0], 1.0).unwrap();
    let parts = unstack_staggered_tensor(&tensor).unwrap();
    assert_eq!(parts[0].shape(), &[1, 5, 4, 1]);
    assert_eq!(parts[1].shape(), &[1, 4, 5, 1]);
}

proptest! {
    #[test]
    fn sampling_at_own_centers_returns_data(
        rows in 1usize..5,
        cols in 1usize..5,
        seed in 0u64..1000,
    ) {
        let domain = Domain::new(&[rows, cols]).unwrap();
        let grid = domain.centered_grid(Initializer::randn(seed), 2, None).unwrap();
        let sampled = grid.sample_at(&domain.center_points()).unwrap();
        prop_assert_eq!(&sampled, grid.data());
    }

    #[test]
    fn at_centers_of_uniform_faces_is_uniform(value in -10.0f32..10.0) {
        let domain = Domain::new(&[3, 4]).unwrap();
        let v = domain.staggered_grid(value, None).unwrap();
        let c = v.at_centers().unwrap();
        prop_assert_eq!(c.data().shape(), &[1, 3, 4, 2]);
        for &x in c.data().data() {
            prop_assert!((x - value).abs() < 1e-5);
        }
    }
}
