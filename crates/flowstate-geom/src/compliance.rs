//! Geometry contract compliance test helpers.
//!
//! These functions verify that a geometry satisfies the invariants
//! required of every `value_at` implementation. Reused across the
//! built-in kinds (box, sphere, union).

use crate::geometry::Geometry;
use flowstate_core::Tensor;

/// Assert that occupancy keeps the leading axes, has a trailing axis of
/// size 1, and contains only 0.0 or 1.0.
pub fn assert_occupancy_is_mask(geometry: &Geometry, points: &Tensor) {
    let v = geometry.value_at(points).unwrap();
    let rank = points.rank();
    assert_eq!(&v.shape()[..rank - 1], &points.shape()[..rank - 1]);
    assert_eq!(v.shape()[rank - 1], 1);
    for &x in v.data() {
        assert!(x == 0.0 || x == 1.0, "occupancy {x} is not a hard mask");
    }
}

/// Assert that `shifted(d).center() == center() + d`.
pub fn assert_shift_moves_center(geometry: &Geometry, offset: &[f32]) {
    let before = geometry.center();
    let after = geometry.shifted(offset).unwrap().center();
    for ((b, a), d) in before.iter().zip(&after).zip(offset) {
        assert!(
            (a - (b + d)).abs() < 1e-5,
            "center moved from {before:?} to {after:?}, expected offset {offset:?}"
        );
    }
}

/// Assert that a shifted geometry sampled at shifted points equals the
/// original geometry sampled at the original points.
pub fn assert_shift_preserves_occupancy(geometry: &Geometry, points: &Tensor, offset: &[f32]) {
    let moved_points = points.add(&Tensor::vector(offset)).unwrap();
    let original = geometry.value_at(points).unwrap();
    let moved = geometry
        .shifted(offset)
        .unwrap()
        .value_at(&moved_points)
        .unwrap();
    assert_eq!(original, moved);
}
