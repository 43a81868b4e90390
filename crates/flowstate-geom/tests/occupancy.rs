//! Property tests: occupancy of parsed boxes, spheres and unions.

use flowstate_core::Tensor;
use flowstate_geom::{union, BoxGenerator, Geometry, Sphere};
use proptest::prelude::*;

fn occupancy(geometry: &Geometry, point: [f32; 2]) -> f32 {
    geometry.value_at(&Tensor::vector(&point)).unwrap().data()[0]
}

fn slice() -> impl Strategy<Value = (i32, i32)> {
    (0i32..10, 1i32..6).prop_map(|(start, len)| (start, start + len))
}

proptest! {
    #[test]
    fn parsed_box_holds_exactly_its_cells(
        (x0, x1) in slice(),
        (y0, y1) in slice(),
        x in 0i32..16,
        y in 0i32..16,
    ) {
        let region: Geometry = BoxGenerator::parse(&format!("{x0}:{x1}, {y0}:{y1}")).unwrap().into();
        let inside = (x0..x1).contains(&x) && (y0..y1).contains(&y);
        let value = occupancy(&region, [x as f32 + 0.5, y as f32 + 0.5]);
        prop_assert_eq!(value, if inside { 1.0 } else { 0.0 });
    }

    #[test]
    fn sphere_holds_its_center_only_within_radius(
        cx in -5.0f32..5.0,
        cy in -5.0f32..5.0,
        radius in 0.5f32..4.0,
        gap in 0.1f32..3.0,
    ) {
        let ball: Geometry = Sphere::new(vec![cx, cy], radius).unwrap().into();
        prop_assert_eq!(occupancy(&ball, [cx, cy]), 1.0);
        prop_assert_eq!(occupancy(&ball, [cx + radius + gap, cy]), 0.0);
    }

    #[test]
    fn union_is_the_maximum_of_its_members(
        (x0, x1) in slice(),
        (y0, y1) in slice(),
        x in 0.0f32..16.0,
        y in 0.0f32..16.0,
    ) {
        let a: Geometry = BoxGenerator::parse(&format!("{x0}:{x1}, 0:16")).unwrap().into();
        let b: Geometry = BoxGenerator::parse(&format!("0:16, {y0}:{y1}")).unwrap().into();
        let expected = occupancy(&a, [x, y]).max(occupancy(&b, [x, y]));
        prop_assert_eq!(occupancy(&union([a, b]).unwrap(), [x, y]), expected);
    }
}

#[test]
fn empty_union_is_empty_everywhere() {
    let nothing = union(Vec::new()).unwrap();
    assert_eq!(nothing.rank(), None);
    assert_eq!(occupancy(&nothing, [1.0, 1.0]), 0.0);
}
