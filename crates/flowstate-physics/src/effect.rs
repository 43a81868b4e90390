//! Applying [`Effect`] states to grids.

use flowstate_core::Tensor;
use flowstate_field::{CenteredGrid, Field, StaggeredGrid};

use crate::error::PhysicsError;
use crate::kinds::{Effect, EffectMode};

/// Combine `effect` with `grid` over a time step `dt`.
///
/// The effect's field is sampled at the grid's cell centers. With
/// [`EffectMode::Fix`] the grid keeps its values outside the field's
/// bounds; an unbounded field fixes the whole grid.
pub fn effect_applied(effect: &Effect, grid: &CenteredGrid, dt: f64) -> Result<CenteredGrid, PhysicsError> {
    let points = grid.center_points();
    let value = effect.field().sample_at(&points)?;
    let data = combine(effect, grid.data(), &value, &points, dt)?;
    Ok(grid.with_data(data)?)
}

/// Apply `effect` to each face component of a staggered grid.
///
/// A field with one component per axis drives each face component with
/// its own axis; a one-component field drives all of them.
pub fn effect_applied_staggered(
    effect: &Effect,
    grid: &StaggeredGrid,
    dt: f64,
) -> Result<StaggeredGrid, PhysicsError> {
    let field = effect.field();
    let components = grid
        .components()
        .iter()
        .enumerate()
        .map(|(axis, component)| {
            let points = component.center_points();
            let channel = if field.components() == 1 { 0 } else { axis };
            let value = field.sample_component_at(channel, &points)?;
            let data = combine(effect, component.data(), &value, &points, dt)?;
            Ok(component.with_data(data)?)
        })
        .collect::<Result<Vec<_>, PhysicsError>>()?;
    Ok(grid.with_components(components)?)
}

fn combine(
    effect: &Effect,
    data: &Tensor,
    value: &Tensor,
    points: &Tensor,
    dt: f64,
) -> Result<Tensor, PhysicsError> {
    let out = match effect.mode() {
        EffectMode::Growth => data.add(&value.scale(dt as f32))?,
        EffectMode::Replace => data.scale(0.0).add(value)?,
        EffectMode::Fix => {
            let inside = match effect.field() {
                Field::Constant(c) => match c.bounds() {
                    Some(bounds) => bounds.value_at(points)?,
                    None => return Ok(data.scale(0.0).add(value)?),
                },
                _ => return Ok(data.scale(0.0).add(value)?),
            };
            let outside = inside.map(|m| 1.0 - m);
            data.mul(&outside)?.add(&value.mul(&inside)?)?
        }
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_field::{ConstantField, Domain};
    use flowstate_geom::{BoxGenerator, Geometry};

    fn region() -> Geometry {
        BoxGenerator::parse("0:1, 0:4").unwrap().into()
    }

    #[test]
    fn fix_holds_values_inside_bounds_only() {
        let domain = Domain::new(&[4, 4]).unwrap();
        let grid = domain.centered_grid(0.25f32, 1, None).unwrap();
        let hold = Effect::constant_density(region(), 1.0);
        let out = effect_applied(&hold, &grid, 1.0).unwrap();
        // the first row of centers (x = 0.5) is inside
        assert_eq!(out.data().get(&[0, 0, 2, 0]).unwrap(), 1.0);
        assert_eq!(out.data().get(&[0, 2, 2, 0]).unwrap(), 0.25);
    }

    #[test]
    fn growth_scales_with_dt() {
        let domain = Domain::new(&[2, 2]).unwrap();
        let grid = domain.centered_grid(1.0f32, 1, None).unwrap();
        let grow = Effect::new(ConstantField::scalar(2.0), EffectMode::Growth, "density_effect");
        let out = effect_applied(&grow, &grid, 0.5).unwrap();
        assert_eq!(out.data().data(), &[2.0; 4]);
    }

    #[test]
    fn replace_overwrites_everything() {
        let domain = Domain::new(&[2, 2]).unwrap();
        let grid = domain.centered_grid(1.0f32, 1, None).unwrap();
        let set = Effect::new(ConstantField::scalar(-3.0), EffectMode::Replace, "density_effect");
        let out = effect_applied(&set, &grid, 0.5).unwrap();
        assert_eq!(out.data().data(), &[-3.0; 4]);
    }

    #[test]
    fn fan_pushes_each_face_component_along_its_axis() {
        let domain = Domain::new(&[4, 4]).unwrap();
        let v = domain.staggered_grid(0.0f32, None).unwrap();
        let everywhere: Geometry = BoxGenerator::parse("-1:5, -1:5").unwrap().into();
        let fan = Effect::fan(everywhere, vec![0.0, 2.0]);
        let out = effect_applied_staggered(&fan, &v, 1.0).unwrap();
        assert_eq!(out.components()[0].data().max_abs(), 0.0);
        assert!(out.components()[1].data().data().iter().all(|&x| x == 2.0));
    }
}
