//! Smoke-like fluid physics.

use flowstate_core::Tensor;
use flowstate_field::advect::{semi_lagrangian, semi_lagrangian_staggered};
use flowstate_field::{CenteredGrid, Field, StaggeredGrid};
use flowstate_geom::union;

use crate::dependency::Dependency;
use crate::effect::{effect_applied, effect_applied_staggered};
use crate::error::PhysicsError;
use crate::kinds::{Fluid, DENSITY_EFFECT, INFLOW, OBSTACLE, VELOCITY_EFFECT};
use crate::physics::Physics;
use crate::resolved::ResolvedDependencies;
use crate::state::State;

/// Advects density and velocity, then applies sources, effects, buoyancy
/// and obstacles, in that order.
///
/// Inflows are read from the start of the tick. Obstacles and effects are
/// blocking so that moving geometry is seen where it is at the end of the
/// tick.
#[derive(Clone, Debug)]
pub struct FluidPhysics {
    deps: Vec<Dependency>,
}

impl FluidPhysics {
    /// Dependency set: `inflows`, `obstacles`, `density_effects`,
    /// `velocity_effects`.
    pub fn new() -> Self {
        Self {
            deps: vec![
                Dependency::tag("inflows", INFLOW),
                Dependency::tag("obstacles", OBSTACLE).blocking(),
                Dependency::tag("density_effects", DENSITY_EFFECT).blocking(),
                Dependency::tag("velocity_effects", VELOCITY_EFFECT).blocking(),
            ],
        }
    }
}

impl Default for FluidPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics for FluidPhysics {
    fn name(&self) -> &str {
        "fluid"
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    fn step(&self, state: &State, dt: f64, deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let fluid = state.as_fluid().ok_or(PhysicsError::UnexpectedKind {
            expected: "fluid",
            found: state.kind(),
        })?;
        let step = dt as f32;
        let flow = Field::from(fluid.velocity().clone());
        let mut density = semi_lagrangian(fluid.density(), &flow, step)?;
        let mut velocity = semi_lagrangian_staggered(fluid.velocity(), &flow, step)?;

        for inflow in deps.states("inflows") {
            let Some(inflow) = inflow.as_inflow() else { continue };
            let source = inflow.geometry().at(fluid.domain())?;
            density = density.add(&density.with_data(source.scale(inflow.rate() * step))?)?;
        }
        for effect in deps.states("density_effects") {
            if let Some(effect) = effect.as_effect() {
                density = effect_applied(effect, &density, dt)?;
            }
        }
        for effect in deps.states("velocity_effects") {
            if let Some(effect) = effect.as_effect() {
                velocity = effect_applied_staggered(effect, &velocity, dt)?;
            }
        }

        velocity = buoyant(&velocity, &density, fluid.buoyancy_factor() * step)?;

        let solids: Vec<_> = deps
            .states("obstacles")
            .iter()
            .filter_map(|s| s.as_obstacle())
            .map(|o| o.geometry().clone())
            .collect();
        if !solids.is_empty() {
            let solid = union(solids)?;
            density = cleared(&density, &solid.value_at(&density.center_points())?)?;
            velocity = velocity.try_map_components(|_, component| {
                let inside = solid.value_at(&component.center_points())?;
                cleared(component, &inside)
            })?;
        }

        Ok(fluid.with_grids(density, velocity, state.age() + dt).into())
    }
}

/// Add `factor * density` to the axis-0 face velocity.
fn buoyant(velocity: &StaggeredGrid, density: &CenteredGrid, factor: f32) -> Result<StaggeredGrid, PhysicsError> {
    if factor == 0.0 {
        return Ok(velocity.clone());
    }
    Ok(velocity.try_map_components(|axis, component| {
        if axis != 0 {
            return Ok(component.clone());
        }
        let lift = density.sample_at(&component.center_points())?.scale(factor);
        component.with_data(component.data().add(&lift)?)
    })?)
}

/// Zero `grid` wherever `mask` is one.
fn cleared(grid: &CenteredGrid, mask: &Tensor) -> Result<CenteredGrid, flowstate_field::FieldError> {
    grid.with_data(grid.data().mul(&mask.map(|m| 1.0 - m))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Inflow, Obstacle};
    use flowstate_field::Domain;
    use flowstate_geom::{BoxGenerator, Geometry};

    fn still_fluid(res: &[usize]) -> State {
        let fluid = Fluid::new(Domain::new(res).unwrap(), 0.0f32, 0.0f32, None)
            .unwrap()
            .with_buoyancy_factor(0.0);
        fluid.into()
    }

    #[test]
    fn inflow_adds_density_inside_its_region() {
        let fluid = still_fluid(&[4, 4]);
        let region: Geometry = BoxGenerator::parse("0:1, 0:1").unwrap().into();
        let inflow: State = Inflow::new(region, 2.0).into();
        let mut deps = ResolvedDependencies::new();
        deps.insert("inflows", vec![&inflow]);
        let next = FluidPhysics::new().step(&fluid, 0.5, &deps).unwrap();
        let density = next.as_fluid().unwrap().density().data();
        assert_eq!(density.get(&[0, 0, 0, 0]).unwrap(), 1.0);
        assert_eq!(density.sum(), 1.0);
        assert_eq!(next.age(), 0.5);
        assert_eq!(next.key(), fluid.key());
    }

    #[test]
    fn obstacles_clear_density_and_velocity() {
        let domain = Domain::new(&[4, 4]).unwrap();
        let fluid: State = Fluid::new(domain, 1.0f32, 1.0f32, None)
            .unwrap()
            .with_buoyancy_factor(0.0)
            .into();
        let wall: State = Obstacle::new(BoxGenerator::parse("0:4, 0:4").unwrap().into()).into();
        let mut deps = ResolvedDependencies::new();
        deps.insert("obstacles", vec![&wall]);
        let next = FluidPhysics::new().step(&fluid, 1.0, &deps).unwrap();
        let next = next.as_fluid().unwrap();
        assert_eq!(next.density().data().max_abs(), 0.0);
        // faces on the box surface count as inside
        for component in next.velocity().components() {
            assert_eq!(component.data().max_abs(), 0.0);
        }
    }

    #[test]
    fn buoyancy_lifts_along_axis_zero() {
        let domain = Domain::new(&[3, 3]).unwrap();
        let fluid: State = Fluid::new(domain, 1.0f32, 0.0f32, None).unwrap().into();
        let next = FluidPhysics::new()
            .step(&fluid, 1.0, &ResolvedDependencies::new())
            .unwrap();
        let v = next.as_fluid().unwrap().velocity();
        assert!(v.components()[0].data().max_abs() > 0.0);
        assert_eq!(v.components()[1].data().max_abs(), 0.0);
    }

    #[test]
    fn other_kinds_rejected() {
        let region: Geometry = BoxGenerator::parse("0:1, 0:1").unwrap().into();
        let inflow: State = Inflow::new(region, 1.0).into();
        match FluidPhysics::new().step(&inflow, 1.0, &ResolvedDependencies::new()) {
            Err(PhysicsError::UnexpectedKind { expected, found }) => {
                assert_eq!((expected, found), ("fluid", "inflow"));
            }
            other => panic!("expected UnexpectedKind, got {other:?}"),
        }
    }
}
