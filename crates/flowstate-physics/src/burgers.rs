//! Burgers' equation on a centered velocity grid.

use flowstate_field::advect::{diffuse, semi_lagrangian};
use flowstate_field::Field;

use crate::dependency::Dependency;
use crate::effect::effect_applied;
use crate::error::PhysicsError;
use crate::kinds::VELOCITY_EFFECT;
use crate::physics::Physics;
use crate::resolved::ResolvedDependencies;
use crate::state::State;

/// Self-advection, explicit diffusion by `dt * viscosity`, then every
/// velocity effect of the current tick.
#[derive(Clone, Debug)]
pub struct BurgersPhysics {
    deps: Vec<Dependency>,
}

impl BurgersPhysics {
    /// Blocking `effects` on the velocity-effect tag.
    pub fn new() -> Self {
        Self {
            deps: vec![Dependency::tag("effects", VELOCITY_EFFECT).blocking()],
        }
    }
}

impl Default for BurgersPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics for BurgersPhysics {
    fn name(&self) -> &str {
        "burgers"
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    fn step(&self, state: &State, dt: f64, deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let burgers = state.as_burgers().ok_or(PhysicsError::UnexpectedKind {
            expected: "burgers",
            found: state.kind(),
        })?;
        let v = burgers.velocity();
        let mut v = semi_lagrangian(v, &Field::from(v.clone()), dt as f32)?;
        v = diffuse(&v, dt as f32 * burgers.viscosity())?;
        for effect in deps.states("effects").iter().filter_map(|s| s.as_effect()) {
            v = effect_applied(effect, &v, dt)?;
        }
        Ok(burgers.with_velocity_at(v, state.age() + dt).into())
    }
}
