//! Passive marker transport.

use flowstate_field::advect::semi_lagrangian;
use flowstate_field::Field;

use crate::dependency::Dependency;
use crate::error::PhysicsError;
use crate::kinds::VELOCITY_FIELD;
use crate::physics::Physics;
use crate::resolved::ResolvedDependencies;
use crate::state::State;

/// Advects a marker through every velocity field of the current tick, in
/// collective order. Without a velocity field the marker only ages.
#[derive(Clone, Debug)]
pub struct MarkerPhysics {
    deps: Vec<Dependency>,
}

impl MarkerPhysics {
    /// Blocking `velocity` on the velocity-field tag.
    pub fn new() -> Self {
        Self {
            deps: vec![Dependency::tag("velocity", VELOCITY_FIELD).blocking()],
        }
    }
}

impl Default for MarkerPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl Physics for MarkerPhysics {
    fn name(&self) -> &str {
        "marker"
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    fn step(&self, state: &State, dt: f64, deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let marker = state.as_marker().ok_or(PhysicsError::UnexpectedKind {
            expected: "marker",
            found: state.kind(),
        })?;
        let mut density = marker.density().clone();
        for carrier in deps.states("velocity") {
            let velocity = match *carrier {
                State::Fluid(f) => Field::from(f.velocity().clone()),
                State::Burgers(b) => Field::from(b.velocity().clone()),
                other => {
                    return Err(PhysicsError::ExecutionFailed {
                        reason: format!("'{}' is tagged as a velocity field but has none", other.name()),
                    })
                }
            };
            density = semi_lagrangian(&density, &velocity, dt as f32)?;
        }
        Ok(marker.with_density_at(density, state.age() + dt).into())
    }
}
