//! Prescribed motion of geometry-carrying states.

use std::fmt;
use std::sync::Arc;

use flowstate_field::Field;
use flowstate_geom::Geometry;

use crate::error::PhysicsError;
use crate::physics::Physics;
use crate::resolved::ResolvedDependencies;
use crate::state::State;

/// Geometry as a function of simulated time.
pub type GeometryPath = Arc<dyn Fn(f64) -> Geometry + Send + Sync>;

/// Places a state's geometry at `path(age + dt)` and derives its velocity
/// by a forward difference of the geometry center.
///
/// The difference step is `1e-2 * dt`, or `1e-2` when `dt` is not
/// positive. Applies to obstacles and to effects whose field is a
/// constant masked by a single geometry.
#[derive(Clone)]
pub struct GeometryMovement {
    path: GeometryPath,
}

impl GeometryMovement {
    /// Move along `path`.
    pub fn new(path: impl Fn(f64) -> Geometry + Send + Sync + 'static) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    /// Geometry at time `t`.
    pub fn geometry_at(&self, t: f64) -> Geometry {
        (self.path)(t)
    }
}

impl fmt::Debug for GeometryMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GeometryMovement(..)")
    }
}

impl Physics for GeometryMovement {
    fn name(&self) -> &str {
        "geometry_movement"
    }

    fn step(&self, state: &State, dt: f64, _deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let t = state.age() + dt;
        let next = self.geometry_at(t);
        match state {
            State::Obstacle(obstacle) => {
                let h = if dt > 0.0 { 1e-2 * dt } else { 1e-2 };
                let ahead = self.geometry_at(t + h);
                let velocity = next
                    .center()
                    .iter()
                    .zip(ahead.center())
                    .map(|(now, later)| ((later - now) as f64 / h) as f32)
                    .collect();
                let moved = obstacle.clone().with_geometry(next).with_velocity(velocity);
                Ok(State::from(moved).copied_with_age(t))
            }
            State::Effect(effect) => match effect.field() {
                Field::Constant(c) if matches!(c.bounds(), Some(g) if !matches!(g, Geometry::Union(_))) => {
                    let moved = effect.clone().with_field(c.with_bounds(next));
                    Ok(State::from(moved).copied_with_age(t))
                }
                _ => Err(PhysicsError::ExecutionFailed {
                    reason: format!(
                        "effect '{}' is not masked by a single geometry",
                        state.name()
                    ),
                }),
            },
            other => Err(PhysicsError::UnexpectedKind {
                expected: "obstacle or effect",
                found: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{Effect, Inflow, Obstacle};
    use flowstate_geom::Sphere;

    fn sliding() -> GeometryMovement {
        GeometryMovement::new(|t| {
            Sphere::new(vec![2.0 * t as f32, 0.0], 1.0)
                .map(Geometry::from)
                .unwrap_or(Geometry::Union(Vec::new()))
        })
    }

    #[test]
    fn obstacle_follows_path_with_finite_difference_velocity() {
        let s: State = Obstacle::new(sliding().geometry_at(0.0)).into();
        let next = sliding().step(&s, 0.5, &ResolvedDependencies::new()).unwrap();
        let obstacle = next.as_obstacle().unwrap();
        assert_eq!(obstacle.geometry().center(), vec![1.0, 0.0]);
        assert!((obstacle.velocity()[0] - 2.0).abs() < 1e-3);
        assert!(obstacle.velocity()[1].abs() < 1e-6);
        assert_eq!(next.age(), 0.5);
        assert_eq!(next.key(), s.key());
    }

    #[test]
    fn masked_effect_moves_its_mask() {
        let s: State = Effect::fan(sliding().geometry_at(0.0), vec![1.0, 0.0]).into();
        let next = sliding().step(&s, 1.0, &ResolvedDependencies::new()).unwrap();
        match next.as_effect().unwrap().field() {
            Field::Constant(c) => assert_eq!(c.bounds().map(Geometry::center), Some(vec![2.0, 0.0])),
            other => panic!("expected a constant field, got {other:?}"),
        }
    }

    #[test]
    fn unmasked_effect_rejected() {
        let s: State = Effect::new(Field::from(1.0f32), crate::kinds::EffectMode::Growth, "x").into();
        assert!(matches!(
            sliding().step(&s, 1.0, &ResolvedDependencies::new()),
            Err(PhysicsError::ExecutionFailed { .. })
        ));
    }

    #[test]
    fn inflows_are_not_movable() {
        let s: State = Inflow::new(sliding().geometry_at(0.0), 1.0).into();
        assert!(matches!(
            sliding().step(&s, 1.0, &ResolvedDependencies::new()),
            Err(PhysicsError::UnexpectedKind { found: "inflow", .. })
        ));
    }
}
