//! The [`Physics`] trait and the trivial [`Static`] law.
//!
//! A physics is a stateless transition function for one state kind. It
//! declares what other states it needs through [`Dependency`] entries; the
//! scheduler resolves those before calling [`Physics::step`].

use crate::dependency::Dependency;
use crate::error::PhysicsError;
use crate::resolved::ResolvedDependencies;
use crate::state::State;

/// A stateless transition law: `(state, dt, dependencies) -> next state`.
///
/// # Contract
///
/// - `step()` MUST be pure: the same inputs produce the same output.
/// - The returned state MUST carry the input state's trajectory key. The
///   scheduler rejects a foreign key with
///   [`StepError::ContractViolation`](crate::StepError::ContractViolation).
/// - The returned state SHOULD be aged by exactly `dt`. The scheduler logs
///   a warning when it is not.
/// - `dependencies()` is read every time the physics is scheduled and must
///   not change between calls.
///
/// # Object safety
///
/// This trait is object-safe; the scheduler stores physics as
/// `Arc<dyn Physics>` so one instance can serve many trajectories.
///
/// # Examples
///
/// A law that counts how many inflows exist at the start of the tick and
/// renames the state accordingly:
///
/// ```
/// use flowstate_physics::{Dependency, Physics, PhysicsError, ResolvedDependencies, State};
///
/// struct CountInflows {
///     deps: Vec<Dependency>,
/// }
///
/// impl Physics for CountInflows {
///     fn name(&self) -> &str { "count_inflows" }
///
///     fn dependencies(&self) -> &[Dependency] { &self.deps }
///
///     fn step(
///         &self,
///         state: &State,
///         dt: f64,
///         deps: &ResolvedDependencies<'_>,
///     ) -> Result<State, PhysicsError> {
///         let n = deps.states("inflows").len();
///         Ok(state.advanced(dt).with_name(format!("sees_{n}")))
///     }
/// }
///
/// let law = CountInflows { deps: vec![Dependency::tag("inflows", "inflow")] };
/// assert_eq!(law.name(), "count_inflows");
/// assert!(!law.dependencies()[0].is_blocking());
/// ```
pub trait Physics: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Named inputs this law needs, each blocking or not.
    ///
    /// Default: none.
    fn dependencies(&self) -> &[Dependency] {
        &[]
    }

    /// Compute the next snapshot of `state` after `dt`.
    ///
    /// `deps` holds one entry per declared dependency. `dt` may be zero or
    /// negative.
    fn step(
        &self,
        state: &State,
        dt: f64,
        deps: &ResolvedDependencies<'_>,
    ) -> Result<State, PhysicsError>;
}

/// Ages a state by `dt` and changes nothing else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Static;

impl Physics for Static {
    fn name(&self) -> &str {
        "static"
    }

    fn step(
        &self,
        state: &State,
        dt: f64,
        _deps: &ResolvedDependencies<'_>,
    ) -> Result<State, PhysicsError> {
        Ok(state.advanced(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::Obstacle;
    use flowstate_geom::{Geometry, Sphere};

    #[test]
    fn static_only_ages() {
        let ball: Geometry = Sphere::new(vec![1.0, 1.0], 0.5).unwrap().into();
        let s: State = Obstacle::new(ball).into();
        let next = Static.step(&s, -0.5, &ResolvedDependencies::new()).unwrap();
        assert_eq!(next.key(), s.key());
        assert_eq!(next.age(), -0.5);
        assert_eq!(next.copied_with_age(0.0), s);
    }

    #[test]
    fn trait_is_object_safe() {
        let boxed: Box<dyn Physics> = Box::new(Static);
        assert!(boxed.dependencies().is_empty());
    }
}
