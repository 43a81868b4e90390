//! [`CollectivePhysics`]: steps a whole collective in one tick.
//!
//! States are scheduled in sweeps. In each sweep every state whose blocking
//! dependencies have all been stepped is stepped itself; results become
//! visible to blocking readers at the end of the sweep, so the order in
//! which states sit in the collective never changes what they read. A
//! sweep that makes no progress means the blocking graph has a cycle.
//!
//! Non-blocking dependencies always read the pre-tick collective.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use flowstate_core::TrajectoryKey;

use crate::collective::CollectiveState;
use crate::dependency::Dependency;
use crate::error::{StepError, UnresolvedState};
use crate::physics::Physics;
use crate::resolved::ResolvedDependencies;
use crate::state::State;

/// Relative tolerance of the age contract check.
const AGE_TOLERANCE: f64 = 1e-9;

/// How a collective step was scheduled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sweeps run, including the last one.
    pub sweeps: usize,
    /// Trajectories in the order they were stepped.
    pub resolution_order: Vec<TrajectoryKey>,
    /// Wall-clock time of each physics call, `(state name, microseconds)`,
    /// in resolution order.
    pub state_us: Vec<(String, u64)>,
}

/// Physics registry plus the sweep scheduler.
///
/// States without a registered physics are stepped by their
/// [`State::default_physics`].
#[derive(Clone)]
pub struct CollectivePhysics {
    registry: IndexMap<TrajectoryKey, Arc<dyn Physics>>,
    max_sweeps: Option<usize>,
    check_age_contract: bool,
}

impl Default for CollectivePhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollectivePhysics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectivePhysics")
            .field(
                "registry",
                &self
                    .registry
                    .iter()
                    .map(|(k, p)| (*k, p.name().to_string()))
                    .collect::<Vec<_>>(),
            )
            .field("max_sweeps", &self.max_sweeps)
            .field("check_age_contract", &self.check_age_contract)
            .finish()
    }
}

impl CollectivePhysics {
    /// Empty registry, sweep bound equal to the number of states, age
    /// contract checking on.
    pub fn new() -> Self {
        Self {
            registry: IndexMap::new(),
            max_sweeps: None,
            check_age_contract: true,
        }
    }

    /// Register `physics` for trajectory `key`, returning the one it replaces.
    pub fn add(&mut self, key: TrajectoryKey, physics: Arc<dyn Physics>) -> Option<Arc<dyn Physics>> {
        self.registry.insert(key, physics)
    }

    /// Drop the registration of `key`.
    pub fn remove(&mut self, key: TrajectoryKey) -> Option<Arc<dyn Physics>> {
        self.registry.shift_remove(&key)
    }

    /// The physics registered for `key`, if any.
    pub fn override_for(&self, key: TrajectoryKey) -> Option<&Arc<dyn Physics>> {
        self.registry.get(&key)
    }

    /// The physics that will step `state`.
    pub fn physics_for(&self, state: &State) -> Arc<dyn Physics> {
        match self.registry.get(&state.key()) {
            Some(physics) => Arc::clone(physics),
            None => state.default_physics(),
        }
    }

    /// Sweep bound override; `None` bounds by the number of states.
    pub fn max_sweeps(&self) -> Option<usize> {
        self.max_sweeps
    }

    /// Set the sweep bound override.
    pub fn set_max_sweeps(&mut self, max_sweeps: Option<usize>) {
        self.max_sweeps = max_sweeps;
    }

    /// Whether age contract drift is logged.
    pub fn check_age_contract(&self) -> bool {
        self.check_age_contract
    }

    /// Turn age contract logging on or off.
    pub fn set_check_age_contract(&mut self, check: bool) {
        self.check_age_contract = check;
    }

    /// Advance every state of `collective` by `dt`.
    ///
    /// The result lists states in the input order and is aged `dt` past
    /// the input. Nothing is returned on failure.
    pub fn step(&self, collective: &CollectiveState, dt: f64) -> Result<CollectiveState, StepError> {
        self.step_with_report(collective, dt).map(|(next, _)| next)
    }

    /// [`step`](Self::step), also reporting how the tick was scheduled.
    pub fn step_with_report(
        &self,
        collective: &CollectiveState,
        dt: f64,
    ) -> Result<(CollectiveState, SweepReport), StepError> {
        check_dt(dt)?;
        let next_age = collective.age() + dt;
        let mut report = SweepReport::default();
        if collective.is_empty() {
            debug!("collective step: 0 states, dt={dt}");
            return Ok((collective.with_age(next_age), report));
        }

        let mut unresolved: Vec<(&State, Arc<dyn Physics>)> = collective
            .iter()
            .map(|state| (state, self.physics_for(state)))
            .collect();
        let mut partial = CollectiveState {
            states: IndexMap::with_capacity(collective.len()),
            age: next_age,
        };
        let bound = self.max_sweeps.unwrap_or(collective.len());

        while !unresolved.is_empty() && report.sweeps < bound {
            report.sweeps += 1;
            let mut fresh = Vec::new();
            for (state, physics) in std::mem::take(&mut unresolved) {
                if !self.blocking_fulfilled(physics.as_ref(), state, collective, &partial)? {
                    unresolved.push((state, physics));
                    continue;
                }
                let started = Instant::now();
                let next = self.substep_with(physics.as_ref(), state, collective, dt, Some(&partial))?;
                report
                    .state_us
                    .push((state.name().to_string(), started.elapsed().as_micros() as u64));
                trace!(
                    "sweep {}: stepped '{}' ({}) with '{}'",
                    report.sweeps,
                    state.name(),
                    state.key(),
                    physics.name()
                );
                fresh.push(next);
            }
            if fresh.is_empty() {
                break;
            }
            for next in fresh {
                report.resolution_order.push(next.key());
                partial.states.insert(next.key(), next);
            }
        }

        if !unresolved.is_empty() {
            let diagnostics = unresolved
                .iter()
                .map(|(state, physics)| self.diagnose(physics.as_ref(), state, collective, &partial))
                .collect::<Vec<_>>();
            warn!(
                "cyclic blocking dependencies: {} of {} states unresolved after {} sweeps",
                diagnostics.len(),
                collective.len(),
                report.sweeps
            );
            return Err(StepError::CyclicDependency {
                unresolved: diagnostics,
            });
        }

        let mut states = IndexMap::with_capacity(collective.len());
        for key in collective.keys() {
            let next = partial
                .states
                .swap_remove(&key)
                .ok_or(StepError::UnknownTrajectory(key))?;
            states.insert(key, next);
        }
        debug!(
            "collective step: {} states in {} sweeps, dt={dt}",
            states.len(),
            report.sweeps
        );
        Ok((
            CollectiveState {
                states,
                age: next_age,
            },
            report,
        ))
    }

    /// Step one state with its scheduled physics.
    ///
    /// Dependencies are read from `collective`; when `partial` is given,
    /// blocking dependencies are read from it instead.
    pub fn substep(
        &self,
        state: &State,
        collective: &CollectiveState,
        dt: f64,
        partial: Option<&CollectiveState>,
    ) -> Result<State, StepError> {
        check_dt(dt)?;
        let physics = self.physics_for(state);
        self.substep_with(physics.as_ref(), state, collective, dt, partial)
    }

    /// [`substep`](Self::substep) with an explicit physics instead of the
    /// scheduled one.
    pub fn substep_with(
        &self,
        physics: &dyn Physics,
        state: &State,
        collective: &CollectiveState,
        dt: f64,
        partial: Option<&CollectiveState>,
    ) -> Result<State, StepError> {
        let mut deps = ResolvedDependencies::new();
        for dep in physics.dependencies() {
            let matches = match partial {
                Some(partial) if dep.is_blocking() => {
                    let current: Vec<&State> = gather(dep, state.key(), collective)?
                        .into_iter()
                        .filter_map(|s| partial.get(s.key()))
                        .collect();
                    check_cardinality(dep, state.key(), current)?
                }
                _ => gather(dep, state.key(), collective)?,
            };
            deps.insert(dep.parameter(), matches);
        }

        let next = physics
            .step(state, dt, &deps)
            .map_err(|reason| StepError::PhysicsFailed {
                state: state.name().to_string(),
                physics: physics.name().to_string(),
                reason,
            })?;

        if next.key() != state.key() {
            return Err(StepError::ContractViolation {
                physics: physics.name().to_string(),
                expected: state.key(),
                found: next.key(),
            });
        }
        if self.check_age_contract {
            let expected = state.age() + dt;
            if (next.age() - expected).abs() > AGE_TOLERANCE * expected.abs().max(1.0) {
                warn!(
                    "physics '{}' aged '{}' to {} instead of {}",
                    physics.name(),
                    state.name(),
                    next.age(),
                    expected
                );
            }
        }
        Ok(next)
    }

    fn blocking_fulfilled(
        &self,
        physics: &dyn Physics,
        state: &State,
        collective: &CollectiveState,
        partial: &CollectiveState,
    ) -> Result<bool, StepError> {
        for dep in physics.dependencies().iter().filter(|d| d.is_blocking()) {
            let matches = gather(dep, state.key(), collective)?;
            if !matches.iter().all(|s| partial.contains(s.key())) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn diagnose(
        &self,
        physics: &dyn Physics,
        state: &State,
        collective: &CollectiveState,
        partial: &CollectiveState,
    ) -> UnresolvedState {
        let missing = physics
            .dependencies()
            .iter()
            .filter(|dep| dep.is_blocking())
            .filter(|dep| {
                collective
                    .lookup(dep.selector())
                    .iter()
                    .any(|s| !partial.contains(s.key()))
            })
            .map(|dep| format!("{} <- {}", dep.parameter(), dep.selector()))
            .collect();
        UnresolvedState {
            name: state.name().to_string(),
            key: state.key(),
            physics: physics.name().to_string(),
            missing,
        }
    }
}

fn check_dt(dt: f64) -> Result<(), StepError> {
    if dt.is_finite() {
        Ok(())
    } else {
        Err(StepError::InvalidDt { value: dt })
    }
}

fn gather<'a>(
    dep: &Dependency,
    owner: TrajectoryKey,
    collective: &'a CollectiveState,
) -> Result<Vec<&'a State>, StepError> {
    check_cardinality(dep, owner, collective.lookup(dep.selector()))
}

fn check_cardinality<'a>(
    dep: &Dependency,
    owner: TrajectoryKey,
    matches: Vec<&'a State>,
) -> Result<Vec<&'a State>, StepError> {
    if dep.is_single() && matches.len() != 1 {
        return Err(StepError::DependencyCardinality {
            parameter: dep.parameter().to_string(),
            key: owner,
            matches: matches.len(),
        });
    }
    Ok(matches)
}
