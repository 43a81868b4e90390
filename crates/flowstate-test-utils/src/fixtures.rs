//! Reusable physics test fixtures.
//!
//! - [`ChainPhysics`]: ages by dt, optionally blocking on one tag.
//! - [`AgeProbe`]: renames the state after the ages it reads.
//! - [`FailingPhysics`]: fails deterministically after N calls.
//! - [`AgeSkippingPhysics`]: returns the state without aging it.
//! - [`KeySwappingPhysics`]: returns a state of another trajectory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flowstate_physics::{Dependency, Physics, PhysicsError, ResolvedDependencies, State};

/// Ages a state by `dt`; declares its dependencies but ignores their values.
///
/// Useful for building dependency graphs of arbitrary shape.
pub struct ChainPhysics {
    pub name: String,
    deps: Vec<Dependency>,
}

impl ChainPhysics {
    /// No dependencies at all.
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deps: Vec::new(),
        }
    }

    /// One blocking dependency, parameter `upstream`, on every state
    /// tagged `tag`.
    pub fn after(name: impl Into<String>, tag: &str) -> Self {
        Self {
            name: name.into(),
            deps: vec![Dependency::tag("upstream", tag).blocking()],
        }
    }

    /// Arbitrary dependency list.
    pub fn with_dependencies(name: impl Into<String>, deps: Vec<Dependency>) -> Self {
        Self {
            name: name.into(),
            deps,
        }
    }

    /// Shared handle for registering in a scheduler.
    pub fn shared(self) -> Arc<dyn Physics> {
        Arc::new(self)
    }
}

impl Physics for ChainPhysics {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    fn step(&self, state: &State, dt: f64, _deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        Ok(state.advanced(dt))
    }
}

/// Ages a state by `dt` and renames it to the comma-joined ages of the
/// states delivered under `upstream`.
///
/// Lets a test see whether a dependency was read before or after it was
/// stepped in the current tick.
pub struct AgeProbe {
    deps: Vec<Dependency>,
}

impl AgeProbe {
    /// Read every state tagged `tag`, blocking or not.
    pub fn reading(tag: &str, blocking: bool) -> Self {
        let dep = Dependency::tag("upstream", tag);
        Self {
            deps: vec![if blocking { dep.blocking() } else { dep }],
        }
    }
}

impl Physics for AgeProbe {
    fn name(&self) -> &str {
        "age_probe"
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.deps
    }

    fn step(&self, state: &State, dt: f64, deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let seen: Vec<String> = deps
            .states("upstream")
            .iter()
            .map(|s| s.age().to_string())
            .collect();
        Ok(state.advanced(dt).with_name(seen.join(",")))
    }
}

/// Fails deterministically after a configurable number of successful calls.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Sync`.
pub struct FailingPhysics {
    pub name: String,
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingPhysics {
    /// Create a physics that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `step()` has been called.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Reset the call counter.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::Relaxed);
    }
}

impl Physics for FailingPhysics {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&self, state: &State, dt: f64, _deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(PhysicsError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(state.advanced(dt))
    }
}

/// Returns the input unchanged, breaking the age contract.
pub struct AgeSkippingPhysics;

impl Physics for AgeSkippingPhysics {
    fn name(&self) -> &str {
        "age_skipping"
    }

    fn step(&self, state: &State, _dt: f64, _deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        Ok(state.clone())
    }
}

/// Returns a fresh trajectory instead of the input's, breaking the
/// identity contract.
pub struct KeySwappingPhysics;

impl Physics for KeySwappingPhysics {
    fn name(&self) -> &str {
        "key_swapping"
    }

    fn step(&self, state: &State, dt: f64, _deps: &ResolvedDependencies<'_>) -> Result<State, PhysicsError> {
        let tags: Vec<String> = state.tags().to_vec();
        Ok(crate::tagged_state(&[]).with_tags(tags).copied_with_age(state.age() + dt))
    }
}
