//! [`CollectiveState`]: every entity of a simulation at one instant.

use indexmap::IndexMap;

use flowstate_core::TrajectoryKey;

use crate::dependency::Selector;
use crate::error::StepError;
use crate::scheduler::CollectivePhysics;
use crate::state::State;

/// Ordered collection of states, at most one per trajectory.
///
/// All editing methods return a new collective; insertion order is kept
/// across every operation, and replacing a state keeps its position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectiveState {
    pub(crate) states: IndexMap<TrajectoryKey, State>,
    pub(crate) age: f64,
}

impl CollectiveState {
    /// Empty collective at age zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from states in order.
    ///
    /// Fails on the first trajectory that appears twice.
    pub fn from_states<I>(states: I) -> Result<Self, StepError>
    where
        I: IntoIterator<Item = State>,
    {
        let mut map = IndexMap::new();
        for state in states {
            let key = state.key();
            if map.insert(key, state).is_some() {
                return Err(StepError::DuplicateTrajectory(key));
            }
        }
        Ok(Self {
            states: map,
            age: 0.0,
        })
    }

    /// Simulated time of the collective.
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Copy at a different age.
    pub fn with_age(&self, age: f64) -> Self {
        Self {
            states: self.states.clone(),
            age,
        }
    }

    /// Copy with `state` appended.
    pub fn added(&self, state: State) -> Result<Self, StepError> {
        let key = state.key();
        if self.states.contains_key(&key) {
            return Err(StepError::DuplicateTrajectory(key));
        }
        let mut next = self.clone();
        next.states.insert(key, state);
        Ok(next)
    }

    /// Copy without trajectory `key`, keeping the order of the rest.
    pub fn removed(&self, key: TrajectoryKey) -> Result<Self, StepError> {
        let mut next = self.clone();
        next.states
            .shift_remove(&key)
            .ok_or(StepError::UnknownTrajectory(key))?;
        Ok(next)
    }

    /// Copy with every state of `other` appended. The age of `self` is kept.
    pub fn concat(&self, other: &CollectiveState) -> Result<Self, StepError> {
        let mut next = self.clone();
        for (key, state) in &other.states {
            if next.states.contains_key(key) {
                return Err(StepError::DuplicateTrajectory(*key));
            }
            next.states.insert(*key, state.clone());
        }
        Ok(next)
    }

    /// Copy with the state of the same trajectory swapped for `state`.
    pub fn replaced(&self, state: State) -> Result<Self, StepError> {
        let key = state.key();
        let mut next = self.clone();
        let slot = next
            .states
            .get_mut(&key)
            .ok_or(StepError::UnknownTrajectory(key))?;
        *slot = state;
        Ok(next)
    }

    /// The state of trajectory `key`.
    pub fn get(&self, key: TrajectoryKey) -> Option<&State> {
        self.states.get(&key)
    }

    /// Every state tagged `tag`, in collective order.
    pub fn get_by_tag(&self, tag: &str) -> Vec<&State> {
        self.states.values().filter(|s| s.has_tag(tag)).collect()
    }

    /// Every state matched by `selector`, in collective order.
    pub fn lookup(&self, selector: &Selector) -> Vec<&State> {
        match selector {
            Selector::Tag(tag) => self.get_by_tag(tag),
            Selector::Trajectory(key) => self.get(*key).into_iter().collect(),
        }
    }

    /// Whether trajectory `key` is present.
    pub fn contains(&self, key: TrajectoryKey) -> bool {
        self.states.contains_key(&key)
    }

    /// States in order.
    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// Trajectory keys in order.
    pub fn keys(&self) -> impl Iterator<Item = TrajectoryKey> + '_ {
        self.states.keys().copied()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the collective holds no state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// A scheduler with every state's default physics registered.
    pub fn default_physics(&self) -> CollectivePhysics {
        let mut physics = CollectivePhysics::new();
        for state in self.states.values() {
            physics.add(state.key(), state.default_physics());
        }
        physics
    }
}

impl<'a> IntoIterator for &'a CollectiveState {
    type Item = &'a State;
    type IntoIter = indexmap::map::Values<'a, TrajectoryKey, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.values()
    }
}
