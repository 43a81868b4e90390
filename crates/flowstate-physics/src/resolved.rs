//! Dependency states as delivered to [`Physics::step`](crate::Physics::step).

use indexmap::IndexMap;

use crate::error::PhysicsError;
use crate::state::State;

/// States resolved for each dependency parameter of one physics.
///
/// Borrowed from the collective being stepped: non-blocking parameters
/// point into the pre-tick collective, blocking ones into the partial
/// result of the current tick. Tag selections keep collective order.
#[derive(Clone, Debug, Default)]
pub struct ResolvedDependencies<'a> {
    entries: IndexMap<String, Vec<&'a State>>,
}

impl<'a> ResolvedDependencies<'a> {
    /// No parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the states delivered under `parameter`.
    pub fn insert(&mut self, parameter: impl Into<String>, states: Vec<&'a State>) {
        self.entries.insert(parameter.into(), states);
    }

    /// States under `parameter`, or `None` if it was never resolved.
    pub fn get(&self, parameter: &str) -> Option<&[&'a State]> {
        self.entries.get(parameter).map(Vec::as_slice)
    }

    /// States under `parameter`; an unresolved parameter reads as empty.
    pub fn states(&self, parameter: &str) -> &[&'a State] {
        self.get(parameter).unwrap_or(&[])
    }

    /// The one state under `parameter`.
    pub fn single(&self, parameter: &str) -> Result<&'a State, PhysicsError> {
        match self.get(parameter) {
            Some(&[state]) => Ok(state),
            Some(states) => Err(PhysicsError::ExecutionFailed {
                reason: format!(
                    "dependency '{parameter}' holds {} states, expected one",
                    states.len()
                ),
            }),
            None => Err(PhysicsError::MissingDependency {
                parameter: parameter.to_string(),
            }),
        }
    }

    /// Parameter names in resolution order.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameter was resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
