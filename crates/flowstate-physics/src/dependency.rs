//! Dependency declarations between states.

use std::fmt;

use flowstate_core::TrajectoryKey;

/// Which states a dependency refers to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Every state carrying this tag, in collective order.
    Tag(String),
    /// The state of one trajectory.
    Trajectory(TrajectoryKey),
}

impl Selector {
    /// Tag selector.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "tag '{tag}'"),
            Self::Trajectory(key) => write!(f, "trajectory {key}"),
        }
    }
}

impl From<TrajectoryKey> for Selector {
    fn from(key: TrajectoryKey) -> Self {
        Self::Trajectory(key)
    }
}

impl From<&str> for Selector {
    fn from(tag: &str) -> Self {
        Self::Tag(tag.to_string())
    }
}

/// One named input of a physics.
///
/// A **blocking** dependency must see the states it selects *after* they
/// have been stepped in the current tick, which orders the dependent after
/// them. A non-blocking dependency sees the states as they were at the
/// start of the tick.
///
/// A **single** dependency must select exactly one state; a trajectory
/// selector is always single.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    parameter: String,
    selector: Selector,
    blocking: bool,
    single: bool,
}

impl Dependency {
    /// Non-blocking dependency on every state tagged `tag`.
    pub fn tag(parameter: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
            selector: Selector::Tag(tag.into()),
            blocking: false,
            single: false,
        }
    }

    /// Non-blocking dependency on one trajectory.
    pub fn trajectory(parameter: impl Into<String>, key: TrajectoryKey) -> Self {
        Self {
            parameter: parameter.into(),
            selector: Selector::Trajectory(key),
            blocking: false,
            single: true,
        }
    }

    /// Mark the dependency as blocking.
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    /// Require the selector to match exactly one state.
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Parameter name the resolved states are delivered under.
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    /// What the dependency selects.
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Whether the dependency orders its dependent within a tick.
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Whether exactly one match is required.
    pub fn is_single(&self) -> bool {
        self.single
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.parameter, self.selector)?;
        if self.blocking {
            write!(f, " (blocking)")?;
        }
        Ok(())
    }
}
