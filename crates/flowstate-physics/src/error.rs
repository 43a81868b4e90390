//! Error types for physics execution and collective stepping.
//!
//! [`PhysicsError`] is what a single [`Physics::step`](crate::Physics::step)
//! returns. [`StepError`] is what the scheduler returns: it wraps physics
//! failures with the state and physics that produced them, and adds the
//! scheduling failures (cycles, identity violations, cardinality).

use std::error::Error;
use std::fmt;

use flowstate_core::{ShapeError, TrajectoryKey};
use flowstate_field::FieldError;
use flowstate_geom::GeometryError;

// ── PhysicsError ────────────────────────────────────────────────

/// Failure inside one physics transition.
#[derive(Clone, Debug, PartialEq)]
pub enum PhysicsError {
    /// The transition could not be computed.
    ExecutionFailed {
        /// Human-readable cause.
        reason: String,
    },
    /// A dependency parameter the physics needs was not supplied.
    MissingDependency {
        /// The parameter name.
        parameter: String,
    },
    /// The physics was handed a state of a kind it cannot step.
    UnexpectedKind {
        /// Kind(s) the physics accepts.
        expected: &'static str,
        /// Kind that was supplied.
        found: &'static str,
    },
    /// A field operation failed.
    Field(FieldError),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::MissingDependency { parameter } => {
                write!(f, "dependency '{parameter}' was not resolved")
            }
            Self::UnexpectedKind { expected, found } => {
                write!(f, "expected a {expected} state, got {found}")
            }
            Self::Field(e) => write!(f, "field error: {e}"),
        }
    }
}

impl Error for PhysicsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for PhysicsError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<GeometryError> for PhysicsError {
    fn from(e: GeometryError) -> Self {
        Self::Field(e.into())
    }
}

impl From<ShapeError> for PhysicsError {
    fn from(e: ShapeError) -> Self {
        Self::Field(e.into())
    }
}

// ── StepError ───────────────────────────────────────────────────

/// Diagnostic for one state left unresolved by a cyclic dependency graph.
#[derive(Clone, Debug, PartialEq)]
pub struct UnresolvedState {
    /// Display name of the state.
    pub name: String,
    /// Trajectory of the state.
    pub key: TrajectoryKey,
    /// Name of the physics assigned to it.
    pub physics: String,
    /// Blocking dependency entries still waiting on unresolved states,
    /// formatted as `parameter <- selector`.
    pub missing: Vec<String>,
}

impl fmt::Display for UnresolvedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state '{}' ({}) with physics '{}' waits on [{}]",
            self.name,
            self.key,
            self.physics,
            self.missing.join(", ")
        )
    }
}

/// Failure of a collective step or a single-state substep.
///
/// Nothing is committed when a step fails: the caller still holds the
/// pre-step collective state.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The sweep bound was exhausted with states still unresolved.
    CyclicDependency {
        /// Every state that could not be scheduled.
        unresolved: Vec<UnresolvedState>,
    },
    /// A single-state dependency matched zero or several states.
    DependencyCardinality {
        /// The dependency parameter.
        parameter: String,
        /// The state whose physics declared the dependency.
        key: TrajectoryKey,
        /// Number of states the selector matched.
        matches: usize,
    },
    /// A trajectory key is not part of the collective.
    UnknownTrajectory(TrajectoryKey),
    /// A trajectory key is already part of the collective.
    DuplicateTrajectory(TrajectoryKey),
    /// A physics returned an error.
    PhysicsFailed {
        /// Name of the state being stepped.
        state: String,
        /// Name of the physics.
        physics: String,
        /// The underlying failure.
        reason: PhysicsError,
    },
    /// A physics returned a state under a different trajectory key.
    ContractViolation {
        /// Name of the offending physics.
        physics: String,
        /// Key of the input state.
        expected: TrajectoryKey,
        /// Key of the returned state.
        found: TrajectoryKey,
    },
    /// `dt` is NaN or infinite.
    InvalidDt {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclicDependency { unresolved } => {
                write!(f, "cyclic blocking dependencies among {} states", unresolved.len())?;
                for state in unresolved {
                    write!(f, "\n  {state}")?;
                }
                Ok(())
            }
            Self::DependencyCardinality {
                parameter,
                key,
                matches,
            } => write!(
                f,
                "dependency '{parameter}' of {key} must match exactly one state, matched {matches}"
            ),
            Self::UnknownTrajectory(key) => write!(f, "trajectory {key} is not in the collective"),
            Self::DuplicateTrajectory(key) => {
                write!(f, "trajectory {key} is already in the collective")
            }
            Self::PhysicsFailed {
                state,
                physics,
                reason,
            } => write!(f, "physics '{physics}' failed on '{state}': {reason}"),
            Self::ContractViolation {
                physics,
                expected,
                found,
            } => write!(
                f,
                "physics '{physics}' returned trajectory {found} when stepping {expected}"
            ),
            Self::InvalidDt { value } => write!(f, "dt must be finite, got {value}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PhysicsFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_report_lists_every_state() {
        let a = TrajectoryKey::next();
        let err = StepError::CyclicDependency {
            unresolved: vec![UnresolvedState {
                name: "a".into(),
                key: a,
                physics: "chain".into(),
                missing: vec!["upstream <- tag 'b'".into()],
            }],
        };
        let text = err.to_string();
        assert!(text.contains("1 states"));
        assert!(text.contains("'a'"));
        assert!(text.contains("upstream <- tag 'b'"));
    }

    #[test]
    fn physics_failure_chains_source() {
        let err = StepError::PhysicsFailed {
            state: "fluid".into(),
            physics: "fluid".into(),
            reason: PhysicsError::Field(FieldError::DomainMismatch),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("field error: grids are defined on different boxes"));
    }
}
