//! Errors returned by [`World`](crate::World) operations.

use std::error::Error;
use std::fmt;

use flowstate_field::FieldError;
use flowstate_physics::StepError;

use crate::config::ConfigError;

/// Failure of a world operation. The world is left unchanged.
#[derive(Debug, PartialEq)]
pub enum WorldError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// Scheduling or stepping failed, or a trajectory was missing or
    /// duplicated.
    Step(StepError),
    /// A typed constructor could not build its grids.
    Field(FieldError),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Step(e) => write!(f, "step: {e}"),
            Self::Field(e) => write!(f, "field: {e}"),
        }
    }
}

impl Error for WorldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Step(e) => Some(e),
            Self::Field(e) => Some(e),
        }
    }
}

impl From<ConfigError> for WorldError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<StepError> for WorldError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

impl From<FieldError> for WorldError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}
