//! Error types for geometry construction and occupancy queries.

use flowstate_core::ShapeError;
use std::error::Error;
use std::fmt;

/// Errors arising from geometry construction or `value_at` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Two per-axis quantities disagree in length, or a location's last
    /// axis does not match the geometry's spatial rank.
    RankMismatch {
        /// Rank the geometry expects.
        expected: usize,
        /// Rank that was supplied.
        found: usize,
    },
    /// A slice spec used a step other than 1.
    NonUnitStep {
        /// Axis of the offending slice.
        axis: usize,
        /// The step that was given.
        step: f32,
    },
    /// A box spec named no axes at all.
    EmptySpec,
    /// A textual box spec could not be parsed.
    Unparseable {
        /// The token that failed to parse.
        token: String,
    },
    /// A sphere was given a negative radius.
    NegativeRadius(f32),
    /// The numeric backend rejected an operation.
    Shape(ShapeError),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankMismatch { expected, found } => {
                write!(f, "rank mismatch: expected {expected}, found {found}")
            }
            Self::NonUnitStep { axis, step } => {
                write!(f, "box step must be 1 but is {step} on axis {axis}")
            }
            Self::EmptySpec => write!(f, "box spec has no axes"),
            Self::Unparseable { token } => write!(f, "cannot parse box spec token '{token}'"),
            Self::NegativeRadius(r) => write!(f, "sphere radius must be non-negative, got {r}"),
            Self::Shape(e) => write!(f, "shape error: {e}"),
        }
    }
}

impl Error for GeometryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for GeometryError {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}
