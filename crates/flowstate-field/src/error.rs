//! Error types for field, grid and domain operations.

use flowstate_core::ShapeError;
use flowstate_geom::GeometryError;
use std::error::Error;
use std::fmt;

/// Errors from building, sampling or combining fields.
///
/// All variants indicate incompatible inputs and are reported at the
/// point of detection.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// The numeric backend rejected an operation.
    Shape(ShapeError),
    /// A geometry query failed.
    Geometry(GeometryError),
    /// Two grids live on different bounding boxes.
    DomainMismatch,
    /// Spatial resolutions differ.
    ResolutionMismatch {
        /// Resolution that was required.
        expected: Vec<usize>,
        /// Resolution that was supplied.
        found: Vec<usize>,
    },
    /// Batch sizes differ and neither is 1.
    BatchMismatch {
        /// Batch size that was required.
        expected: usize,
        /// Batch size that was supplied.
        found: usize,
    },
    /// Spatial (or tensor) ranks differ.
    RankMismatch {
        /// Rank that was required.
        expected: usize,
        /// Rank that was supplied.
        found: usize,
    },
    /// A component index is not below the component count.
    ComponentOutOfRange {
        /// Requested component.
        component: usize,
        /// Number of components available.
        components: usize,
    },
    /// A boundary specification does not fit the domain.
    InvalidBoundaries {
        /// What went wrong.
        reason: String,
    },
    /// A resolution is empty or has a zero-sized axis.
    InvalidResolution {
        /// The offending resolution.
        resolution: Vec<usize>,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(e) => write!(f, "shape error: {e}"),
            Self::Geometry(e) => write!(f, "geometry error: {e}"),
            Self::DomainMismatch => write!(f, "grids are defined on different boxes"),
            Self::ResolutionMismatch { expected, found } => {
                write!(f, "resolution mismatch: expected {expected:?}, found {found:?}")
            }
            Self::BatchMismatch { expected, found } => {
                write!(f, "batch size mismatch: expected {expected}, found {found}")
            }
            Self::RankMismatch { expected, found } => {
                write!(f, "rank mismatch: expected {expected}, found {found}")
            }
            Self::ComponentOutOfRange {
                component,
                components,
            } => write!(
                f,
                "component {component} out of range for {components} components"
            ),
            Self::InvalidBoundaries { reason } => write!(f, "invalid boundaries: {reason}"),
            Self::InvalidResolution { resolution } => {
                write!(f, "invalid resolution {resolution:?}")
            }
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
            Self::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for FieldError {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}

impl From<GeometryError> for FieldError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}
