//! Error types for numeric backend operations.

use std::error::Error;
use std::fmt;

use crate::tensor::Shape;

/// Errors from tensor construction and elementwise arithmetic.
///
/// Raised synchronously at the point of detection; a shape error always
/// indicates incompatible inputs, never a transient condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// Two shapes cannot be broadcast against each other.
    Incompatible {
        /// Left operand shape.
        left: Shape,
        /// Right operand shape.
        right: Shape,
    },
    /// Data length does not match the product of the shape.
    LengthMismatch {
        /// The requested shape.
        shape: Shape,
        /// Number of elements supplied.
        len: usize,
    },
    /// An axis index is outside `0..rank`.
    AxisOutOfRange {
        /// The requested axis.
        axis: usize,
        /// Rank of the tensor.
        rank: usize,
    },
    /// A multi-index does not address an element of the tensor.
    IndexOutOfBounds {
        /// The offending index.
        index: Vec<usize>,
        /// Shape of the tensor.
        shape: Shape,
    },
    /// An operation that needs at least one operand received none.
    Empty,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incompatible { left, right } => {
                write!(f, "shapes {left:?} and {right:?} cannot be broadcast")
            }
            Self::LengthMismatch { shape, len } => {
                let expected: usize = shape.iter().product();
                write!(f, "shape {shape:?} needs {expected} elements, got {len}")
            }
            Self::AxisOutOfRange { axis, rank } => {
                write!(f, "axis {axis} out of range for rank {rank}")
            }
            Self::IndexOutOfBounds { index, shape } => {
                write!(f, "index {index:?} out of bounds for shape {shape:?}")
            }
            Self::Empty => write!(f, "operation requires at least one tensor"),
        }
    }
}

impl Error for ShapeError {}
