//! Core types for the Flowstate simulation framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! trajectory identities, the eager numeric backend that fields and
//! geometries delegate their arithmetic to, and shape errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod tensor;

pub use error::ShapeError;
pub use id::{ObserverId, TrajectoryKey};
pub use tensor::{Shape, Tensor};
