//! Geometry primitives for Flowstate simulations.
//!
//! This crate defines [`Geometry`], the closed set of shapes used to build
//! obstacle masks, inflow regions and effect areas, together with the
//! concrete primitives it wraps.
//!
//! # Kinds
//!
//! - [`AaBox`]: axis-aligned box, closed on both faces
//! - [`Sphere`]: closed ball
//! - [`Geometry::Union`]: maximum occupancy over members
//!
//! Boxes are most conveniently written in slice notation through
//! [`BoxGenerator`]:
//!
//! ```
//! use flowstate_geom::BoxGenerator;
//! let b = BoxGenerator::parse("0:2, 6:10").unwrap();
//! assert_eq!(b.upper(), vec![2.0, 10.0]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aabox;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod sphere;

#[cfg(test)]
pub(crate) mod compliance;

pub use aabox::AaBox;
pub use error::GeometryError;
pub use generator::{AxisSpec, BoxGenerator};
pub use geometry::{union, CenterPoints, Geometry};
pub use sphere::Sphere;
