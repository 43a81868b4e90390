//! Sampled fields and simulation domains for Flowstate.
//!
//! A [`Field`] is an immutable function over space with a
//! [`sample_at`](Field::sample_at) contract. Three kinds exist:
//!
//! - [`ConstantField`]: one value everywhere, or inside a geometry
//! - [`CenteredGrid`]: data at cell centers, multilinear in between
//! - [`StaggeredGrid`]: one component per axis, sampled on cell faces
//!
//! A [`Domain`] couples a resolution, a bounding box and the boundary
//! [`Material`]s, and is the factory for grids of the right shape:
//!
//! ```
//! use flowstate_field::{Domain, Initializer};
//! let domain = Domain::new(&[4, 4]).unwrap();
//! let velocity = domain.staggered_grid(Initializer::Zeros, None).unwrap();
//! assert_eq!(velocity.components()[0].resolution(), &[5, 4]);
//! assert_eq!(velocity.components()[1].resolution(), &[4, 5]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod advect;
pub mod centered;
pub mod constant;
pub mod domain;
pub mod error;
pub mod field;
pub mod init;
pub mod material;
pub mod staggered;

pub use centered::CenteredGrid;
pub use constant::ConstantField;
pub use domain::{AxisBoundary, Boundaries, Domain};
pub use error::FieldError;
pub use field::Field;
pub use init::{GridData, Initializer};
pub use material::{Extrapolation, Material};
pub use staggered::{
    stack_staggered_tensor, staggered_component_box, unstack_staggered_tensor, StaggeredGrid,
};
