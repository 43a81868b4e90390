//! Mutable simulation world over Flowstate collective states.
//!
//! Provides [`World`], which owns the current
//! [`CollectiveState`](flowstate_physics::CollectiveState) and a physics
//! registry, steps it through the collective scheduler, and notifies
//! observers after every change.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod world;

pub use config::{ConfigError, WorldConfig};
pub use error::WorldError;
pub use metrics::StepMetrics;
pub use world::{Observer, World};
