//! States, physics laws and the collective dependency scheduler.
//!
//! A [`State`] is an immutable snapshot of one entity; its
//! [`TrajectoryKey`](flowstate_core::TrajectoryKey) ties snapshots of the
//! same entity together over time. A [`Physics`] steps one state, reading
//! the other states it declares as [`Dependency`] entries.
//! [`CollectivePhysics`] steps a whole [`CollectiveState`], ordering states
//! so that blocking dependencies are stepped first.
//!
//! ```
//! use flowstate_field::Domain;
//! use flowstate_geom::BoxGenerator;
//! use flowstate_physics::{CollectiveState, Fluid, Inflow, State};
//!
//! let domain = Domain::new(&[8, 8]).unwrap();
//! let smoke: State = Fluid::new(domain, 0.0f32, 0.0f32, None).unwrap().into();
//! let source: State = Inflow::new(BoxGenerator::parse("0:2, 3:5").unwrap().into(), 1.0).into();
//! let collective = CollectiveState::from_states([smoke, source]).unwrap();
//!
//! let next = collective.default_physics().step(&collective, 1.0).unwrap();
//! assert_eq!(next.age(), 1.0);
//! assert!(next.iter().all(|s| s.age() == 1.0));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod burgers;
pub mod collective;
pub mod dependency;
pub mod effect;
pub mod error;
pub mod fluid;
pub mod kinds;
pub mod marker;
pub mod movement;
pub mod physics;
pub mod resolved;
pub mod scheduler;
pub mod state;

pub use burgers::BurgersPhysics;
pub use collective::CollectiveState;
pub use dependency::{Dependency, Selector};
pub use effect::{effect_applied, effect_applied_staggered};
pub use error::{PhysicsError, StepError, UnresolvedState};
pub use fluid::FluidPhysics;
pub use kinds::{Burgers, Effect, EffectMode, Fluid, Inflow, Marker, Obstacle};
pub use marker::MarkerPhysics;
pub use movement::{GeometryMovement, GeometryPath};
pub use physics::{Physics, Static};
pub use resolved::ResolvedDependencies;
pub use scheduler::{CollectivePhysics, SweepReport};
pub use state::{State, StateMeta, Tags};
