//! Flowstate: grid-based physics simulation with dependency-scheduled
//! state transitions.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Flowstate sub-crates. For most users, adding `flowstate` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use flowstate::prelude::*;
//!
//! let mut world = World::default();
//! let domain = Domain::new(&[16, 16]).unwrap();
//! let smoke = world.add_fluid(domain, 0.0f32, 0.0f32).unwrap();
//! let plume = Sphere::new(vec![8.0, 8.0], 4.0).unwrap();
//! world.add_inflow(plume.into(), 0.2).unwrap();
//! let pinned: Geometry = BoxGenerator::parse("[0:2, 6:10]").unwrap().into();
//! world.add(Effect::constant_density(pinned, 1.0).into(), None).unwrap();
//!
//! world.step_default().unwrap();
//! world.step_default().unwrap();
//! assert_eq!(world.age(), 2.0);
//! assert_eq!(world.get(smoke).unwrap().age(), 2.0);
//! ```
//!
//! # Custom physics
//!
//! ```rust
//! use std::sync::Arc;
//! use flowstate::prelude::*;
//!
//! /// Counts how many inflows it can see, in its name.
//! struct Census {
//!     deps: Vec<Dependency>,
//! }
//!
//! impl Physics for Census {
//!     fn name(&self) -> &str { "census" }
//!     fn dependencies(&self) -> &[Dependency] { &self.deps }
//!     fn step(&self, state: &State, dt: f64, deps: &ResolvedDependencies<'_>)
//!         -> Result<State, PhysicsError>
//!     {
//!         let seen = deps.states("sources").len();
//!         Ok(state.advanced(dt).with_name(format!("sees {seen}")))
//!     }
//! }
//!
//! let mut world = World::default();
//! let cell: Geometry = AaBox::spanning(&[2, 2]).into();
//! world.add_inflow(cell.clone(), 1.0).unwrap();
//! let census = Census { deps: vec![Dependency::tag("sources", "inflow")] };
//! let key = world.add(Obstacle::new(cell).into(), Some(Arc::new(census))).unwrap();
//! world.step(None, 1.0).unwrap();
//! assert_eq!(world.get(key).unwrap().name(), "sees 1");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `flowstate-core` | Trajectory keys, the dense tensor backend |
//! | [`geom`] | `flowstate-geom` | Boxes, spheres, unions, slice parsing |
//! | [`field`] | `flowstate-field` | Domains, grids, advection, materials |
//! | [`physics`] | `flowstate-physics` | States, physics, the collective scheduler |
//! | [`world`] | `flowstate-world` | The mutable world, config, metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Identifiers and the numeric backend (`flowstate-core`).
pub use flowstate_core as types;

/// Geometry primitives (`flowstate-geom`).
///
/// [`geom::Geometry`] is the closed set of shapes; [`geom::BoxGenerator`]
/// parses slice specs such as `"0:2, 6:10"`.
pub use flowstate_geom as geom;

/// Domains and fields (`flowstate-field`).
///
/// [`field::Domain`] builds [`field::CenteredGrid`] and
/// [`field::StaggeredGrid`] values; [`field::advect`] moves them.
pub use flowstate_field as field;

/// States, physics, and scheduling (`flowstate-physics`).
///
/// The [`physics::Physics`] trait is the main extension point for
/// user-defined simulation logic.
pub use flowstate_physics as physics;

/// The simulation world (`flowstate-world`).
pub use flowstate_world as world;

/// Common imports for typical Flowstate usage.
///
/// ```rust
/// use flowstate::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use flowstate_core::{Tensor, TrajectoryKey};

    // Geometry
    pub use flowstate_geom::{union, AaBox, BoxGenerator, Geometry, Sphere};

    // Fields
    pub use flowstate_field::{
        CenteredGrid, ConstantField, Domain, Field, GridData, Initializer, Material, StaggeredGrid,
    };

    // States and physics
    pub use flowstate_physics::{
        Burgers, CollectivePhysics, CollectiveState, Dependency, Effect, EffectMode, Fluid,
        GeometryMovement, Inflow, Marker, Obstacle, Physics, ResolvedDependencies, Selector, State,
        Static,
    };

    // Errors
    pub use flowstate_physics::{PhysicsError, StepError};
    pub use flowstate_world::WorldError;

    // World
    pub use flowstate_world::{StepMetrics, World, WorldConfig};
}
