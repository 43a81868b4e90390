//! Test utilities and physics fixtures for Flowstate development.
//!
//! Provides contract-breaking and graph-shaping [`Physics`] fixtures (see
//! [`fixtures`]) and small builders for states and dependency chains.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Arc;

use flowstate_field::Domain;
use flowstate_geom::{AaBox, Geometry};
use flowstate_physics::{CollectivePhysics, Inflow, Physics, State};

pub use fixtures::{AgeProbe, AgeSkippingPhysics, ChainPhysics, FailingPhysics, KeySwappingPhysics};

/// A cheap static state carrying exactly `tags`.
///
/// Built as a one-cell inflow, so its default physics is
/// [`Static`](flowstate_physics::Static).
pub fn tagged_state(tags: &[&str]) -> State {
    let cell: Geometry = AaBox::spanning(&[1]).into();
    State::from(Inflow::new(cell, 0.0)).with_tags(tags.iter().copied())
}

/// Tag of link `i` in a [`chain`].
pub fn link_tag(i: usize) -> String {
    format!("link{i}")
}

/// `n` states where link `i` blocks on link `i - 1`.
///
/// States are returned upstream first; shuffle them to test order
/// independence.
pub fn chain(n: usize) -> (Vec<State>, CollectivePhysics) {
    let mut physics = CollectivePhysics::new();
    let states: Vec<State> = (0..n).map(|i| tagged_state(&[link_tag(i).as_str()])).collect();
    for (i, state) in states.iter().enumerate() {
        let law: Arc<dyn Physics> = if i == 0 {
            ChainPhysics::free(link_tag(i)).shared()
        } else {
            ChainPhysics::after(link_tag(i), &link_tag(i - 1)).shared()
        };
        physics.add(state.key(), law);
    }
    (states, physics)
}

/// Square domain of side `n` over the default box.
pub fn square_domain(n: usize) -> Domain {
    match Domain::new(&[n, n]) {
        Ok(domain) => domain,
        Err(e) => panic!("square_domain({n}): {e}"),
    }
}
