//! State snapshots: identity metadata plus the closed set of entity kinds.
//!
//! A [`State`] is an immutable value. Stepping or editing produces a new
//! value that keeps the [`TrajectoryKey`] of the one it came from, so the
//! key names the entity across time while each snapshot names one instant.

use std::sync::Arc;

use flowstate_core::TrajectoryKey;
use smallvec::SmallVec;

use crate::burgers::BurgersPhysics;
use crate::fluid::FluidPhysics;
use crate::kinds::{Burgers, Effect, Fluid, Inflow, Marker, Obstacle};
use crate::marker::MarkerPhysics;
use crate::physics::{Physics, Static};

/// Ordered, duplicate-free list of tags.
pub type Tags = SmallVec<[String; 2]>;

/// Identity and bookkeeping shared by every state kind.
#[derive(Clone, Debug, PartialEq)]
pub struct StateMeta {
    key: TrajectoryKey,
    name: String,
    tags: Tags,
    age: f64,
    batch_size: Option<usize>,
}

impl StateMeta {
    /// Allocate a fresh trajectory at age zero.
    ///
    /// The default name is `{kind}_{key}`.
    pub fn new<'a>(kind: &str, tags: impl IntoIterator<Item = &'a str>) -> Self {
        let key = TrajectoryKey::next();
        Self {
            key,
            name: format!("{kind}_{}", key.raw()),
            tags: dedup_tags(tags.into_iter().map(str::to_string)),
            age: 0.0,
            batch_size: None,
        }
    }

    /// Trajectory identity.
    pub fn key(&self) -> TrajectoryKey {
        self.key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tags in declaration order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether `tag` is among the tags.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Simulated time this trajectory has been stepped through.
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Batch size the state's grids were built with, if one was requested.
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    /// Copy with a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Copy with a different tag list.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedup_tags(tags.into_iter().map(Into::into));
        self
    }

    /// Copy with a different age.
    pub fn with_age(mut self, age: f64) -> Self {
        self.age = age;
        self
    }

    pub(crate) fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        self.batch_size = batch_size;
        self
    }
}

fn dedup_tags(tags: impl Iterator<Item = String>) -> Tags {
    let mut out = Tags::new();
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// One snapshot of one simulated entity.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    /// Smoke-like fluid with density and staggered velocity.
    Fluid(Fluid),
    /// Centered velocity field obeying Burgers' equation.
    Burgers(Burgers),
    /// Solid region that fluids cannot enter.
    Obstacle(Obstacle),
    /// Source region that injects density into fluids.
    Inflow(Inflow),
    /// Field applied to tagged grids of other states.
    Effect(Effect),
    /// Passive scalar carried by a velocity field.
    Marker(Marker),
}

impl State {
    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        match self {
            Self::Fluid(s) => s.meta(),
            Self::Burgers(s) => s.meta(),
            Self::Obstacle(s) => s.meta(),
            Self::Inflow(s) => s.meta(),
            Self::Effect(s) => s.meta(),
            Self::Marker(s) => s.meta(),
        }
    }

    fn meta_mut(&mut self) -> &mut StateMeta {
        match self {
            Self::Fluid(s) => &mut s.meta,
            Self::Burgers(s) => &mut s.meta,
            Self::Obstacle(s) => &mut s.meta,
            Self::Inflow(s) => &mut s.meta,
            Self::Effect(s) => &mut s.meta,
            Self::Marker(s) => &mut s.meta,
        }
    }

    /// Lowercase kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fluid(_) => "fluid",
            Self::Burgers(_) => "burgers",
            Self::Obstacle(_) => "obstacle",
            Self::Inflow(_) => "inflow",
            Self::Effect(_) => "effect",
            Self::Marker(_) => "marker",
        }
    }

    /// Trajectory identity.
    pub fn key(&self) -> TrajectoryKey {
        self.meta().key
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.meta().name
    }

    /// Tags in declaration order.
    pub fn tags(&self) -> &[String] {
        &self.meta().tags
    }

    /// Whether the state carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.meta().has_tag(tag)
    }

    /// Simulated age.
    pub fn age(&self) -> f64 {
        self.meta().age
    }

    /// Batch size requested at construction.
    pub fn batch_size(&self) -> Option<usize> {
        self.meta().batch_size
    }

    /// Copy at a different age, same trajectory.
    pub fn copied_with_age(&self, age: f64) -> State {
        let mut next = self.clone();
        next.meta_mut().age = age;
        next
    }

    /// Copy advanced by `dt`. This is the whole of [`Static`] physics.
    pub fn advanced(&self, dt: f64) -> State {
        self.copied_with_age(self.age() + dt)
    }

    /// Copy with a different name, same trajectory.
    pub fn with_name(mut self, name: impl Into<String>) -> State {
        self.meta_mut().name = name.into();
        self
    }

    /// Copy with a different tag list, same trajectory.
    pub fn with_tags<I, S>(mut self, tags: I) -> State
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta_mut().tags = dedup_tags(tags.into_iter().map(Into::into));
        self
    }

    /// The physics that steps this kind when no override is registered.
    pub fn default_physics(&self) -> Arc<dyn Physics> {
        match self {
            Self::Fluid(_) => Arc::new(FluidPhysics::new()),
            Self::Burgers(_) => Arc::new(BurgersPhysics::new()),
            Self::Marker(_) => Arc::new(MarkerPhysics::new()),
            Self::Obstacle(_) | Self::Inflow(_) | Self::Effect(_) => Arc::new(Static),
        }
    }

    /// The fluid payload, if this is a fluid.
    pub fn as_fluid(&self) -> Option<&Fluid> {
        match self {
            Self::Fluid(s) => Some(s),
            _ => None,
        }
    }

    /// The Burgers payload, if this is a Burgers state.
    pub fn as_burgers(&self) -> Option<&Burgers> {
        match self {
            Self::Burgers(s) => Some(s),
            _ => None,
        }
    }

    /// The obstacle payload, if this is an obstacle.
    pub fn as_obstacle(&self) -> Option<&Obstacle> {
        match self {
            Self::Obstacle(s) => Some(s),
            _ => None,
        }
    }

    /// The inflow payload, if this is an inflow.
    pub fn as_inflow(&self) -> Option<&Inflow> {
        match self {
            Self::Inflow(s) => Some(s),
            _ => None,
        }
    }

    /// The effect payload, if this is an effect.
    pub fn as_effect(&self) -> Option<&Effect> {
        match self {
            Self::Effect(s) => Some(s),
            _ => None,
        }
    }

    /// The marker payload, if this is a marker.
    pub fn as_marker(&self) -> Option<&Marker> {
        match self {
            Self::Marker(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Fluid> for State {
    fn from(s: Fluid) -> Self {
        Self::Fluid(s)
    }
}

impl From<Burgers> for State {
    fn from(s: Burgers) -> Self {
        Self::Burgers(s)
    }
}

impl From<Obstacle> for State {
    fn from(s: Obstacle) -> Self {
        Self::Obstacle(s)
    }
}

impl From<Inflow> for State {
    fn from(s: Inflow) -> Self {
        Self::Inflow(s)
    }
}

impl From<Effect> for State {
    fn from(s: Effect) -> Self {
        Self::Effect(s)
    }
}

impl From<Marker> for State {
    fn from(s: Marker) -> Self {
        Self::Marker(s)
    }
}
