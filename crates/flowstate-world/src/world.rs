//! The mutable simulation world.
//!
//! [`World`] owns the authoritative [`CollectiveState`] and the physics
//! registry. Every mutation replaces the collective with a new value and
//! then notifies the registered observers; a failed operation leaves the
//! world exactly as it was.
//!
//! # Ownership model
//!
//! `World` is [`Send`] but carries no internal locking. All mutating
//! methods take `&mut self`, so sharing one world between threads has to
//! be serialized by the caller.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use flowstate_core::{ObserverId, TrajectoryKey};
use flowstate_field::{Domain, Field, GridData};
use flowstate_geom::{union, Geometry, GeometryError};
use flowstate_physics::kinds::OBSTACLE;
use flowstate_physics::{
    Burgers, CollectivePhysics, CollectiveState, Effect, EffectMode, Fluid, Inflow, Marker,
    Obstacle, Physics, State, StepError,
};

use crate::config::{ConfigError, WorldConfig};
use crate::error::WorldError;
use crate::metrics::StepMetrics;

// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<World>();
    }
};

/// Callback run with the new collective after every world mutation.
pub type Observer = Box<dyn FnMut(&CollectiveState) + Send>;

// ── World ───────────────────────────────────────────────────────

/// Single-threaded simulation world.
///
/// ```
/// use flowstate_field::Domain;
/// use flowstate_geom::BoxGenerator;
/// use flowstate_world::World;
///
/// let mut world = World::default();
/// let domain = Domain::new(&[16, 16]).unwrap();
/// let smoke = world.add_fluid(domain, 0.0f32, 0.0f32).unwrap();
/// world.add_inflow(BoxGenerator::parse("0:2, 6:10").unwrap().into(), 0.5).unwrap();
///
/// world.step_default().unwrap();
/// world.step_default().unwrap();
/// assert_eq!(world.age(), 2.0);
/// assert_eq!(world.get(smoke).unwrap().age(), 2.0);
/// ```
pub struct World {
    config: WorldConfig,
    collective: CollectiveState,
    physics: CollectivePhysics,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    last_metrics: StepMetrics,
}

impl World {
    /// Create an empty world from a validated [`WorldConfig`].
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: WorldConfig) -> Self {
        let physics = scheduler_for(&config);
        Self {
            config,
            collective: CollectiveState::new(),
            physics,
            observers: Vec::new(),
            next_observer: 0,
            last_metrics: StepMetrics::default(),
        }
    }

    /// The configuration the world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The current collective state.
    pub fn state(&self) -> &CollectiveState {
        &self.collective
    }

    /// Age of the current collective.
    pub fn age(&self) -> f64 {
        self.collective.age()
    }

    /// The current state of trajectory `key`.
    pub fn get(&self, key: TrajectoryKey) -> Option<&State> {
        self.collective.get(key)
    }

    /// Metrics of the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    // ── membership ──────────────────────────────────────────────

    /// Append `state`, optionally registering a physics override for it.
    ///
    /// # Errors
    ///
    /// [`StepError::DuplicateTrajectory`] if the trajectory is already
    /// present.
    pub fn add(
        &mut self,
        state: State,
        physics: Option<Arc<dyn Physics>>,
    ) -> Result<TrajectoryKey, WorldError> {
        let key = state.key();
        let name = state.name().to_string();
        self.collective = self.collective.added(state)?;
        if let Some(physics) = physics {
            self.physics.add(key, physics);
        }
        info!("added '{name}' ({key}), {} states", self.collective.len());
        self.notify();
        Ok(key)
    }

    /// Remove trajectory `key` together with its physics override.
    pub fn remove(&mut self, key: TrajectoryKey) -> Result<State, WorldError> {
        let state = self
            .collective
            .get(key)
            .cloned()
            .ok_or(StepError::UnknownTrajectory(key))?;
        self.collective = self.collective.removed(key)?;
        self.physics.remove(key);
        info!(
            "removed '{}' ({key}), {} states",
            state.name(),
            self.collective.len()
        );
        self.notify();
        Ok(state)
    }

    /// Drop every state and physics override and reset the age to zero.
    /// Observers stay registered.
    pub fn clear(&mut self) {
        info!("cleared {} states", self.collective.len());
        self.collective = CollectiveState::new();
        self.physics = scheduler_for(&self.config);
        self.notify();
    }

    // ── typed constructors ──────────────────────────────────────

    /// Add a fluid on `domain`, batched per the configuration.
    pub fn add_fluid(
        &mut self,
        domain: Domain,
        density: impl Into<GridData>,
        velocity: impl Into<GridData>,
    ) -> Result<TrajectoryKey, WorldError> {
        let fluid = Fluid::new(domain, density, velocity, self.config.batch_size)?;
        self.add(fluid.into(), None)
    }

    /// Add a Burgers velocity field on `domain`, batched per the
    /// configuration.
    pub fn add_burgers(
        &mut self,
        domain: Domain,
        velocity: impl Into<GridData>,
    ) -> Result<TrajectoryKey, WorldError> {
        let burgers = Burgers::new(domain, velocity, self.config.batch_size)?;
        self.add(burgers.into(), None)
    }

    /// Add a static obstacle.
    pub fn add_obstacle(&mut self, geometry: Geometry) -> Result<TrajectoryKey, WorldError> {
        self.add(Obstacle::new(geometry).into(), None)
    }

    /// Add an inflow of `rate` density per unit time.
    pub fn add_inflow(&mut self, geometry: Geometry, rate: f32) -> Result<TrajectoryKey, WorldError> {
        self.add(Inflow::new(geometry, rate).into(), None)
    }

    /// Add an effect applied to grids tagged `target`.
    pub fn add_effect(
        &mut self,
        field: impl Into<Field>,
        mode: EffectMode,
        target: &str,
    ) -> Result<TrajectoryKey, WorldError> {
        self.add(Effect::new(field, mode, target).into(), None)
    }

    /// Add a passive marker on `domain`, batched per the configuration.
    pub fn add_marker(
        &mut self,
        domain: Domain,
        density: impl Into<GridData>,
    ) -> Result<TrajectoryKey, WorldError> {
        let marker = Marker::new(domain, density, self.config.batch_size)?;
        self.add(marker.into(), None)
    }

    // ── physics registry ────────────────────────────────────────

    /// The physics that will step trajectory `key`, override or default.
    pub fn physics_for(&self, key: TrajectoryKey) -> Option<Arc<dyn Physics>> {
        self.collective.get(key).map(|s| self.physics.physics_for(s))
    }

    /// Override the physics of trajectory `key`, returning the previous
    /// override.
    pub fn set_physics(
        &mut self,
        key: TrajectoryKey,
        physics: Arc<dyn Physics>,
    ) -> Result<Option<Arc<dyn Physics>>, WorldError> {
        if !self.collective.contains(key) {
            return Err(StepError::UnknownTrajectory(key).into());
        }
        Ok(self.physics.add(key, physics))
    }

    // ── observers ───────────────────────────────────────────────

    /// Register `observer`; it runs after every successful mutation.
    pub fn on_change(&mut self, observer: impl FnMut(&CollectiveState) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Unregister an observer. Returns whether it was registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.collective);
        }
    }

    // ── stepping ────────────────────────────────────────────────

    /// Advance the world by `dt` and commit the result.
    ///
    /// With `None` every state is stepped through the scheduler. With
    /// `Some(key)` only that trajectory is stepped, reading its
    /// dependencies from the current collective; the result is folded back
    /// and the collective age still advances by `dt`.
    ///
    /// # Errors
    ///
    /// Any [`StepError`] from the scheduler. The world is not modified.
    pub fn step(&mut self, key: Option<TrajectoryKey>, dt: f64) -> Result<&CollectiveState, WorldError> {
        let (next, metrics) = self.stepped_with_metrics(key, dt)?;
        debug!(
            "world step: {} states, {} sweeps, {}us",
            metrics.states_stepped, metrics.sweeps, metrics.total_us
        );
        self.collective = next;
        self.last_metrics = metrics;
        self.notify();
        Ok(&self.collective)
    }

    /// Step every state by the configured `default_dt`.
    pub fn step_default(&mut self) -> Result<&CollectiveState, WorldError> {
        self.step(None, self.config.default_dt)
    }

    /// What [`step`](Self::step) would produce, without committing it.
    pub fn stepped(&self, key: Option<TrajectoryKey>, dt: f64) -> Result<CollectiveState, WorldError> {
        self.stepped_with_metrics(key, dt).map(|(next, _)| next)
    }

    fn stepped_with_metrics(
        &self,
        key: Option<TrajectoryKey>,
        dt: f64,
    ) -> Result<(CollectiveState, StepMetrics), WorldError> {
        let started = Instant::now();
        let (next, mut metrics) = match key {
            None => {
                let (next, report) = self.physics.step_with_report(&self.collective, dt)?;
                let metrics = StepMetrics {
                    total_us: 0,
                    sweeps: report.sweeps,
                    states_stepped: report.state_us.len(),
                    per_state_us: report.state_us,
                };
                (next, metrics)
            }
            Some(key) => {
                let state = self
                    .collective
                    .get(key)
                    .ok_or(StepError::UnknownTrajectory(key))?;
                let physics_started = Instant::now();
                let updated = self.physics.substep(state, &self.collective, dt, None)?;
                let us = physics_started.elapsed().as_micros() as u64;
                let next = self
                    .collective
                    .replaced(updated)?
                    .with_age(self.collective.age() + dt);
                let metrics = StepMetrics {
                    total_us: 0,
                    sweeps: 0,
                    states_stepped: 1,
                    per_state_us: vec![(state.name().to_string(), us)],
                };
                (next, metrics)
            }
        };
        metrics.total_us = started.elapsed().as_micros() as u64;
        Ok((next, metrics))
    }

    // ── queries ─────────────────────────────────────────────────

    /// Union of the geometries of every obstacle-tagged obstacle, or
    /// `None` when there are none.
    ///
    /// Fails with [`GeometryError::RankMismatch`] if the obstacles do not
    /// share one spatial rank.
    pub fn obstacle_mask(&self) -> Result<Option<Geometry>, GeometryError> {
        let geometries: Vec<Geometry> = self
            .collective
            .get_by_tag(OBSTACLE)
            .into_iter()
            .filter_map(|s| s.as_obstacle())
            .map(|o| o.geometry().clone())
            .collect();
        if geometries.is_empty() {
            Ok(None)
        } else {
            union(geometries).map(Some)
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::build(WorldConfig::default())
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("age", &self.collective.age())
            .field("states", &self.collective.len())
            .field("observers", &self.observers.len())
            .field("config", &self.config)
            .finish()
    }
}

fn scheduler_for(config: &WorldConfig) -> CollectivePhysics {
    let mut physics = CollectivePhysics::new();
    physics.set_max_sweeps(config.max_sweeps);
    physics.set_check_age_contract(config.check_age_contract);
    physics
}
