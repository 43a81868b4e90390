//! Per-kind state payloads.
//!
//! Each kind carries its [`StateMeta`] plus the physical attributes that
//! define it. Grids are built through the kind's [`Domain`], so their shape
//! always matches the domain's resolution and the requested batch size.
//! `with_*` methods return edited copies under the same trajectory.

use flowstate_field::{
    CenteredGrid, ConstantField, Domain, Field, FieldError, GridData, Material, StaggeredGrid,
};
use flowstate_geom::Geometry;

use crate::state::StateMeta;

/// Tag carried by fluids.
pub const FLUID: &str = "fluid";
/// Tag carried by every state that exposes a velocity field.
pub const VELOCITY_FIELD: &str = "velocityfield";
/// Tag carried by Burgers states.
pub const BURGERS: &str = "burgers";
/// Tag carried by obstacles.
pub const OBSTACLE: &str = "obstacle";
/// Tag carried by inflows.
pub const INFLOW: &str = "inflow";
/// Tag carried by every effect.
pub const EFFECT: &str = "effect";
/// Target tag of effects acting on density grids.
pub const DENSITY_EFFECT: &str = "density_effect";
/// Target tag of effects acting on velocity grids.
pub const VELOCITY_EFFECT: &str = "velocity_effect";
/// Tag carried by markers.
pub const MARKER: &str = "marker";

// ── Fluid ───────────────────────────────────────────────────────

/// Smoke-like fluid: a density carried by a staggered velocity field.
#[derive(Clone, Debug, PartialEq)]
pub struct Fluid {
    pub(crate) meta: StateMeta,
    domain: Domain,
    density: CenteredGrid,
    velocity: StaggeredGrid,
    buoyancy_factor: f32,
}

impl Fluid {
    /// Buoyancy factor of a fresh fluid.
    pub const DEFAULT_BUOYANCY: f32 = 0.1;

    /// Build a fluid on `domain`, shaping both grids to its resolution.
    pub fn new(
        domain: Domain,
        density: impl Into<GridData>,
        velocity: impl Into<GridData>,
        batch_size: Option<usize>,
    ) -> Result<Self, FieldError> {
        let density = domain.centered_grid(density, 1, batch_size)?;
        let velocity = domain.staggered_grid(velocity, batch_size)?;
        Ok(Self {
            meta: StateMeta::new(FLUID, [FLUID, VELOCITY_FIELD]).with_batch_size(batch_size),
            domain,
            density,
            velocity,
            buoyancy_factor: Self::DEFAULT_BUOYANCY,
        })
    }

    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        &self.meta
    }

    /// Simulation domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Cell-centered density, one component.
    pub fn density(&self) -> &CenteredGrid {
        &self.density
    }

    /// Face-centered velocity.
    pub fn velocity(&self) -> &StaggeredGrid {
        &self.velocity
    }

    /// Upward acceleration per unit density.
    pub fn buoyancy_factor(&self) -> f32 {
        self.buoyancy_factor
    }

    /// Copy with a different buoyancy factor.
    pub fn with_buoyancy_factor(mut self, factor: f32) -> Self {
        self.buoyancy_factor = factor;
        self
    }

    /// Copy with new density data, reshaped onto the domain.
    pub fn with_density(&self, density: impl Into<GridData>) -> Result<Self, FieldError> {
        let density = self.domain.centered_grid(density, 1, self.meta.batch_size())?;
        Ok(Self {
            density,
            ..self.clone()
        })
    }

    /// Copy with new velocity data, reshaped onto the domain.
    pub fn with_velocity(&self, velocity: impl Into<GridData>) -> Result<Self, FieldError> {
        let velocity = self.domain.staggered_grid(velocity, self.meta.batch_size())?;
        Ok(Self {
            velocity,
            ..self.clone()
        })
    }

    pub(crate) fn with_grids(&self, density: CenteredGrid, velocity: StaggeredGrid, age: f64) -> Self {
        Self {
            meta: self.meta.clone().with_age(age),
            domain: self.domain.clone(),
            density,
            velocity,
            buoyancy_factor: self.buoyancy_factor,
        }
    }
}

// ── Burgers ─────────────────────────────────────────────────────

/// Cell-centered velocity field evolving under Burgers' equation.
#[derive(Clone, Debug, PartialEq)]
pub struct Burgers {
    pub(crate) meta: StateMeta,
    domain: Domain,
    velocity: CenteredGrid,
    viscosity: f32,
}

impl Burgers {
    /// Viscosity of a fresh Burgers state.
    pub const DEFAULT_VISCOSITY: f32 = 0.1;

    /// Build on `domain` with one velocity component per axis.
    pub fn new(
        domain: Domain,
        velocity: impl Into<GridData>,
        batch_size: Option<usize>,
    ) -> Result<Self, FieldError> {
        let velocity = domain.centered_grid(velocity, domain.rank(), batch_size)?;
        Ok(Self {
            meta: StateMeta::new(BURGERS, [BURGERS, VELOCITY_FIELD]).with_batch_size(batch_size),
            domain,
            velocity,
            viscosity: Self::DEFAULT_VISCOSITY,
        })
    }

    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        &self.meta
    }

    /// Simulation domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Velocity, `rank` components.
    pub fn velocity(&self) -> &CenteredGrid {
        &self.velocity
    }

    /// Kinematic viscosity.
    pub fn viscosity(&self) -> f32 {
        self.viscosity
    }

    /// Copy with a different viscosity.
    pub fn with_viscosity(mut self, viscosity: f32) -> Self {
        self.viscosity = viscosity;
        self
    }

    pub(crate) fn with_velocity_at(&self, velocity: CenteredGrid, age: f64) -> Self {
        Self {
            meta: self.meta.clone().with_age(age),
            domain: self.domain.clone(),
            velocity,
            viscosity: self.viscosity,
        }
    }
}

// ── Obstacle ────────────────────────────────────────────────────

/// Solid region with a surface material and a rigid velocity.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub(crate) meta: StateMeta,
    geometry: Geometry,
    material: Material,
    velocity: Vec<f32>,
}

impl Obstacle {
    /// Slippery obstacle at rest.
    pub fn new(geometry: Geometry) -> Self {
        let rank = geometry.rank().unwrap_or(0);
        Self {
            meta: StateMeta::new(OBSTACLE, [OBSTACLE]),
            geometry,
            material: Material::SLIPPERY,
            velocity: vec![0.0; rank],
        }
    }

    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        &self.meta
    }

    /// Occupied region.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Surface material.
    pub fn material(&self) -> Material {
        self.material
    }

    /// Rigid velocity, one entry per axis.
    pub fn velocity(&self) -> &[f32] {
        &self.velocity
    }

    /// Copy with a different material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Copy with a different velocity.
    pub fn with_velocity(mut self, velocity: Vec<f32>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Copy occupying a different region.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }
}

// ── Inflow ──────────────────────────────────────────────────────

/// Region that adds density to fluids at a fixed rate.
#[derive(Clone, Debug, PartialEq)]
pub struct Inflow {
    pub(crate) meta: StateMeta,
    geometry: Geometry,
    rate: f32,
}

impl Inflow {
    /// Inflow over `geometry` adding `rate` density per unit time.
    pub fn new(geometry: Geometry, rate: f32) -> Self {
        Self {
            meta: StateMeta::new(INFLOW, [INFLOW]),
            geometry,
            rate,
        }
    }

    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        &self.meta
    }

    /// Source region.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Density added per unit time.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Copy with a different rate.
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

// ── Effect ──────────────────────────────────────────────────────

/// How an [`Effect`] combines its field with a target grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectMode {
    /// `grid + field * dt`.
    Growth,
    /// `field` everywhere.
    Replace,
    /// `field` inside the field's bounds, `grid` elsewhere.
    Fix,
}

/// A field applied to the grids of states that depend on the effect's tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub(crate) meta: StateMeta,
    field: Field,
    mode: EffectMode,
}

impl Effect {
    /// Effect tagged `effect` and `target`.
    pub fn new(field: impl Into<Field>, mode: EffectMode, target: &str) -> Self {
        Self {
            meta: StateMeta::new(EFFECT, [EFFECT, target]),
            field: field.into(),
            mode,
        }
    }

    /// Hold the density inside `region` at `value`.
    pub fn constant_density(region: Geometry, value: f32) -> Self {
        Self::new(
            ConstantField::masked(region, vec![value]),
            EffectMode::Fix,
            DENSITY_EFFECT,
        )
    }

    /// Accelerate velocity inside `region` by `acceleration` per unit time.
    pub fn fan(region: Geometry, acceleration: Vec<f32>) -> Self {
        Self::new(
            ConstantField::masked(region, acceleration),
            EffectMode::Growth,
            VELOCITY_EFFECT,
        )
    }

    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        &self.meta
    }

    /// Applied field.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Combination mode.
    pub fn mode(&self) -> EffectMode {
        self.mode
    }

    /// Copy with a different field.
    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        self.field = field.into();
        self
    }
}

// ── Marker ──────────────────────────────────────────────────────

/// Passive scalar advected by whatever velocity field is present.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub(crate) meta: StateMeta,
    domain: Domain,
    density: CenteredGrid,
}

impl Marker {
    /// Build a one-component marker grid on `domain`.
    pub fn new(
        domain: Domain,
        density: impl Into<GridData>,
        batch_size: Option<usize>,
    ) -> Result<Self, FieldError> {
        let density = domain.centered_grid(density, 1, batch_size)?;
        Ok(Self {
            meta: StateMeta::new(MARKER, [MARKER]).with_batch_size(batch_size),
            domain,
            density,
        })
    }

    /// Identity metadata.
    pub fn meta(&self) -> &StateMeta {
        &self.meta
    }

    /// Simulation domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Marker concentration.
    pub fn density(&self) -> &CenteredGrid {
        &self.density
    }

    pub(crate) fn with_density_at(&self, density: CenteredGrid, age: f64) -> Self {
        Self {
            meta: self.meta.clone().with_age(age),
            domain: self.domain.clone(),
            density,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_field::Initializer;
    use flowstate_geom::BoxGenerator;

    #[test]
    fn fluid_grids_follow_the_domain() {
        let domain = Domain::new(&[4, 6]).unwrap();
        let fluid = Fluid::new(domain, 0.0f32, Initializer::Zeros, Some(2)).unwrap();
        assert_eq!(fluid.density().data().shape(), &[2, 4, 6, 1]);
        assert_eq!(fluid.velocity().components()[0].resolution(), &[5, 6]);
        assert_eq!(fluid.velocity().components()[1].resolution(), &[4, 7]);
        assert_eq!(fluid.meta().batch_size(), Some(2));
        assert!(fluid.meta().has_tag(VELOCITY_FIELD));
    }

    #[test]
    fn editing_a_fluid_keeps_its_key() {
        let fluid = Fluid::new(Domain::new(&[3, 3]).unwrap(), 0.0f32, 0.0f32, None).unwrap();
        let denser = fluid.with_density(1.0f32).unwrap();
        assert_eq!(denser.meta().key(), fluid.meta().key());
        assert_eq!(denser.density().data().sum(), 9.0);
        assert!(matches!(
            fluid.with_density(flowstate_core::Tensor::zeros(&[1, 2, 3, 1])),
            Err(FieldError::ResolutionMismatch { .. })
        ));
    }

    #[test]
    fn burgers_velocity_has_rank_components() {
        let b = Burgers::new(Domain::new(&[8]).unwrap(), 1.0f32, None).unwrap();
        assert_eq!(b.velocity().components(), 1);
        assert_eq!(b.viscosity(), Burgers::DEFAULT_VISCOSITY);
    }

    #[test]
    fn obstacle_starts_at_rest() {
        let o = Obstacle::new(BoxGenerator::parse("0:2, 6:10").unwrap().into());
        assert_eq!(o.velocity(), &[0.0, 0.0]);
        assert_eq!(o.material(), Material::SLIPPERY);
    }

    #[test]
    fn effect_constructors_target_their_grids() {
        let region: Geometry = BoxGenerator::parse("0:1, 0:1").unwrap().into();
        let hold = Effect::constant_density(region.clone(), 1.0);
        assert!(hold.meta().has_tag(DENSITY_EFFECT));
        assert_eq!(hold.mode(), EffectMode::Fix);
        let fan = Effect::fan(region, vec![0.0, 2.0]);
        assert!(fan.meta().has_tag(VELOCITY_EFFECT));
        assert_eq!(fan.field().components(), 2);
    }
}
