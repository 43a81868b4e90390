//! Transport and smoothing operators composed from field sampling.

use crate::centered::CenteredGrid;
use crate::error::FieldError;
use crate::field::Field;
use crate::staggered::StaggeredGrid;

/// Semi-Lagrangian advection: each cell of `grid` takes the value found
/// by tracing its center backwards through `velocity` for `dt`.
///
/// `velocity` must have one component per spatial axis. The result keeps
/// the layout of `grid`; its batch size is the broadcast of both inputs.
pub fn semi_lagrangian(grid: &CenteredGrid, velocity: &Field, dt: f32) -> Result<CenteredGrid, FieldError> {
    let points = grid.center_points();
    let v = velocity.sample_at(&points)?;
    let origins = points.sub(&v.scale(dt))?;
    grid.with_data(grid.sample_at(&origins)?)
}

/// Advect every face component of a staggered grid through `velocity`.
pub fn semi_lagrangian_staggered(
    grid: &StaggeredGrid,
    velocity: &Field,
    dt: f32,
) -> Result<StaggeredGrid, FieldError> {
    grid.try_map_components(|_, component| semi_lagrangian(component, velocity, dt))
}

/// Explicit diffusion step `grid + amount * laplace(grid)`.
pub fn diffuse(grid: &CenteredGrid, amount: f32) -> Result<CenteredGrid, FieldError> {
    grid.add(&grid.laplace()?.scale(amount))
}
