//! Spheres (discs in 2D, intervals in 1D).

use flowstate_core::Tensor;

use crate::error::GeometryError;

/// A closed ball `‖p - center‖² <= radius²`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sphere {
    center: Vec<f32>,
    radius: f32,
}

impl Sphere {
    /// Create a sphere. The radius must be non-negative.
    pub fn new(center: Vec<f32>, radius: f32) -> Result<Self, GeometryError> {
        if radius < 0.0 || radius.is_nan() {
            return Err(GeometryError::NegativeRadius(radius));
        }
        Ok(Self { center, radius })
    }

    /// Center point.
    pub fn center(&self) -> &[f32] {
        &self.center
    }

    /// Radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.center.len()
    }

    /// Translated copy.
    pub fn shifted(&self, offset: &[f32]) -> Result<Self, GeometryError> {
        if offset.len() != self.rank() {
            return Err(GeometryError::RankMismatch {
                expected: self.rank(),
                found: offset.len(),
            });
        }
        Ok(Self {
            center: self.center.iter().zip(offset).map(|(c, d)| c + d).collect(),
            radius: self.radius,
        })
    }

    /// Occupancy `[..., 1]` of positions `[..., rank]`.
    pub fn value_at(&self, location: &Tensor) -> Result<Tensor, GeometryError> {
        if location.last_dim() != self.rank() {
            return Err(GeometryError::RankMismatch {
                expected: self.rank(),
                found: location.last_dim(),
            });
        }
        let delta = location.sub(&Tensor::vector(&self.center))?;
        let dist2 = delta.mul(&delta)?.sum_axis(delta.rank() - 1, true)?;
        Ok(dist2.le(&Tensor::scalar(self.radius * self.radius))?)
    }
}
