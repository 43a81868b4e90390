//! Constant fields, optionally restricted to a geometry.

use flowstate_core::Tensor;
use flowstate_geom::Geometry;

use crate::error::FieldError;

/// A field with the same value everywhere, or everywhere inside `bounds`
/// and zero outside.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantField {
    bounds: Option<Geometry>,
    value: Vec<f32>,
}

impl ConstantField {
    /// Unbounded field with a vector value (one entry per component).
    pub fn new(value: Vec<f32>) -> Self {
        Self {
            bounds: None,
            value,
        }
    }

    /// Unbounded single-component field.
    pub fn scalar(value: f32) -> Self {
        Self::new(vec![value])
    }

    /// `value` inside `geometry` (scaled by its occupancy), zero outside.
    pub fn masked(geometry: Geometry, value: Vec<f32>) -> Self {
        Self {
            bounds: Some(geometry),
            value,
        }
    }

    /// The geometry restricting this field, if any.
    pub fn bounds(&self) -> Option<&Geometry> {
        self.bounds.as_ref()
    }

    /// Per-component value.
    pub fn value(&self) -> &[f32] {
        &self.value
    }

    /// Number of components.
    pub fn components(&self) -> usize {
        self.value.len()
    }

    /// Same bounds with a new value.
    pub fn with_value(&self, value: Vec<f32>) -> Self {
        Self {
            bounds: self.bounds.clone(),
            value,
        }
    }

    /// Same value restricted to another geometry.
    pub fn with_bounds(&self, bounds: Geometry) -> Self {
        Self {
            bounds: Some(bounds),
            value: self.value.clone(),
        }
    }

    /// Values at `location` (`[..., rank]`), shaped `[..., components]`.
    pub fn sample_at(&self, location: &Tensor) -> Result<Tensor, FieldError> {
        let value = Tensor::vector(&self.value);
        match &self.bounds {
            Some(geometry) => {
                let occupancy = geometry.value_at(location)?;
                Ok(occupancy.mul(&value)?)
            }
            None => {
                let mut shape = location.shape().to_vec();
                match shape.last_mut() {
                    Some(last) => *last = self.value.len(),
                    None => shape.push(self.value.len()),
                }
                Ok(value.broadcast_to(&shape)?)
            }
        }
    }
}
