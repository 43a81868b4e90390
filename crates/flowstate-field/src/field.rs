//! The closed set of field kinds and their common sampling contract.

use flowstate_core::Tensor;
use flowstate_geom::{CenterPoints, Geometry};

use crate::centered::CenteredGrid;
use crate::constant::ConstantField;
use crate::domain::Domain;
use crate::error::FieldError;
use crate::staggered::{stack_staggered_tensor, StaggeredGrid};

/// An immutable sampled function over space.
///
/// Every kind answers [`Field::sample_at`]; sampling has no side effects
/// and returns identical results for identical inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// Constant value, optionally restricted to a geometry.
    Constant(ConstantField),
    /// Cell-centered grid.
    Centered(CenteredGrid),
    /// Face-sampled grid.
    Staggered(StaggeredGrid),
}

impl Field {
    /// Coerce anything convertible into a field: numbers become constant
    /// fields, geometries become 1-inside/0-outside indicator fields.
    pub fn to_field(value: impl Into<Field>) -> Field {
        value.into()
    }

    /// Values at `location` (`[..., rank]`), shaped `[..., components]`.
    pub fn sample_at(&self, location: &Tensor) -> Result<Tensor, FieldError> {
        match self {
            Self::Constant(c) => c.sample_at(location),
            Self::Centered(g) => g.sample_at(location),
            Self::Staggered(s) => s.sample_at(location),
        }
    }

    /// One component at `location`, shaped `[..., 1]`.
    pub fn sample_component_at(&self, component: usize, location: &Tensor) -> Result<Tensor, FieldError> {
        if let Self::Staggered(s) = self {
            return s.sample_component_at(component, location);
        }
        let components = self.components();
        if component >= components {
            return Err(FieldError::ComponentOutOfRange {
                component,
                components,
            });
        }
        let all = self.sample_at(location)?;
        let mut shape = all.shape().to_vec();
        if let Some(last) = shape.last_mut() {
            *last = 1;
        }
        Ok(all.slice_last(component)?.reshape(&shape)?)
    }

    /// Number of values per sample point.
    pub fn components(&self) -> usize {
        match self {
            Self::Constant(c) => c.components(),
            Self::Centered(g) => g.components(),
            Self::Staggered(s) => s.rank(),
        }
    }

    /// Sample onto `domain`.
    ///
    /// Without `staggered`, samples the cell centers, giving
    /// `[batch, *resolution, components]`. With `staggered`, samples
    /// component `i` at the faces perpendicular to axis `i` and returns the
    /// padded `[batch, *(resolution + 1), rank]` layout. A grid sampled on
    /// its own domain returns its stored data unchanged.
    pub fn sample_grid(&self, domain: &Domain, staggered: bool) -> Result<Tensor, FieldError> {
        match (self, staggered) {
            (Self::Centered(g), false)
                if g.resolution() == domain.resolution() && g.bbox() == domain.bbox() =>
            {
                Ok(g.data().clone())
            }
            (Self::Staggered(s), true)
                if s.resolution() == domain.resolution() && s.bbox() == domain.bbox() =>
            {
                s.staggered_tensor()
            }
            (_, false) => self.sample_at(&domain.center_points()),
            (_, true) => {
                let parts = (0..domain.rank())
                    .map(|axis| self.sample_component_at(axis, &domain.staggered_points(axis)))
                    .collect::<Result<Vec<_>, _>>()?;
                stack_staggered_tensor(&parts)
            }
        }
    }
}

impl From<f32> for Field {
    fn from(v: f32) -> Self {
        Self::Constant(ConstantField::scalar(v))
    }
}

impl From<Geometry> for Field {
    fn from(g: Geometry) -> Self {
        Self::Constant(ConstantField::masked(g, vec![1.0]))
    }
}

impl From<ConstantField> for Field {
    fn from(c: ConstantField) -> Self {
        Self::Constant(c)
    }
}

impl From<CenteredGrid> for Field {
    fn from(g: CenteredGrid) -> Self {
        Self::Centered(g)
    }
}

impl From<StaggeredGrid> for Field {
    fn from(s: StaggeredGrid) -> Self {
        Self::Staggered(s)
    }
}
