//! Staggered (face-sampled) grids.
//!
//! A staggered grid stores one single-component [`CenteredGrid`] per
//! spatial axis. The component for axis `i` samples the faces
//! perpendicular to `i`, so it has one more sample along `i` than the
//! cell resolution and lives on a box widened by one cell along `i`
//! (see [`staggered_component_box`]).
//!
//! The padded tensor layout `[batch, *(resolution + 1), rank]` stores all
//! components in one tensor; entries past a component's own resolution
//! are zero. [`unstack_staggered_tensor`] and [`stack_staggered_tensor`]
//! convert between the two forms.

use flowstate_core::{ShapeError, Tensor};
use flowstate_geom::AaBox;

use crate::centered::{broadcast_batch, strides, CenteredGrid};
use crate::error::FieldError;
use crate::material::Extrapolation;

/// Box of the component grid for `axis`: shifted down by half a cell and
/// one cell larger along `axis`, so its cell centers land on the faces of
/// the cells of `bbox`.
pub fn staggered_component_box(resolution: &[usize], axis: usize, bbox: &AaBox) -> AaBox {
    match (bbox.size().get(axis), resolution.get(axis)) {
        (Some(&size), Some(&n)) => {
            let half = 0.5 * size / n as f32;
            bbox.grown_along(axis, half, half)
        }
        _ => bbox.clone(),
    }
}

/// Split a padded staggered tensor `[batch, *(res + 1), rank]` into one
/// `[batch, *(res + e_i), 1]` tensor per axis.
pub fn unstack_staggered_tensor(tensor: &Tensor) -> Result<Vec<Tensor>, FieldError> {
    let shape = tensor.shape();
    if shape.len() < 3 {
        return Err(FieldError::RankMismatch {
            expected: 3,
            found: shape.len(),
        });
    }
    let rank = shape.len() - 2;
    if shape[rank + 1] != rank {
        return Err(FieldError::ComponentOutOfRange {
            component: rank,
            components: shape[rank + 1],
        });
    }
    let src_strides = strides(shape);
    let values = tensor.data();
    let mut out = Vec::with_capacity(rank);
    for axis in 0..rank {
        let mut comp_shape = shape.to_vec();
        for d in 0..rank {
            if d != axis {
                comp_shape[d + 1] = comp_shape[d + 1].saturating_sub(1);
            }
        }
        comp_shape[rank + 1] = 1;
        out.push(Tensor::from_fn(&comp_shape, |idx| {
            let flat: usize = idx[..=rank]
                .iter()
                .zip(&src_strides)
                .map(|(i, s)| i * s)
                .sum();
            values[flat + axis]
        }));
    }
    Ok(out)
}

/// Inverse of [`unstack_staggered_tensor`]: pad and stack per-axis
/// components into `[batch, *(res + 1), rank]`.
pub fn stack_staggered_tensor(components: &[Tensor]) -> Result<Tensor, FieldError> {
    let first = components.first().ok_or(ShapeError::Empty)?;
    let rank = components.len();
    if first.rank() != rank + 2 {
        return Err(FieldError::RankMismatch {
            expected: rank + 2,
            found: first.rank(),
        });
    }
    let batch = first.shape()[0];
    let mut padded = Vec::with_capacity(rank + 2);
    padded.push(batch);
    padded.extend(first.shape()[1..=rank].iter().enumerate().map(|(d, &n)| {
        if d == 0 {
            n
        } else {
            n + 1
        }
    }));
    padded.push(rank);
    for (axis, c) in components.iter().enumerate() {
        let expected: Vec<usize> = (0..rank)
            .map(|d| if d == axis { padded[d + 1] } else { padded[d + 1] - 1 })
            .collect();
        if c.rank() != rank + 2 || c.shape()[1..=rank] != expected[..] || c.shape()[0] != batch {
            return Err(FieldError::ResolutionMismatch {
                expected,
                found: c.shape().to_vec(),
            });
        }
    }
    let comp_strides: Vec<Vec<usize>> = components.iter().map(|c| strides(c.shape())).collect();
    Ok(Tensor::from_fn(&padded, |idx| {
        let axis = idx[rank + 1];
        let comp = &components[axis];
        let cs = comp.shape();
        if (1..=rank).any(|d| idx[d] >= cs[d]) {
            return 0.0;
        }
        let flat: usize = idx[..=rank]
            .iter()
            .zip(&comp_strides[axis])
            .map(|(i, s)| i * s)
            .sum();
        comp.data()[flat]
    }))
}

/// Vector data sampled on cell faces.
#[derive(Clone, Debug, PartialEq)]
pub struct StaggeredGrid {
    components: Vec<CenteredGrid>,
    bbox: AaBox,
}

impl StaggeredGrid {
    /// Assemble a staggered grid from per-axis component grids.
    ///
    /// Component `i` must have a single channel, resolution
    /// `resolution + e_i` and the box returned by
    /// [`staggered_component_box`]; all components share one batch size.
    pub fn from_components(components: Vec<CenteredGrid>, bbox: AaBox) -> Result<Self, FieldError> {
        if components.len() != bbox.rank() {
            return Err(FieldError::RankMismatch {
                expected: bbox.rank(),
                found: components.len(),
            });
        }
        let Some(first) = components.first() else {
            return Err(ShapeError::Empty.into());
        };
        let mut resolution = first.resolution().to_vec();
        resolution[0] = resolution[0].saturating_sub(1);
        let batch = first.batch_size();
        for (axis, c) in components.iter().enumerate() {
            let mut expected = resolution.clone();
            expected[axis] += 1;
            if c.resolution() != expected.as_slice() {
                return Err(FieldError::ResolutionMismatch {
                    expected,
                    found: c.resolution().to_vec(),
                });
            }
            if c.components() != 1 {
                return Err(FieldError::ComponentOutOfRange {
                    component: c.components() - 1,
                    components: 1,
                });
            }
            if c.batch_size() != batch {
                return Err(FieldError::BatchMismatch {
                    expected: batch,
                    found: c.batch_size(),
                });
            }
            if *c.bbox() != staggered_component_box(&resolution, axis, &bbox) {
                return Err(FieldError::DomainMismatch);
            }
        }
        Ok(Self { components, bbox })
    }

    /// Build from a padded `[batch, *(res + 1), rank]` tensor.
    pub fn from_tensor(
        tensor: &Tensor,
        bbox: AaBox,
        extrapolation: Extrapolation,
    ) -> Result<Self, FieldError> {
        let parts = unstack_staggered_tensor(tensor)?;
        let mut resolution = parts
            .first()
            .map(|p| p.shape()[1..p.rank() - 1].to_vec())
            .unwrap_or_default();
        if let Some(r) = resolution.first_mut() {
            *r = r.saturating_sub(1);
        }
        let grids = parts
            .into_iter()
            .enumerate()
            .map(|(axis, t)| {
                CenteredGrid::new(
                    t,
                    staggered_component_box(&resolution, axis, &bbox),
                    extrapolation,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_components(grids, bbox)
    }

    /// Cell resolution (not the face resolution of any component).
    pub fn resolution(&self) -> Vec<usize> {
        let mut res = self.components[0].resolution().to_vec();
        res[0] -= 1;
        res
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.components.len()
    }

    /// Leading batch dimension.
    pub fn batch_size(&self) -> usize {
        self.components[0].batch_size()
    }

    /// Region covered by the cells.
    pub fn bbox(&self) -> &AaBox {
        &self.bbox
    }

    /// All component grids, outermost axis first.
    pub fn components(&self) -> &[CenteredGrid] {
        &self.components
    }

    /// The component grid for one axis.
    pub fn component(&self, axis: usize) -> Result<&CenteredGrid, FieldError> {
        self.components
            .get(axis)
            .ok_or(FieldError::ComponentOutOfRange {
                component: axis,
                components: self.rank(),
            })
    }

    /// Extrapolation of the component grids.
    pub fn extrapolation(&self) -> Extrapolation {
        self.components[0].extrapolation()
    }

    /// Replace the component grids, revalidating the layout.
    pub fn with_components(&self, components: Vec<CenteredGrid>) -> Result<Self, FieldError> {
        Self::from_components(components, self.bbox.clone())
    }

    /// Apply `f` to every component grid.
    pub fn try_map_components(
        &self,
        mut f: impl FnMut(usize, &CenteredGrid) -> Result<CenteredGrid, FieldError>,
    ) -> Result<Self, FieldError> {
        let components = self
            .components
            .iter()
            .enumerate()
            .map(|(axis, c)| f(axis, c))
            .collect::<Result<Vec<_>, _>>()?;
        self.with_components(components)
    }

    /// Whether `other` has the same resolution and box.
    pub fn compatible(&self, other: &StaggeredGrid) -> bool {
        self.bbox == other.bbox && self.resolution() == other.resolution()
    }

    /// Componentwise sum of two compatible grids.
    pub fn add(&self, other: &StaggeredGrid) -> Result<Self, FieldError> {
        if !self.compatible(other) {
            return Err(FieldError::DomainMismatch);
        }
        broadcast_batch(self.batch_size(), other.batch_size())?;
        self.try_map_components(|axis, c| c.add(&other.components[axis]))
    }

    /// Sample every component at `location`, stacking them as the last axis.
    pub fn sample_at(&self, location: &Tensor) -> Result<Tensor, FieldError> {
        let parts = self
            .components
            .iter()
            .map(|c| c.sample_at(location))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Tensor::concat_last(&parts)?)
    }

    /// Sample one component at `location`, `[..., 1]`.
    pub fn sample_component_at(&self, component: usize, location: &Tensor) -> Result<Tensor, FieldError> {
        self.component(component)?.sample_at(location)
    }

    /// Average opposite faces onto cell centers, giving a
    /// `[batch, *resolution, rank]` centered grid.
    pub fn at_centers(&self) -> Result<CenteredGrid, FieldError> {
        let rank = self.rank();
        let resolution = self.resolution();
        let mut shape = Vec::with_capacity(rank + 2);
        shape.push(self.batch_size());
        shape.extend_from_slice(&resolution);
        shape.push(rank);
        let comp_strides: Vec<Vec<usize>> = self
            .components
            .iter()
            .map(|c| strides(c.data().shape()))
            .collect();
        let data = Tensor::from_fn(&shape, |idx| {
            let axis = idx[rank + 1];
            let s = &comp_strides[axis];
            let flat: usize = idx[..=rank].iter().zip(s).map(|(i, st)| i * st).sum();
            let values = self.components[axis].data().data();
            0.5 * (values[flat] + values[flat + s[axis + 1]])
        });
        CenteredGrid::new(data, self.bbox.clone(), self.extrapolation())
    }

    /// Padded `[batch, *(res + 1), rank]` tensor of all components.
    pub fn staggered_tensor(&self) -> Result<Tensor, FieldError> {
        let parts: Vec<Tensor> = self.components.iter().map(|c| c.data().clone()).collect();
        stack_staggered_tensor(&parts)
    }

    /// Same grid with a different extrapolation on every component.
    pub fn with_extrapolation(self, extrapolation: Extrapolation) -> Self {
        Self {
            components: self
                .components
                .into_iter()
                .map(|c| c.with_extrapolation(extrapolation))
                .collect(),
            bbox: self.bbox,
        }
    }
}
