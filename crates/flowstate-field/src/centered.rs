//! Cell-centered grids.

use flowstate_core::Tensor;
use flowstate_geom::AaBox;

use crate::error::FieldError;
use crate::material::Extrapolation;

/// Data sampled at the cell centers of a regular grid.
///
/// The data tensor is shaped `[batch, *resolution, components]` and the
/// grid covers `bbox`, so cell `i` along axis `d` is centered at
/// `origin[d] + (i + 0.5) * dx[d]`. Sampling between centers is
/// multilinear; outside the data the grid's [`Extrapolation`] applies.
#[derive(Clone, Debug, PartialEq)]
pub struct CenteredGrid {
    data: Tensor,
    bbox: AaBox,
    extrapolation: Extrapolation,
}

impl CenteredGrid {
    /// Wrap `data` as a grid over `bbox`.
    ///
    /// The tensor rank must be the box rank plus two (batch and
    /// components), and no axis may be empty.
    pub fn new(data: Tensor, bbox: AaBox, extrapolation: Extrapolation) -> Result<Self, FieldError> {
        if data.rank() != bbox.rank() + 2 {
            return Err(FieldError::RankMismatch {
                expected: bbox.rank() + 2,
                found: data.rank(),
            });
        }
        if data.shape().contains(&0) {
            return Err(FieldError::InvalidResolution {
                resolution: data.shape().to_vec(),
            });
        }
        Ok(Self {
            data,
            bbox,
            extrapolation,
        })
    }

    /// The `[batch, *resolution, components]` data tensor.
    pub fn data(&self) -> &Tensor {
        &self.data
    }

    /// Consume the grid, returning its data.
    pub fn into_data(self) -> Tensor {
        self.data
    }

    /// Region covered by the grid.
    pub fn bbox(&self) -> &AaBox {
        &self.bbox
    }

    /// Extrapolation used outside the data.
    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Same grid with a different extrapolation.
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.bbox.rank()
    }

    /// Cells per axis.
    pub fn resolution(&self) -> &[usize] {
        &self.data.shape()[1..=self.rank()]
    }

    /// Leading batch dimension.
    pub fn batch_size(&self) -> usize {
        self.data.shape()[0]
    }

    /// Values per cell.
    pub fn components(&self) -> usize {
        self.data.last_dim()
    }

    /// Cell size along each axis.
    pub fn dx(&self) -> Vec<f32> {
        self.bbox
            .size()
            .iter()
            .zip(self.resolution())
            .map(|(s, &r)| s / r as f32)
            .collect()
    }

    /// Whether `other` samples exactly the same points: same resolution and box.
    pub fn compatible(&self, other: &CenteredGrid) -> bool {
        self.resolution() == other.resolution() && self.bbox == other.bbox
    }

    /// Replace the data, keeping box and extrapolation. The resolution
    /// must not change; batch size and component count may.
    pub fn with_data(&self, data: Tensor) -> Result<Self, FieldError> {
        let n = self.rank();
        if data.rank() != n + 2 {
            return Err(FieldError::RankMismatch {
                expected: n + 2,
                found: data.rank(),
            });
        }
        if &data.shape()[1..=n] != self.resolution() {
            return Err(FieldError::ResolutionMismatch {
                expected: self.resolution().to_vec(),
                found: data.shape()[1..=n].to_vec(),
            });
        }
        CenteredGrid::new(data, self.bbox.clone(), self.extrapolation)
    }

    /// Cell-center positions, `[1, *resolution, rank]`.
    pub fn center_points(&self) -> Tensor {
        cell_centers(&self.bbox, self.resolution())
    }

    /// Sample at arbitrary positions by multilinear interpolation.
    ///
    /// `location` is `[batch, *points, rank]` (or a single `[rank]` point);
    /// the result is `[batch, *points, components]`. A batch of 1 on either
    /// side broadcasts against the other.
    pub fn sample_at(&self, location: &Tensor) -> Result<Tensor, FieldError> {
        let rank = self.rank();
        if location.rank() == 0 || location.last_dim() != rank {
            return Err(FieldError::RankMismatch {
                expected: rank,
                found: if location.rank() == 0 { 0 } else { location.last_dim() },
            });
        }
        let loc_shape = location.shape();
        let (loc_batch, points_shape): (usize, &[usize]) = if location.rank() == 1 {
            (1, &[])
        } else {
            (loc_shape[0], &loc_shape[1..loc_shape.len() - 1])
        };
        let grid_batch = self.batch_size();
        let batch = broadcast_batch(grid_batch, loc_batch)?;

        let n_points: usize = points_shape.iter().product();
        let components = self.components();
        let resolution = self.resolution().to_vec();
        let strides = strides(self.data.shape());
        let origin = self.bbox.origin();
        let size = self.bbox.size();
        let values = self.data.data();
        let positions = location.data();

        let mut out = vec![0.0f32; batch * n_points * components];
        let mut lower = vec![0i64; rank];
        let mut frac = vec![0.0f32; rank];
        for b in 0..batch {
            let lb = if loc_batch == 1 { 0 } else { b };
            let gb = if grid_batch == 1 { 0 } else { b };
            for p in 0..n_points {
                let start = (lb * n_points + p) * rank;
                let pos = &positions[start..start + rank];
                for d in 0..rank {
                    let x = (pos[d] - origin[d]) * resolution[d] as f32 / size[d] - 0.5;
                    let f = x.floor();
                    lower[d] = f as i64;
                    frac[d] = x - f;
                }
                let dst = (b * n_points + p) * components;
                'corners: for corner in 0..(1usize << rank) {
                    let mut weight = 1.0f32;
                    let mut flat = gb * strides[0];
                    for d in 0..rank {
                        let upper = (corner >> d) & 1 == 1;
                        weight *= if upper { frac[d] } else { 1.0 - frac[d] };
                        let i = lower[d] + i64::from(upper);
                        match resolve_index(i, resolution[d], self.extrapolation) {
                            Some(j) => flat += j * strides[d + 1],
                            None => continue 'corners,
                        }
                    }
                    if weight == 0.0 {
                        continue;
                    }
                    for c in 0..components {
                        out[dst + c] += weight * values[flat + c];
                    }
                }
            }
        }

        let mut shape = Vec::with_capacity(points_shape.len() + 2);
        shape.push(batch);
        shape.extend_from_slice(points_shape);
        shape.push(components);
        Ok(Tensor::from_vec(&shape, out)?)
    }

    /// Discrete Laplacian in cell units, honouring the extrapolation at
    /// the edges.
    pub fn laplace(&self) -> Result<Self, FieldError> {
        let rank = self.rank();
        let shape = self.data.shape().to_vec();
        let strides = strides(&shape);
        let values = self.data.data();
        let extrapolation = self.extrapolation;
        let out = Tensor::from_fn(&shape, |idx| {
            let flat: usize = idx.iter().zip(&strides).map(|(i, s)| i * s).sum();
            let center = values[flat];
            let mut acc = 0.0;
            for d in 0..rank {
                let n = shape[d + 1];
                let i = idx[d + 1] as i64;
                for neighbour in [i - 1, i + 1] {
                    let v = match resolve_index(neighbour, n, extrapolation) {
                        Some(j) => values[flat - idx[d + 1] * strides[d + 1] + j * strides[d + 1]],
                        None => 0.0,
                    };
                    acc += v - center;
                }
            }
            acc
        });
        self.with_data(out)
    }

    /// Multiply every value by `factor`.
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            data: self.data.scale(factor),
            bbox: self.bbox.clone(),
            extrapolation: self.extrapolation,
        }
    }

    /// Pointwise sum of two compatible grids.
    pub fn add(&self, other: &CenteredGrid) -> Result<Self, FieldError> {
        self.check_combinable(other)?;
        self.with_data(self.data.add(&other.data)?)
    }

    /// Pointwise product of two compatible grids.
    pub fn mul(&self, other: &CenteredGrid) -> Result<Self, FieldError> {
        self.check_combinable(other)?;
        self.with_data(self.data.mul(&other.data)?)
    }

    fn check_combinable(&self, other: &CenteredGrid) -> Result<(), FieldError> {
        if self.rank() != other.rank() {
            return Err(FieldError::RankMismatch {
                expected: self.rank(),
                found: other.rank(),
            });
        }
        if self.resolution() != other.resolution() {
            return Err(FieldError::ResolutionMismatch {
                expected: self.resolution().to_vec(),
                found: other.resolution().to_vec(),
            });
        }
        if self.bbox != other.bbox {
            return Err(FieldError::DomainMismatch);
        }
        broadcast_batch(self.batch_size(), other.batch_size()).map(|_| ())
    }
}

/// Cell-center positions of a grid covering `bbox`, `[1, *resolution, rank]`.
pub fn cell_centers(bbox: &AaBox, resolution: &[usize]) -> Tensor {
    let mut shape = Vec::with_capacity(resolution.len() + 2);
    shape.push(1);
    shape.extend_from_slice(resolution);
    shape.push(resolution.len());
    let origin = bbox.origin();
    let size = bbox.size();
    Tensor::from_fn(&shape, |i| {
        let d = i[i.len() - 1];
        origin[d] + (i[1 + d] as f32 + 0.5) * size[d] / resolution[d] as f32
    })
}

/// Batch size after combining two batches where 1 broadcasts.
pub(crate) fn broadcast_batch(a: usize, b: usize) -> Result<usize, FieldError> {
    if a == b || b == 1 {
        Ok(a)
    } else if a == 1 {
        Ok(b)
    } else {
        Err(FieldError::BatchMismatch {
            expected: a,
            found: b,
        })
    }
}

/// Map a possibly out-of-range index onto the data, or `None` where the
/// extrapolation reads zero.
fn resolve_index(i: i64, n: usize, extrapolation: Extrapolation) -> Option<usize> {
    let n = n as i64;
    match extrapolation {
        Extrapolation::Constant => (0..n).contains(&i).then_some(i as usize),
        Extrapolation::Boundary => Some(i.clamp(0, n - 1) as usize),
        Extrapolation::Periodic => Some(i.rem_euclid(n) as usize),
    }
}

pub(crate) fn strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for d in (0..shape.len().saturating_sub(1)).rev() {
        strides[d] = strides[d + 1] * shape[d + 1];
    }
    strides
}
