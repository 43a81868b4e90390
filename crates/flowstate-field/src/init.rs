//! Grid data sources and deterministic initializers.
//!
//! [`GridData`] is everything a [`Domain`](crate::Domain) grid factory
//! accepts: a scalar fill, a ready tensor, an [`Initializer`], a generator
//! closure, or another field to sample. The factory conforms the result
//! to the domain's resolution and the requested batch size.
//!
//! [`Initializer::Randn`] draws multi-scale Gaussian noise from a seeded
//! ChaCha8 RNG, so identical seeds give identical grids.

use std::fmt;
use std::sync::Arc;

use flowstate_core::Tensor;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::centered::CenteredGrid;
use crate::constant::ConstantField;
use crate::domain::Domain;
use crate::error::FieldError;
use crate::field::Field;
use crate::staggered::{unstack_staggered_tensor, StaggeredGrid};

/// Builds grid data for a requested tensor shape.
pub type Generator = Arc<dyn Fn(&[usize]) -> Tensor + Send + Sync>;

/// Named ways of filling a grid.
#[derive(Clone, Debug, PartialEq)]
pub enum Initializer {
    /// All zeros.
    Zeros,
    /// All ones.
    Ones,
    /// Sum of Gaussian noise octaves. Octave `i` is drawn at resolution
    /// `resolution / 2^i`, scaled by `levels[i]` and upsampled by
    /// nearest-neighbour repetition.
    Randn {
        /// Amplitude per octave, finest first.
        levels: Vec<f32>,
        /// RNG seed.
        seed: u64,
    },
}

impl Initializer {
    /// Single-octave unit Gaussian noise.
    pub fn randn(seed: u64) -> Self {
        Self::Randn {
            levels: vec![1.0],
            seed,
        }
    }

    /// Produce a tensor of `shape` (`[batch, *spatial, components]`).
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        match self {
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Randn { levels, seed } => random_tensor(shape, levels, *seed),
        }
    }
}

fn random_tensor(shape: &[usize], levels: &[f32], seed: u64) -> Tensor {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut result = Tensor::zeros(shape);
    let spatial = 1..shape.len().saturating_sub(1);
    for (octave, &level) in levels.iter().enumerate() {
        let shift = octave.min(31) as u32;
        let factor = 1usize << shift;
        let low_shape: Vec<usize> = shape
            .iter()
            .enumerate()
            .map(|(d, &n)| {
                if spatial.contains(&d) {
                    n.div_ceil(factor).max(1)
                } else {
                    n
                }
            })
            .collect();
        let noise = Tensor::from_fn(&low_shape, |_| gaussian(&mut rng) * level);
        let upsampled = Tensor::from_fn(shape, |idx| {
            let mut flat = 0usize;
            for (d, &i) in idx.iter().enumerate() {
                let i = if spatial.contains(&d) { i >> shift } else { i };
                flat = flat * low_shape[d] + i;
            }
            noise.data()[flat]
        });
        // shapes are equal by construction
        if let Ok(sum) = result.add(&upsampled) {
            result = sum;
        }
    }
    result
}

/// Standard normal sample via the Box-Muller transform.
fn gaussian(rng: &mut ChaCha8Rng) -> f32 {
    let u1 = unit_f64(rng).max(1e-300);
    let u2 = unit_f64(rng);
    ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
}

fn unit_f64(rng: &mut ChaCha8Rng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Source of grid values for [`Domain::centered_grid`] and
/// [`Domain::staggered_grid`].
#[derive(Clone)]
pub enum GridData {
    /// Every value equals this number.
    Scalar(f32),
    /// Explicit data; batch 1 broadcasts to the requested batch size.
    Tensor(Tensor),
    /// A named initializer.
    Initializer(Initializer),
    /// A closure from target shape to data.
    Generator(Generator),
    /// A field sampled at the grid's points.
    Field(Field),
}

impl GridData {
    /// Wrap a generator closure.
    pub fn generator(f: impl Fn(&[usize]) -> Tensor + Send + Sync + 'static) -> Self {
        Self::Generator(Arc::new(f))
    }

    pub(crate) fn centered_tensor(
        self,
        domain: &Domain,
        components: usize,
        batch_size: Option<usize>,
    ) -> Result<Tensor, FieldError> {
        let resolution = domain.resolution();
        let shape = grid_shape(batch_size.unwrap_or(1), resolution, components);
        match self {
            Self::Scalar(v) => Ok(Tensor::full(&shape, v)),
            Self::Initializer(init) => Ok(init.generate(&shape)),
            Self::Generator(f) => conform(f(&shape), batch_size, resolution, components),
            Self::Tensor(t) => conform(t, batch_size, resolution, components),
            Self::Field(field) => conform(
                field.sample_grid(domain, false)?,
                batch_size,
                resolution,
                components,
            ),
        }
    }

    pub(crate) fn staggered_tensors(
        self,
        domain: &Domain,
        batch_size: Option<usize>,
    ) -> Result<Vec<Tensor>, FieldError> {
        let rank = domain.rank();
        let batch = batch_size.unwrap_or(1);
        let component_shape = |axis: usize| grid_shape(batch, &domain.staggered_resolution(axis), 1);
        let padded_res: Vec<usize> = domain.resolution().iter().map(|r| r + 1).collect();
        let padded = match self {
            Self::Scalar(v) => {
                return Ok((0..rank).map(|a| Tensor::full(&component_shape(a), v)).collect())
            }
            Self::Initializer(init) => {
                return Ok((0..rank)
                    .map(|a| match &init {
                        Initializer::Randn { levels, seed } => {
                            random_tensor(&component_shape(a), levels, seed.wrapping_add(a as u64))
                        }
                        other => other.generate(&component_shape(a)),
                    })
                    .collect())
            }
            Self::Generator(f) => f(&grid_shape(batch, &padded_res, rank)),
            Self::Tensor(t) => t,
            Self::Field(field) => field.sample_grid(domain, true)?,
        };
        let padded = conform(padded, batch_size, &padded_res, rank)?;
        unstack_staggered_tensor(&padded)
    }
}

impl fmt::Debug for GridData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Self::Tensor(t) => f.debug_tuple("Tensor").field(&t.shape()).finish(),
            Self::Initializer(i) => f.debug_tuple("Initializer").field(i).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
        }
    }
}

impl From<f32> for GridData {
    fn from(v: f32) -> Self {
        Self::Scalar(v)
    }
}

impl From<Tensor> for GridData {
    fn from(t: Tensor) -> Self {
        Self::Tensor(t)
    }
}

impl From<Initializer> for GridData {
    fn from(i: Initializer) -> Self {
        Self::Initializer(i)
    }
}

impl From<Field> for GridData {
    fn from(f: Field) -> Self {
        Self::Field(f)
    }
}

impl From<ConstantField> for GridData {
    fn from(c: ConstantField) -> Self {
        Self::Field(c.into())
    }
}

impl From<CenteredGrid> for GridData {
    fn from(g: CenteredGrid) -> Self {
        Self::Field(g.into())
    }
}

impl From<StaggeredGrid> for GridData {
    fn from(s: StaggeredGrid) -> Self {
        Self::Field(s.into())
    }
}

fn grid_shape(batch: usize, resolution: &[usize], components: usize) -> Vec<usize> {
    let mut shape = Vec::with_capacity(resolution.len() + 2);
    shape.push(batch);
    shape.extend_from_slice(resolution);
    shape.push(components);
    shape
}

/// Check `t` against `[batch, *resolution, components]` and broadcast a
/// batch or component axis of size 1.
fn conform(
    t: Tensor,
    batch_size: Option<usize>,
    resolution: &[usize],
    components: usize,
) -> Result<Tensor, FieldError> {
    let n = resolution.len();
    if t.rank() != n + 2 {
        return Err(FieldError::RankMismatch {
            expected: n + 2,
            found: t.rank(),
        });
    }
    if &t.shape()[1..=n] != resolution {
        return Err(FieldError::ResolutionMismatch {
            expected: resolution.to_vec(),
            found: t.shape()[1..=n].to_vec(),
        });
    }
    let found_batch = t.shape()[0];
    let batch = batch_size.unwrap_or(found_batch);
    if found_batch != batch && found_batch != 1 {
        return Err(FieldError::BatchMismatch {
            expected: batch,
            found: found_batch,
        });
    }
    let target = grid_shape(batch, resolution, components);
    if t.shape() == target.as_slice() {
        Ok(t)
    } else {
        Ok(t.broadcast_to(&target)?)
    }
}
