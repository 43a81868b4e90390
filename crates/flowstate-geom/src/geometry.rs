//! The closed set of geometry kinds.

use flowstate_core::Tensor;

use crate::aabox::AaBox;
use crate::error::GeometryError;
use crate::sphere::Sphere;

/// Anything that can report the cell-center positions of a regular grid.
///
/// Implemented by simulation domains so that a geometry can be rasterized
/// onto them via [`Geometry::at`] without this crate depending on the
/// field layer.
pub trait CenterPoints {
    /// Cell-center positions, shaped `[1, *resolution, rank]`.
    fn center_points(&self) -> Tensor;
}

/// A shape with an occupancy query.
///
/// `value_at(location)` maps positions `[..., rank]` to occupancy
/// `[..., 1]` in `[0, 1]`; the built-in kinds are hard 0/1 masks.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Axis-aligned box.
    Box(AaBox),
    /// Ball around a center point.
    Sphere(Sphere),
    /// Union of member geometries; occupancy is the member maximum.
    Union(Vec<Geometry>),
}

impl Geometry {
    /// Occupancy of each position.
    pub fn value_at(&self, location: &Tensor) -> Result<Tensor, GeometryError> {
        match self {
            Self::Box(b) => b.value_at(location),
            Self::Sphere(s) => s.value_at(location),
            Self::Union(members) => {
                let mut shape = location.shape().to_vec();
                match shape.last_mut() {
                    Some(last) => *last = 1,
                    None => shape.push(1),
                }
                let mut acc = Tensor::zeros(&shape);
                for member in members {
                    acc = acc.maximum(&member.value_at(location)?)?;
                }
                Ok(acc)
            }
        }
    }

    /// Occupancy sampled at the cell centers of `grid`.
    pub fn at(&self, grid: &impl CenterPoints) -> Result<Tensor, GeometryError> {
        self.value_at(&grid.center_points())
    }

    /// Spatial rank, or `None` for an empty union.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Box(b) => Some(b.rank()),
            Self::Sphere(s) => Some(s.rank()),
            Self::Union(members) => members.first().and_then(Geometry::rank),
        }
    }

    /// Representative center: box midpoint, sphere center, or the mean of
    /// member centers for a union. Empty for an empty union.
    ///
    /// A hand-built union with mixed member ranks averages each axis over
    /// the members that have it.
    pub fn center(&self) -> Vec<f32> {
        match self {
            Self::Box(b) => b.center(),
            Self::Sphere(s) => s.center().to_vec(),
            Self::Union(members) => {
                let centers: Vec<Vec<f32>> = members.iter().map(Geometry::center).collect();
                let Some(first) = centers.first() else {
                    return Vec::new();
                };
                (0..first.len())
                    .map(|axis| {
                        let (sum, n) = centers
                            .iter()
                            .filter_map(|c| c.get(axis))
                            .fold((0.0f32, 0usize), |(sum, n), v| (sum + v, n + 1));
                        sum / n as f32
                    })
                    .collect()
            }
        }
    }

    /// Translated copy.
    pub fn shifted(&self, offset: &[f32]) -> Result<Geometry, GeometryError> {
        Ok(match self {
            Self::Box(b) => Self::Box(b.shifted(offset)?),
            Self::Sphere(s) => Self::Sphere(s.shifted(offset)?),
            Self::Union(members) => Self::Union(
                members
                    .iter()
                    .map(|m| m.shifted(offset))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

impl From<AaBox> for Geometry {
    fn from(b: AaBox) -> Self {
        Self::Box(b)
    }
}

impl From<Sphere> for Geometry {
    fn from(s: Sphere) -> Self {
        Self::Sphere(s)
    }
}

/// Union of a set of geometries, as a single [`Geometry`].
///
/// Returns [`GeometryError::RankMismatch`] if the members do not share one
/// spatial rank. Empty unions carry no rank and combine with anything.
pub fn union<I: IntoIterator<Item = Geometry>>(geometries: I) -> Result<Geometry, GeometryError> {
    let members: Vec<Geometry> = geometries.into_iter().collect();
    let mut ranks = members.iter().filter_map(Geometry::rank);
    if let Some(expected) = ranks.next() {
        if let Some(found) = ranks.find(|&r| r != expected) {
            return Err(GeometryError::RankMismatch { expected, found });
        }
    }
    Ok(Geometry::Union(members))
}
