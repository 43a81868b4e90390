//! Simulation domains: resolution, bounding box and boundary materials.

use flowstate_core::{ShapeError, Tensor};
use flowstate_geom::{AaBox, CenterPoints};

use crate::centered::{cell_centers, CenteredGrid};
use crate::error::FieldError;
use crate::init::GridData;
use crate::material::{Extrapolation, Material};
use crate::staggered::StaggeredGrid;

// ── Boundaries ──────────────────────────────────────────────────

/// Boundary materials for the two faces perpendicular to one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisBoundary {
    /// Both faces share one material.
    Both(Material),
    /// Lower and upper faces differ.
    Faces {
        /// Face at the axis origin.
        lower: Material,
        /// Face at the far end of the axis.
        upper: Material,
    },
}

impl AxisBoundary {
    /// Material of one face.
    pub fn face(&self, upper: bool) -> Material {
        match *self {
            Self::Both(m) => m,
            Self::Faces { lower, upper: u } => {
                if upper {
                    u
                } else {
                    lower
                }
            }
        }
    }

    fn collapsed(self) -> Self {
        match self {
            Self::Faces { lower, upper } if lower == upper => Self::Both(lower),
            other => other,
        }
    }
}

impl From<Material> for AxisBoundary {
    fn from(m: Material) -> Self {
        Self::Both(m)
    }
}

impl From<(Material, Material)> for AxisBoundary {
    fn from((lower, upper): (Material, Material)) -> Self {
        Self::Faces { lower, upper }
    }
}

/// Boundary specification of a domain.
///
/// Either one material for every face, or one [`AxisBoundary`] per axis
/// (outermost axis first). A [`Domain`] stores its spec collapsed, so a
/// per-axis spec whose faces all agree reads back as the uniform spec.
#[derive(Clone, Debug, PartialEq)]
pub enum Boundaries {
    /// Every face uses this material.
    Uniform(Material),
    /// One entry per spatial axis.
    PerAxis(Vec<AxisBoundary>),
}

impl Boundaries {
    /// Build a per-axis spec, one entry per axis in order.
    pub fn per_axis<I, A>(axes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AxisBoundary>,
    {
        Self::PerAxis(axes.into_iter().map(Into::into).collect())
    }

    /// Same spec with equal faces and equal axes merged.
    pub fn collapsed(self) -> Self {
        match self {
            Self::Uniform(m) => Self::Uniform(m),
            Self::PerAxis(axes) => {
                let axes: Vec<AxisBoundary> =
                    axes.into_iter().map(AxisBoundary::collapsed).collect();
                match axes.first() {
                    Some(&AxisBoundary::Both(m))
                        if axes.iter().all(|a| *a == AxisBoundary::Both(m)) =>
                    {
                        Self::Uniform(m)
                    }
                    _ => Self::PerAxis(axes),
                }
            }
        }
    }

    /// Material of one domain face.
    ///
    /// For a per-axis spec, `axis` must be below the number of entries.
    pub fn surface_material(&self, axis: usize, upper: bool) -> Option<Material> {
        match self {
            Self::Uniform(m) => Some(*m),
            Self::PerAxis(axes) => axes.get(axis).map(|a| a.face(upper)),
        }
    }

    /// Extrapolation for grids on this domain: the uniform material's
    /// mode, or [`Extrapolation::Boundary`] for a mixed spec.
    pub fn extrapolation(&self) -> Extrapolation {
        match self {
            Self::Uniform(m) => m.extrapolation(),
            Self::PerAxis(_) => Extrapolation::Boundary,
        }
    }
}

impl Default for Boundaries {
    fn default() -> Self {
        Self::Uniform(Material::OPEN)
    }
}

impl From<Material> for Boundaries {
    fn from(m: Material) -> Self {
        Self::Uniform(m)
    }
}

// ── Domain ──────────────────────────────────────────────────────

/// A regular grid region: resolution, bounding box and boundary spec.
///
/// Two domains are equal when their resolution and box are equal; the
/// boundary spec does not take part in equality.
#[derive(Clone, Debug)]
pub struct Domain {
    resolution: Vec<usize>,
    bbox: AaBox,
    boundaries: Boundaries,
}

impl Domain {
    /// Domain with open boundaries on the box `[0, resolution]`.
    ///
    /// Returns [`FieldError::InvalidResolution`] for an empty resolution or
    /// one with a zero-sized axis.
    pub fn new(resolution: &[usize]) -> Result<Self, FieldError> {
        if resolution.is_empty() || resolution.contains(&0) {
            return Err(FieldError::InvalidResolution {
                resolution: resolution.to_vec(),
            });
        }
        Ok(Self {
            resolution: resolution.to_vec(),
            bbox: AaBox::spanning(resolution),
            boundaries: Boundaries::default(),
        })
    }

    /// Replace the bounding box.
    pub fn with_box(mut self, bbox: AaBox) -> Result<Self, FieldError> {
        if bbox.rank() != self.rank() {
            return Err(FieldError::RankMismatch {
                expected: self.rank(),
                found: bbox.rank(),
            });
        }
        self.bbox = bbox;
        Ok(self)
    }

    /// Replace the boundary spec. A per-axis spec must have one entry per
    /// axis; the spec is stored collapsed.
    pub fn with_boundaries(mut self, boundaries: impl Into<Boundaries>) -> Result<Self, FieldError> {
        let boundaries = boundaries.into();
        if let Boundaries::PerAxis(axes) = &boundaries {
            if axes.len() != self.rank() {
                return Err(FieldError::InvalidBoundaries {
                    reason: format!(
                        "{} axis entries for a rank-{} domain",
                        axes.len(),
                        self.rank()
                    ),
                });
            }
        }
        self.boundaries = boundaries.collapsed();
        Ok(self)
    }

    /// Cells per axis.
    pub fn resolution(&self) -> &[usize] {
        &self.resolution
    }

    /// Bounding box.
    pub fn bbox(&self) -> &AaBox {
        &self.bbox
    }

    /// Boundary spec.
    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.resolution.len()
    }

    /// Size of one cell along each axis.
    pub fn cell_size(&self) -> Vec<f32> {
        self.bbox
            .size()
            .iter()
            .zip(&self.resolution)
            .map(|(s, &r)| s / r as f32)
            .collect()
    }

    /// Extrapolation implied by the boundary spec.
    pub fn extrapolation(&self) -> Extrapolation {
        self.boundaries.extrapolation()
    }

    /// Material of the lower or upper face perpendicular to `axis`.
    pub fn surface_material(&self, axis: usize, upper: bool) -> Result<Material, FieldError> {
        if axis >= self.rank() {
            return Err(ShapeError::AxisOutOfRange {
                axis,
                rank: self.rank(),
            }
            .into());
        }
        self.boundaries
            .surface_material(axis, upper)
            .ok_or(FieldError::InvalidBoundaries {
                reason: format!("no entry for axis {axis}"),
            })
    }

    /// Resolution of the face-centered component grid for `axis`:
    /// one more sample along that axis.
    pub fn staggered_resolution(&self, axis: usize) -> Vec<usize> {
        let mut res = self.resolution.clone();
        if let Some(r) = res.get_mut(axis) {
            *r += 1;
        }
        res
    }

    /// Index of the cell center at or below `position`, clamped to the grid.
    pub fn cell_index(&self, position: &[f32]) -> Result<Vec<usize>, FieldError> {
        if position.len() != self.rank() {
            return Err(FieldError::RankMismatch {
                expected: self.rank(),
                found: position.len(),
            });
        }
        let origin = self.bbox.origin();
        let size = self.bbox.size();
        Ok(position
            .iter()
            .enumerate()
            .map(|(d, &p)| {
                let local = (p - origin[d]) * self.resolution[d] as f32 / size[d];
                let idx = (local - 0.5).floor().max(0.0) as usize;
                idx.min(self.resolution[d] - 1)
            })
            .collect())
    }

    /// Integer cell indices as `[1, *resolution, rank]` floats.
    pub fn indices(&self) -> Tensor {
        let shape = self.point_shape(&self.resolution);
        Tensor::from_fn(&shape, |i| i[1 + i[i.len() - 1]] as f32)
    }

    /// Face-center positions of the component grid for `axis`, shaped
    /// `[1, *staggered_resolution(axis), rank]`. Along `axis` the points sit
    /// on cell faces; along the other axes they sit on cell centers.
    pub fn staggered_points(&self, axis: usize) -> Tensor {
        let shape = self.point_shape(&self.staggered_resolution(axis));
        let origin = self.bbox.origin().to_vec();
        let dx = self.cell_size();
        Tensor::from_fn(&shape, |i| {
            let d = i[i.len() - 1];
            let offset = if d == axis { 0.0 } else { 0.5 };
            origin[d] + (i[1 + d] as f32 + offset) * dx[d]
        })
    }

    fn point_shape(&self, resolution: &[usize]) -> Vec<usize> {
        let mut shape = Vec::with_capacity(resolution.len() + 2);
        shape.push(1);
        shape.extend_from_slice(resolution);
        shape.push(self.rank());
        shape
    }

    /// Build a cell-centered grid on this domain.
    ///
    /// `data` may be a scalar fill, a tensor shaped
    /// `[batch, *resolution, components]` (batch 1 broadcasts), an
    /// initializer, a generator function or any field to sample. The
    /// result always has exactly this domain's resolution and box and uses
    /// the domain's extrapolation.
    pub fn centered_grid(
        &self,
        data: impl Into<GridData>,
        components: usize,
        batch_size: Option<usize>,
    ) -> Result<CenteredGrid, FieldError> {
        let tensor = data.into().centered_tensor(self, components, batch_size)?;
        CenteredGrid::new(tensor, self.bbox.clone(), self.extrapolation())
    }

    /// Build a staggered grid on this domain.
    ///
    /// Tensor data is read in the padded `[batch, *(resolution + 1), rank]`
    /// layout; fields are sampled at each component's face points.
    pub fn staggered_grid(
        &self,
        data: impl Into<GridData>,
        batch_size: Option<usize>,
    ) -> Result<StaggeredGrid, FieldError> {
        let components = data.into().staggered_tensors(self, batch_size)?;
        let extrapolation = self.extrapolation();
        let grids = components
            .into_iter()
            .enumerate()
            .map(|(axis, t)| {
                CenteredGrid::new(
                    t,
                    crate::staggered::staggered_component_box(&self.resolution, axis, &self.bbox),
                    extrapolation,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        StaggeredGrid::from_components(grids, self.bbox.clone())
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.resolution == other.resolution && self.bbox == other.bbox
    }
}

impl CenterPoints for Domain {
    /// Cell-center positions in world coordinates, `[1, *resolution, rank]`.
    fn center_points(&self) -> Tensor {
        cell_centers(&self.bbox, &self.resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_boundaries_collapse() {
        let b = Boundaries::per_axis([
            AxisBoundary::from((Material::OPEN, Material::OPEN)),
            AxisBoundary::from(Material::OPEN),
        ]);
        assert_eq!(b.collapsed(), Boundaries::Uniform(Material::OPEN));

        let mixed = Boundaries::per_axis([
            AxisBoundary::from((Material::SLIPPERY, Material::OPEN)),
            AxisBoundary::from(Material::SLIPPERY),
        ])
        .collapsed();
        assert!(matches!(mixed, Boundaries::PerAxis(_)));
        assert_eq!(mixed.surface_material(0, true), Some(Material::OPEN));
        assert_eq!(mixed.surface_material(0, false), Some(Material::SLIPPERY));
        assert_eq!(mixed.surface_material(1, true), Some(Material::SLIPPERY));
        assert_eq!(mixed.extrapolation(), Extrapolation::Boundary);
    }

    #[test]
    fn domain_stores_collapsed_boundaries() {
        let d = Domain::new(&[4, 4])
            .unwrap()
            .with_boundaries(Boundaries::per_axis([Material::OPEN, Material::OPEN]))
            .unwrap();
        assert_eq!(d.boundaries(), &Boundaries::Uniform(Material::OPEN));
    }

    #[test]
    fn per_axis_length_must_match_rank() {
        let spec = Boundaries::PerAxis(vec![AxisBoundary::Both(Material::OPEN)]);
        let err = Domain::new(&[64, 32, 16])
            .unwrap()
            .with_boundaries(spec)
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidBoundaries { .. }));
    }

    #[test]
    fn uniform_looking_per_axis_spec_still_checks_length() {
        let three = Boundaries::per_axis([Material::OPEN, Material::OPEN, Material::OPEN]);
        match Domain::new(&[4, 4]).unwrap().with_boundaries(three) {
            Err(FieldError::InvalidBoundaries { .. }) => {}
            other => panic!("expected InvalidBoundaries, got {other:?}"),
        }
    }

    #[test]
    fn invalid_resolution_rejected() {
        assert!(Domain::new(&[]).is_err());
        assert!(Domain::new(&[4, 0]).is_err());
    }

    #[test]
    fn equality_ignores_boundaries() {
        let a = Domain::new(&[4, 4]).unwrap();
        let b = Domain::new(&[4, 4])
            .unwrap()
            .with_boundaries(Material::STICKY)
            .unwrap();
        assert_eq!(a, b);
        let c = Domain::new(&[4, 4])
            .unwrap()
            .with_box(AaBox::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap())
            .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn staggered_resolution_adds_one_on_axis() {
        let d = Domain::new(&[4, 4]).unwrap();
        assert_eq!(d.staggered_resolution(0), vec![5, 4]);
        assert_eq!(d.staggered_resolution(1), vec![4, 5]);
        assert_eq!(d.staggered_points(0).shape(), &[1, 5, 4, 2]);
        assert_eq!(d.staggered_points(1).shape(), &[1, 4, 5, 2]);
    }

    #[test]
    fn points_and_indices() {
        let d = Domain::new(&[2, 3]).unwrap();
        let c = d.center_points();
        assert_eq!(c.shape(), &[1, 2, 3, 2]);
        assert_eq!(c.get(&[0, 1, 2, 0]).unwrap(), 1.5);
        assert_eq!(c.get(&[0, 1, 2, 1]).unwrap(), 2.5);
        let idx = d.indices();
        assert_eq!(idx.get(&[0, 1, 2, 1]).unwrap(), 2.0);
        let faces = d.staggered_points(1);
        assert_eq!(faces.get(&[0, 0, 3, 1]).unwrap(), 3.0);
        assert_eq!(faces.get(&[0, 0, 3, 0]).unwrap(), 0.5);
    }

    #[test]
    fn cell_index_clamps() {
        let d = Domain::new(&[4, 4]).unwrap();
        assert_eq!(d.cell_index(&[1.7, 2.2]).unwrap(), vec![1, 1]);
        assert_eq!(d.cell_index(&[-3.0, 9.0]).unwrap(), vec![0, 3]);
        assert!(d.cell_index(&[1.0]).is_err());
    }

    #[test]
    fn surface_material_checks_axis() {
        let d = Domain::new(&[4, 4]).unwrap();
        assert_eq!(d.surface_material(1, true).unwrap(), Material::OPEN);
        assert!(d.surface_material(2, false).is_err());
    }
}
