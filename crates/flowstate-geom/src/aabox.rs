//! Axis-aligned boxes.

use flowstate_core::Tensor;

use crate::error::GeometryError;

/// An axis-aligned box given by its lower corner and extent.
///
/// Membership is closed on both faces: a point is inside when
/// `origin <= p <= origin + size` holds on every axis. Axes are ordered
/// outermost first, matching grid tensor layout.
#[derive(Clone, Debug, PartialEq)]
pub struct AaBox {
    origin: Vec<f32>,
    size: Vec<f32>,
}

impl AaBox {
    /// Create a box from its lower corner and size.
    ///
    /// Returns [`GeometryError::RankMismatch`] if the two lengths differ.
    pub fn new(origin: Vec<f32>, size: Vec<f32>) -> Result<Self, GeometryError> {
        if origin.len() != size.len() {
            return Err(GeometryError::RankMismatch {
                expected: origin.len(),
                found: size.len(),
            });
        }
        Ok(Self { origin, size })
    }

    /// Create a box from its lower and upper corners.
    pub fn from_corners(lower: Vec<f32>, upper: &[f32]) -> Result<Self, GeometryError> {
        if lower.len() != upper.len() {
            return Err(GeometryError::RankMismatch {
                expected: lower.len(),
                found: upper.len(),
            });
        }
        let size = lower.iter().zip(upper).map(|(l, u)| u - l).collect();
        Ok(Self {
            origin: lower,
            size,
        })
    }

    /// The box spanning `[0, resolution)` in cell units, used when a domain
    /// is created without an explicit box.
    pub fn spanning(resolution: &[usize]) -> Self {
        Self {
            origin: vec![0.0; resolution.len()],
            size: resolution.iter().map(|&r| r as f32).collect(),
        }
    }

    /// Lower corner.
    pub fn origin(&self) -> &[f32] {
        &self.origin
    }

    /// Extent along each axis.
    pub fn size(&self) -> &[f32] {
        &self.size
    }

    /// Upper corner, `origin + size`.
    pub fn upper(&self) -> Vec<f32> {
        self.origin
            .iter()
            .zip(&self.size)
            .map(|(o, s)| o + s)
            .collect()
    }

    /// Number of spatial axes.
    pub fn rank(&self) -> usize {
        self.size.len()
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Vec<f32> {
        self.origin
            .iter()
            .zip(&self.size)
            .map(|(o, s)| o + 0.5 * s)
            .collect()
    }

    /// Translated copy.
    pub fn shifted(&self, offset: &[f32]) -> Result<Self, GeometryError> {
        self.check_rank(offset.len())?;
        Ok(Self {
            origin: self.origin.iter().zip(offset).map(|(o, d)| o + d).collect(),
            size: self.size.clone(),
        })
    }

    /// Copy extended by `below` under the origin and `above` past the
    /// upper corner along one axis. Out-of-range axes leave the box as is.
    pub fn grown_along(&self, axis: usize, below: f32, above: f32) -> Self {
        let mut grown = self.clone();
        if axis < grown.rank() {
            grown.origin[axis] -= below;
            grown.size[axis] += below + above;
        }
        grown
    }

    /// Map global positions `[..., rank]` into box-local coordinates where
    /// the box spans `[0, 1]` on every axis.
    pub fn global_to_local(&self, global: &Tensor) -> Result<Tensor, GeometryError> {
        self.check_rank(global.last_dim())?;
        let shifted = global.sub(&Tensor::vector(&self.origin))?;
        Ok(shifted.div(&Tensor::vector(&self.size))?)
    }

    /// Inverse of [`AaBox::global_to_local`].
    pub fn local_to_global(&self, local: &Tensor) -> Result<Tensor, GeometryError> {
        self.check_rank(local.last_dim())?;
        let scaled = local.mul(&Tensor::vector(&self.size))?;
        Ok(scaled.add(&Tensor::vector(&self.origin))?)
    }

    /// Occupancy `[..., 1]` of positions `[..., rank]`: 1.0 inside, 0.0 outside.
    pub fn value_at(&self, location: &Tensor) -> Result<Tensor, GeometryError> {
        self.check_rank(location.last_dim())?;
        let above = location.ge(&Tensor::vector(&self.origin))?;
        let below = location.le(&Tensor::vector(&self.upper()))?;
        let inside = above.mul(&below)?;
        Ok(inside.all_axis(inside.rank() - 1, true)?)
    }

    fn check_rank(&self, found: usize) -> Result<(), GeometryError> {
        if found != self.rank() {
            return Err(GeometryError::RankMismatch {
                expected: self.rank(),
                found,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(p: &[f32]) -> Tensor {
        Tensor::vector(p)
    }

    #[test]
    fn membership_is_closed() {
        let b = AaBox::new(vec![0.0, 6.0], vec![2.0, 4.0]).unwrap();
        assert_eq!(b.value_at(&point(&[1.0, 7.0])).unwrap().data(), &[1.0]);
        assert_eq!(b.value_at(&point(&[2.0, 10.0])).unwrap().data(), &[1.0]);
        assert_eq!(b.value_at(&point(&[5.0, 5.0])).unwrap().data(), &[0.0]);
        assert_eq!(b.value_at(&point(&[1.0, 10.5])).unwrap().data(), &[0.0]);
    }

    #[test]
    fn value_at_keeps_leading_axes() {
        let b = AaBox::new(vec![0.0], vec![1.0]).unwrap();
        let pts = Tensor::from_vec(&[1, 3, 1], vec![-0.5, 0.5, 1.5]).unwrap();
        let v = b.value_at(&pts).unwrap();
        assert_eq!(v.shape(), &[1, 3, 1]);
        assert_eq!(v.data(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn rank_mismatch_rejected() {
        assert!(matches!(
            AaBox::new(vec![0.0], vec![1.0, 1.0]),
            Err(GeometryError::RankMismatch { .. })
        ));
        let b = AaBox::spanning(&[4, 4]);
        match b.value_at(&point(&[1.0, 1.0, 1.0])) {
            Err(GeometryError::RankMismatch {
                expected: 2,
                found: 3,
            }) => {}
            other => panic!("expected RankMismatch, got {other:?}"),
        }
    }

    #[test]
    fn local_global_round_trip() {
        let b = AaBox::new(vec![1.0, -2.0], vec![4.0, 8.0]).unwrap();
        let g = point(&[3.0, 2.0]);
        let local = b.global_to_local(&g).unwrap();
        assert_eq!(local.data(), &[0.5, 0.5]);
        assert_eq!(b.local_to_global(&local).unwrap(), g);
    }

    #[test]
    fn center_and_shift() {
        let b = AaBox::spanning(&[4, 2]);
        assert_eq!(b.center(), vec![2.0, 1.0]);
        let s = b.shifted(&[1.0, 1.0]).unwrap();
        assert_eq!(s.origin(), &[1.0, 1.0]);
        assert_eq!(s.upper(), vec![5.0, 3.0]);
    }
}
