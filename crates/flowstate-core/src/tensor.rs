//! Eager dense tensor backend.
//!
//! [`Tensor`] is the numeric backend that fields and geometries delegate
//! to. It wraps an [`ndarray::ArrayD`] of `f32` kept in standard
//! (row-major) layout and exposes exactly the operations the field layer
//! composes: allocation, broadcasting elementwise arithmetic, comparisons
//! producing `0.0`/`1.0` masks, axis reductions, reshaping and last-axis
//! slicing or stacking. Nothing above this module indexes raw buffers by
//! hand.

use ndarray::{ArrayD, ArrayViewD, Axis, Dimension, IxDyn, Zip};
use smallvec::SmallVec;

use crate::error::ShapeError;

/// Tensor dimensions, outermost first.
///
/// Inline capacity covers `[batch, z, y, x, components]` plus one spare
/// axis without heap allocation.
pub type Shape = SmallVec<[usize; 6]>;

/// A dense, row-major `f32` tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    // Always in standard layout, so `data()` can hand out a flat slice.
    array: ArrayD<f32>,
}

impl Tensor {
    fn wrap(array: ArrayD<f32>) -> Self {
        if array.is_standard_layout() {
            Self { array }
        } else {
            Self {
                array: array.as_standard_layout().into_owned(),
            }
        }
    }

    /// A tensor of the given shape filled with `value`.
    pub fn full(shape: &[usize], value: f32) -> Self {
        Self::wrap(ArrayD::from_elem(IxDyn(shape), value))
    }

    /// A tensor of the given shape filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, 0.0)
    }

    /// A tensor of the given shape filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, 1.0)
    }

    /// A rank-0 tensor holding a single value.
    pub fn scalar(value: f32) -> Self {
        Self::full(&[], value)
    }

    /// A rank-1 tensor holding `values`.
    pub fn vector(values: &[f32]) -> Self {
        Self::wrap(ndarray::Array1::from(values.to_vec()).into_dyn())
    }

    /// Wrap existing row-major data.
    ///
    /// Returns [`ShapeError::LengthMismatch`] unless `data.len()` equals the
    /// product of `shape`.
    pub fn from_vec(shape: &[usize], data: Vec<f32>) -> Result<Self, ShapeError> {
        let len = data.len();
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(Self::wrap)
            .map_err(|_| ShapeError::LengthMismatch {
                shape: Shape::from_slice(shape),
                len,
            })
    }

    /// Build a tensor by evaluating `f` at every multi-index, in row-major order.
    pub fn from_fn(shape: &[usize], mut f: impl FnMut(&[usize]) -> f32) -> Self {
        Self::wrap(ArrayD::from_shape_fn(IxDyn(shape), |ix| f(ix.slice())))
    }

    /// The tensor's dimensions.
    pub fn shape(&self) -> &[usize] {
        self.array.shape()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.array.ndim()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// Whether the tensor holds zero elements.
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Row-major element buffer.
    pub fn data(&self) -> &[f32] {
        self.array.as_slice().unwrap_or_default()
    }

    /// Borrow the underlying array.
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.array.view()
    }

    /// Size of the last axis, or 1 for a rank-0 tensor.
    pub fn last_dim(&self) -> usize {
        self.shape().last().copied().unwrap_or(1)
    }

    fn out_of_bounds(&self, index: &[usize]) -> ShapeError {
        ShapeError::IndexOutOfBounds {
            index: index.to_vec(),
            shape: Shape::from_slice(self.shape()),
        }
    }

    /// Read one element.
    pub fn get(&self, index: &[usize]) -> Result<f32, ShapeError> {
        if index.len() != self.rank() {
            return Err(self.out_of_bounds(index));
        }
        self.array
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// Overwrite one element.
    pub fn set(&mut self, index: &[usize], value: f32) -> Result<(), ShapeError> {
        if index.len() != self.rank() {
            return Err(self.out_of_bounds(index));
        }
        match self.array.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(self.out_of_bounds(index)),
        }
    }

    /// Shape obtained by broadcasting `a` against `b` (right-aligned).
    pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Result<Shape, ShapeError> {
        let rank = a.len().max(b.len());
        let padded = |s: &[usize], i: usize| {
            (i + s.len())
                .checked_sub(rank)
                .map_or(1, |j| s[j])
        };
        (0..rank)
            .map(|i| match (padded(a, i), padded(b, i)) {
                (x, y) if x == y => Ok(x),
                (1, y) => Ok(y),
                (x, 1) => Ok(x),
                _ => Err(ShapeError::Incompatible {
                    left: Shape::from_slice(a),
                    right: Shape::from_slice(b),
                }),
            })
            .collect()
    }

    /// Materialize this tensor at a larger broadcast-compatible shape.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Tensor, ShapeError> {
        self.array
            .broadcast(IxDyn(shape))
            .map(|view| Self::wrap(view.to_owned()))
            .ok_or_else(|| ShapeError::Incompatible {
                left: Shape::from_slice(self.shape()),
                right: Shape::from_slice(shape),
            })
    }

    /// Combine two tensors elementwise under broadcasting.
    pub fn zip_with(
        &self,
        other: &Tensor,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Tensor, ShapeError> {
        let shape = Self::broadcast_shape(self.shape(), other.shape())?;
        let incompatible = || ShapeError::Incompatible {
            left: Shape::from_slice(self.shape()),
            right: Shape::from_slice(other.shape()),
        };
        let a = self.array.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        let b = other.array.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        Ok(Self::wrap(
            Zip::from(&a).and(&b).map_collect(|&x, &y| f(x, y)),
        ))
    }


    /// Elementwise `self + other`.
    pub fn add(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise `self - other`.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise `self * other`.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise `self / other`.
    pub fn div(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Elementwise maximum.
    pub fn maximum(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, f32::max)
    }

    /// Elementwise minimum.
    pub fn minimum(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, f32::min)
    }

    /// Mask with `1.0` where `self <= other`, else `0.0`.
    pub fn le(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| if a <= b { 1.0 } else { 0.0 })
    }

    /// Mask with `1.0` where `self >= other`, else `0.0`.
    pub fn ge(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| if a >= b { 1.0 } else { 0.0 })
    }


    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Self::wrap(self.array.mapv(f))
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: f32) -> Tensor {
        self.map(|v| v * factor)
    }

    /// Add `value` to every element.
    pub fn add_scalar(&self, value: f32) -> Tensor {
        self.map(|v| v + value)
    }

    fn axis(&self, axis: usize) -> Result<Axis, ShapeError> {
        if axis < self.rank() {
            Ok(Axis(axis))
        } else {
            Err(ShapeError::AxisOutOfRange {
                axis,
                rank: self.rank(),
            })
        }
    }

    /// Reduce along `axis` with `fold`, starting from `init`.
    fn reduce_axis(
        &self,
        axis: usize,
        keepdims: bool,
        init: f32,
        fold: impl Fn(f32, f32) -> f32,
    ) -> Result<Tensor, ShapeError> {
        let ax = self.axis(axis)?;
        let reduced = self.array.fold_axis(ax, init, |&acc, &v| fold(acc, v));
        Ok(Self::wrap(if keepdims {
            reduced.insert_axis(ax)
        } else {
            reduced
        }))
    }

    /// Sum along `axis`.
    pub fn sum_axis(&self, axis: usize, keepdims: bool) -> Result<Tensor, ShapeError> {
        let ax = self.axis(axis)?;
        let summed = self.array.sum_axis(ax);
        Ok(Self::wrap(if keepdims {
            summed.insert_axis(ax)
        } else {
            summed
        }))
    }

    /// Logical AND (all non-zero) along `axis`, as a `0.0`/`1.0` mask.
    pub fn all_axis(&self, axis: usize, keepdims: bool) -> Result<Tensor, ShapeError> {
        self.reduce_axis(axis, keepdims, 1.0, |acc, v| {
            if acc != 0.0 && v != 0.0 {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Logical OR (any non-zero) along `axis`, as a `0.0`/`1.0` mask.
    pub fn any_axis(&self, axis: usize, keepdims: bool) -> Result<Tensor, ShapeError> {
        self.reduce_axis(axis, keepdims, 0.0, |acc, v| {
            if acc != 0.0 || v != 0.0 {
                1.0
            } else {
                0.0
            }
        })
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f32 {
        self.array.sum()
    }

    /// Largest absolute element, or `0.0` for an empty tensor.
    pub fn max_abs(&self) -> f32 {
        self.array.fold(0.0f32, |m, v| m.max(v.abs()))
    }

    /// Same data under a new shape with the same element count.
    pub fn reshape(&self, shape: &[usize]) -> Result<Tensor, ShapeError> {
        self.array
            .clone()
            .into_shape_with_order(IxDyn(shape))
            .map(Self::wrap)
            .map_err(|_| ShapeError::LengthMismatch {
                shape: Shape::from_slice(shape),
                len: self.len(),
            })
    }

    /// Select index `component` of the last axis, dropping that axis.
    pub fn slice_last(&self, component: usize) -> Result<Tensor, ShapeError> {
        let rank = self.rank();
        if rank == 0 {
            return Err(ShapeError::AxisOutOfRange { axis: 0, rank: 0 });
        }
        if component >= self.last_dim() {
            let mut index = vec![0; rank];
            index[rank - 1] = component;
            return Err(self.out_of_bounds(&index));
        }
        Ok(Self::wrap(
            self.array.index_axis(Axis(rank - 1), component).to_owned(),
        ))
    }

    /// Stack equally-shaped tensors along a new trailing axis.
    pub fn stack_last(tensors: &[Tensor]) -> Result<Tensor, ShapeError> {
        let first = tensors.first().ok_or(ShapeError::Empty)?;
        if let Some(t) = tensors.iter().find(|t| t.shape() != first.shape()) {
            return Err(ShapeError::Incompatible {
                left: Shape::from_slice(first.shape()),
                right: Shape::from_slice(t.shape()),
            });
        }
        let views: Vec<_> = tensors.iter().map(Tensor::view).collect();
        ndarray::stack(Axis(first.rank()), &views)
            .map(Self::wrap)
            .map_err(|_| ShapeError::Incompatible {
                left: Shape::from_slice(first.shape()),
                right: Shape::from_slice(first.shape()),
            })
    }

    /// Concatenate tensors along their existing last axis.
    ///
    /// All leading axes must agree.
    pub fn concat_last(tensors: &[Tensor]) -> Result<Tensor, ShapeError> {
        let first = tensors.first().ok_or(ShapeError::Empty)?;
        let rank = first.rank();
        if rank == 0 {
            return Err(ShapeError::AxisOutOfRange { axis: 0, rank: 0 });
        }
        let lead = &first.shape()[..rank - 1];
        if let Some(t) = tensors
            .iter()
            .find(|t| t.rank() != rank || &t.shape()[..rank - 1] != lead)
        {
            return Err(ShapeError::Incompatible {
                left: Shape::from_slice(first.shape()),
                right: Shape::from_slice(t.shape()),
            });
        }
        let views: Vec<_> = tensors.iter().map(Tensor::view).collect();
        ndarray::concatenate(Axis(rank - 1), &views)
            .map(Self::wrap)
            .map_err(|_| ShapeError::Incompatible {
                left: Shape::from_slice(first.shape()),
                right: Shape::from_slice(lead),
            })
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(array: ArrayD<f32>) -> Self {
        Self::wrap(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Tensor::from_vec(&[2, 3], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, ShapeError::LengthMismatch { len: 5, .. }));
    }

    #[test]
    fn from_fn_is_row_major() {
        let t = Tensor::from_fn(&[2, 3], |i| (i[0] * 10 + i[1]) as f32);
        assert_eq!(t.data(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(t.get(&[1, 2]).unwrap(), 12.0);
    }

    #[test]
    fn broadcast_vector_against_matrix() {
        let m = Tensor::from_fn(&[2, 3], |i| i[1] as f32);
        let v = Tensor::vector(&[10.0, 20.0, 30.0]);
        let out = m.add(&v).unwrap();
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out.data(), &[10.0, 21.0, 32.0, 10.0, 21.0, 32.0]);
    }

    #[test]
    fn broadcast_trailing_one() {
        let mask = Tensor::from_vec(&[2, 1], vec![0.0, 1.0]).unwrap();
        let value = Tensor::vector(&[3.0, 4.0]);
        let out = mask.mul(&value).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.data(), &[0.0, 0.0, 3.0, 4.0]);
    }

    #[test]
    fn incompatible_shapes_rejected() {
        let a = Tensor::zeros(&[2, 3]);
        let b = Tensor::zeros(&[4]);
        assert!(matches!(a.add(&b), Err(ShapeError::Incompatible { .. })));
    }

    #[test]
    fn reductions() {
        let t = Tensor::from_fn(&[2, 3], |i| (i[0] + i[1]) as f32);
        let s = t.sum_axis(1, false).unwrap();
        assert_eq!(s.shape(), &[2]);
        assert_eq!(s.data(), &[3.0, 6.0]);
        let k = t.sum_axis(0, true).unwrap();
        assert_eq!(k.shape(), &[1, 3]);
        assert_eq!(k.data(), &[1.0, 3.0, 5.0]);

        let all = t.all_axis(1, true).unwrap();
        assert_eq!(all.data(), &[0.0, 1.0]);
        let any = t.any_axis(1, true).unwrap();
        assert_eq!(any.data(), &[1.0, 1.0]);
    }

    #[test]
    fn axis_out_of_range() {
        let t = Tensor::zeros(&[2]);
        assert!(matches!(
            t.sum_axis(1, false),
            Err(ShapeError::AxisOutOfRange { axis: 1, rank: 1 })
        ));
    }

    #[test]
    fn slice_and_stack_last() {
        let t = Tensor::from_fn(&[2, 2], |i| (i[0] * 2 + i[1]) as f32);
        let c1 = t.slice_last(1).unwrap();
        assert_eq!(c1.shape(), &[2]);
        assert_eq!(c1.data(), &[1.0, 3.0]);
        let c0 = t.slice_last(0).unwrap();
        let back = Tensor::stack_last(&[c0, c1]).unwrap();
        assert_eq!(back, t);
        assert!(t.slice_last(2).is_err());
    }

    #[test]
    fn concat_last_joins_components() {
        let a = Tensor::ones(&[2, 1]);
        let b = Tensor::zeros(&[2, 2]);
        let c = Tensor::concat_last(&[a, b]).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        assert_eq!(c.data(), &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn broadcast_to_expands() {
        let s = Tensor::scalar(2.0);
        let t = s.broadcast_to(&[2, 2]).unwrap();
        assert_eq!(t.data(), &[2.0; 4]);
        assert!(Tensor::zeros(&[3]).broadcast_to(&[2]).is_err());
    }

    #[test]
    fn transposed_arrays_are_stored_row_major() {
        let a = ndarray::ArrayD::from_shape_vec(IxDyn(&[2, 3]), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .reversed_axes();
        let t = Tensor::from(a);
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(t.data(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
        assert_eq!(t.view().shape(), &[3, 2]);
    }

    #[test]
    fn get_rejects_wrong_rank() {
        let t = Tensor::zeros(&[2, 2]);
        assert!(matches!(
            t.get(&[1]),
            Err(ShapeError::IndexOutOfBounds { .. })
        ));
        let mut t = t;
        assert!(t.set(&[0, 2], 1.0).is_err());
        t.set(&[1, 1], 4.0).unwrap();
        assert_eq!(t.data(), &[0.0, 0.0, 0.0, 4.0]);
    }

    fn arb_tensor() -> impl Strategy<Value = Tensor> {
        (1usize..4, 1usize..4).prop_flat_map(|(r, c)| {
            prop::collection::vec(-100.0f32..100.0, r * c)
                .prop_map(move |data| Tensor::from_vec(&[r, c], data).unwrap())
        })
    }

    proptest! {
        #[test]
        fn add_commutative(a in arb_tensor(), s in -10.0f32..10.0) {
            let b = a.map(|v| v * s);
            prop_assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
        }

        #[test]
        fn scalar_broadcast_matches_map(a in arb_tensor(), s in -10.0f32..10.0) {
            let via_broadcast = a.mul(&Tensor::scalar(s)).unwrap();
            prop_assert_eq!(via_broadcast, a.scale(s));
        }

        #[test]
        fn sum_axis_preserves_total(a in arb_tensor()) {
            let total: f32 = a.sum_axis(0, false).unwrap().sum();
            prop_assert!((total - a.sum()).abs() < 1e-2);
        }

        #[test]
        fn reshape_round_trip(a in arb_tensor()) {
            let flat = a.reshape(&[a.len()]).unwrap();
            prop_assert_eq!(flat.reshape(a.shape()).unwrap(), a);
        }
    }
}
