//! Slice-style box construction.
//!
//! A box can be described per axis the way an array is sliced: a range
//! `start:stop` covers `[start, stop]`, a bare index `i` covers the unit
//! cell `[i, i + 1]`. [`BoxGenerator::parse`] accepts the textual form
//! `"0:2, 6:10"`; [`AaBox::from_axes`] accepts typed [`AxisSpec`] values.

use std::ops::Range;

use crate::aabox::AaBox;
use crate::error::GeometryError;

/// Extent of a box along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisSpec {
    /// A unit-size interval starting at the given coordinate.
    Index(f32),
    /// An interval `[start, stop]`. `step` must be `None` or `1`.
    Slice {
        /// Lower bound.
        start: f32,
        /// Upper bound.
        stop: f32,
        /// Optional slice step.
        step: Option<f32>,
    },
}

impl From<Range<i32>> for AxisSpec {
    fn from(r: Range<i32>) -> Self {
        Self::Slice {
            start: r.start as f32,
            stop: r.end as f32,
            step: None,
        }
    }
}

impl From<Range<f32>> for AxisSpec {
    fn from(r: Range<f32>) -> Self {
        Self::Slice {
            start: r.start,
            stop: r.end,
            step: None,
        }
    }
}

impl From<i32> for AxisSpec {
    fn from(i: i32) -> Self {
        Self::Index(i as f32)
    }
}

impl From<f32> for AxisSpec {
    fn from(v: f32) -> Self {
        Self::Index(v)
    }
}

impl AaBox {
    /// Build a box from one [`AxisSpec`] per axis.
    pub fn from_axes(axes: &[AxisSpec]) -> Result<Self, GeometryError> {
        if axes.is_empty() {
            return Err(GeometryError::EmptySpec);
        }
        let mut origin = Vec::with_capacity(axes.len());
        let mut size = Vec::with_capacity(axes.len());
        for (axis, spec) in axes.iter().enumerate() {
            match *spec {
                AxisSpec::Index(i) => {
                    origin.push(i);
                    size.push(1.0);
                }
                AxisSpec::Slice { start, stop, step } => {
                    if let Some(step) = step {
                        if step != 1.0 {
                            return Err(GeometryError::NonUnitStep { axis, step });
                        }
                    }
                    origin.push(start);
                    size.push(stop - start);
                }
            }
        }
        AaBox::new(origin, size)
    }
}

/// Builder for boxes from slice notation.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxGenerator;

impl BoxGenerator {
    /// Build a box from typed axis specs. Equivalent to [`AaBox::from_axes`].
    pub fn index<I, A>(self, axes: I) -> Result<AaBox, GeometryError>
    where
        I: IntoIterator<Item = A>,
        A: Into<AxisSpec>,
    {
        let axes: Vec<AxisSpec> = axes.into_iter().map(Into::into).collect();
        AaBox::from_axes(&axes)
    }

    /// Parse a comma-separated slice spec such as `"0:2, 6:10"` or `"3, 1:4:1"`.
    pub fn parse(spec: &str) -> Result<AaBox, GeometryError> {
        let trimmed = spec.trim().trim_start_matches('[').trim_end_matches(']');
        if trimmed.trim().is_empty() {
            return Err(GeometryError::EmptySpec);
        }
        let axes = trimmed
            .split(',')
            .map(parse_axis)
            .collect::<Result<Vec<_>, _>>()?;
        AaBox::from_axes(&axes)
    }
}

fn parse_axis(token: &str) -> Result<AxisSpec, GeometryError> {
    let token = token.trim();
    let parts: Vec<&str> = token.split(':').map(str::trim).collect();
    let number = |s: &str| {
        s.parse::<f32>().map_err(|_| GeometryError::Unparseable {
            token: token.to_string(),
        })
    };
    match parts.as_slice() {
        [index] => Ok(AxisSpec::Index(number(index)?)),
        [start, stop] => Ok(AxisSpec::Slice {
            start: number(start)?,
            stop: number(stop)?,
            step: None,
        }),
        [start, stop, step] => Ok(AxisSpec::Slice {
            start: number(start)?,
            stop: number(stop)?,
            step: if step.is_empty() {
                None
            } else {
                Some(number(step)?)
            },
        }),
        _ => Err(GeometryError::Unparseable {
            token: token.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstate_core::Tensor;

    #[test]
    fn parsed_box_matches_slices() {
        let b = BoxGenerator::parse("[0:2, 6:10]").unwrap();
        assert_eq!(b.origin(), &[0.0, 6.0]);
        assert_eq!(b.size(), &[2.0, 4.0]);
        let inside = b.value_at(&Tensor::vector(&[1.0, 7.0])).unwrap();
        let outside = b.value_at(&Tensor::vector(&[5.0, 5.0])).unwrap();
        assert_eq!(inside.data(), &[1.0]);
        assert_eq!(outside.data(), &[0.0]);
    }

    #[test]
    fn scalar_index_is_unit_box() {
        let b = BoxGenerator.index([AxisSpec::from(3i32), AxisSpec::from(1i32..4)]).unwrap();
        assert_eq!(b.origin(), &[3.0, 1.0]);
        assert_eq!(b.size(), &[1.0, 3.0]);
    }

    #[test]
    fn step_must_be_one() {
        assert!(BoxGenerator::parse("0:4:1").is_ok());
        match BoxGenerator::parse("0:2, 0:4:2") {
            Err(GeometryError::NonUnitStep { axis: 1, step }) => assert_eq!(step, 2.0),
            other => panic!("expected NonUnitStep, got {other:?}"),
        }
    }

    #[test]
    fn malformed_specs_rejected() {
        assert_eq!(BoxGenerator::parse("  "), Err(GeometryError::EmptySpec));
        assert!(matches!(
            BoxGenerator::parse("0:x"),
            Err(GeometryError::Unparseable { .. })
        ));
        assert!(matches!(
            BoxGenerator::parse("1:2:3:4"),
            Err(GeometryError::Unparseable { .. })
        ));
        assert_eq!(AaBox::from_axes(&[]), Err(GeometryError::EmptySpec));
    }
}
