// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! N-dimensional fixed-point coordinate.

use core::cmp::Ordering;
use core::fmt;

use crate::error::GeomError;
use crate::fixed::{Fixed, SCALE};

/// Position in `dimension`-space with [`Fixed`] components.
///
/// Invariants:
/// - Binary operations require both operands to share `dimension` and
///   return [`GeomError::DimensionMismatch`] otherwise.
/// - Equality and hashing compare exact component values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    components: Vec<Fixed>,
}

impl Coordinate {
    /// Wraps existing components.
    #[must_use]
    pub fn new(components: Vec<Fixed>) -> Self {
        Self { components }
    }

    /// The origin of `dimension`-space.
    #[must_use]
    pub fn zeros(dimension: usize) -> Self {
        Self::new(vec![Fixed::ZERO; dimension])
    }

    /// Parses decimal literals, keeping every given digit.
    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> Result<Self, GeomError> {
        let components = values
            .iter()
            .map(|v| v.as_ref().parse::<Fixed>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(components))
    }

    /// Converts floating values, truncating each to three decimal places.
    pub fn from_f64s(values: &[f64]) -> Result<Self, GeomError> {
        let components = values
            .iter()
            .map(|v| Fixed::from_f64_truncated(*v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(components))
    }

    /// Number of components.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.components.len()
    }

    /// Component on `axis`, if the axis exists.
    #[must_use]
    pub fn get(&self, axis: usize) -> Option<Fixed> {
        self.components.get(axis).copied()
    }

    /// All components in axis order.
    #[must_use]
    pub fn components(&self) -> &[Fixed] {
        &self.components
    }

    /// Fails with `DimensionMismatch` unless `other` shares this dimension.
    pub fn ensure_same_dimension(&self, other: &Self) -> Result<(), GeomError> {
        if self.dimension() == other.dimension() {
            Ok(())
        } else {
            Err(GeomError::DimensionMismatch {
                expected: self.dimension(),
                found: other.dimension(),
            })
        }
    }

    /// Elementwise sum.
    pub fn checked_add(&self, other: &Self) -> Result<Self, GeomError> {
        self.ensure_same_dimension(other)?;
        Ok(Self::new(
            self.components
                .iter()
                .zip(&other.components)
                .map(|(a, b)| *a + *b)
                .collect(),
        ))
    }

    /// Multiplies every component by `factor`.
    #[must_use]
    pub fn scale(&self, factor: Fixed) -> Self {
        Self::new(self.components.iter().map(|c| c.mul_trunc(factor)).collect())
    }

    /// Euclidean distance to `other`.
    ///
    /// Differences and squares are computed exactly in integer space; the
    /// sum is converted to floating point once, right before the root.
    pub fn distance(&self, other: &Self) -> Result<f64, GeomError> {
        let sum = self.squared_raw_distance(other)?;
        let scale_sq = i128::from(SCALE) * i128::from(SCALE);
        #[allow(clippy::cast_precision_loss)]
        let squared = (sum / scale_sq) as f64 + (sum % scale_sq) as f64 / 1e18;
        Ok(squared.sqrt())
    }

    /// Returns `true` when `other` lies strictly closer than `limit`.
    ///
    /// Exact: compares squared raw values, no rounding at the boundary.
    pub fn closer_than(&self, other: &Self, limit: Fixed) -> Result<bool, GeomError> {
        let limit = i128::from(limit.raw());
        Ok(self.squared_raw_distance(other)? < limit.saturating_mul(limit))
    }

    fn squared_raw_distance(&self, other: &Self) -> Result<i128, GeomError> {
        self.ensure_same_dimension(other)?;
        Ok(self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| {
                let d = i128::from(b.raw()) - i128::from(a.raw());
                d.saturating_mul(d)
            })
            .fold(0_i128, i128::saturating_add))
    }

    /// Orders `self` against `other` on a single axis.
    pub fn cmp_axis(&self, other: &Self, axis: usize) -> Result<Ordering, GeomError> {
        self.ensure_same_dimension(other)?;
        match (self.get(axis), other.get(axis)) {
            (Some(a), Some(b)) => Ok(a.cmp(&b)),
            _ => Err(GeomError::AxisOutOfRange {
                axis,
                dimension: self.dimension(),
            }),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn c(values: &[&str]) -> Coordinate {
        Coordinate::from_strs(values).expect("valid literals")
    }

    #[test]
    fn distance_matches_concrete_separations() {
        let origin = c(&["0", "0", "0"]);
        assert!((origin.distance(&c(&["3.5", "0", "0"])).unwrap() - 3.5).abs() < 1e-12);
        assert_eq!(origin.distance(&c(&["4", "0", "0"])).unwrap(), 4.0);
        assert!((origin.distance(&c(&["1", "1", "1"])).unwrap() - 3_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn closer_than_is_exact_at_the_boundary() {
        let origin = c(&["0", "0", "0"]);
        let limit: Fixed = "2.002".parse().unwrap();
        assert!(origin.closer_than(&c(&["2.001", "0", "0"]), limit).unwrap());
        assert!(!origin.closer_than(&c(&["2.002", "0", "0"]), limit).unwrap());
        assert!(!origin.closer_than(&c(&["0", "-2.002", "0"]), limit).unwrap());
        assert!(origin.closer_than(&c(&["1", "1", "1"]), "1.733".parse().unwrap()).unwrap());
        assert!(!origin.closer_than(&c(&["1", "1", "1"]), "1.732".parse().unwrap()).unwrap());
        assert!(origin.closer_than(&c(&["0", "0"]), limit).is_err());
    }

    #[test]
    fn distance_is_symmetric() {
        let p = c(&["-1.234", "5.5", "0.001"]);
        let q = c(&["2.5", "-3.75", "9.999"]);
        assert_eq!(p.distance(&q).unwrap(), q.distance(&p).unwrap());
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let p = c(&["0", "0", "0"]);
        let q = c(&["0", "0"]);
        let err = GeomError::DimensionMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(p.distance(&q), Err(err.clone()));
        assert_eq!(p.checked_add(&q), Err(err.clone()));
        assert_eq!(p.cmp_axis(&q, 0), Err(err));
    }

    #[test]
    fn axis_comparison_and_bounds() {
        let p = c(&["1", "2"]);
        let q = c(&["1", "3"]);
        assert_eq!(p.cmp_axis(&q, 0), Ok(Ordering::Equal));
        assert_eq!(p.cmp_axis(&q, 1), Ok(Ordering::Less));
        assert_eq!(
            p.cmp_axis(&q, 2),
            Err(GeomError::AxisOutOfRange {
                axis: 2,
                dimension: 2
            })
        );
    }

    #[test]
    fn add_and_scale() {
        let p = c(&["1.5", "-2"]);
        let step = c(&["-1", "1"]).scale("4".parse().unwrap());
        assert_eq!(step, c(&["-4", "4"]));
        assert_eq!(p.checked_add(&step).unwrap(), c(&["-2.5", "2"]));
    }

    #[test]
    fn equality_is_by_value_not_spelling() {
        assert_eq!(c(&["1.50", "2"]), c(&["1.5", "2.000"]));
        assert_eq!(
            Coordinate::from_f64s(&[1.5, 2.0]).unwrap(),
            c(&["1.5", "2"])
        );
        assert_eq!(c(&["1.5", "-2"]).to_string(), "(1.5, -2.0)");
    }
}
