// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Axis-aligned bounding volumes.
//!
//! [`Bounds`] is the box the grid is laid over: the tight envelope of the
//! indexed set, optionally inflated by a margin on every side.

use core::cmp::Ordering;

use crate::coordinate::Coordinate;
use crate::error::GeomError;
use crate::fixed::Fixed;

/// Axis-aligned bounding volume in `dimension`-space.
///
/// Invariants:
/// - `min` and `max` share their dimension.
/// - `min` components are less than or equal to `max` components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    min: Coordinate,
    max: Coordinate,
}

impl Bounds {
    /// Constructs bounds from explicit corners.
    pub fn new(min: Coordinate, max: Coordinate) -> Result<Self, GeomError> {
        min.ensure_same_dimension(&max)?;
        for axis in 0..min.dimension() {
            if min.cmp_axis(&max, axis)? == Ordering::Greater {
                return Err(GeomError::InvalidBounds { axis });
            }
        }
        Ok(Self { min, max })
    }

    /// Builds the minimal bounds containing every coordinate.
    ///
    /// Returns `Ok(None)` for an empty input.
    pub fn enclosing<'a, I>(coords: I) -> Result<Option<Self>, GeomError>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = coords.into_iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        let mut min = first.components().to_vec();
        let mut max = min.clone();
        for c in iter {
            first.ensure_same_dimension(c)?;
            for (axis, value) in c.components().iter().enumerate() {
                min[axis] = min[axis].min(*value);
                max[axis] = max[axis].max(*value);
            }
        }
        Ok(Some(Self {
            min: Coordinate::new(min),
            max: Coordinate::new(max),
        }))
    }

    /// Grows the volume by `margin` on every side.
    ///
    /// Used to keep points sitting exactly on the discovered extremes away
    /// from the grid's outer faces.
    #[must_use]
    pub fn inflate(&self, margin: Fixed) -> Self {
        let shift = |c: &Coordinate, f: fn(Fixed, Fixed) -> Fixed| {
            Coordinate::new(c.components().iter().map(|v| f(*v, margin)).collect())
        };
        Self {
            min: shift(&self.min, |v, m| v - m),
            max: shift(&self.max, |v, m| v + m),
        }
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> &Coordinate {
        &self.min
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> &Coordinate {
        &self.max
    }

    /// Shared dimension of both corners.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.min.dimension()
    }

    /// Splits into `(min, max)`.
    #[must_use]
    pub fn into_corners(self) -> (Coordinate, Coordinate) {
        (self.min, self.max)
    }
}
