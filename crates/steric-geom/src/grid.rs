// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Uniform grid over a bounding volume.
//!
//! The volume between `min` and `max` is sliced into cubic cells whose edge
//! equals the clash threshold. Two points closer than one cell edge can then
//! differ by at most one cell index per axis, so looking at the `3^d` cells
//! around a point is exhaustive.
//!
//! Cell addressing:
//! - Per axis, the index is `ceil(offset / cell)` for a positive offset from
//!   `min` and `floor(offset / cell)` otherwise. A point exactly on a lower
//!   cell face therefore belongs to the cell below it, and a point exactly on
//!   `min` lands in cell `0`.
//! - Indices therefore run over `0..=cell_count` on each axis, and are
//!   folded into one [`CellOrdinal`] by mixed-radix composition with
//!   `cell_count + 1` as the radix of each axis; the last axis is the most
//!   significant digit. Distinct cells get distinct ordinals while the index
//!   space fits in a `u64`.

use core::fmt;

use crate::bounds::Bounds;
use crate::coordinate::Coordinate;
use crate::error::GeomError;
use crate::fixed::Fixed;

/// Integer address of one grid cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellOrdinal(u64);

impl CellOrdinal {
    /// Wraps a raw ordinal.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw ordinal value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Partition of a bounding volume into cells of edge `cell_size`.
///
/// Immutable after construction; shared readers need no locking.
#[derive(Debug, Clone)]
pub struct GridIndex {
    min: Coordinate,
    max: Coordinate,
    cell_size: Fixed,
    cell_counts: Vec<u64>,
    /// Per-axis upper limit `min + cell_count * cell_size`.
    limits: Vec<Fixed>,
}

impl GridIndex {
    /// Builds a grid spanning `min..=max`.
    ///
    /// Each axis gets `ceil((max - min) / cell_size)` cells, never fewer than one.
    pub fn new(cell_size: Fixed, min: Coordinate, max: Coordinate) -> Result<Self, GeomError> {
        if !cell_size.is_positive() {
            return Err(GeomError::InvalidCellSize(cell_size.to_string()));
        }
        let bounds = Bounds::new(min, max)?;
        if bounds.dimension() == 0 {
            return Err(GeomError::ZeroDimension);
        }
        let (min, max) = bounds.into_corners();

        let mut cell_counts = Vec::with_capacity(min.dimension());
        let mut limits = Vec::with_capacity(min.dimension());
        for (lo, hi) in min.components().iter().zip(max.components()) {
            let span = *hi - *lo;
            let cells = span.div_ceil(cell_size).unwrap_or(0).max(1);
            let count = u64::try_from(cells).unwrap_or(1);
            let reach = Fixed::from_raw(cell_size.raw().saturating_mul(cells));
            cell_counts.push(count);
            limits.push(*lo + reach);
        }

        Ok(Self {
            min,
            max,
            cell_size,
            cell_counts,
            limits,
        })
    }

    /// Builds a grid over `bounds`.
    pub fn from_bounds(cell_size: Fixed, bounds: Bounds) -> Result<Self, GeomError> {
        let (min, max) = bounds.into_corners();
        Self::new(cell_size, min, max)
    }

    /// Minimum corner (the grid origin).
    #[must_use]
    pub fn min(&self) -> &Coordinate {
        &self.min
    }

    /// Maximum corner as given at construction.
    #[must_use]
    pub fn max(&self) -> &Coordinate {
        &self.max
    }

    /// Edge length of every cell.
    #[must_use]
    pub fn cell_size(&self) -> Fixed {
        self.cell_size
    }

    /// Number of cells along each axis.
    #[must_use]
    pub fn cell_counts(&self) -> &[u64] {
        &self.cell_counts
    }

    /// Dimension of the indexed space.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.min.dimension()
    }

    /// Product of the per-axis cell counts, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_cells(&self) -> u64 {
        self.cell_counts.iter().fold(1_u64, |acc, c| acc.saturating_mul(*c))
    }

    /// Returns `true` when `point` lies inside the gridded volume.
    ///
    /// A coordinate below `min` or past `min + cell_count * cell_size` on
    /// any axis is outside.
    pub fn contains(&self, point: &Coordinate) -> Result<bool, GeomError> {
        self.min.ensure_same_dimension(point)?;
        Ok(point
            .components()
            .iter()
            .zip(self.min.components().iter().zip(&self.limits))
            .all(|(c, (lo, hi))| c >= lo && c <= hi))
    }

    /// Ordinal of the cell holding `point`, or `None` when it lies outside.
    pub fn cell_of(&self, point: &Coordinate) -> Result<Option<CellOrdinal>, GeomError> {
        if !self.contains(point)? {
            return Ok(None);
        }
        let mut ordinal = 0_u64;
        for axis in (0..self.dimension()).rev() {
            let index = u64::try_from(self.axis_index(point, axis)).unwrap_or(0);
            ordinal = ordinal
                .wrapping_mul(self.cell_counts[axis].saturating_add(1))
                .wrapping_add(index);
        }
        Ok(Some(CellOrdinal(ordinal)))
    }

    /// Ordinals of every in-volume cell within one step of `point`'s cell.
    ///
    /// Visits the `3^dimension` offsets `{-1, 0, 1}` per axis, shifts the
    /// point by `offset * cell_size`, and keeps the shifted points that fall
    /// inside the volume. The result is sorted and free of duplicates; it
    /// includes the point's own cell whenever the point is inside.
    pub fn neighbors_of(&self, point: &Coordinate) -> Result<Vec<CellOrdinal>, GeomError> {
        self.min.ensure_same_dimension(point)?;
        let mut out = Vec::new();
        for offset in NeighborOffsets::new(point.dimension()) {
            let shifted = Coordinate::new(
                point
                    .components()
                    .iter()
                    .zip(&offset)
                    .map(|(c, step)| match step {
                        -1 => *c - self.cell_size,
                        1 => *c + self.cell_size,
                        _ => *c,
                    })
                    .collect(),
            );
            if let Some(ordinal) = self.cell_of(&shifted)? {
                out.push(ordinal);
            }
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    fn axis_index(&self, point: &Coordinate, axis: usize) -> i64 {
        let offset = point.components()[axis] - self.min.components()[axis];
        // cell_size is validated positive in `new`, so both quotients exist.
        let index = if offset.is_positive() {
            offset.div_ceil(self.cell_size)
        } else {
            offset.div_floor(self.cell_size)
        };
        index.unwrap_or_default()
    }
}

/// Iterator over every offset vector in `{-1, 0, 1}^dimension`.
///
/// Offsets are produced by counting in base three, first axis fastest,
/// so `dimension = 3` yields 27 vectors starting at `[-1, -1, -1]`.
#[derive(Debug, Clone)]
pub struct NeighborOffsets {
    dimension: usize,
    next: u64,
    end: u64,
}

impl NeighborOffsets {
    /// Offsets for `dimension` axes.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        let exp = u32::try_from(dimension).unwrap_or(u32::MAX);
        Self {
            dimension,
            next: 0,
            end: 3_u64.saturating_pow(exp),
        }
    }
}

impl Iterator for NeighborOffsets {
    type Item = Vec<i8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let mut code = self.next;
        self.next += 1;
        let mut offset = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            // code % 3 is in 0..3.
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let digit = (code % 3) as i8;
            offset.push(digit - 1);
            code /= 3;
        }
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}
