// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Labeled points and the ordered sets they are loaded into.

use steric_geom::{Bounds, Coordinate, GeomError};

/// Descriptive fields carried through from the input record unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomInfo {
    /// Atom name (e.g. `CA`).
    pub name: String,
    /// Alternate location indicator.
    pub alt_loc: String,
    /// Residue name (e.g. `GLY`).
    pub res_name: String,
    /// Chain identifier.
    pub chain_id: String,
    /// Residue sequence number.
    pub res_seq: i32,
    /// Residue insertion code.
    pub i_code: String,
}

/// One atom: a serial number, metadata, and an immutable position.
///
/// Points have no value equality. Two points are "the same" only when they
/// are the same instance, see [`Point::same_instance`]; distinct atoms with
/// identical coordinates stay distinct.
#[derive(Debug, Clone)]
pub struct Point {
    serial: i64,
    info: AtomInfo,
    position: Coordinate,
}

impl Point {
    /// Builds a point.
    #[must_use]
    pub fn new(serial: i64, info: AtomInfo, position: Coordinate) -> Self {
        Self {
            serial,
            info,
            position,
        }
    }

    /// Serial number from the input record.
    #[must_use]
    pub fn serial(&self) -> i64 {
        self.serial
    }

    /// Descriptive metadata.
    #[must_use]
    pub fn info(&self) -> &AtomInfo {
        &self.info
    }

    /// Center of the atom.
    #[must_use]
    pub fn position(&self) -> &Coordinate {
        &self.position
    }

    /// Identity comparison: `true` only for the very same instance.
    #[must_use]
    pub fn same_instance(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

/// Ordered collection of points sharing one dimension.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Wraps `points`, checking that every position has the same dimension.
    pub fn new(points: Vec<Point>) -> Result<Self, GeomError> {
        if let Some((first, rest)) = points.split_first() {
            for p in rest {
                first.position().ensure_same_dimension(p.position())?;
            }
        }
        Ok(Self { points })
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimension shared by every point, `None` for an empty set.
    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.points.first().map(|p| p.position().dimension())
    }

    /// Point at `index` in load order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Points in load order.
    pub fn iter(&self) -> core::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Points as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Tight bounding volume of every position, `None` when empty.
    pub fn bounds(&self) -> Result<Option<Bounds>, GeomError> {
        Bounds::enclosing(self.points.iter().map(Point::position))
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = core::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
