// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Clash detection strategies.
//!
//! Both strategies test every candidate pair with the same strict predicate
//! `distance(p, q) < threshold` and emit one [`MatchRecord`] per hit, keyed
//! by the serial of the indexed point `q`. The grid strategy only narrows
//! the candidate pairs; it never changes which pairs clash.

use core::fmt;

use serde::{Deserialize, Serialize};
use steric_geom::{BucketMap, CellOrdinal, Coordinate, Fixed, GeomError, GridIndex};
use thiserror::Error;
use tracing::debug;

use crate::point::{Point, PointSet};

/// Which of the two input sets an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetRole {
    /// The set whose points are looked up (A).
    Query,
    /// The set stored in the grid (B).
    Indexed,
}

impl fmt::Display for SetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query set",
            Self::Indexed => "indexed set",
        })
    }
}

/// Errors raised by a detection run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    /// One of the inputs holds no points.
    #[error("{role} is empty")]
    EmptyPointSet {
        /// The empty set.
        role: SetRole,
    },
    /// The clash threshold is not a positive value.
    #[error("clash threshold must be positive, got {0}")]
    InvalidThreshold(String),
    /// The bounds margin is not a positive value.
    #[error("bounds margin must be positive, got {0}")]
    InvalidMargin(String),
    /// Geometry failure, typically mixed dimensions across the two sets.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Center distance below which two equal spheres overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClashThreshold(Fixed);

impl ClashThreshold {
    /// Threshold for spheres of `radius`, i.e. their diameter.
    pub fn from_radius(radius: Fixed) -> Result<Self, DetectError> {
        Self::new(radius + radius)
    }

    /// Threshold given directly as a distance.
    pub fn new(distance: Fixed) -> Result<Self, DetectError> {
        if distance.is_positive() {
            Ok(Self(distance))
        } else {
            Err(DetectError::InvalidThreshold(distance.to_string()))
        }
    }

    /// Threshold distance.
    #[must_use]
    pub fn distance(self) -> Fixed {
        self.0
    }

    /// Strict overlap test, exact at the threshold.
    pub fn clashes(self, p: &Coordinate, q: &Coordinate) -> Result<bool, GeomError> {
        p.closer_than(q, self.0)
    }
}

/// One hit: a point of the indexed set and the key the result is sorted by.
#[derive(Debug, Clone, Copy)]
pub struct MatchRecord<'a> {
    sort_key: i64,
    point: &'a Point,
}

impl<'a> MatchRecord<'a> {
    /// Record keyed by the serial of `point`.
    #[must_use]
    pub fn for_point(point: &'a Point) -> Self {
        Self {
            sort_key: point.serial(),
            point,
        }
    }

    /// Sort key (serial of the matched point).
    #[must_use]
    pub fn sort_key(&self) -> i64 {
        self.sort_key
    }

    /// Matched point.
    #[must_use]
    pub fn point(&self) -> &'a Point {
        self.point
    }
}

/// Raw output of a strategy, before aggregation.
#[derive(Debug, Clone, Default)]
pub struct Detection<'a> {
    /// Every hit in discovery order; one indexed point may appear many times.
    pub matches: Vec<MatchRecord<'a>>,
    /// Number of distance tests performed.
    pub comparisons: u64,
}

/// Selects a detection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Uniform grid with neighbor-cell lookup.
    #[default]
    Grid,
    /// Every pair of the two sets.
    #[serde(alias = "brute")]
    BruteForce,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Grid => "grid",
            Self::BruteForce => "brute-force",
        })
    }
}

/// A way of finding every indexed point that clashes with some query point.
pub trait ClashStrategy {
    /// Strategy identifier, for logs.
    fn method(&self) -> Method;

    /// Runs the strategy. Both sets must be non-empty.
    fn detect<'b>(
        &self,
        query: &PointSet,
        indexed: &'b PointSet,
    ) -> Result<Detection<'b>, DetectError>;
}

fn ensure_non_empty(query: &PointSet, indexed: &PointSet) -> Result<(), DetectError> {
    if query.is_empty() {
        return Err(DetectError::EmptyPointSet {
            role: SetRole::Query,
        });
    }
    if indexed.is_empty() {
        return Err(DetectError::EmptyPointSet {
            role: SetRole::Indexed,
        });
    }
    Ok(())
}

/// Exhaustive pairwise comparison; the reference the grid is checked against.
#[derive(Debug, Clone, Copy)]
pub struct BruteForce {
    threshold: ClashThreshold,
}

impl BruteForce {
    /// Creates the strategy.
    #[must_use]
    pub fn new(threshold: ClashThreshold) -> Self {
        Self { threshold }
    }
}

impl ClashStrategy for BruteForce {
    fn method(&self) -> Method {
        Method::BruteForce
    }

    fn detect<'b>(
        &self,
        query: &PointSet,
        indexed: &'b PointSet,
    ) -> Result<Detection<'b>, DetectError> {
        ensure_non_empty(query, indexed)?;
        let mut out = Detection::default();
        for p in query {
            for q in indexed {
                out.comparisons += 1;
                if self.threshold.clashes(p.position(), q.position())? {
                    out.matches.push(MatchRecord::for_point(q));
                }
            }
        }
        Ok(out)
    }
}

/// Grid-accelerated search.
///
/// The grid spans the indexed set's bounds grown by `margin`, so no indexed
/// point sits exactly on the lower face of the volume. That keeps every
/// indexed point at axis index one or above, which the one-cell neighbor
/// search relies on.
#[derive(Debug, Clone, Copy)]
pub struct GridSearch {
    threshold: ClashThreshold,
    margin: Fixed,
}

impl GridSearch {
    /// Creates the strategy. `margin` must be positive.
    pub fn new(threshold: ClashThreshold, margin: Fixed) -> Result<Self, DetectError> {
        if !margin.is_positive() {
            return Err(DetectError::InvalidMargin(margin.to_string()));
        }
        Ok(Self { threshold, margin })
    }

    /// Builds the grid, fills the buckets and caches query neighborhoods.
    ///
    /// This is the pre-calculation phase; [`PreparedGrid::run`] then does
    /// the lookups.
    pub fn prepare<'q, 'b>(
        &self,
        query: &'q PointSet,
        indexed: &'b PointSet,
    ) -> Result<PreparedGrid<'q, 'b>, DetectError> {
        ensure_non_empty(query, indexed)?;
        let Some(bounds) = indexed.bounds()? else {
            return Err(DetectError::EmptyPointSet {
                role: SetRole::Indexed,
            });
        };
        let grid = GridIndex::from_bounds(self.threshold.distance(), bounds.inflate(self.margin))?;

        let mut buckets = BucketMap::new();
        for (idx, q) in indexed.iter().enumerate() {
            if let Some(ordinal) = grid.cell_of(q.position())? {
                buckets.insert(ordinal, idx);
            }
        }
        let neighbors = NeighborCache::build(&grid, query)?;

        debug!(
            cells = ?grid.cell_counts(),
            occupied = buckets.occupied_cells(),
            max_occupancy = buckets.max_occupancy(),
            "grid built"
        );

        Ok(PreparedGrid {
            threshold: self.threshold,
            query,
            indexed,
            grid,
            buckets,
            neighbors,
        })
    }
}

impl ClashStrategy for GridSearch {
    fn method(&self) -> Method {
        Method::Grid
    }

    fn detect<'b>(
        &self,
        query: &PointSet,
        indexed: &'b PointSet,
    ) -> Result<Detection<'b>, DetectError> {
        self.prepare(query, indexed)?.run()
    }
}

/// Neighbor-cell ordinals of each query point, computed once per run.
#[derive(Debug, Clone, Default)]
pub struct NeighborCache {
    cells: Vec<Vec<CellOrdinal>>,
}

impl NeighborCache {
    /// Computes the neighborhood of every point of `set`, in set order.
    pub fn build(grid: &GridIndex, set: &PointSet) -> Result<Self, GeomError> {
        let cells = set
            .iter()
            .map(|p| grid.neighbors_of(p.position()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells })
    }

    /// Neighborhood of the point at `index`; empty for an unknown index.
    #[must_use]
    pub fn get(&self, index: usize) -> &[CellOrdinal] {
        self.cells.get(index).map_or(&[][..], Vec::as_slice)
    }

    /// Number of cached points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Grid state for one pair of sets, ready to be queried.
#[derive(Debug)]
pub struct PreparedGrid<'q, 'b> {
    threshold: ClashThreshold,
    query: &'q PointSet,
    indexed: &'b PointSet,
    grid: GridIndex,
    buckets: BucketMap<usize>,
    neighbors: NeighborCache,
}

impl<'b> PreparedGrid<'_, 'b> {
    /// The grid over the indexed set.
    #[must_use]
    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Indexed points by cell.
    #[must_use]
    pub fn buckets(&self) -> &BucketMap<usize> {
        &self.buckets
    }

    /// Cached query neighborhoods.
    #[must_use]
    pub fn neighbors(&self) -> &NeighborCache {
        &self.neighbors
    }

    /// Tests every query point against the residents of its neighbor cells.
    pub fn run(&self) -> Result<Detection<'b>, DetectError> {
        let mut out = Detection::default();
        for (i, p) in self.query.iter().enumerate() {
            for ordinal in self.neighbors.get(i) {
                for j in self.buckets.lookup(*ordinal) {
                    let Some(q) = self.indexed.get(j) else {
                        continue;
                    };
                    out.comparisons += 1;
                    if self.threshold.clashes(p.position(), q.position())? {
                        out.matches.push(MatchRecord::for_point(q));
                    }
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::point::AtomInfo;

    fn set(points: &[(i64, [&str; 3])]) -> PointSet {
        PointSet::new(
            points
                .iter()
                .map(|(serial, xyz)| {
                    Point::new(
                        *serial,
                        AtomInfo::default(),
                        Coordinate::from_strs(xyz).unwrap(),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn threshold() -> ClashThreshold {
        ClashThreshold::from_radius("2".parse().unwrap()).unwrap()
    }

    fn grid() -> GridSearch {
        GridSearch::new(threshold(), "0.001".parse().unwrap()).unwrap()
    }

    fn serials(d: &Detection<'_>) -> Vec<i64> {
        let mut s: Vec<i64> = d.matches.iter().map(MatchRecord::sort_key).collect();
        s.sort_unstable();
        s
    }

    #[test]
    fn threshold_is_strict() {
        let origin = Coordinate::from_strs(&["0", "0", "0"]).unwrap();
        let t = threshold();
        assert_eq!(t.distance(), "4".parse().unwrap());
        for (x, hit) in [("3.5", true), ("4.0", false), ("4.5", false)] {
            let q = Coordinate::from_strs(&[x, "0", "0"]).unwrap();
            assert_eq!(t.clashes(&origin, &q).unwrap(), hit, "x = {x}");
            assert_eq!(t.clashes(&q, &origin).unwrap(), hit, "x = {x}");
        }
    }

    #[test]
    fn non_positive_threshold_or_margin_is_rejected() {
        assert!(matches!(
            ClashThreshold::from_radius(Fixed::ZERO),
            Err(DetectError::InvalidThreshold(_))
        ));
        assert!(matches!(
            GridSearch::new(threshold(), Fixed::ZERO),
            Err(DetectError::InvalidMargin(_))
        ));
    }

    #[test]
    fn single_close_pair_yields_one_record() {
        let a = set(&[(1, ["0", "0", "0"])]);
        let b = set(&[(7, ["1", "1", "1"])]);
        for strategy in [&grid() as &dyn ClashStrategy, &BruteForce::new(threshold())] {
            let d = strategy.detect(&a, &b).unwrap();
            assert_eq!(serials(&d), vec![7], "{}", strategy.method());
            assert!(d.matches[0].point().same_instance(b.get(0).unwrap()));
        }
    }

    #[test]
    fn grid_agrees_with_brute_force_and_compares_less() {
        let a = set(&[
            (1, ["0", "0", "0"]),
            (2, ["10", "10", "10"]),
            (3, ["20.5", "0", "3"]),
        ]);
        let b = set(&[
            (10, ["3.5", "0", "0"]),
            (11, ["4", "0", "0"]),
            (12, ["12", "11", "10"]),
            (13, ["30", "30", "30"]),
            (14, ["20", "1", "2.5"]),
            (15, ["-1", "-1", "-1"]),
        ]);
        let g = grid().detect(&a, &b).unwrap();
        let bf = BruteForce::new(threshold()).detect(&a, &b).unwrap();
        assert_eq!(serials(&g), vec![10, 12, 14, 15]);
        assert_eq!(serials(&g), serials(&bf));
        assert_eq!(bf.comparisons, 18);
        assert!(g.comparisons < bf.comparisons);
    }

    #[test]
    fn query_points_outside_the_volume_still_find_boundary_clashes() {
        let a = set(&[(1, ["-3", "0", "0"]), (2, ["100", "0", "0"])]);
        let b = set(&[(5, ["0", "0", "0"]), (6, ["2", "0", "0"])]);
        let d = grid().detect(&a, &b).unwrap();
        assert_eq!(serials(&d), vec![5]);
    }

    #[test]
    fn empty_sets_are_precondition_failures() {
        let a = set(&[(1, ["0", "0", "0"])]);
        let empty = PointSet::default();
        for strategy in [&grid() as &dyn ClashStrategy, &BruteForce::new(threshold())] {
            assert_eq!(
                strategy.detect(&empty, &a).unwrap_err(),
                DetectError::EmptyPointSet {
                    role: SetRole::Query
                }
            );
            assert_eq!(
                strategy.detect(&a, &empty).unwrap_err(),
                DetectError::EmptyPointSet {
                    role: SetRole::Indexed
                }
            );
        }
    }

    #[test]
    fn mixed_dimensions_abort() {
        let a = PointSet::new(vec![Point::new(
            1,
            AtomInfo::default(),
            Coordinate::from_strs(&["0", "0"]).unwrap(),
        )])
        .unwrap();
        let b = set(&[(2, ["0", "0", "0"])]);
        assert!(matches!(
            grid().detect(&a, &b),
            Err(DetectError::Geom(GeomError::DimensionMismatch { .. }))
        ));
        assert!(matches!(
            BruteForce::new(threshold()).detect(&a, &b),
            Err(DetectError::Geom(GeomError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn prepared_grid_exposes_its_state() {
        let a = set(&[(1, ["0", "0", "0"]), (2, ["5", "5", "5"])]);
        let b = set(&[(3, ["0", "0", "0"]), (4, ["8", "8", "8"])]);
        let prepared = grid().prepare(&a, &b).unwrap();
        assert_eq!(prepared.buckets().len(), 2);
        assert_eq!(prepared.neighbors().len(), 2);
        assert!(prepared.neighbors().get(9).is_empty());
        assert_eq!(prepared.grid().cell_size(), "4".parse().unwrap());
        let own = prepared.grid().cell_of(a.get(1).unwrap().position()).unwrap().unwrap();
        assert!(prepared.neighbors().get(1).contains(&own));
    }

    #[test]
    fn built_structures_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GridIndex>();
        assert_send_sync::<BucketMap<usize>>();
        assert_send_sync::<NeighborCache>();
        assert_send_sync::<PreparedGrid<'static, 'static>>();
    }

    #[test]
    fn method_serde_names() {
        assert_eq!(serde_json::to_string(&Method::BruteForce).unwrap(), "\"brute_force\"");
        let m: Method = serde_json::from_str("\"brute\"").unwrap();
        assert_eq!(m, Method::BruteForce);
        assert_eq!(Method::default(), Method::Grid);
    }
}
