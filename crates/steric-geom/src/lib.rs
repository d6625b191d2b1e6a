// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for steric overlap detection.

This crate provides:
- A decimal fixed-point scalar (`Fixed`) and n-dimensional `Coordinate`.
- Axis-aligned `Bounds` with padding.
- A uniform cell grid (`GridIndex`) that maps points to cell ordinals and
  enumerates neighboring cells.
- Per-cell storage (`BucketMap`) for the indexed point set.

Design notes:
- Deterministic: integer arithmetic throughout; floating point appears only
  at the final square root of a distance.
- Dimension mismatches are errors, never silent truncation.
- Everything is immutable once built, so shared readers need no locking.
"]

pub mod bounds;
pub mod bucket;
pub mod coordinate;
pub mod error;
pub mod fixed;
pub mod grid;

pub use bounds::Bounds;
pub use bucket::{BucketMap, Residents};
pub use coordinate::Coordinate;
pub use error::GeomError;
pub use fixed::{Fixed, FixedError};
pub use grid::{CellOrdinal, GridIndex, NeighborOffsets};
