// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error type shared by the geometry primitives.

use thiserror::Error;

use crate::fixed::FixedError;

/// Errors raised by coordinate arithmetic and grid construction.
///
/// `DimensionMismatch` is an invariant violation: callers are expected to
/// propagate it and abort the current operation rather than recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeomError {
    /// Two operands disagree on their number of dimensions.
    #[error("dimensions don't agree: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimension of the receiving operand.
        expected: usize,
        /// Dimension of the other operand.
        found: usize,
    },
    /// Axis index past the coordinate's dimension.
    #[error("axis {axis} out of range for dimension {dimension}")]
    AxisOutOfRange {
        /// Requested axis.
        axis: usize,
        /// Dimension of the coordinate.
        dimension: usize,
    },
    /// Cell size must be strictly positive.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(String),
    /// `min` lies above `max` on some axis.
    #[error("invalid bounds: min > max on axis {axis}")]
    InvalidBounds {
        /// First offending axis.
        axis: usize,
    },
    /// Zero-dimensional coordinates carry no geometry.
    #[error("coordinates must have at least one dimension")]
    ZeroDimension,
    /// A component could not be converted to fixed point.
    #[error(transparent)]
    Fixed(#[from] FixedError),
}
