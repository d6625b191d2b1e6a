// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-cell storage for the indexed point set.

use rustc_hash::FxHashMap;

use crate::grid::CellOrdinal;

/// Map from cell ordinal to the handles of the points living in that cell.
///
/// Every entry keeps the ordinal it was inserted under, and [`lookup`]
/// filters on it. Ordinals from [`GridIndex::cell_of`] are unique per cell
/// unless the index space outgrows `u64` and the composition wraps. A
/// wrapped ordinal can only add residents of a foreign cell to a lookup,
/// never hide one, and callers reject those with the exact distance test.
///
/// [`GridIndex::cell_of`]: crate::grid::GridIndex::cell_of
///
/// [`lookup`]: BucketMap::lookup
#[derive(Debug, Clone)]
pub struct BucketMap<T> {
    buckets: FxHashMap<CellOrdinal, Vec<(CellOrdinal, T)>>,
    len: usize,
}

impl<T> Default for BucketMap<T> {
    fn default() -> Self {
        Self {
            buckets: FxHashMap::default(),
            len: 0,
        }
    }
}

impl<T: Copy + Eq> BucketMap<T> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `item` under `ordinal`.
    ///
    /// Idempotent: inserting the same `(ordinal, item)` twice keeps a single
    /// entry. Returns `true` when a new entry was appended.
    pub fn insert(&mut self, ordinal: CellOrdinal, item: T) -> bool {
        let entries = self.buckets.entry(ordinal).or_default();
        if entries.iter().any(|(o, it)| *o == ordinal && *it == item) {
            return false;
        }
        entries.push((ordinal, item));
        self.len += 1;
        true
    }

    /// Items stored under exactly `ordinal`, in insertion order.
    ///
    /// The returned iterator is cheap to clone, so callers can walk a bucket
    /// more than once.
    #[must_use]
    pub fn lookup(&self, ordinal: CellOrdinal) -> Residents<'_, T> {
        let entries = self.buckets.get(&ordinal).map_or(&[][..], Vec::as_slice);
        Residents {
            ordinal,
            inner: entries.iter(),
        }
    }

    /// Total number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct occupied ordinals.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }

    /// Size of the fullest bucket.
    #[must_use]
    pub fn max_occupancy(&self) -> usize {
        self.buckets.values().map(Vec::len).max().unwrap_or(0)
    }
}

/// Iterator over the residents of one bucket.
#[derive(Debug, Clone)]
pub struct Residents<'a, T> {
    ordinal: CellOrdinal,
    inner: core::slice::Iter<'a, (CellOrdinal, T)>,
}

impl<T: Copy> Iterator for Residents<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let ordinal = self.ordinal;
        self.inner
            .by_ref()
            .find(|(o, _)| *o == ordinal)
            .map(|(_, item)| *item)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent_per_ordinal_and_item() {
        let mut b = BucketMap::new();
        assert!(b.insert(CellOrdinal::new(3), 10_u32));
        assert!(!b.insert(CellOrdinal::new(3), 10_u32));
        assert!(b.insert(CellOrdinal::new(3), 11_u32));
        assert!(b.insert(CellOrdinal::new(4), 10_u32));
        assert_eq!(b.len(), 3);
        assert_eq!(b.occupied_cells(), 2);
        assert_eq!(b.max_occupancy(), 2);
    }

    #[test]
    fn lookup_preserves_insertion_order_and_restarts() {
        let mut b = BucketMap::new();
        for item in [5_u32, 1, 9] {
            b.insert(CellOrdinal::new(7), item);
        }
        let residents = b.lookup(CellOrdinal::new(7));
        let first: Vec<u32> = residents.clone().collect();
        let second: Vec<u32> = residents.collect();
        assert_eq!(first, vec![5, 1, 9]);
        assert_eq!(first, second);
    }

    #[test]
    fn lookup_of_unknown_ordinal_is_empty() {
        let b: BucketMap<u32> = BucketMap::new();
        assert!(b.is_empty());
        assert_eq!(b.lookup(CellOrdinal::new(0)).count(), 0);
    }
}
