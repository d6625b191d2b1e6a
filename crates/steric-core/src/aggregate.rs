// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ordering and deduplication of raw detection hits.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::detect::MatchRecord;
use crate::point::Point;

/// How repeated hits on the same indexed point are collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep only the first record of every point.
    #[default]
    Full,
    /// Drop a record only when the previous survivor references the same
    /// point. Two records of one point separated by another point with an
    /// equal sort key both survive.
    Adjacent,
}

/// Stable-sorts `records` by sort key and removes duplicates per `policy`.
///
/// Records with equal keys keep their discovery order, so the output is a
/// pure function of the input sequence.
pub fn aggregate<'a>(mut records: Vec<MatchRecord<'a>>, policy: DedupPolicy) -> Vec<MatchRecord<'a>> {
    records.sort_by_key(MatchRecord::sort_key);
    match policy {
        DedupPolicy::Adjacent => {
            records.dedup_by(|later, kept| later.point().same_instance(kept.point()));
        }
        DedupPolicy::Full => {
            let mut seen: FxHashSet<*const Point> = FxHashSet::default();
            records.retain(|r| seen.insert(core::ptr::from_ref(r.point())));
        }
    }
    records
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::point::AtomInfo;
    use steric_geom::Coordinate;

    fn point(serial: i64) -> Point {
        Point::new(serial, AtomInfo::default(), Coordinate::zeros(3))
    }

    fn keys(records: &[MatchRecord<'_>]) -> Vec<i64> {
        records.iter().map(MatchRecord::sort_key).collect()
    }

    #[test]
    fn sorts_by_key_and_collapses_repeats() {
        let (p3, p1, p2) = (point(3), point(1), point(2));
        let raw = [&p3, &p1, &p3, &p2, &p1]
            .into_iter()
            .map(MatchRecord::for_point)
            .collect::<Vec<_>>();
        for policy in [DedupPolicy::Full, DedupPolicy::Adjacent] {
            assert_eq!(keys(&aggregate(raw.clone(), policy)), vec![1, 2, 3]);
        }
    }

    #[test]
    fn equal_keys_keep_discovery_order() {
        // Distinct atoms may share a serial across chains.
        let (a, b) = (point(5), point(5));
        let out = aggregate(
            vec![MatchRecord::for_point(&b), MatchRecord::for_point(&a)],
            DedupPolicy::Full,
        );
        assert_eq!(out.len(), 2);
        assert!(out[0].point().same_instance(&b));
        assert!(out[1].point().same_instance(&a));
    }

    #[test]
    fn policies_differ_on_interleaved_equal_keys() {
        let (a, b) = (point(5), point(5));
        let raw = vec![
            MatchRecord::for_point(&a),
            MatchRecord::for_point(&b),
            MatchRecord::for_point(&a),
        ];
        assert_eq!(aggregate(raw.clone(), DedupPolicy::Full).len(), 2);
        assert_eq!(aggregate(raw, DedupPolicy::Adjacent).len(), 3);
    }

    #[test]
    fn identical_coordinates_are_distinct_points() {
        let (a, b) = (point(1), point(2));
        let out = aggregate(
            vec![MatchRecord::for_point(&a), MatchRecord::for_point(&b)],
            DedupPolicy::Full,
        );
        assert_eq!(keys(&out), vec![1, 2]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(aggregate(Vec::new(), DedupPolicy::Full).is_empty());
    }

    #[test]
    fn policy_serde_names() {
        assert_eq!(serde_json::to_string(&DedupPolicy::Adjacent).unwrap(), "\"adjacent\"");
        assert_eq!(DedupPolicy::default(), DedupPolicy::Full);
    }
}
