// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::expect_used)]
//! Grid search must report exactly the atoms brute force reports.

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use steric_core::{
    aggregate, AtomInfo, BruteForce, ClashStrategy, ClashThreshold, DedupPolicy, GridSearch,
    MatchRecord, Point, PointSet,
};
use steric_geom::{Coordinate, Fixed};

// Override with PROPTEST_SEED or edit the bytes to explore other cases.
const SEED_BYTES: [u8; 32] = [
    0xc1, 0xa5, 0x4e, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0,
];

fn point_set(raw: &[[i64; 3]], first_serial: i64) -> PointSet {
    let points = raw
        .iter()
        .zip(first_serial..)
        .map(|(millis, serial)| {
            let position = Coordinate::new(
                millis
                    .iter()
                    .map(|m| Fixed::from_raw(m * 1_000_000))
                    .collect(),
            );
            Point::new(serial, AtomInfo::default(), position)
        })
        .collect();
    PointSet::new(points).expect("uniform dimension")
}

fn survivors(records: Vec<MatchRecord<'_>>) -> BTreeSet<i64> {
    aggregate(records, DedupPolicy::Full)
        .iter()
        .map(MatchRecord::sort_key)
        .collect()
}

#[test]
fn proptest_seed_pinned_grid_equals_brute_force() {
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(
        PropConfig {
            cases: 96,
            ..PropConfig::default()
        },
        rng,
    );

    // Millimetre resolution; A is allowed to stick out of B's box.
    let a_point = prop::array::uniform3(-25_000_i64..25_000);
    let b_point = prop::array::uniform3(-12_000_i64..12_000);
    let radius = prop_oneof![Just(2_000_i64), 500_i64..3_000];
    let case = (
        prop::collection::vec(a_point, 1..30),
        prop::collection::vec(b_point, 1..60),
        radius,
    );

    runner
        .run(&case, |(a_raw, b_raw, radius_millis)| {
            let a = point_set(&a_raw, 1);
            // Serials are unique across B so the key set identifies atoms.
            let b = point_set(&b_raw, 1_000);
            let threshold = ClashThreshold::from_radius(Fixed::from_raw(radius_millis * 1_000_000))
                .expect("positive radius");
            let grid = GridSearch::new(threshold, "0.001".parse().expect("literal"))
                .expect("positive margin");

            let g = grid.detect(&a, &b).expect("grid");
            let bf = BruteForce::new(threshold).detect(&a, &b).expect("brute force");

            prop_assert!(g.comparisons <= bf.comparisons);
            prop_assert_eq!(survivors(g.matches), survivors(bf.matches));
            Ok(())
        })
        .expect("grid and brute force should agree");
}

#[test]
fn touching_spheres_do_not_clash_in_either_strategy() {
    let a = point_set(&[[0, 0, 0]], 1);
    let b = point_set(&[[3_500, 0, 0], [4_000, 0, 0], [4_500, 0, 0], [0, -4_000, 0]], 10);
    let threshold = ClashThreshold::from_radius("2".parse().expect("literal")).expect("radius");
    let grid = GridSearch::new(threshold, "0.001".parse().expect("literal")).expect("margin");

    for strategy in [&grid as &dyn ClashStrategy, &BruteForce::new(threshold)] {
        let d = strategy.detect(&a, &b).expect("detect");
        assert_eq!(survivors(d.matches), BTreeSet::from([10]), "{}", strategy.method());
    }
}
