// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Steric overlap detection between two atom sets.

Every atom is a sphere of one shared radius. An atom of the indexed set
clashes when its center lies closer than one diameter to the center of
any atom of the query set.

Pipeline:
- [`pdb`] loads both sets from fixed-column atom records.
- [`detect`] finds candidate pairs, either through a uniform grid over the
  indexed set or by brute force; both apply the same exact distance test.
- [`aggregate`] sorts hits by serial and drops repeats of the same atom.
- [`report`] writes one line per clashing atom and a final count.

[`pipeline`] composes these steps with timing logs, and
[`pipeline::cross_check`] runs both strategies against each other.
"]

pub mod aggregate;
pub mod config;
pub mod detect;
pub mod pdb;
pub mod pipeline;
pub mod point;
pub mod report;

pub use aggregate::{aggregate, DedupPolicy};
pub use config::{ConfigError, ConfigService, ConfigStore, DetectorConfig};
pub use detect::{
    BruteForce, ClashStrategy, ClashThreshold, DetectError, Detection, GridSearch, MatchRecord,
    Method, NeighborCache, PreparedGrid, SetRole,
};
pub use pdb::PdbError;
pub use pipeline::{
    cross_check, detect_clashes, run_files, Outcome, PhaseTimings, RunError, RunSummary,
};
pub use point::{AtomInfo, Point, PointSet};
pub use report::{render_report, write_report};
