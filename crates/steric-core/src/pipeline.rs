// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end run: load, detect, aggregate, report.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use steric_geom::Fixed;
use thiserror::Error;
use tracing::{error, info};

use crate::aggregate::aggregate;
use crate::config::DetectorConfig;
use crate::detect::{
    BruteForce, ClashStrategy, ClashThreshold, DetectError, Detection, GridSearch, MatchRecord,
    Method,
};
use crate::pdb::{self, PdbError};
use crate::point::{Point, PointSet};
use crate::report::write_report;

/// Errors raised by a pipeline run.
#[derive(Debug, Error)]
pub enum RunError {
    /// An input file could not be loaded.
    #[error("failed to load {}", path.display())]
    Load {
        /// Offending input.
        path: PathBuf,
        /// Why loading failed.
        #[source]
        source: PdbError,
    },
    /// The configured atom radius is not positive.
    #[error("invalid atom radius {0}")]
    InvalidRadius(Fixed),
    /// The configured bounds margin is not positive.
    #[error("invalid bounds margin {0}")]
    InvalidMargin(Fixed),
    /// Detection failed.
    #[error(transparent)]
    Detect(#[from] DetectError),
    /// The report could not be written.
    #[error("failed to write report: {0}")]
    Write(#[from] io::Error),
    /// Grid and brute force disagree.
    #[error("grid found {grid} clashing atoms, brute force found {brute_force}")]
    OracleMismatch {
        /// Survivors of the grid strategy.
        grid: usize,
        /// Survivors of the brute-force strategy.
        brute_force: usize,
    },
}

/// Wall-clock time spent in each phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Grid construction, bucket filling and neighbor caching.
    pub precalc: Duration,
    /// Candidate lookups and distance tests.
    pub detection: Duration,
}

/// Aggregated result of one detection.
#[derive(Debug, Clone)]
pub struct Outcome<'b> {
    /// Strategy that produced the records.
    pub method: Method,
    /// Sorted, deduplicated records.
    pub records: Vec<MatchRecord<'b>>,
    /// Hits before deduplication.
    pub raw_matches: usize,
    /// Distance tests performed.
    pub comparisons: u64,
    /// Phase timings.
    pub timings: PhaseTimings,
}

/// Counters of a completed file-to-report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Strategy used.
    pub method: Method,
    /// Atoms in the first input.
    pub query_atoms: usize,
    /// Atoms in the second input.
    pub indexed_atoms: usize,
    /// Lines in the report.
    pub clashing_atoms: usize,
    /// Distance tests performed.
    pub comparisons: u64,
    /// Phase timings.
    pub timings: PhaseTimings,
    /// Whole run, loading and writing included.
    pub total: Duration,
}

fn threshold(config: &DetectorConfig) -> Result<ClashThreshold, RunError> {
    ClashThreshold::from_radius(config.atom_radius)
        .map_err(|_| RunError::InvalidRadius(config.atom_radius))
}

fn margin(config: &DetectorConfig) -> Result<Fixed, RunError> {
    if config.bounds_margin.is_positive() {
        Ok(config.bounds_margin)
    } else {
        Err(RunError::InvalidMargin(config.bounds_margin))
    }
}

fn run_strategy<'b>(
    method: Method,
    query: &PointSet,
    indexed: &'b PointSet,
    config: &DetectorConfig,
) -> Result<(Detection<'b>, PhaseTimings), RunError> {
    let threshold = threshold(config)?;
    let mut timings = PhaseTimings::default();
    let detection = match method {
        Method::Grid => {
            let started = Instant::now();
            let prepared = GridSearch::new(threshold, margin(config)?)?.prepare(query, indexed)?;
            timings.precalc = started.elapsed();
            let started = Instant::now();
            let detection = prepared.run()?;
            timings.detection = started.elapsed();
            detection
        }
        Method::BruteForce => {
            let started = Instant::now();
            let detection = BruteForce::new(threshold).detect(query, indexed)?;
            timings.detection = started.elapsed();
            detection
        }
    };
    Ok((detection, timings))
}

fn identities(records: &[MatchRecord<'_>]) -> FxHashSet<*const Point> {
    records
        .iter()
        .map(|r| core::ptr::from_ref(r.point()))
        .collect()
}

/// Runs the configured strategy and aggregates its hits.
///
/// With `config.verify` set, the other strategy runs as well and any
/// difference in the surviving points is an [`RunError::OracleMismatch`].
pub fn detect_clashes<'b>(
    query: &PointSet,
    indexed: &'b PointSet,
    config: &DetectorConfig,
) -> Result<Outcome<'b>, RunError> {
    let (detection, timings) = run_strategy(config.method, query, indexed, config)?;
    let raw_matches = detection.matches.len();
    let records = aggregate(detection.matches, config.dedup);
    info!("pre-calculation took {:?}", timings.precalc);
    info!(
        method = %config.method,
        matches = raw_matches,
        comparisons = detection.comparisons,
        "detection took {:?}",
        timings.detection
    );

    if config.verify {
        let other = match config.method {
            Method::Grid => Method::BruteForce,
            Method::BruteForce => Method::Grid,
        };
        let (check, _) = run_strategy(other, query, indexed, config)?;
        let check = aggregate(check.matches, config.dedup);
        ensure_agreement(config.method, &records, &check)?;
        info!(records = records.len(), "{other} agrees");
    }

    Ok(Outcome {
        method: config.method,
        records,
        raw_matches,
        comparisons: detection.comparisons,
        timings,
    })
}

fn ensure_agreement(
    primary: Method,
    records: &[MatchRecord<'_>],
    check: &[MatchRecord<'_>],
) -> Result<(), RunError> {
    if identities(records) == identities(check) {
        return Ok(());
    }
    let (grid, brute_force) = match primary {
        Method::Grid => (records.len(), check.len()),
        Method::BruteForce => (check.len(), records.len()),
    };
    error!(grid, brute_force, "grid and brute force disagree");
    Err(RunError::OracleMismatch { grid, brute_force })
}

/// Runs grid and brute force on the same input and compares the points they report.
///
/// Returns the number of clashing atoms both agree on.
pub fn cross_check(
    query: &PointSet,
    indexed: &PointSet,
    config: &DetectorConfig,
) -> Result<usize, RunError> {
    let (grid, _) = run_strategy(Method::Grid, query, indexed, config)?;
    let (brute, _) = run_strategy(Method::BruteForce, query, indexed, config)?;
    let grid = aggregate(grid.matches, config.dedup);
    let brute = aggregate(brute.matches, config.dedup);
    ensure_agreement(Method::Grid, &grid, &brute)?;
    Ok(grid.len())
}

fn load(path: &Path) -> Result<PointSet, RunError> {
    pdb::read_file(path).map_err(|source| RunError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads both inputs, detects clashes of `query_path` atoms against
/// `indexed_path` atoms and writes the report to `out`.
///
/// Nothing is written unless detection succeeds.
pub fn run_files<W: Write>(
    query_path: &Path,
    indexed_path: &Path,
    config: &DetectorConfig,
    out: &mut W,
) -> Result<RunSummary, RunError> {
    let started = Instant::now();
    let query = load(query_path)?;
    let indexed = load(indexed_path)?;
    info!(
        query = query.len(),
        indexed = indexed.len(),
        "size of molecules"
    );

    let outcome = detect_clashes(&query, &indexed, config)?;
    write_report(out, &outcome.records)?;
    out.flush()?;

    let total = started.elapsed();
    info!("total time {total:?}");
    Ok(RunSummary {
        method: outcome.method,
        query_atoms: query.len(),
        indexed_atoms: indexed.len(),
        clashing_atoms: outcome.records.len(),
        comparisons: outcome.comparisons,
        timings: outcome.timings,
        total,
    })
}
