// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `csod`: cubic steric overlap detector.
//!
//! Reads two structures, reports the atoms of the second that clash with
//! atoms of the first, and exits non-zero on any failure.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use steric_config_fs::FsConfigStore;
use steric_core::{run_files, ConfigService, DedupPolicy, DetectorConfig, Method};
use steric_geom::Fixed;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "csod", author, version, about = "Steric overlap detector")]
struct Cli {
    /// Structure whose atoms are looked up (PDB).
    input_a: PathBuf,
    /// Structure whose clashing atoms are reported (PDB).
    input_b: PathBuf,
    /// Detection strategy [default: stored config, else grid].
    #[arg(long, value_enum)]
    method: Option<MethodArg>,
    /// Report file.
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,
    /// Atom radius in Ångström; the clash threshold is twice this.
    #[arg(long, value_parser = str::parse::<Fixed>)]
    radius: Option<Fixed>,
    /// How repeated hits on one atom are collapsed.
    #[arg(long, value_enum)]
    dedup: Option<DedupArg>,
    /// Also run the other strategy and fail if the results differ.
    #[arg(long)]
    verify: bool,
    /// Directory holding `detector.json` [default: platform config dir].
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Persist the effective settings before running.
    #[arg(long)]
    save_config: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    Grid,
    Brute,
}

impl From<MethodArg> for Method {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Grid => Self::Grid,
            MethodArg::Brute => Self::BruteForce,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum DedupArg {
    Full,
    Adjacent,
}

impl From<DedupArg> for DedupPolicy {
    fn from(value: DedupArg) -> Self {
        match value {
            DedupArg::Full => Self::Full,
            DedupArg::Adjacent => Self::Adjacent,
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of `base`.
    fn apply(&self, mut base: DetectorConfig) -> DetectorConfig {
        if let Some(method) = self.method {
            base.method = method.into();
        }
        if let Some(radius) = self.radius {
            base.atom_radius = radius;
        }
        if let Some(dedup) = self.dedup {
            base.dedup = dedup.into();
        }
        base.verify |= self.verify;
        base
    }
}

fn open_store(dir: Option<&Path>) -> Result<Option<ConfigService<FsConfigStore>>> {
    match dir {
        Some(dir) => {
            let store = FsConfigStore::at(dir)
                .with_context(|| format!("opening config dir {}", dir.display()))?;
            Ok(Some(ConfigService::new(store)))
        }
        None => match FsConfigStore::new() {
            Ok(store) => Ok(Some(ConfigService::new(store))),
            Err(err) => {
                warn!(?err, "config dir unavailable; using defaults");
                Ok(None)
            }
        },
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = open_store(cli.config_dir.as_deref())?;
    let stored = match &service {
        Some(svc) => svc.detector().context("loading detector config")?,
        None => DetectorConfig::default(),
    };
    let config = cli.apply(stored);
    if cli.save_config {
        if let Some(svc) = &service {
            svc.save_detector(&config).context("saving detector config")?;
            info!("saved detector config");
        }
    }

    let mut report = Vec::new();
    let summary = run_files(&cli.input_a, &cli.input_b, &config, &mut report)?;
    fs::write(&cli.output, &report)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!(
        clashing = summary.clashing_atoms,
        output = %cli.output.display(),
        "report written"
    );
    Ok(())
}
