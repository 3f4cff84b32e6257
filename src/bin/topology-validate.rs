// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Validator
//!
//! Loads a topology snapshot, replays every device through the validation
//! pipeline and reports which devices would be accepted.
//!
//! Run with: cargo run --bin topology-validate -- <snapshot.json> [--events]
//!
//! Configuration is read from the environment:
//! - `TOPOLOGY_SNAPSHOT` (snapshot path when none is given)
//! - `TOPOLOGY_MIN_CLUSTER_VERSION` (default `10.1`)
//! - `TOPOLOGY_RELEASE_POLICY` (default `ignore_missing`)
//! - `TOPOLOGY_RECORD_EVENTS` (default `true`)
//!
//! Exits with a failure status when any device was rejected.

use anyhow::{Context, Result};
use cim_device_topology::{LoadedSnapshot, TopologyConfig, TopologySnapshot};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

/// Validate an environment device topology snapshot
#[derive(Debug, Parser)]
#[command(name = "topology-validate")]
#[command(about = "Replay a topology snapshot through device validation")]
struct Args {
    /// Snapshot JSON file
    #[arg(env = "TOPOLOGY_SNAPSHOT")]
    snapshot: PathBuf,

    /// Print the recorded topology events as JSON lines
    #[arg(long)]
    events: bool,
}

fn report<W: Write>(loaded: &LoadedSnapshot, out: &mut W) -> Result<()> {
    for id in &loaded.accepted {
        if let Some(device) = loaded.topology.get(*id) {
            writeln!(out, "ok       {} {}", device.device_type, id)?;
        }
    }

    for rejected in &loaded.rejected {
        let label = rejected
            .draft
            .id
            .map_or_else(|| "<unassigned>".to_string(), |id| id.to_string());
        writeln!(out, "rejected {}: {}", label, rejected.error)?;
        if let Some(errors) = rejected.error.validation_errors() {
            for error in errors {
                writeln!(out, "         - {}", error)?;
            }
        }
    }

    for root in loaded.topology.roots() {
        let keying = loaded
            .topology
            .keying_children_count(root.id)
            .with_context(|| format!("Failed to count keying children of {}", root.id))?;
        writeln!(
            out,
            "root     {} {} keying children: {}",
            root.device_type, root.id, keying
        )?;
    }

    Ok(())
}

/// Load, validate and report a snapshot; `Ok(false)` when a device was rejected
fn run<W: Write>(args: &Args, config: TopologyConfig, out: &mut W) -> Result<bool> {
    debug!("Configuration: {:?}", config);

    info!("Loading snapshot {}", args.snapshot.display());
    let snapshot = TopologySnapshot::from_path(&args.snapshot)
        .with_context(|| format!("Failed to load {}", args.snapshot.display()))?;

    let loaded = snapshot.load(config);
    report(&loaded, out)?;

    if args.events {
        for event in loaded.topology.events() {
            writeln!(out, "{}", serde_json::to_string(event)?)?;
        }
    }

    if loaded.is_clean() {
        info!("All {} device(s) accepted", loaded.accepted.len());
    } else {
        warn!(
            "{} of {} device(s) rejected",
            loaded.rejected.len(),
            loaded.accepted.len() + loaded.rejected.len()
        );
    }

    Ok(loaded.is_clean())
}

fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = TopologyConfig::from_env().context("Invalid topology configuration")?;

    let stdout = std::io::stdout();
    if run(&args, config, &mut stdout.lock())? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
