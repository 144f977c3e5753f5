//! queue-sim - run a queueing model from a JSON file
//!
//! Loads a model, runs it until the requested time (or until no entity has
//! anything left to do) and prints the report as JSON on stdout.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`, e.g.
//! `RUST_LOG=queueing_simulator_core_rs=debug` to trace every seize decision.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use queueing_simulator_core_rs::{ModelConfig, Orchestrator};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "queue-sim")]
#[command(about = "Run a discrete-event queueing model")]
struct Args {
    /// Path to the JSON model
    model: PathBuf,

    /// Stop after this simulated time (default: run to completion)
    #[arg(long)]
    until: Option<f64>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("queue_sim=info".parse()?))
        .init();

    let args = Args::parse();

    let json = fs::read_to_string(&args.model)
        .with_context(|| format!("Failed to read model {}", args.model.display()))?;
    let config = ModelConfig::from_json(&json)
        .with_context(|| format!("Invalid model {}", args.model.display()))?;

    let mut orchestrator = Orchestrator::from_config(&config)?;
    let until = args.until.unwrap_or(f64::INFINITY);
    let summary = orchestrator.run(until)?;

    info!(
        departures = summary.departures,
        dropouts = summary.dropouts,
        end_time = summary.end_time,
        "simulation complete"
    );

    println!("{}", orchestrator.report().to_json(args.pretty)?);
    Ok(())
}
