// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LBP Simulation Suite - Command Line Runner
//
// Usage:
//   lbp-sim --config lbp.json                          # result JSON on stdout
//   lbp-sim --config lbp.json --seed 42 --output out.json
//   lbp-sim --config lbp.json --time-series prices.jsonl
//   RUST_LOG=lbp_sim=debug lbp-sim --config lbp.json   # per-day scheduling logs

mod time_series;

use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use lbp_sim::{SimulationConfig, Simulator};
use tracing::info;
use tracing_subscriber::EnvFilter;

use time_series::TimeSeriesRecorder;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(version, about = "Simulate the price path of a liquidity bootstrapping pool")]
struct CliArgs {
    /// JSON pool configuration
    #[arg(long, short)]
    config: PathBuf,
    /// RNG seed; derived from the wall clock when omitted
    #[arg(long, env = "LBP_SIM_SEED")]
    seed: Option<u64>,
    /// Write the pretty-printed result here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Write one JSON line per price observation
    #[arg(long)]
    time_series: Option<PathBuf>,
    /// Used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args);

    let raw = std::fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let config = SimulationConfig::from_json(&raw)
        .with_context(|| format!("invalid configuration in {}", args.config.display()))?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    info!(seed, config = %args.config.display(), "loaded configuration");

    let started = Instant::now();
    let result = Simulator::new(config, seed).run().context("simulation failed")?;
    let elapsed = started.elapsed();

    let json = serde_json::to_string_pretty(&result)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "result written");
        }
        None => println!("{}", json),
    }

    if let Some(path) = &args.time_series {
        let recorder = TimeSeriesRecorder::from_observations(&result.prices);
        recorder
            .write_jsonl(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), lines = recorder.len(), "time series written");
    }

    let first = result.first_price().map(|p| p.round_dp(8).to_string()).unwrap_or_default();
    let last = result.last_price().map(|p| p.round_dp(8).to_string()).unwrap_or_default();
    eprintln!(
        "seed={} samples={} buys={} volume={} price {} -> {} ({:.2?})",
        seed,
        result.prices.len(),
        result.total_trades,
        result.total_volume,
        first,
        last,
        elapsed
    );
    Ok(())
}
