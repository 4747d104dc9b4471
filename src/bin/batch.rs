//! Value every scenario in a JSON file in parallel
//!
//! The input is a JSON array of `{"name": ..., "config": {...}}` objects.
//! Outputs one CSV row per scenario, in input order. With `--export-dir`,
//! each valued scenario also gets its forecast CSV and summary JSON.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use equity_dcf::report;
use equity_dcf::{ScenarioRunner, ValuationConfig};

#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(about = "Parallel valuation of a scenario file", long_about = None)]
struct Args {
    /// JSON array of named scenarios
    scenarios: PathBuf,

    /// Output CSV
    #[arg(long, default_value = "batch_output.csv")]
    output: PathBuf,

    /// Write <name>_forecast.csv and <name>_summary.json per scenario here
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct NamedScenario {
    name: String,
    #[serde(default)]
    config: ValuationConfig,
}

/// One output line; unavailable figures are left empty
#[derive(Debug, Serialize)]
struct BatchRow {
    name: String,
    wacc: Option<f64>,
    enterprise_value: Option<f64>,
    equity_value: Option<f64>,
    per_share_value: Option<f64>,
    error: Option<String>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading scenarios from {}...", args.scenarios.display());

    let file = File::open(&args.scenarios)
        .with_context(|| format!("failed to open {}", args.scenarios.display()))?;
    let scenarios: Vec<NamedScenario> = serde_json::from_reader(file)
        .with_context(|| format!("failed to parse {}", args.scenarios.display()))?;
    println!("Loaded {} scenarios in {:?}", scenarios.len(), start.elapsed());

    let configs: Vec<ValuationConfig> = scenarios.iter().map(|s| s.config.clone()).collect();

    println!("Running valuations...");
    let run_start = Instant::now();
    let results = ScenarioRunner::default().run_batch(&configs);
    println!("Valuations complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let mut failed = 0;
    for (scenario, result) in scenarios.iter().zip(&results) {
        let row = match result {
            Ok(valuation) => BatchRow {
                name: scenario.name.clone(),
                wacc: finite(valuation.wacc),
                enterprise_value: finite(valuation.result.enterprise_value),
                equity_value: finite(valuation.result.equity_value),
                per_share_value: finite(valuation.result.per_share_value),
                error: None,
            },
            Err(err) => {
                failed += 1;
                BatchRow {
                    name: scenario.name.clone(),
                    wacc: None,
                    enterprise_value: None,
                    equity_value: None,
                    per_share_value: None,
                    error: Some(err.to_string()),
                }
            }
        };
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Output written to {}", args.output.display());

    if let Some(dir) = &args.export_dir {
        let mut exported = 0;
        for (scenario, result) in scenarios.iter().zip(&results) {
            if let Ok(valuation) = result {
                report::export(dir, &scenario.name, valuation)
                    .with_context(|| format!("failed to export {}", scenario.name))?;
                exported += 1;
            }
        }
        println!("Exported {} scenarios to {}", exported, dir.display());
    }

    println!("\nBatch Summary:");
    println!("  Scenarios: {}", results.len());
    println!("  Failed:    {}", failed);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
