//! Write WACC x g and WACC x exit multiple terminal value grids to CSV
//!
//! Both grids use the last forecast year of the configured valuation and the
//! default axes.

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use equity_dcf::constants::{exit_multiple_sensitivity, g_sensitivity, wacc_sensitivity};
use equity_dcf::report::write_grid_csv;
use equity_dcf::valuation::{sensitivity_wacc_exit, sensitivity_wacc_g};
use equity_dcf::{ValuationConfig, ValuationEngine};

#[derive(Parser, Debug)]
#[command(name = "sensitivity")]
#[command(about = "Terminal value sensitivity grids", long_about = None)]
struct Args {
    /// JSON file with a ValuationConfig; defaults are used otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "./outputs")]
    out_dir: PathBuf,

    /// File name prefix
    #[arg(long, default_value = "sensitivity")]
    prefix: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ValuationConfig::from_json_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValuationConfig::default(),
    };

    let valuation = ValuationEngine::new(config).run().context("base valuation failed")?;
    let last = valuation
        .forecast
        .last()
        .context("valuation has no forecast years")?;

    let waccs = wacc_sensitivity();
    let grids = [
        ("g", "wacc_g", sensitivity_wacc_g(last.fcff, &waccs, &g_sensitivity())),
        (
            "exit_multiple",
            "wacc_exit",
            sensitivity_wacc_exit(last.ebitda(), &waccs, &exit_multiple_sensitivity()),
        ),
    ];

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    for (row_label, suffix, grid) in &grids {
        let path = args.out_dir.join(format!("{}_{}.csv", args.prefix, suffix));
        let file = File::create(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_grid_csv(file, grid, row_label)?;

        let (rows, cols) = grid.shape();
        println!(
            "{}: {} x {} grid, {} invalid cells",
            path.display(),
            rows,
            cols,
            grid.invalid_cells()
        );
        log::debug!("wrote {}", path.display());
    }

    Ok(())
}
