//! Equity DCF CLI
//!
//! Values one company and prints the result. Inputs are layered: built-in
//! defaults, then `--config`, then market data and proposed assumptions from
//! `--data-dir`, then any explicit flag.
//!
//! ```bash
//! equity_dcf --ticker VOLV-B.ST --data-dir ./data --price 250 --export-dir ./outputs
//! equity_dcf --revenue 100 110 121 --ebit-margin 0.12 --method exit --sensitivity
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;

use equity_dcf::assumptions::revenue_cagr;
use equity_dcf::constants::{
    exit_multiple_sensitivity, g_sensitivity, wacc_sensitivity, REPORTING_CURRENCY,
};
use equity_dcf::market::{FX_FILE, FileMarketData, FxTable, Lookup, MarketDataProvider};
use equity_dcf::report::{self, format_currency, ValuationSummary};
use equity_dcf::scenario::{default_shocks, tornado};
use equity_dcf::valuation::{implied_wacc, upside};
use equity_dcf::{TerminalMethod, ValuationConfig, ValuationEngine};

/// FCFF-based DCF for Swedish equities
#[derive(Parser, Debug)]
#[command(name = "equity_dcf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with a ValuationConfig
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker, used for market data lookup and export file names
    #[arg(long)]
    ticker: Option<String>,

    /// Directory with quotes.csv, financials.csv and fx_rates.csv
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Forecast horizon in years
    #[arg(long)]
    horizon: Option<u32>,

    /// Terminal value method
    #[arg(long)]
    method: Option<TerminalMethod>,

    /// Terminal growth rate
    #[arg(long)]
    g: Option<f64>,

    #[arg(long)]
    exit_multiple: Option<f64>,

    /// Risk-free rate
    #[arg(long)]
    rf: Option<f64>,

    #[arg(long)]
    beta: Option<f64>,

    /// Market risk premium
    #[arg(long)]
    mrp: Option<f64>,

    /// Size premium in basis points
    #[arg(long)]
    size_premium_bps: Option<f64>,

    /// Pre-tax cost of debt
    #[arg(long)]
    cod: Option<f64>,

    #[arg(long)]
    tax: Option<f64>,

    #[arg(long)]
    equity_weight: Option<f64>,

    #[arg(long)]
    debt_weight: Option<f64>,

    /// Use this WACC instead of the CAPM build-up
    #[arg(long)]
    wacc: Option<f64>,

    /// Historical revenue, oldest first; the last value is the forecast base
    #[arg(long, num_args = 1..)]
    revenue: Vec<f64>,

    /// Forecast revenue growth; defaults to the CAGR of two or more --revenue values
    #[arg(long)]
    revenue_growth: Option<f64>,

    #[arg(long)]
    ebit_margin: Option<f64>,

    #[arg(long)]
    da_pct: Option<f64>,

    #[arg(long)]
    capex_pct: Option<f64>,

    #[arg(long)]
    deltawnc_pct: Option<f64>,

    #[arg(long)]
    net_debt: Option<f64>,

    #[arg(long)]
    minority_interest: Option<f64>,

    #[arg(long)]
    investments: Option<f64>,

    #[arg(long)]
    shares: Option<f64>,

    /// Market price per share, for upside and implied WACC
    #[arg(long)]
    price: Option<f64>,

    /// Write <ticker>_forecast.csv and <ticker>_summary.json here
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Print the terminal value grid (and export it with --export-dir)
    #[arg(long)]
    sensitivity: bool,

    /// Print per-share tornado analysis
    #[arg(long)]
    tornado: bool,
}

/// Config and market context after the data layer
struct Layered {
    config: ValuationConfig,
    currency: String,
    market_price: Option<f64>,
}

/// Defaults, then the JSON config, then market data and proposals
fn layer_inputs(cli: &Cli) -> Result<Layered> {
    let config = match &cli.config {
        Some(path) => ValuationConfig::from_json_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValuationConfig::default(),
    };

    let mut layered = Layered {
        config,
        currency: REPORTING_CURRENCY.to_string(),
        market_price: None,
    };

    let (Some(dir), Some(ticker)) = (&cli.data_dir, &cli.ticker) else {
        if cli.data_dir.is_some() {
            log::warn!("--data-dir given without --ticker, market data ignored");
        }
        return Ok(layered);
    };

    let provider = FileMarketData::from_dir(dir)
        .with_context(|| format!("failed to load market data from {}", dir.display()))?;

    let fx_path = dir.join(FX_FILE);
    let fx = if fx_path.exists() {
        FxTable::from_csv(&fx_path)
            .with_context(|| format!("failed to load {}", fx_path.display()))?
    } else {
        FxTable::new()
    };

    let snapshot = match provider.snapshot(ticker) {
        Lookup::Resolved(snapshot) => snapshot,
        Lookup::Unavailable(reason) => {
            log::warn!("{}, valuing from config only", reason);
            return Ok(layered);
        }
    };

    let snapshot = match snapshot.in_currency(REPORTING_CURRENCY, &fx) {
        Lookup::Resolved(converted) => converted,
        Lookup::Unavailable(reason) => {
            log::warn!("{}, reporting in {}", reason, snapshot.currency());
            snapshot
        }
    };

    layered.config = snapshot.seed_config(layered.config);
    layered.currency = snapshot.currency().to_string();
    layered.market_price = Some(snapshot.market.price);
    Ok(layered)
}

/// Explicit flags override everything before them
fn apply_flags(cli: &Cli, config: &mut ValuationConfig) {
    if let Some(&last) = cli.revenue.last() {
        config.revenue = last;
    }
    if cli.revenue.len() >= 2 {
        config.revenue_growth = revenue_cagr(&cli.revenue);
    }

    let overrides = [
        (cli.g, &mut config.g),
        (cli.exit_multiple, &mut config.exit_multiple),
        (cli.rf, &mut config.rf),
        (cli.beta, &mut config.beta),
        (cli.mrp, &mut config.mrp),
        (cli.size_premium_bps.map(|bps| bps / 10_000.0), &mut config.size_premium),
        (cli.cod, &mut config.cod),
        (cli.tax, &mut config.tax_rate),
        (cli.equity_weight, &mut config.equity_weight),
        (cli.debt_weight, &mut config.debt_weight),
        (cli.revenue_growth, &mut config.revenue_growth),
        (cli.ebit_margin, &mut config.ebit_margin),
        (cli.da_pct, &mut config.da_pct),
        (cli.capex_pct, &mut config.capex_pct),
        (cli.deltawnc_pct, &mut config.deltawnc_pct),
        (cli.net_debt, &mut config.net_debt),
        (cli.minority_interest, &mut config.minority_interest),
        (cli.investments, &mut config.investments),
        (cli.shares, &mut config.shares_outstanding),
    ];
    for (flag, field) in overrides {
        if let Some(value) = flag {
            *field = value;
        }
    }

    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }
    if let Some(method) = cli.method {
        config.method = method;
    }
    if cli.wacc.is_some() {
        config.wacc_override = cli.wacc;
    }
}

/// All input layers in order, with `--price` over the quoted price
fn resolve_inputs(cli: &Cli) -> Result<Layered> {
    let mut layered = layer_inputs(cli)?;
    apply_flags(cli, &mut layered.config);
    layered.market_price = cli.price.or(layered.market_price);
    Ok(layered)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let Layered { config, currency, market_price } = resolve_inputs(&cli)?;
    let ticker = cli.ticker.clone().unwrap_or_else(|| "valuation".to_string());

    log::debug!("valuing {} with {:?}", ticker, config);

    let valuation = ValuationEngine::new(config.clone())
        .run()
        .with_context(|| format!("valuation of {} failed", ticker))?;

    let today = Local::now().date_naive();
    let mut summary = ValuationSummary::new(&ticker, &currency, today, &valuation);
    if let Some(price) = market_price {
        summary = summary.with_market(
            price,
            upside(valuation.result.per_share_value, price),
            implied_wacc(&config, price),
        );
    }

    println!("Equity DCF v{}", env!("CARGO_PKG_VERSION"));
    println!("{}\n", "=".repeat(40));
    println!("{:>5} {:>16} {:>16} {:>16} {:>16}", "Year", "Revenue", "EBIT", "FCFF", "PV FCFF");
    println!("{}", "-".repeat(73));
    for row in &valuation.forecast {
        println!(
            "{:>5} {:>16.0} {:>16.0} {:>16.0} {:>16.0}",
            row.year, row.revenue, row.ebit, row.fcff, row.pv_fcff
        );
    }
    println!();
    for line in summary.lines() {
        println!("{}", line);
    }
    println!(
        "Terminal share:    {}",
        report::as_percent(valuation.terminal_share(), 1)
    );

    let grid = cli.sensitivity.then(|| {
        let second_axis = match valuation.method {
            TerminalMethod::Perpetuity => g_sensitivity(),
            TerminalMethod::ExitMultiple => exit_multiple_sensitivity(),
        };
        valuation.terminal_grid(&wacc_sensitivity(), &second_axis)
    });

    if let Some(grid) = &grid {
        println!("\nTerminal value sensitivity ({} x WACC):", valuation.method);
        report::write_grid_csv(std::io::stdout().lock(), grid, valuation.method.as_str())
            .context("failed to print sensitivity grid")?;
        if grid.invalid_cells() > 0 {
            println!("{} cells have no valid terminal value", grid.invalid_cells());
        }
    }

    if cli.tornado {
        println!("\nTornado (value per share):");
        for bar in tornado(&config, &default_shocks()) {
            println!(
                "  {:<22} +/-{:<8} {:>18} {:>18}",
                bar.driver.label(),
                bar.delta,
                format_currency(bar.low, &currency, 2),
                format_currency(bar.high, &currency, 2),
            );
        }
    }

    if let Some(dir) = &cli.export_dir {
        let paths = report::export_summary(dir, &summary, &valuation)
            .with_context(|| format!("failed to export to {}", dir.display()))?;
        println!("\nForecast written to: {}", paths.forecast.display());
        println!("Summary written to:  {}", paths.summary.display());

        if let Some(grid) = &grid {
            let path = dir.join(format!("{}_sensitivity.csv", ticker));
            let file = std::fs::File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            report::write_grid_csv(file, grid, valuation.method.as_str())?;
            println!("Sensitivity written to: {}", path.display());
        }
    }

    Ok(())
}
