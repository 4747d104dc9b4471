//! Scenario runner for batch valuations and tornado analysis
//!
//! Holds a base config, then runs many valuations with variations of it.
//! Independent runs are spread over the rayon thread pool.

use std::cmp::Ordering;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ValuationConfig;
use crate::error::DcfResult;
use crate::valuation::{Valuation, ValuationEngine};

/// Input that a tornado shock moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    RevenueGrowth,
    EbitMargin,
    TaxRate,
    RiskFreeRate,
    Beta,
    MarketRiskPremium,
    CostOfDebt,
    TerminalGrowth,
    ExitMultiple,
}

impl Driver {
    pub fn label(&self) -> &'static str {
        match self {
            Driver::RevenueGrowth => "Revenue growth",
            Driver::EbitMargin => "EBIT margin",
            Driver::TaxRate => "Tax rate",
            Driver::RiskFreeRate => "Risk-free rate",
            Driver::Beta => "Beta",
            Driver::MarketRiskPremium => "Market risk premium",
            Driver::CostOfDebt => "Cost of debt",
            Driver::TerminalGrowth => "Terminal growth",
            Driver::ExitMultiple => "Exit multiple",
        }
    }

    /// Copy of `config` with this driver moved by `delta`
    pub fn apply(&self, config: &ValuationConfig, delta: f64) -> ValuationConfig {
        let mut shocked = config.clone();
        match self {
            Driver::RevenueGrowth => shocked.revenue_growth += delta,
            Driver::EbitMargin => shocked.ebit_margin += delta,
            Driver::TaxRate => shocked.tax_rate += delta,
            Driver::RiskFreeRate => shocked.rf += delta,
            Driver::Beta => shocked.beta += delta,
            Driver::MarketRiskPremium => shocked.mrp += delta,
            Driver::CostOfDebt => shocked.cod += delta,
            Driver::TerminalGrowth => shocked.g += delta,
            Driver::ExitMultiple => shocked.exit_multiple += delta,
        }
        shocked
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Symmetric shift of one driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shock {
    pub driver: Driver,
    pub delta: f64,
}

impl Shock {
    pub fn new(driver: Driver, delta: f64) -> Self {
        Self { driver, delta }
    }
}

/// Shocks used when none are given
pub fn default_shocks() -> Vec<Shock> {
    vec![
        Shock::new(Driver::RevenueGrowth, 0.02),
        Shock::new(Driver::EbitMargin, 0.02),
        Shock::new(Driver::TaxRate, 0.02),
        Shock::new(Driver::RiskFreeRate, 0.01),
        Shock::new(Driver::Beta, 0.2),
        Shock::new(Driver::MarketRiskPremium, 0.01),
        Shock::new(Driver::CostOfDebt, 0.01),
        Shock::new(Driver::TerminalGrowth, 0.005),
        Shock::new(Driver::ExitMultiple, 2.0),
    ]
}

/// Per-share value at `-delta` (low) and `+delta` (high)
///
/// A shock that makes the valuation fail gives NaN for that side, and a NaN
/// swing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TornadoBar {
    pub driver: Driver,
    pub delta: f64,
    pub low: f64,
    pub high: f64,
    pub swing: f64,
}

/// Descending swing, NaN last
fn by_swing_desc(a: &TornadoBar, b: &TornadoBar) -> Ordering {
    match (a.swing.is_nan(), b.swing.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.swing.partial_cmp(&a.swing).unwrap_or(Ordering::Equal),
    }
}

fn per_share_or_nan(config: &ValuationConfig) -> f64 {
    ValuationEngine::new(config.clone())
        .run()
        .map(|v| v.result.per_share_value)
        .unwrap_or(f64::NAN)
}

/// One-at-a-time sensitivity of the per-share value around `base`
pub fn tornado(base: &ValuationConfig, shocks: &[Shock]) -> Vec<TornadoBar> {
    let mut bars: Vec<TornadoBar> = shocks
        .par_iter()
        .map(|shock| {
            let low = per_share_or_nan(&shock.driver.apply(base, -shock.delta));
            let high = per_share_or_nan(&shock.driver.apply(base, shock.delta));
            TornadoBar {
                driver: shock.driver,
                delta: shock.delta,
                low,
                high,
                swing: (high - low).abs(),
            }
        })
        .collect();

    bars.sort_by(by_swing_desc);
    bars
}

/// Batch runner around a base config
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(base);
///
/// let configs: Vec<_> = [0.07, 0.08, 0.09]
///     .iter()
///     .map(|&w| ValuationConfig { wacc_override: Some(w), ..runner.base().clone() })
///     .collect();
/// let results = runner.run_batch(&configs);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    base: ValuationConfig,
}

impl ScenarioRunner {
    pub fn new(base: ValuationConfig) -> Self {
        Self { base }
    }

    /// Run a single valuation
    pub fn run(&self, config: &ValuationConfig) -> DcfResult<Valuation> {
        ValuationEngine::new(config.clone()).run()
    }

    /// Run the base config
    pub fn run_base(&self) -> DcfResult<Valuation> {
        self.run(&self.base)
    }

    /// Run many configs in parallel; results keep the input order
    pub fn run_batch(&self, configs: &[ValuationConfig]) -> Vec<DcfResult<Valuation>> {
        let results: Vec<DcfResult<Valuation>> = configs.par_iter().map(|c| self.run(c)).collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            log::warn!("{} of {} scenarios failed", failed, results.len());
        }
        log::debug!("ran {} scenarios", results.len());
        results
    }

    /// Tornado analysis around the base config
    pub fn tornado(&self, shocks: &[Shock]) -> Vec<TornadoBar> {
        tornado(&self.base, shocks)
    }

    pub fn base(&self) -> &ValuationConfig {
        &self.base
    }
}
