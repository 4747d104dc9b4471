//! Operating and market assumptions, and their proposal from reported history

mod history;
pub mod loader;

pub use history::{
    HistoricalStatements, StatementRow, clamp, revenue_cagr, avg_margin, avg_margin_series,
    propose_da_pct, propose_capex_pct, propose_delta_nwc_pct, propose_ebit_margin,
    propose_tax_rate, propose_mrp,
};
pub use loader::{load_financials, load_financials_from_reader};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MRP_SE, DEFAULT_TAX_RATE_SE};

/// Container for the operating assumptions of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub revenue_growth: f64,
    pub ebit_margin: f64,
    pub da_pct: f64,
    pub capex_pct: f64,
    pub deltawnc_pct: f64,
    pub tax_rate: f64,
    pub mrp: f64,
}

impl Assumptions {
    /// Generic Swedish defaults used when no history is available
    pub fn default_sweden() -> Self {
        Self {
            revenue_growth: 0.05,
            ebit_margin: 0.10,
            da_pct: 0.05,
            capex_pct: 0.05,
            deltawnc_pct: 0.01,
            tax_rate: DEFAULT_TAX_RATE_SE,
            mrp: DEFAULT_MRP_SE,
        }
    }

    /// Propose assumptions from reported history
    ///
    /// Growth is the revenue CAGR; line items are averaged margins with the
    /// bounds of the `propose_*` functions. Tax rate and MRP are Swedish
    /// defaults.
    pub fn propose(history: &HistoricalStatements) -> Self {
        if history.is_empty() {
            log::warn!("no reported history, falling back to default assumptions");
            return Self::default_sweden();
        }

        let revenues = history.series(|r| r.revenue);

        let da_pct = propose_da_pct(&history.series(|r| r.da), &revenues);
        let proposed = Self {
            revenue_growth: revenue_cagr(&history.revenues()),
            ebit_margin: propose_ebit_margin(&history.series(|r| r.ebit), &revenues),
            da_pct,
            capex_pct: propose_capex_pct(&history.series(|r| r.capex), &revenues, da_pct),
            deltawnc_pct: propose_delta_nwc_pct(&history.series(|r| r.delta_nwc), &revenues),
            tax_rate: propose_tax_rate(),
            mrp: propose_mrp(),
        };

        log::debug!(
            "proposed from {} periods: growth={:.4} ebit={:.4} da={:.4} capex={:.4} nwc={:.4}",
            history.len(),
            proposed.revenue_growth,
            proposed.ebit_margin,
            proposed.da_pct,
            proposed.capex_pct,
            proposed.deltawnc_pct,
        );

        proposed
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_sweden()
    }
}
