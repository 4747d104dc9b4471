//! Valuation configuration record
//!
//! Every input the engine consumes is an explicit named field. Missing fields
//! in a JSON file take the defaults below; unknown fields are rejected.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::constants::{
    DEFAULT_COST_OF_DEBT, DEFAULT_EXIT_MULTIPLE, DEFAULT_HORIZON, DEFAULT_MRP_SE, DEFAULT_RF,
    DEFAULT_TAX_RATE_SE, DEFAULT_TERMINAL_GROWTH,
};
use crate::error::DataError;
use crate::valuation::{compute_wacc, TerminalMethod};

/// Inputs for one valuation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValuationConfig {
    // Discount rate
    pub rf: f64,
    pub beta: f64,
    pub mrp: f64,
    /// Added to the MRP before applying beta (decimal, not bps)
    pub size_premium: f64,
    /// Pre-tax cost of debt
    pub cod: f64,
    pub tax_rate: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    /// Replaces the CAPM build-up when set
    pub wacc_override: Option<f64>,

    // Operating forecast
    /// Last reported revenue; year 1 is `revenue * (1 + revenue_growth)`
    pub revenue: f64,
    pub revenue_growth: f64,
    pub ebit_margin: f64,
    pub da_pct: f64,
    pub capex_pct: f64,
    pub deltawnc_pct: f64,
    pub horizon: u32,

    // Terminal value
    pub method: TerminalMethod,
    pub g: f64,
    pub exit_multiple: f64,

    // Equity bridge
    pub net_debt: f64,
    pub minority_interest: f64,
    pub investments: f64,
    pub shares_outstanding: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            rf: DEFAULT_RF,
            beta: 1.0,
            mrp: DEFAULT_MRP_SE,
            size_premium: 0.0,
            cod: DEFAULT_COST_OF_DEBT,
            tax_rate: DEFAULT_TAX_RATE_SE,
            equity_weight: 1.0,
            debt_weight: 0.0,
            wacc_override: None,
            revenue: 100_000_000.0,
            revenue_growth: 0.05,
            ebit_margin: 0.10,
            da_pct: 0.05,
            capex_pct: 0.05,
            deltawnc_pct: 0.01,
            horizon: DEFAULT_HORIZON,
            method: TerminalMethod::Perpetuity,
            g: DEFAULT_TERMINAL_GROWTH,
            exit_multiple: DEFAULT_EXIT_MULTIPLE,
            net_debt: 0.0,
            minority_interest: 0.0,
            investments: 0.0,
            shares_outstanding: 100_000_000.0,
        }
    }
}

impl ValuationConfig {
    /// Load a config from a JSON file
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Self::from_json_reader(file)
    }

    /// Load a config from any JSON reader
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Discount rate for this run: the override if present, otherwise the
    /// CAPM/after-tax-debt blend
    pub fn wacc(&self) -> f64 {
        self.wacc_override.unwrap_or_else(|| {
            compute_wacc(
                self.rf,
                self.beta,
                self.mrp,
                self.size_premium,
                self.cod,
                self.tax_rate,
                self.equity_weight,
                self.debt_weight,
            )
        })
    }

    /// Replace the operating assumptions with proposed ones
    pub fn with_assumptions(mut self, assumptions: &Assumptions) -> Self {
        self.revenue_growth = assumptions.revenue_growth;
        self.ebit_margin = assumptions.ebit_margin;
        self.da_pct = assumptions.da_pct;
        self.capex_pct = assumptions.capex_pct;
        self.deltawnc_pct = assumptions.deltawnc_pct;
        self.tax_rate = assumptions.tax_rate;
        self.mrp = assumptions.mrp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_wacc_is_all_equity() {
        let config = ValuationConfig::default();
        assert_relative_eq!(config.wacc(), 0.02 + 0.055, epsilon = 1e-15);
    }

    #[test]
    fn test_wacc_override() {
        let config = ValuationConfig { wacc_override: Some(0.09), ..Default::default() };
        assert_eq!(config.wacc(), 0.09);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "horizon": 7, "method": "exit", "exit_multiple": 8.5, "beta": 1.3 }"#;
        let config = ValuationConfig::from_json_reader(json.as_bytes()).unwrap();

        assert_eq!(config.horizon, 7);
        assert_eq!(config.method, TerminalMethod::ExitMultiple);
        assert_eq!(config.exit_multiple, 8.5);
        assert_eq!(config.beta, 1.3);
        assert_eq!(config.tax_rate, DEFAULT_TAX_RATE_SE);
        assert!(config.wacc_override.is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{ "horizon": 5, "ebitda_margin": 0.2 }"#;
        let result = ValuationConfig::from_json_reader(json.as_bytes());
        assert!(matches!(result, Err(DataError::Json(_))));
    }

    #[test]
    fn test_with_assumptions() {
        let assumptions = Assumptions {
            revenue_growth: 0.07,
            ebit_margin: 0.15,
            da_pct: 0.04,
            capex_pct: 0.06,
            deltawnc_pct: 0.02,
            tax_rate: 0.206,
            mrp: 0.055,
        };
        let config = ValuationConfig::default().with_assumptions(&assumptions);
        assert_eq!(config.revenue_growth, 0.07);
        assert_eq!(config.capex_pct, 0.06);
        assert_eq!(config.horizon, DEFAULT_HORIZON);
    }
}
