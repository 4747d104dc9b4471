//! Valuation pipeline: forecast -> FCFF -> WACC -> terminal value -> EV ->
//! equity value -> value per share

use serde::{Deserialize, Serialize};

use crate::config::ValuationConfig;
use crate::error::{DcfResult, ValuationError};
use super::discount::{enterprise_value_from_fcff, equity_value_from_ev, per_share_value};
use super::forecast::{ForecastRow, OperatingDrivers};
use super::sensitivity::{sensitivity_wacc_exit, sensitivity_wacc_g, SensitivityGrid};
use super::terminal::{terminal_value_exit_multiple, terminal_value_perpetuity, TerminalMethod};

/// Headline valuation figures, each derived from the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub enterprise_value: f64,
    pub equity_value: f64,
    /// NaN when the share count is not positive
    pub per_share_value: f64,
}

/// Complete output of one valuation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Explicit forecast years
    pub forecast: Vec<ForecastRow>,

    /// Discount rate used for every year
    pub wacc: f64,

    pub method: TerminalMethod,

    /// Terminal value at the end of the last forecast year (undiscounted)
    pub terminal_value: f64,

    /// Terminal value discounted to today
    pub pv_terminal_value: f64,

    /// Sum of discounted explicit FCFFs
    pub pv_explicit: f64,

    pub result: ValuationResult,
}

impl Valuation {
    /// Share of enterprise value coming from the terminal value
    pub fn terminal_share(&self) -> f64 {
        if self.result.enterprise_value == 0.0 {
            return f64::NAN;
        }
        self.pv_terminal_value / self.result.enterprise_value
    }

    /// Terminal value grid around this run's last forecast year
    ///
    /// WACC x g for the perpetuity method, WACC x exit multiple otherwise.
    /// `second_axis` holds the g values or the multiples accordingly.
    pub fn terminal_grid(&self, wacc_values: &[f64], second_axis: &[f64]) -> SensitivityGrid {
        match self.method {
            TerminalMethod::Perpetuity => {
                let fcff_last = self.forecast.last().map_or(f64::NAN, |r| r.fcff);
                sensitivity_wacc_g(fcff_last, wacc_values, second_axis)
            }
            TerminalMethod::ExitMultiple => {
                let ebitda = self.forecast.last().map_or(f64::NAN, |r| r.ebitda());
                sensitivity_wacc_exit(ebitda, wacc_values, second_axis)
            }
        }
    }
}

/// Runs the full valuation for a config
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    config: ValuationConfig,
}

impl ValuationEngine {
    pub fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    fn drivers(&self) -> OperatingDrivers {
        OperatingDrivers {
            base_revenue: self.config.revenue,
            revenue_growth: self.config.revenue_growth,
            ebit_margin: self.config.ebit_margin,
            da_pct: self.config.da_pct,
            capex_pct: self.config.capex_pct,
            deltawnc_pct: self.config.deltawnc_pct,
            tax_rate: self.config.tax_rate,
        }
    }

    /// Check inputs that would make discounting undefined
    fn validate(&self, wacc: f64) -> DcfResult<()> {
        if self.config.horizon == 0 {
            return Err(ValuationError::invalid("forecast horizon must be at least 1 year"));
        }
        if !wacc.is_finite() || wacc <= -1.0 {
            return Err(ValuationError::invalid(format!(
                "WACC {} must be finite and above -100%",
                wacc
            )));
        }
        Ok(())
    }

    /// Run the valuation
    ///
    /// Fails with `InvalidAssumption` on a zero horizon, an unusable WACC, or
    /// terminal growth at or above WACC under the perpetuity method.
    pub fn run(&self) -> DcfResult<Valuation> {
        let wacc = self.config.wacc();
        self.validate(wacc)?;

        let forecast = self.drivers().project(self.config.horizon, wacc);
        let fcffs: Vec<f64> = forecast.iter().map(|r| r.fcff).collect();

        // validate() guarantees at least one row
        let last = &forecast[forecast.len() - 1];

        let terminal_value = match self.config.method {
            TerminalMethod::Perpetuity => {
                let fcff_next = last.fcff * (1.0 + self.config.g);
                terminal_value_perpetuity(fcff_next, wacc, self.config.g)?
            }
            TerminalMethod::ExitMultiple => {
                terminal_value_exit_multiple(last.ebitda(), self.config.exit_multiple)
            }
        };

        let enterprise_value = enterprise_value_from_fcff(&fcffs, wacc, terminal_value);
        let equity_value = equity_value_from_ev(
            enterprise_value,
            self.config.net_debt,
            self.config.minority_interest,
            self.config.investments,
        );
        let per_share = per_share_value(equity_value, self.config.shares_outstanding);

        let pv_explicit: f64 = forecast.iter().map(|r| r.pv_fcff).sum();
        let pv_terminal_value = terminal_value / (1.0 + wacc).powi(self.config.horizon as i32);

        Ok(Valuation {
            forecast,
            wacc,
            method: self.config.method,
            terminal_value,
            pv_terminal_value,
            pv_explicit,
            result: ValuationResult {
                enterprise_value,
                equity_value,
                per_share_value: per_share,
            },
        })
    }
}
