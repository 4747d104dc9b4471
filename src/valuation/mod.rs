//! Valuation engine: closed-form DCF formulas, the forecast pipeline and
//! sensitivity grids
//!
//! Everything here is pure. Hard assumption violations are returned as
//! `ValuationError`; unavailable results are NaN.

mod fcff;
mod wacc;
mod terminal;
mod discount;
mod forecast;
mod engine;
pub mod sensitivity;
pub mod implied;

pub use fcff::compute_fcff;
pub use wacc::{cost_of_equity, cost_of_debt_after_tax, compute_wacc};
pub use terminal::{TerminalMethod, terminal_value_perpetuity, terminal_value_exit_multiple};
pub use discount::{
    discount_factor, discount_cash_flows, enterprise_value_from_fcff, equity_value_from_ev,
    per_share_value,
};
pub use forecast::{ForecastRow, OperatingDrivers};
pub use engine::{ValuationEngine, Valuation, ValuationResult};
pub use sensitivity::{SensitivityGrid, sensitivity_wacc_g, sensitivity_wacc_exit};
pub use implied::{implied_wacc, upside};
