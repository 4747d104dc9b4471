//! Equity DCF - FCFF discounted cash flow valuation for Swedish equities
//!
//! This library provides:
//! - Closed-form DCF formulas (FCFF, CAPM/WACC, terminal value, discounting, equity bridge)
//! - A forecast pipeline from operating assumptions to value per share
//! - WACC x growth and WACC x exit multiple sensitivity grids
//! - Market-implied WACC and upside versus the quoted price
//! - Assumption proposal from reported history
//! - File-backed market data and FX conversion into SEK
//! - Parallel batch valuation and tornado analysis
//! - CSV/JSON export of results

pub mod constants;
pub mod error;
pub mod config;
pub mod valuation;
pub mod assumptions;
pub mod market;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use config::ValuationConfig;
pub use error::{DataError, DcfResult, ValuationError};
pub use assumptions::{Assumptions, HistoricalStatements};
pub use market::{FileMarketData, FxProvider, FxTable, Lookup, MarketDataProvider};
pub use valuation::{SensitivityGrid, TerminalMethod, Valuation, ValuationEngine, ValuationResult};
pub use scenario::ScenarioRunner;
