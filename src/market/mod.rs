//! Market data and FX behind capability traits
//!
//! Lookups never guess: a missing quote or rate is reported as
//! [`Lookup::Unavailable`] and callers decide how to present it.

mod data;
pub mod fx;
pub mod loader;

pub use data::{Lookup, MarketData, MarketSnapshot, Money};
pub use fx::{convert, convert_to_sek, FxProvider, FxTable, FX_FILE};
pub use loader::{load_quotes, load_quotes_from_reader, FileMarketData, QUOTES_FILE};

use crate::assumptions::HistoricalStatements;

/// Source of quotes and reported history
pub trait MarketDataProvider {
    fn market_data(&self, ticker: &str) -> Lookup<MarketData>;

    fn financials(&self, ticker: &str) -> Lookup<HistoricalStatements>;

    /// Quote plus history; missing history gives an empty one
    fn snapshot(&self, ticker: &str) -> Lookup<MarketSnapshot> {
        self.market_data(ticker).map(|market| {
            let history = match self.financials(ticker) {
                Lookup::Resolved(history) => history,
                Lookup::Unavailable(reason) => {
                    log::warn!("{}: {}", market.ticker, reason);
                    HistoricalStatements::default()
                }
            };
            MarketSnapshot { market, history }
        })
    }
}
