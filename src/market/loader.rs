//! File-backed market data
//!
//! A data directory holds `quotes.csv`
//! (`ticker,price,currency,shares_outstanding,market_cap,net_debt`) and,
//! optionally, `financials.csv` in the format read by
//! [`crate::assumptions::loader`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::data::{Lookup, MarketData};
use super::MarketDataProvider;
use crate::assumptions::loader::{load_financials, FINANCIALS_FILE};
use crate::assumptions::HistoricalStatements;
use crate::error::DataError;

/// Default file name inside a data directory
pub const QUOTES_FILE: &str = "quotes.csv";

/// Raw CSV row matching quotes.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    ticker: String,
    price: f64,
    currency: String,
    shares_outstanding: f64,
    market_cap: Option<f64>,
    net_debt: Option<f64>,
}

impl CsvRow {
    fn into_market_data(self) -> Result<MarketData, DataError> {
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(DataError::Invalid {
                field: "ticker".into(),
                reason: "empty ticker".into(),
            });
        }

        // Market cap falls back to price x shares when not quoted
        let market_cap = self
            .market_cap
            .unwrap_or(self.price * self.shares_outstanding);

        Ok(MarketData {
            ticker,
            price: self.price,
            currency: self.currency.trim().to_uppercase(),
            shares_outstanding: self.shares_outstanding,
            market_cap,
            net_debt: self.net_debt.unwrap_or(0.0),
        })
    }
}

/// Load quotes keyed by upper-cased ticker
pub fn load_quotes<P: AsRef<Path>>(path: P) -> Result<HashMap<String, MarketData>, DataError> {
    let file = File::open(path)?;
    load_quotes_from_reader(file)
}

/// Load quotes from any reader (e.g. string buffer)
pub fn load_quotes_from_reader<R: Read>(
    reader: R,
) -> Result<HashMap<String, MarketData>, DataError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut quotes = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let data = row.into_market_data()?;
        quotes.insert(data.ticker.clone(), data);
    }

    log::debug!("loaded {} quotes", quotes.len());
    Ok(quotes)
}

/// Market data read once from a directory of CSV files
#[derive(Debug, Clone, Default)]
pub struct FileMarketData {
    quotes: HashMap<String, MarketData>,
    financials: HashMap<String, HistoricalStatements>,
}

impl FileMarketData {
    pub fn new(
        quotes: HashMap<String, MarketData>,
        financials: HashMap<String, HistoricalStatements>,
    ) -> Self {
        Self { quotes, financials }
    }

    /// Load `quotes.csv` and, when present, `financials.csv`
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        let quotes = load_quotes(dir.join(QUOTES_FILE))?;

        let financials_path = dir.join(FINANCIALS_FILE);
        let financials = if financials_path.exists() {
            load_financials(&financials_path)?
        } else {
            log::warn!("{} not found, proposals will use defaults", financials_path.display());
            HashMap::new()
        };

        log::info!(
            "market data from {}: {} quotes, {} histories",
            dir.display(),
            quotes.len(),
            financials.len()
        );
        Ok(Self::new(quotes, financials))
    }

    pub fn tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.quotes.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }
}

impl MarketDataProvider for FileMarketData {
    fn market_data(&self, ticker: &str) -> Lookup<MarketData> {
        match self.quotes.get(&ticker.to_uppercase()) {
            Some(data) => Lookup::Resolved(data.clone()),
            None => Lookup::unavailable(format!("no quote for {}", ticker)),
        }
    }

    fn financials(&self, ticker: &str) -> Lookup<HistoricalStatements> {
        match self.financials.get(&ticker.to_uppercase()) {
            Some(history) => Lookup::Resolved(history.clone()),
            None => Lookup::unavailable(format!("no reported history for {}", ticker)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const QUOTES: &str = "\
ticker,price,currency,shares_outstanding,market_cap,net_debt
volv-b.st,250.5,sek,2033,,40000
AAPL,190,USD,15500,2945000,-50000
";

    #[test]
    fn test_load_quotes_from_reader() {
        let quotes = load_quotes_from_reader(QUOTES.as_bytes()).unwrap();
        assert_eq!(quotes.len(), 2);

        let volvo = &quotes["VOLV-B.ST"];
        assert_eq!(volvo.currency, "SEK");
        assert_eq!(volvo.market_cap, 250.5 * 2033.0);
        assert_eq!(quotes["AAPL"].net_debt, -50000.0);
    }

    #[test]
    fn test_unknown_ticker_is_unavailable() {
        let quotes = load_quotes_from_reader(QUOTES.as_bytes()).unwrap();
        let provider = FileMarketData::new(quotes, HashMap::new());
        assert!(provider.market_data("aapl").is_resolved());
        assert!(!provider.market_data("MSFT").is_resolved());
        assert!(!provider.financials("AAPL").is_resolved());
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(QUOTES_FILE), QUOTES).unwrap();
        fs::write(
            dir.path().join(FINANCIALS_FILE),
            "ticker,period,revenue,ebit,da,capex,delta_nwc\n\
             AAPL,2023,383000,114000,11500,11000,2000\n",
        )
        .unwrap();

        let provider = FileMarketData::from_dir(dir.path()).unwrap();
        assert_eq!(provider.tickers(), vec!["AAPL", "VOLV-B.ST"]);

        let snapshot = provider.snapshot("AAPL").ok().unwrap();
        assert_eq!(snapshot.history.last_revenue(), Some(383000.0));
        assert_eq!(snapshot.currency(), "USD");

        // Quote without history still gives a snapshot
        let volvo = provider.snapshot("VOLV-B.ST").ok().unwrap();
        assert!(volvo.history.is_empty());
    }

    #[test]
    fn test_from_dir_missing_quotes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(FileMarketData::from_dir(dir.path()), Err(DataError::Io(_))));
    }
}
