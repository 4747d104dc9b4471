//! Currency conversion into the reporting currency

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::data::{Lookup, MarketSnapshot, Money};
use crate::constants::REPORTING_CURRENCY;
use crate::error::DataError;

/// Default file name inside a data directory
pub const FX_FILE: &str = "fx_rates.csv";

/// Source of FX quotes
pub trait FxProvider {
    /// Units of `to` per one unit of `from`
    fn fx_rate(&self, from: &str, to: &str) -> Lookup<f64>;
}

/// Convert an amount, short-circuiting same-currency conversions
pub fn convert(money: &Money, target: &str, fx: &dyn FxProvider) -> Lookup<Money> {
    let target = target.to_uppercase();
    if money.currency == target {
        return Lookup::Resolved(money.clone());
    }
    fx.fx_rate(&money.currency, &target)
        .map(|rate| Money::new(money.amount * rate, target.clone()))
}

/// Convert an amount into SEK
pub fn convert_to_sek(amount: f64, currency: &str, fx: &dyn FxProvider) -> Lookup<f64> {
    convert(&Money::new(amount, currency), REPORTING_CURRENCY, fx).map(|m| m.amount)
}

impl MarketSnapshot {
    /// Convert price, market cap, net debt and every statement amount into `target`
    pub fn in_currency(&self, target: &str, fx: &dyn FxProvider) -> Lookup<MarketSnapshot> {
        let target = target.to_uppercase();
        let from = self.currency().to_uppercase();

        let rate = if from == target {
            Lookup::Resolved(1.0)
        } else {
            fx.fx_rate(&from, &target)
        };

        rate.map(|rate| {
            let mut market = self.market.clone();
            market.price *= rate;
            market.market_cap *= rate;
            market.net_debt *= rate;
            market.currency = target.clone();

            MarketSnapshot {
                market,
                history: self.history.scaled(rate),
            }
        })
    }
}

/// In-memory table of FX rates keyed by (from, to)
#[derive(Debug, Clone, Default)]
pub struct FxTable {
    rates: HashMap<(String, String), f64>,
}

/// Raw CSV row matching fx_rates.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    from: String,
    to: String,
    rate: f64,
}

impl FxTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rate; non-positive or non-finite rates are rejected
    pub fn insert(&mut self, from: &str, to: &str, rate: f64) -> Result<(), DataError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DataError::Invalid {
                field: format!("FX rate {}/{}", from, to),
                reason: format!("{} is not a positive number", rate),
            });
        }
        self.rates.insert((from.to_uppercase(), to.to_uppercase()), rate);
        Ok(())
    }

    /// Load rates from a CSV file with columns `from,to,rate`
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut table = Self::new();

        for result in csv_reader.deserialize() {
            let row: CsvRow = result?;
            table.insert(row.from.trim(), row.to.trim(), row.rate)?;
        }

        log::debug!("loaded {} FX rates", table.len());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FxProvider for FxTable {
    fn fx_rate(&self, from: &str, to: &str) -> Lookup<f64> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from == to {
            return Lookup::Resolved(1.0);
        }

        if let Some(&rate) = self.rates.get(&(from.clone(), to.clone())) {
            return Lookup::Resolved(rate);
        }
        // An inverse quote is the same market rate, not an estimate
        if let Some(&rate) = self.rates.get(&(to.clone(), from.clone())) {
            return Lookup::Resolved(1.0 / rate);
        }

        Lookup::unavailable(format!("no FX quote for {}/{}", from, to))
    }
}
