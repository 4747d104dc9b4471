//! Market data records and the resolved/unavailable lookup result

use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, HistoricalStatements};
use crate::config::ValuationConfig;

/// Outcome of a best-effort external lookup
///
/// `Unavailable` carries the reason for display; no value is ever guessed.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Resolved(T),
    Unavailable(String),
}

impl<T> Lookup<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Lookup::Unavailable(reason.into())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Lookup::Resolved(_))
    }

    /// Resolved value, dropping the reason
    pub fn ok(self) -> Option<T> {
        match self {
            Lookup::Resolved(value) => Some(value),
            Lookup::Unavailable(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Resolved(value) => Lookup::Resolved(f(value)),
            Lookup::Unavailable(reason) => Lookup::Unavailable(reason),
        }
    }

    /// Resolved value or a fallback
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Lookup::Resolved(value) => value,
            Lookup::Unavailable(_) => default,
        }
    }
}

/// An amount with its currency code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    pub amount: f64,
    pub currency: String,
}

impl Money {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_uppercase(),
        }
    }
}

/// Latest quote data for a listed company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub ticker: String,
    /// Last traded price
    pub price: f64,
    /// Currency of price, market cap, net debt and statements
    pub currency: String,
    pub shares_outstanding: f64,
    pub market_cap: f64,
    pub net_debt: f64,
}

/// Quote data and reported history in one currency
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub market: MarketData,
    pub history: HistoricalStatements,
}

impl MarketSnapshot {
    pub fn currency(&self) -> &str {
        &self.market.currency
    }

    /// Seed a config from this snapshot
    ///
    /// Revenue, shares and net debt come from the data; operating assumptions
    /// are proposed from history. Capital-structure weights use market cap
    /// and net debt when both are positive.
    pub fn seed_config(&self, base: ValuationConfig) -> ValuationConfig {
        let mut config = base.with_assumptions(&Assumptions::propose(&self.history));

        if let Some(revenue) = self.history.last_revenue() {
            config.revenue = revenue;
        }
        if self.market.shares_outstanding.is_finite() {
            config.shares_outstanding = self.market.shares_outstanding;
        }
        if self.market.net_debt.is_finite() {
            config.net_debt = self.market.net_debt;
        }
        if self.market.market_cap > 0.0 && self.market.net_debt > 0.0 {
            config.equity_weight = self.market.market_cap;
            config.debt_weight = self.market.net_debt;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::StatementRow;
    use chrono::NaiveDate;

    #[test]
    fn test_lookup_combinators() {
        let resolved: Lookup<f64> = Lookup::Resolved(2.0);
        assert_eq!(resolved.clone().map(|v| v * 3.0), Lookup::Resolved(6.0));
        assert_eq!(resolved.ok(), Some(2.0));

        let missing: Lookup<f64> = Lookup::unavailable("no quote");
        assert!(!missing.is_resolved());
        assert_eq!(missing.clone().map(|v| v + 1.0), Lookup::unavailable("no quote"));
        assert_eq!(missing.unwrap_or(0.0), 0.0);
    }

    #[test]
    fn test_seed_config() {
        let mut row = StatementRow::empty(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        row.revenue = 5_000.0;
        row.ebit = 600.0;

        let snapshot = MarketSnapshot {
            market: MarketData {
                ticker: "ABC".into(),
                price: 120.0,
                currency: "SEK".into(),
                shares_outstanding: 40.0,
                market_cap: 4_800.0,
                net_debt: 1_200.0,
            },
            history: HistoricalStatements::new(vec![row]),
        };

        let config = snapshot.seed_config(ValuationConfig::default());
        assert_eq!(config.revenue, 5_000.0);
        assert_eq!(config.shares_outstanding, 40.0);
        assert_eq!(config.net_debt, 1_200.0);
        assert_eq!(config.equity_weight, 4_800.0);
        assert_eq!(config.debt_weight, 1_200.0);
        assert!((config.ebit_margin - 0.12).abs() < 1e-12);
    }
}
