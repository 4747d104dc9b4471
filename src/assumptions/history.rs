//! Historical statements and the heuristics that turn them into assumptions
//!
//! Missing values are NaN and are skipped when averaging.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MRP_SE, DEFAULT_TAX_RATE_SE};

/// One reported fiscal period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Fiscal period end
    pub period: NaiveDate,
    pub revenue: f64,
    pub ebit: f64,
    pub da: f64,
    pub capex: f64,
    pub delta_nwc: f64,
}

impl StatementRow {
    /// Row with every amount missing
    pub fn empty(period: NaiveDate) -> Self {
        Self {
            period,
            revenue: f64::NAN,
            ebit: f64::NAN,
            da: f64::NAN,
            capex: f64::NAN,
            delta_nwc: f64::NAN,
        }
    }

    /// Multiply every amount by `factor` (currency conversion)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            period: self.period,
            revenue: self.revenue * factor,
            ebit: self.ebit * factor,
            da: self.da * factor,
            capex: self.capex * factor,
            delta_nwc: self.delta_nwc * factor,
        }
    }
}

/// Reported history for one company, oldest period first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalStatements {
    rows: Vec<StatementRow>,
}

impl HistoricalStatements {
    /// Build from rows in any order; rows are sorted by period
    pub fn new(mut rows: Vec<StatementRow>) -> Self {
        rows.sort_by_key(|r| r.period);
        Self { rows }
    }

    pub fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// (period, value) pairs for one line item
    pub fn series<F>(&self, line: F) -> Vec<(NaiveDate, f64)>
    where
        F: Fn(&StatementRow) -> f64,
    {
        self.rows.iter().map(|r| (r.period, line(r))).collect()
    }

    pub fn revenues(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.revenue).collect()
    }

    /// Most recent revenue that is actually reported
    pub fn last_revenue(&self) -> Option<f64> {
        self.rows.iter().rev().map(|r| r.revenue).find(|v| v.is_finite())
    }

    /// Convert every amount by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rows: self.rows.iter().map(|r| r.scaled(factor)).collect(),
        }
    }
}

pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    low.max(high.min(value))
}

/// Geometric revenue growth between the first and last positive revenue
///
/// Non-positive and missing revenues are dropped first. Fewer than two
/// remaining points gives zero growth.
pub fn revenue_cagr(revenues: &[f64]) -> f64 {
    let positive: Vec<f64> = revenues.iter().copied().filter(|&r| r > 0.0).collect();
    if positive.len() < 2 {
        return 0.0;
    }

    let start = positive[0];
    let end = positive[positive.len() - 1];
    let years = (positive.len() - 1) as f64;
    (end / start).powf(1.0 / years) - 1.0
}

/// Mean of `series / revenue` over periods with a non-zero revenue
///
/// Periods where the ratio is NaN (missing values) are skipped. No usable
/// periods gives zero.
pub fn avg_margin(series: &[f64], revenues: &[f64]) -> f64 {
    let margins: Vec<f64> = series
        .iter()
        .zip(revenues)
        .filter(|&(_, &rev)| rev != 0.0)
        .map(|(&value, &rev)| value / rev)
        .filter(|m| !m.is_nan())
        .collect();

    if margins.is_empty() {
        return 0.0;
    }
    margins.iter().sum::<f64>() / margins.len() as f64
}

/// [`avg_margin`] over (period, value) pairs joined on period
///
/// Periods present in only one of the two series are dropped.
pub fn avg_margin_series(series: &[(NaiveDate, f64)], revenues: &[(NaiveDate, f64)]) -> f64 {
    let by_period: HashMap<NaiveDate, f64> = revenues.iter().copied().collect();
    let (values, revs): (Vec<f64>, Vec<f64>) = series
        .iter()
        .filter_map(|(period, value)| by_period.get(period).map(|&rev| (*value, rev)))
        .unzip();
    avg_margin(&values, &revs)
}

/// D&A as a share of revenue, bounded to [0, 20%]
pub fn propose_da_pct(da: &[(NaiveDate, f64)], revenues: &[(NaiveDate, f64)]) -> f64 {
    clamp(avg_margin_series(da, revenues), 0.0, 0.2)
}

/// Capex as a share of revenue, bounded to [0, 20%] and never below D&A
pub fn propose_capex_pct(
    capex: &[(NaiveDate, f64)],
    revenues: &[(NaiveDate, f64)],
    da_pct: f64,
) -> f64 {
    let capex_pct = clamp(avg_margin_series(capex, revenues), 0.0, 0.2);
    capex_pct.max(da_pct)
}

/// Change in NWC as a share of revenue, bounded to [-5%, 15%]
pub fn propose_delta_nwc_pct(deltawnc: &[(NaiveDate, f64)], revenues: &[(NaiveDate, f64)]) -> f64 {
    clamp(avg_margin_series(deltawnc, revenues), -0.05, 0.15)
}

/// EBIT margin, bounded to [-50%, 50%]
pub fn propose_ebit_margin(ebit: &[(NaiveDate, f64)], revenues: &[(NaiveDate, f64)]) -> f64 {
    clamp(avg_margin_series(ebit, revenues), -0.5, 0.5)
}

pub fn propose_tax_rate() -> f64 {
    DEFAULT_TAX_RATE_SE
}

pub fn propose_mrp() -> f64 {
    DEFAULT_MRP_SE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
    }

    #[test]
    fn test_revenue_cagr() {
        assert_relative_eq!(revenue_cagr(&[100.0, 110.0, 121.0]), 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_revenue_cagr_skips_non_positive() {
        assert_relative_eq!(
            revenue_cagr(&[0.0, 100.0, f64::NAN, -5.0, 121.0]),
            0.10,
            epsilon = 1e-6
        );
        assert_eq!(revenue_cagr(&[100.0]), 0.0);
        assert_eq!(revenue_cagr(&[]), 0.0);
    }

    #[test]
    fn test_avg_margin_skips_missing_and_zero_revenue() {
        let series = [10.0, f64::NAN, 30.0, 5.0];
        let revenues = [100.0, 100.0, 200.0, 0.0];
        assert_relative_eq!(avg_margin(&series, &revenues), (0.1 + 0.15) / 2.0);
    }

    #[test]
    fn test_avg_margin_empty() {
        assert_eq!(avg_margin(&[f64::NAN], &[100.0]), 0.0);
        assert_eq!(avg_margin(&[], &[]), 0.0);
    }

    fn yearly(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (date(2021 + i as i32), v))
            .collect()
    }

    #[test]
    fn test_capex_pct_floored_at_da() {
        let revenues = yearly(&[100.0, 100.0, 100.0]);
        let da_pct = propose_da_pct(&yearly(&[5.0, 5.0, 5.0]), &revenues);
        let capex_pct = propose_capex_pct(&yearly(&[4.0, 4.0, 4.0]), &revenues, da_pct);
        assert_eq!(capex_pct, da_pct);
    }

    #[test]
    fn test_proposal_bounds() {
        let revenues = yearly(&[100.0, 100.0]);
        assert_eq!(propose_da_pct(&yearly(&[50.0, 50.0]), &revenues), 0.2);
        assert_eq!(propose_delta_nwc_pct(&yearly(&[-30.0, -30.0]), &revenues), -0.05);
        assert_eq!(propose_ebit_margin(&yearly(&[90.0, 90.0]), &revenues), 0.5);
    }

    #[test]
    fn test_avg_margin_series_joins_on_period() {
        let ebit = [(date(2021), 10.0), (date(2022), 20.0)];
        let revenue = [(date(2022), 200.0)];
        assert_relative_eq!(avg_margin_series(&ebit, &revenue), 0.1);

        // Same periods in a different order
        let ebit = [(date(2022), 30.0), (date(2021), 10.0)];
        let revenue = [(date(2021), 100.0), (date(2022), 300.0)];
        assert_relative_eq!(avg_margin_series(&ebit, &revenue), 0.1);

        assert_eq!(avg_margin_series(&ebit, &[(date(2023), 100.0)]), 0.0);
    }

    #[test]
    fn test_statements_sorted_and_series() {
        let mut late = StatementRow::empty(date(2023));
        late.revenue = 120.0;
        late.ebit = 12.0;
        let mut early = StatementRow::empty(date(2021));
        early.revenue = 100.0;
        early.ebit = 8.0;

        let history = HistoricalStatements::new(vec![late, early]);
        assert_eq!(history.rows()[0].period, date(2021));

        let ebit = history.series(|r| r.ebit);
        let revenue = history.series(|r| r.revenue);
        assert_relative_eq!(avg_margin_series(&ebit, &revenue), (0.08 + 0.1) / 2.0);
        assert_eq!(history.last_revenue(), Some(120.0));
    }

    #[test]
    fn test_last_revenue_skips_missing() {
        let mut reported = StatementRow::empty(date(2022));
        reported.revenue = 90.0;
        let history = HistoricalStatements::new(vec![reported, StatementRow::empty(date(2023))]);
        assert_eq!(history.last_revenue(), Some(90.0));
    }
}
