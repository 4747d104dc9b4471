//! Formatting and export of valuation results
//!
//! Unavailable numbers (NaN or infinite) are never printed as `NaN`: text
//! output shows `n/a`, CSV cells are left empty and JSON fields are `null`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::REPORTING_CURRENCY;
use crate::error::DataError;
use crate::valuation::{SensitivityGrid, TerminalMethod, Valuation};

/// Marker for values that could not be computed
pub const UNAVAILABLE: &str = "n/a";

fn available(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Insert `,` every three digits of the integer part
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

/// `1234567.8` -> `"1,234,568 SEK"` at zero decimals
pub fn format_currency(value: f64, currency: &str, decimals: usize) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    format!("{} {}", group_thousands(&format!("{:.*}", decimals, value)), currency)
}

/// `0.075` -> `"7.5%"` at one decimal
pub fn as_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    format!("{:.*}%", decimals, value * 100.0)
}

fn cell(value: f64) -> String {
    match available(value) {
        Some(v) => format!("{:.2}", v),
        None => String::new(),
    }
}

/// Write the explicit forecast as CSV
///
/// Columns: `Year,Revenue,EBIT,DA,Capex,DeltaNWC,FCFF,PV_FCFF`
pub fn write_forecast_csv<W: Write>(writer: W, valuation: &Valuation) -> Result<(), DataError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "Year", "Revenue", "EBIT", "DA", "Capex", "DeltaNWC", "FCFF", "PV_FCFF",
    ])?;

    for row in &valuation.forecast {
        csv_writer.write_record([
            row.year.to_string(),
            cell(row.revenue),
            cell(row.ebit),
            cell(row.da),
            cell(row.capex),
            cell(row.delta_nwc),
            cell(row.fcff),
            cell(row.pv_fcff),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write a sensitivity grid as CSV
///
/// The header row is `row_label` followed by the WACC axis in percent; each
/// line starts with its row axis value. Invalid cells are empty.
pub fn write_grid_csv<W: Write>(
    writer: W,
    grid: &SensitivityGrid,
    row_label: &str,
) -> Result<(), DataError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![row_label.to_string()];
    header.extend(grid.col_axis.iter().map(|&w| as_percent(w, 2)));
    csv_writer.write_record(&header)?;

    for (&axis_value, values) in grid.row_axis.iter().zip(grid.rows()) {
        let mut record = vec![axis_value.to_string()];
        record.extend(values.iter().map(|&v| cell(v)));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Headline figures of one valuation, ready for JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub ticker: String,
    pub currency: String,
    pub valued_on: NaiveDate,
    pub method: TerminalMethod,
    pub wacc: f64,
    pub terminal_value: f64,
    pub pv_terminal_value: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    /// `None` when the share count is not positive
    pub per_share_value: Option<f64>,
    pub market_price: Option<f64>,
    pub upside: Option<f64>,
    pub implied_wacc: Option<f64>,
}

impl ValuationSummary {
    pub fn new(ticker: &str, currency: &str, valued_on: NaiveDate, valuation: &Valuation) -> Self {
        Self {
            ticker: ticker.to_string(),
            currency: currency.to_string(),
            valued_on,
            method: valuation.method,
            wacc: valuation.wacc,
            terminal_value: valuation.terminal_value,
            pv_terminal_value: valuation.pv_terminal_value,
            enterprise_value: valuation.result.enterprise_value,
            equity_value: valuation.result.equity_value,
            per_share_value: available(valuation.result.per_share_value),
            market_price: None,
            upside: None,
            implied_wacc: None,
        }
    }

    /// Attach market comparison figures
    pub fn with_market(mut self, price: f64, upside: f64, implied_wacc: Option<f64>) -> Self {
        self.market_price = available(price);
        self.upside = available(upside);
        self.implied_wacc = implied_wacc;
        self
    }

    /// Human-readable lines for the terminal
    pub fn lines(&self) -> Vec<String> {
        let per_share = self
            .per_share_value
            .map(|v| format_currency(v, &self.currency, 2))
            .unwrap_or_else(|| UNAVAILABLE.to_string());
        let whole = |amount: f64| format_currency(amount, &self.currency, 0);

        let mut lines = vec![
            format!("Ticker:            {}", self.ticker),
            format!("Valued on:         {}", self.valued_on),
            format!("Terminal method:   {}", self.method),
            format!("WACC:              {}", as_percent(self.wacc, 2)),
            format!("Terminal value:    {}", whole(self.terminal_value)),
            format!("Enterprise value:  {}", whole(self.enterprise_value)),
            format!("Equity value:      {}", whole(self.equity_value)),
            format!("Value per share:   {}", per_share),
        ];

        if let Some(price) = self.market_price {
            lines.push(format!("Market price:      {}", format_currency(price, &self.currency, 2)));
            lines.push(format!(
                "Upside:            {}",
                self.upside.map(|u| as_percent(u, 1)).unwrap_or_else(|| UNAVAILABLE.to_string())
            ));
            lines.push(format!(
                "Implied WACC:      {}",
                self.implied_wacc
                    .map(|w| as_percent(w, 2))
                    .unwrap_or_else(|| UNAVAILABLE.to_string())
            ));
        }
        lines
    }
}

/// Paths written by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub forecast: PathBuf,
    pub summary: PathBuf,
}

/// Write `<ticker>_forecast.csv` and `<ticker>_summary.json` into `dir`
pub fn export_summary(
    dir: &Path,
    summary: &ValuationSummary,
    valuation: &Valuation,
) -> Result<ExportPaths, DataError> {
    fs::create_dir_all(dir)?;

    let paths = ExportPaths {
        forecast: dir.join(format!("{}_forecast.csv", summary.ticker)),
        summary: dir.join(format!("{}_summary.json", summary.ticker)),
    };

    write_forecast_csv(File::create(&paths.forecast)?, valuation)?;

    let mut json = File::create(&paths.summary)?;
    serde_json::to_writer_pretty(&mut json, summary)?;
    writeln!(json)?;

    log::info!("exported {} and {}", paths.forecast.display(), paths.summary.display());
    Ok(paths)
}

/// Export with a summary dated today in the reporting currency
pub fn export(dir: &Path, ticker: &str, valuation: &Valuation) -> Result<ExportPaths, DataError> {
    let today = Local::now().date_naive();
    let summary = ValuationSummary::new(ticker, REPORTING_CURRENCY, today, valuation);
    export_summary(dir, &summary, valuation)
}
