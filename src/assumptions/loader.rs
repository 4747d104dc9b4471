//! CSV loader for historical financial statements
//!
//! Expected columns: `ticker,period,revenue,ebit,da,capex,delta_nwc`.
//! `period` is `YYYY-MM-DD` or a bare fiscal year (taken as 31 December).
//! Empty amount cells are treated as missing.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use super::history::{HistoricalStatements, StatementRow};
use crate::error::DataError;

/// Default file name inside a data directory
pub const FINANCIALS_FILE: &str = "financials.csv";

/// Raw CSV row matching financials.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    ticker: String,
    period: String,
    revenue: Option<f64>,
    ebit: Option<f64>,
    da: Option<f64>,
    capex: Option<f64>,
    delta_nwc: Option<f64>,
}

impl CsvRow {
    fn into_statement(self) -> Result<(String, StatementRow), DataError> {
        let period = parse_period(&self.period)?;
        let missing = f64::NAN;

        let row = StatementRow {
            period,
            revenue: self.revenue.unwrap_or(missing),
            ebit: self.ebit.unwrap_or(missing),
            da: self.da.unwrap_or(missing),
            capex: self.capex.unwrap_or(missing),
            delta_nwc: self.delta_nwc.unwrap_or(missing),
        };
        Ok((self.ticker.trim().to_uppercase(), row))
    }
}

/// Parse `YYYY-MM-DD` or a fiscal year like `2023`
pub fn parse_period(value: &str) -> Result<NaiveDate, DataError> {
    let trimmed = value.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        if let Some(date) = NaiveDate::from_ymd_opt(year, 12, 31) {
            return Ok(date);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|source| DataError::Date {
        value: trimmed.to_string(),
        source,
    })
}

/// Load statements for every ticker in a CSV file
pub fn load_financials<P: AsRef<Path>>(
    path: P,
) -> Result<HashMap<String, HistoricalStatements>, DataError> {
    let file = File::open(path)?;
    load_financials_from_reader(file)
}

/// Load statements from any reader (e.g. string buffer)
pub fn load_financials_from_reader<R: Read>(
    reader: R,
) -> Result<HashMap<String, HistoricalStatements>, DataError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut by_ticker: HashMap<String, Vec<StatementRow>> = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let (ticker, statement) = row.into_statement()?;
        by_ticker.entry(ticker).or_default().push(statement);
    }

    log::debug!("loaded financial history for {} tickers", by_ticker.len());

    Ok(by_ticker
        .into_iter()
        .map(|(ticker, rows)| (ticker, HistoricalStatements::new(rows)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ticker,period,revenue,ebit,da,capex,delta_nwc
volv-b.st,2023,552000,69000,18000,21000,4000
VOLV-B.ST,2022-12-31,473000,51000,17000,19000,
ERIC-B.ST,2023-12-31,263000,,9000,5000,-2000
";

    #[test]
    fn test_load_from_reader() {
        let loaded = load_financials_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(loaded.len(), 2);

        let volvo = &loaded["VOLV-B.ST"];
        assert_eq!(volvo.len(), 2);
        // Sorted oldest first
        assert_eq!(volvo.rows()[0].revenue, 473000.0);
        assert!(volvo.rows()[0].delta_nwc.is_nan());

        let ericsson = &loaded["ERIC-B.ST"];
        assert!(ericsson.rows()[0].ebit.is_nan());
        assert_eq!(ericsson.rows()[0].delta_nwc, -2000.0);
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("2021").unwrap(), NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
        assert_eq!(
            parse_period(" 2022-06-30 ").unwrap(),
            NaiveDate::from_ymd_opt(2022, 6, 30).unwrap()
        );
        assert!(matches!(parse_period("FY22"), Err(DataError::Date { .. })));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        let csv = "ticker,period,revenue,ebit,da,capex,delta_nwc\nABC,2023,lots,1,1,1,1\n";
        assert!(matches!(load_financials_from_reader(csv.as_bytes()), Err(DataError::Csv(_))));
    }
}
