//! Terminal value beyond the explicit forecast horizon

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DcfResult, ValuationError};

/// How the terminal value is computed; exactly one per valuation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalMethod {
    /// Gordon growth on the FCFF following the last forecast year
    #[default]
    Perpetuity,
    /// EV/EBITDA multiple on terminal-year EBITDA
    #[serde(rename = "exit")]
    ExitMultiple,
}

impl TerminalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalMethod::Perpetuity => "perpetuity",
            TerminalMethod::ExitMultiple => "exit",
        }
    }
}

impl fmt::Display for TerminalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerminalMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "perpetuity" | "gordon" => Ok(TerminalMethod::Perpetuity),
            "exit" | "exit-multiple" | "multiple" => Ok(TerminalMethod::ExitMultiple),
            other => Err(format!(
                "unknown terminal method '{}' (expected perpetuity or exit)",
                other
            )),
        }
    }
}

/// Gordon growth terminal value: `fcff_next / (wacc - g)`
///
/// `fcff_next` is the cash flow of the first year after the horizon, usually
/// `last_fcff * (1 + g)`. Growth at or above the discount rate has no finite
/// value and is rejected before dividing, as is a NaN rate.
pub fn terminal_value_perpetuity(fcff_next: f64, wacc: f64, g: f64) -> DcfResult<f64> {
    if g.is_nan() || wacc.is_nan() || g >= wacc {
        return Err(ValuationError::invalid(format!(
            "terminal growth {} must be below WACC {}",
            g, wacc
        )));
    }
    Ok(fcff_next / (wacc - g))
}

/// Exit multiple terminal value: `ebitda * exit_multiple`
///
/// Any multiple is accepted; sanity of the multiple is left to the caller.
pub fn terminal_value_exit_multiple(ebitda: f64, exit_multiple: f64) -> f64 {
    ebitda * exit_multiple
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perpetuity_closed_form() {
        let tv = terminal_value_perpetuity(102.0, 0.08, 0.02).unwrap();
        assert_eq!(tv, 102.0 / (0.08 - 0.02));
    }

    #[test]
    fn test_perpetuity_rejects_growth_at_wacc() {
        let err = terminal_value_perpetuity(100.0, 0.05, 0.05).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidAssumption { .. }));
    }

    #[test]
    fn test_perpetuity_rejects_growth_above_wacc() {
        assert!(terminal_value_perpetuity(100.0, 0.05, 0.06).is_err());
        assert!(terminal_value_perpetuity(-100.0, -0.01, 0.0).is_err());
    }

    #[test]
    fn test_perpetuity_rejects_nan_rates() {
        assert!(terminal_value_perpetuity(100.0, 0.08, f64::NAN).is_err());
        assert!(terminal_value_perpetuity(100.0, f64::NAN, 0.02).is_err());
    }

    #[test]
    fn test_perpetuity_is_idempotent() {
        let a = terminal_value_perpetuity(123.456, 0.0731, 0.0177).unwrap();
        let b = terminal_value_perpetuity(123.456, 0.0731, 0.0177).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_exit_multiple() {
        assert_eq!(terminal_value_exit_multiple(50.0, 8.0), 400.0);
        assert_eq!(terminal_value_exit_multiple(50.0, -2.0), -100.0);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("perpetuity".parse::<TerminalMethod>().unwrap(), TerminalMethod::Perpetuity);
        assert_eq!("EXIT".parse::<TerminalMethod>().unwrap(), TerminalMethod::ExitMultiple);
        assert!("dividend".parse::<TerminalMethod>().is_err());
    }

    #[test]
    fn test_method_serde_names() {
        let json = serde_json::to_string(&TerminalMethod::ExitMultiple).unwrap();
        assert_eq!(json, "\"exit\"");
        let parsed: TerminalMethod = serde_json::from_str("\"perpetuity\"").unwrap();
        assert_eq!(parsed, TerminalMethod::Perpetuity);
    }
}
