//! Error types for valuation and data loading

use thiserror::Error;

/// Result type for valuation operations
pub type DcfResult<T> = Result<T, ValuationError>;

/// Hard failures raised by the valuation engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    /// An assumption makes the model undefined (e.g. g >= WACC in a perpetuity)
    #[error("invalid assumption: {reason}")]
    InvalidAssumption {
        /// What was violated
        reason: String,
    },
}

impl ValuationError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAssumption { reason: reason.into() }
    }
}

/// Errors from loading inputs or writing exports
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A period column could not be read as YYYY-MM-DD
    #[error("invalid date '{value}': {source}")]
    Date {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A value parsed but is outside its domain (e.g. a negative FX rate)
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_assumption_message() {
        let err = ValuationError::invalid("terminal growth 0.05 must be below WACC 0.05");
        assert_eq!(
            err.to_string(),
            "invalid assumption: terminal growth 0.05 must be below WACC 0.05"
        );
    }

    #[test]
    fn test_invalid_field_message() {
        let err = DataError::Invalid {
            field: "FX rate USD/SEK".into(),
            reason: "-1 is not a positive number".into(),
        };
        assert_eq!(err.to_string(), "invalid FX rate USD/SEK: -1 is not a positive number");
    }
}
