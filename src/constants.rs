//! Market defaults for Swedish equity valuation

/// Swedish corporate tax rate (2023)
pub const DEFAULT_TAX_RATE_SE: f64 = 0.206;

/// Market risk premium assumption for Sweden
pub const DEFAULT_MRP_SE: f64 = 0.055;

/// Placeholder risk-free rate; callers are expected to override it
pub const DEFAULT_RF: f64 = 0.02;

/// Reporting currency all amounts are converted to before valuation
pub const REPORTING_CURRENCY: &str = "SEK";

/// Pre-tax cost of debt used when none is supplied
pub const DEFAULT_COST_OF_DEBT: f64 = 0.03;

/// Default explicit forecast horizon in years
pub const DEFAULT_HORIZON: u32 = 5;

/// Default perpetual growth for the terminal value
pub const DEFAULT_TERMINAL_GROWTH: f64 = 0.02;

/// Default EV/EBITDA exit multiple
pub const DEFAULT_EXIT_MULTIPLE: f64 = 10.0;

/// WACC axis: 6% to 12% in 0.5% steps
pub fn wacc_sensitivity() -> Vec<f64> {
    (0..=12).map(|i| (600.0 + 50.0 * i as f64) / 10_000.0).collect()
}

/// Terminal growth axis: 0% to 2.5% in 0.25% steps
pub fn g_sensitivity() -> Vec<f64> {
    (0..=10).map(|i| (25.0 * i as f64) / 10_000.0).collect()
}

/// Exit multiple axis: 6x to 14x
pub fn exit_multiple_sensitivity() -> Vec<f64> {
    (6..=14).map(f64::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_axes() {
        let wacc = wacc_sensitivity();
        assert_eq!(wacc.len(), 13);
        assert_relative_eq!(wacc[0], 0.06);
        assert_relative_eq!(wacc[12], 0.12);

        let g = g_sensitivity();
        assert_eq!(g.len(), 11);
        assert_relative_eq!(g[10], 0.025);

        let multiples = exit_multiple_sensitivity();
        assert_eq!(multiples, vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0]);
    }
}
