//! Present value, enterprise value and the equity bridge
//!
//! Cash flows are annual and arrive at the end of each forecast year. The
//! terminal value is assumed to arrive with the last explicit year.

/// End-of-year discount factor for year `t` at an annual rate
pub fn discount_factor(rate: f64, t: u32) -> f64 {
    1.0 / (1.0 + rate).powi(t as i32)
}

/// Present value of each FCFF; element `t` (1-indexed) is `fcff / (1+wacc)^t`
///
/// Rates at or below -100% are not meaningful; callers validate WACC first.
pub fn discount_cash_flows(fcffs: &[f64], wacc: f64) -> Vec<f64> {
    fcffs
        .iter()
        .enumerate()
        .map(|(i, fcff)| fcff / (1.0 + wacc).powi(i as i32 + 1))
        .collect()
}

/// Enterprise value: PV of explicit FCFFs plus the terminal value discounted
/// at the same exponent as the last forecast year
pub fn enterprise_value_from_fcff(fcffs: &[f64], wacc: f64, terminal_value: f64) -> f64 {
    let pv_explicit: f64 = discount_cash_flows(fcffs, wacc).iter().sum();
    let n = fcffs.len() as i32;
    pv_explicit + terminal_value / (1.0 + wacc).powi(n)
}

/// Bridge from enterprise value to equity value
///
/// A negative result is a valid outcome, not an error.
pub fn equity_value_from_ev(
    ev: f64,
    net_debt: f64,
    minority_interest: f64,
    investments: f64,
) -> f64 {
    ev - net_debt - minority_interest + investments
}

/// Equity value per share, or NaN when the share count is not positive
///
/// A zero or negative share count is a data problem the caller has to show
/// as unavailable; it does not abort the pipeline.
pub fn per_share_value(equity_value: f64, shares_outstanding: f64) -> f64 {
    if shares_outstanding <= 0.0 {
        return f64::NAN;
    }
    equity_value / shares_outstanding
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factors() {
        assert_eq!(discount_factor(0.1, 0), 1.0);
        assert_relative_eq!(discount_factor(0.1, 2), 1.0 / 1.21, epsilon = 1e-15);
    }

    #[test]
    fn test_discount_cash_flows() {
        let pvs = discount_cash_flows(&[110.0, 121.0, 133.1], 0.1);
        assert_eq!(pvs.len(), 3);
        for pv in pvs {
            assert_relative_eq!(pv, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_discount_empty() {
        assert!(discount_cash_flows(&[], 0.08).is_empty());
    }

    #[test]
    fn test_enterprise_value() {
        let fcffs = [100.0, 110.0, 120.0];
        let wacc = 0.1;
        let tv = 120.0 * 1.02 / (0.1 - 0.02);

        let ev = enterprise_value_from_fcff(&fcffs, wacc, tv);
        let expected = 100.0 / 1.1 + 110.0 / 1.21 + 120.0 / 1.331 + tv / 1.331;
        assert_relative_eq!(ev, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_equity_bridge() {
        assert_eq!(equity_value_from_ev(1000.0, 200.0, 50.0, 30.0), 780.0);
        // Net cash raises equity value
        assert_eq!(equity_value_from_ev(1000.0, -100.0, 0.0, 0.0), 1100.0);
        // Negative equity is reported, not rejected
        assert_eq!(equity_value_from_ev(100.0, 300.0, 0.0, 0.0), -200.0);
    }

    #[test]
    fn test_per_share_value() {
        assert_eq!(per_share_value(780.0, 10.0), 78.0);
        assert_eq!(per_share_value(-50.0, 10.0), -5.0);
    }

    #[test]
    fn test_per_share_unavailable_for_bad_share_count() {
        for x in [0.0, 1.0, -250.0, 1e12] {
            assert!(per_share_value(x, 0.0).is_nan());
            assert!(per_share_value(x, -5.0).is_nan());
        }
    }

    #[test]
    fn test_valuation_flow_positive() {
        let fcffs = [100.0, 110.0, 120.0];
        let wacc = 0.1;
        let tv = crate::valuation::terminal_value_perpetuity(120.0 * 1.02, wacc, 0.02).unwrap();
        let ev = enterprise_value_from_fcff(&fcffs, wacc, tv);
        let eq = equity_value_from_ev(ev, 50.0, 0.0, 0.0);
        assert!(per_share_value(eq, 10.0) > 0.0);
    }
}
