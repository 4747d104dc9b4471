//! Market-implied discount rate (reverse DCF) and upside to market price
//!
//! The implied WACC is the rate at which the model's value per share equals
//! the quoted price, holding every other assumption fixed.

use crate::config::ValuationConfig;
use super::engine::ValuationEngine;
use super::terminal::TerminalMethod;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 200;

/// Upper end of the WACC search interval
const MAX_WACC: f64 = 1.0;

/// Value per share at a given WACC, NaN if the model is undefined there
fn per_share_at(config: &ValuationConfig, wacc: f64) -> f64 {
    let config = ValuationConfig { wacc_override: Some(wacc), ..config.clone() };
    ValuationEngine::new(config)
        .run()
        .map(|v| v.result.per_share_value)
        .unwrap_or(f64::NAN)
}

/// Solve for the WACC that prices the equity at `market_price`
///
/// Uses bisection over `(lower, 1.0]`, where `lower` sits just above the
/// terminal growth rate for the perpetuity method (the model diverges at g)
/// and just above -99% otherwise.
///
/// # Returns
/// * `None` if the price is not a positive number, the share count makes the
///   per-share value unavailable, or the price is outside the bracketed range
pub fn implied_wacc(config: &ValuationConfig, market_price: f64) -> Option<f64> {
    if !market_price.is_finite() || market_price <= 0.0 || config.shares_outstanding <= 0.0 {
        return None;
    }

    let low = match config.method {
        TerminalMethod::Perpetuity => config.g + 1e-6,
        TerminalMethod::ExitMultiple => -0.99,
    };
    if low >= MAX_WACC {
        return None;
    }

    bisect(|wacc| per_share_at(config, wacc) - market_price, low, MAX_WACC)
}

/// Root of `f` in `[low, high]`, `None` unless the ends bracket a sign change
///
/// Evaluates `f` once per step; the value at the lower end is carried over.
fn bisect<F: FnMut(f64) -> f64>(mut f: F, mut low: f64, mut high: f64) -> Option<f64> {
    let mut f_low = f(low);
    let f_high = f(high);
    if f_low.is_nan() || f_high.is_nan() || f_low * f_high > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let f_mid = f(mid);

        if f_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if f_mid * f_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            f_low = f_mid;
        }
    }

    Some((low + high) / 2.0)
}

/// Upside of intrinsic value over market price, e.g. 0.25 for +25%
///
/// NaN when either value is unavailable or the price is not positive.
pub fn upside(per_share: f64, market_price: f64) -> f64 {
    if !per_share.is_finite() || !market_price.is_finite() || market_price <= 0.0 {
        return f64::NAN;
    }
    per_share / market_price - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> ValuationConfig {
        ValuationConfig {
            revenue: 1_000.0,
            revenue_growth: 0.04,
            ebit_margin: 0.15,
            horizon: 5,
            shares_outstanding: 10.0,
            g: 0.02,
            ..Default::default()
        }
    }

    #[test]
    fn test_implied_wacc_recovers_model_rate() {
        let base = config();
        let price = ValuationEngine::new(base.clone()).run().unwrap().result.per_share_value;

        let implied = implied_wacc(&base, price).unwrap();
        assert_relative_eq!(implied, base.wacc(), epsilon = 1e-6);
    }

    #[test]
    fn test_higher_price_implies_lower_wacc() {
        let base = config();
        let price = ValuationEngine::new(base.clone()).run().unwrap().result.per_share_value;

        let cheap = implied_wacc(&base, price * 0.8).unwrap();
        let rich = implied_wacc(&base, price * 1.2).unwrap();
        assert!(rich < base.wacc() && base.wacc() < cheap);
    }

    #[test]
    fn test_exit_multiple_method() {
        let base = ValuationConfig { method: TerminalMethod::ExitMultiple, ..config() };
        let price = ValuationEngine::new(base.clone()).run().unwrap().result.per_share_value;
        let implied = implied_wacc(&base, price).unwrap();
        assert_relative_eq!(implied, base.wacc(), epsilon = 1e-6);
    }

    #[test]
    fn test_unavailable_inputs() {
        assert!(implied_wacc(&config(), 0.0).is_none());
        assert!(implied_wacc(&config(), f64::NAN).is_none());

        let no_shares = ValuationConfig { shares_outstanding: 0.0, ..config() };
        assert!(implied_wacc(&no_shares, 50.0).is_none());
    }

    #[test]
    fn test_unreachable_price() {
        // Negative equity at every rate cannot match a positive price
        let config = ValuationConfig { net_debt: 1e12, ..config() };
        assert!(implied_wacc(&config, 10.0).is_none());
    }

    #[test]
    fn test_bisect_evaluates_once_per_step() {
        let mut calls = 0;
        let root = bisect(
            |x| {
                calls += 1;
                x * x - 0.3
            },
            0.0,
            1.0,
        )
        .unwrap();

        assert_relative_eq!(root, 0.3f64.sqrt(), epsilon = 1e-9);
        // Two bracket evaluations plus one per halving of the unit interval
        assert!(calls <= 2 + 36, "{} evaluations", calls);
    }

    #[test]
    fn test_bisect_needs_sign_change() {
        assert_eq!(bisect(|x| x + 1.0, 0.0, 1.0), None);
        assert_eq!(bisect(|_| f64::NAN, 0.0, 1.0), None);
    }

    #[test]
    fn test_upside() {
        assert_relative_eq!(upside(125.0, 100.0), 0.25);
        assert_relative_eq!(upside(80.0, 100.0), -0.2);
        assert!(upside(f64::NAN, 100.0).is_nan());
        assert!(upside(100.0, 0.0).is_nan());
    }
}
