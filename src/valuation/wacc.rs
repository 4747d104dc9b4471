//! Discount rate build-up: CAPM cost of equity, after-tax cost of debt, WACC

/// CAPM cost of equity with an optional size premium on top of the MRP
pub fn cost_of_equity(rf: f64, beta: f64, mrp: f64, size_premium: f64) -> f64 {
    rf + beta * (mrp + size_premium)
}

/// Pre-tax cost of debt reduced by the interest tax shield
pub fn cost_of_debt_after_tax(cod: f64, tax_rate: f64) -> f64 {
    cod * (1.0 - tax_rate)
}

/// Weighted average cost of capital
///
/// Weights are normalised here, so callers can pass raw market values or
/// percentages. When both weights are zero the capital structure is treated as
/// all equity and the cost of equity is returned unchanged.
#[allow(clippy::too_many_arguments)]
pub fn compute_wacc(
    rf: f64,
    beta: f64,
    mrp: f64,
    size_premium: f64,
    cod: f64,
    tax_rate: f64,
    equity_weight: f64,
    debt_weight: f64,
) -> f64 {
    let coe = cost_of_equity(rf, beta, mrp, size_premium);
    let cod_at = cost_of_debt_after_tax(cod, tax_rate);

    let total = equity_weight + debt_weight;
    if total == 0.0 {
        return coe;
    }

    (equity_weight / total) * coe + (debt_weight / total) * cod_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cost_of_equity() {
        assert_relative_eq!(cost_of_equity(0.02, 1.2, 0.055, 0.01), 0.02 + 1.2 * 0.065);
    }

    #[test]
    fn test_after_tax_cost_of_debt() {
        assert_relative_eq!(cost_of_debt_after_tax(0.05, 0.206), 0.05 * 0.794);
    }

    #[test]
    fn test_wacc_blend() {
        // 0.6 * 0.07 + 0.4 * 0.024 = 0.0516
        let wacc = compute_wacc(0.02, 1.0, 0.05, 0.0, 0.03, 0.2, 60.0, 40.0);
        assert_relative_eq!(wacc, 0.0516, epsilon = 1e-12);
    }

    #[test]
    fn test_wacc_weights_need_not_sum_to_one() {
        let raw = compute_wacc(0.02, 1.0, 0.05, 0.0, 0.03, 0.2, 600.0, 400.0);
        let normalised = compute_wacc(0.02, 1.0, 0.05, 0.0, 0.03, 0.2, 0.6, 0.4);
        assert_relative_eq!(raw, normalised, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_weights_fall_back_to_cost_of_equity() {
        let wacc = compute_wacc(0.025, 0.9, 0.055, 0.004, 0.04, 0.206, 0.0, 0.0);
        assert_eq!(wacc, cost_of_equity(0.025, 0.9, 0.055, 0.004));
    }

    #[test]
    fn test_all_equity_weight() {
        let wacc = compute_wacc(0.02, 1.0, 0.055, 0.0, 0.03, 0.206, 1.0, 0.0);
        assert_relative_eq!(wacc, 0.075, epsilon = 1e-15);
    }
}
