//! Free cash flow to firm

/// Free cash flow to firm for one period
///
/// `ebit * (1 - tax_rate) + da - capex - delta_nwc`. The tax rate is
/// conventionally in [0, 1] but is not checked.
pub fn compute_fcff(ebit: f64, tax_rate: f64, da: f64, capex: f64, delta_nwc: f64) -> f64 {
    ebit * (1.0 - tax_rate) + da - capex - delta_nwc
}
