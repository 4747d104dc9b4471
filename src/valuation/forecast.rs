//! Explicit forecast rows

use serde::{Deserialize, Serialize};

use super::fcff::compute_fcff;

/// One forecast year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// Forecast year (1-indexed)
    pub year: u32,

    // Operating lines, all fixed fractions of revenue
    pub revenue: f64,
    pub ebit: f64,
    pub da: f64,
    pub capex: f64,
    pub delta_nwc: f64,

    // Cash flow and discounting
    pub fcff: f64,
    pub discount_factor: f64,
    pub pv_fcff: f64,
}

impl ForecastRow {
    pub fn ebitda(&self) -> f64 {
        self.ebit + self.da
    }
}

/// Operating drivers applied to every forecast year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingDrivers {
    pub base_revenue: f64,
    pub revenue_growth: f64,
    pub ebit_margin: f64,
    pub da_pct: f64,
    pub capex_pct: f64,
    pub deltawnc_pct: f64,
    pub tax_rate: f64,
}

impl OperatingDrivers {
    /// Revenue in year `t`: `base * (1 + g)^t`
    pub fn revenue_in(&self, year: u32) -> f64 {
        self.base_revenue * (1.0 + self.revenue_growth).powi(year as i32)
    }

    /// Project `horizon` years of operating lines and FCFF, discounted at `wacc`
    pub fn project(&self, horizon: u32, wacc: f64) -> Vec<ForecastRow> {
        (1..=horizon)
            .map(|year| {
                let revenue = self.revenue_in(year);
                let ebit = revenue * self.ebit_margin;
                let da = revenue * self.da_pct;
                let capex = revenue * self.capex_pct;
                let delta_nwc = revenue * self.deltawnc_pct;

                let fcff = compute_fcff(ebit, self.tax_rate, da, capex, delta_nwc);
                let discount_factor = super::discount::discount_factor(wacc, year);

                ForecastRow {
                    year,
                    revenue,
                    ebit,
                    da,
                    capex,
                    delta_nwc,
                    fcff,
                    discount_factor,
                    pv_fcff: fcff / (1.0 + wacc).powi(year as i32),
                }
            })
            .collect()
    }
}
