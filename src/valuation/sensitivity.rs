//! Two-dimensional sensitivity grids for heatmap analysis
//!
//! Rows are indexed by the second parameter (terminal growth or exit multiple)
//! and columns by WACC. Every grid is fully populated and rectangular; cells
//! whose inputs have no valid terminal value hold NaN.

use serde::{Deserialize, Serialize};

use super::terminal::{terminal_value_exit_multiple, terminal_value_perpetuity};

/// Row-major grid of values over two ordered axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Row axis (g values or exit multiples)
    pub row_axis: Vec<f64>,
    /// Column axis (WACC values)
    pub col_axis: Vec<f64>,
    values: Vec<f64>,
}

impl SensitivityGrid {
    /// Build a grid by evaluating `cell(row_value, col_value)` for every pair
    pub fn from_fn<F>(row_axis: &[f64], col_axis: &[f64], mut cell: F) -> Self
    where
        F: FnMut(f64, f64) -> f64,
    {
        let mut values = Vec::with_capacity(row_axis.len() * col_axis.len());
        for &r in row_axis {
            for &c in col_axis {
                values.push(cell(r, c));
            }
        }

        Self {
            row_axis: row_axis.to_vec(),
            col_axis: col_axis.to_vec(),
            values,
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_axis.len(), self.col_axis.len())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.row_axis.len() || col >= self.col_axis.len() {
            return None;
        }
        self.values.get(row * self.col_axis.len() + col).copied()
    }

    /// Iterate rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics; with no columns there are no values to chunk anyway
        self.values.chunks(self.col_axis.len().max(1))
    }

    /// Number of NaN cells (the invalid region)
    pub fn invalid_cells(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

/// Perpetuity terminal value over (g, WACC)
///
/// Cell (i, j) is the Gordon value of `fcff_last * (1 + g_i)` at `wacc_j`,
/// or NaN where `g_i >= wacc_j`.
pub fn sensitivity_wacc_g(
    fcff_last: f64,
    wacc_values: &[f64],
    g_values: &[f64],
) -> SensitivityGrid {
    SensitivityGrid::from_fn(g_values, wacc_values, |g, wacc| {
        terminal_value_perpetuity(fcff_last * (1.0 + g), wacc, g).unwrap_or(f64::NAN)
    })
}

/// Discounted exit-multiple terminal value over (multiple, WACC)
///
/// Known approximation: each cell is discounted by `(1 + wacc)^k` where `k` is
/// the number of WACC values on the axis, not the forecast horizon.
pub fn sensitivity_wacc_exit(
    ebitda: f64,
    wacc_values: &[f64],
    exit_multiples: &[f64],
) -> SensitivityGrid {
    let exponent = wacc_values.len() as i32;
    SensitivityGrid::from_fn(exit_multiples, wacc_values, |multiple, wacc| {
        terminal_value_exit_multiple(ebitda, multiple) / (1.0 + wacc).powi(exponent)
    })
}
