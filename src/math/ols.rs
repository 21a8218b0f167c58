//! Ordinary least squares with an intercept.
//!
//! Each (cell, cause) pair fits a tiny regression:
//!
//! ```text
//! y ≈ b0 + b1 * year + b2 * |month - peak_month|
//! ```
//!
//! Implementation choices:
//! - Features and target are centered first and the intercept is recovered as
//!   `b0 = mean(y) - Σ b_j * mean(x_j)`. Raw year values (~2000) would otherwise
//!   dominate the conditioning of the design matrix.
//! - The centered system is solved with SVD. Singular values under the tolerance
//!   are treated as zero, which yields the minimum-norm solution when a feature
//!   is constant (e.g. a single-year history) instead of failing.

use nalgebra::{DMatrix, DVector};

/// Singular-value cutoffs tried in order, strictest first.
const SVD_TOLERANCES: [f64; 3] = [1e-10, 1e-8, 1e-6];

/// Minimum-norm least squares solution of `x * beta = y` via SVD.
///
/// `None` when no tolerance yields a finite solution.
pub fn solve_least_squares(x: DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.svd(true, true);
    SVD_TOLERANCES
        .iter()
        .filter_map(|&eps| svd.solve(y, eps).ok())
        .find(|beta| beta.iter().all(|v| v.is_finite()))
}

/// A fitted linear model `y = intercept + Σ coefficients[j] * x[j]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel<const P: usize> {
    pub intercept: f64,
    pub coefficients: [f64; P],
}

impl<const P: usize> LinearModel<P> {
    pub fn predict(&self, x: &[f64; P]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x.iter())
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }
}

/// Fit `y` against `features` with an intercept.
///
/// Returns `None` for empty or mismatched input, or when the solve fails.
pub fn fit_linear<const P: usize>(features: &[[f64; P]], y: &[f64]) -> Option<LinearModel<P>> {
    let n = y.len();
    if n == 0 || features.len() != n {
        return None;
    }
    let n_f = n as f64;

    let mut x_mean = [0.0; P];
    for row in features {
        for (m, v) in x_mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    for m in &mut x_mean {
        *m /= n_f;
    }
    let y_mean = y.iter().sum::<f64>() / n_f;

    let x = DMatrix::from_fn(n, P, |i, j| features[i][j] - x_mean[j]);
    let y_centered = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));

    let beta = solve_least_squares(x, &y_centered)?;

    let mut coefficients = [0.0; P];
    for (c, b) in coefficients.iter_mut().zip(beta.iter()) {
        *c = *b;
    }
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(x_mean.iter())
            .map(|(b, m)| b * m)
            .sum::<f64>();

    if !intercept.is_finite() {
        return None;
    }

    Some(LinearModel {
        intercept,
        coefficients,
    })
}
