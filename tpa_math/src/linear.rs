//! Ordinary least squares regression.
//!
//! The design matrix (optionally prefixed with a column of ones) is solved
//! with SVD, which copes with tall systems and near-collinear calendar
//! features such as `trend` and the daily price lags.

use crate::regressor::{check_fit_input, check_predict_input, Regressor};
use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`LinearRegression`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinearRegressionParams {
    /// Whether to estimate an intercept term
    pub fit_intercept: bool,
}

impl Default for LinearRegressionParams {
    fn default() -> Self {
        Self {
            fit_intercept: true,
        }
    }
}

/// Linear least squares regressor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    params: LinearRegressionParams,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl LinearRegression {
    /// Create an unfitted regressor
    pub fn new(params: LinearRegressionParams) -> Self {
        Self {
            params,
            coefficients: None,
            intercept: 0.0,
        }
    }

    /// Fitted slope coefficients, one per feature
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    /// Fitted intercept (0 when `fit_intercept` is false)
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(x, y)?;

        let offset = usize::from(self.params.fit_intercept);
        let design = DMatrix::from_fn(x.nrows(), x.ncols() + offset, |r, c| {
            if c < offset {
                1.0
            } else {
                x[[r, c - offset]]
            }
        });
        let target = DVector::from_iterator(y.len(), y.iter().copied());

        let svd = design.svd(true, true);
        // Progressively looser tolerances for near-singular designs
        let beta = [1e-10, 1e-8, 1e-6]
            .iter()
            .find_map(|&tol| {
                svd.solve(&target, tol)
                    .ok()
                    .filter(|beta| beta.iter().all(|v| v.is_finite()))
            })
            .ok_or_else(|| {
                MathError::CalculationError("least squares system is singular".to_string())
            })?;

        self.intercept = if self.params.fit_intercept { beta[0] } else { 0.0 };
        self.coefficients = Some(beta.iter().skip(offset).copied().collect());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| MathError::NotFitted(self.name().to_string()))?;
        check_predict_input(x, coefficients.len())?;

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(coefficients.iter())
                        .map(|(v, c)| v * c)
                        .sum::<f64>()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "LinearRegression"
    }
}
