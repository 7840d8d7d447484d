//! Common interface for regression estimators

use crate::{MathError, Result};
use ndarray::{Array1, Array2};
use std::fmt::Debug;

/// A regression estimator that can be fitted on a feature matrix and
/// predict a target for new rows.
pub trait Regressor: Debug + Send + Sync {
    /// Fit the estimator on `x` (one row per sample) and target `y`
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict the target for every row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Name of the estimator
    fn name(&self) -> &str;
}

/// Validate a training set before fitting
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() == 0 {
        return Err(MathError::InsufficientData(
            "cannot fit on 0 samples".to_string(),
        ));
    }
    if x.ncols() == 0 {
        return Err(MathError::InvalidInput(
            "feature matrix has no columns".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "feature rows ({}) don't match target length ({})",
            x.nrows(),
            y.len()
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "training data contains NaN or infinite values".to_string(),
        ));
    }

    Ok(())
}

/// Validate a prediction matrix against the fitted feature count
pub(crate) fn check_predict_input(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.nrows() > 0 && x.ncols() != n_features {
        return Err(MathError::InvalidInput(format!(
            "expected {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "prediction data contains NaN or infinite values".to_string(),
        ));
    }

    Ok(())
}
