//! # TPA Math
//!
//! Regression estimators used by the fuel price forecast pipeline.
//! Every estimator works on dense `ndarray` feature matrices and implements
//! the [`Regressor`] trait, so callers can swap them without knowing the
//! concrete type.

use thiserror::Error;

// Estimator modules
pub mod binning;
pub mod gradient_boosting;
pub mod linear;
pub mod regressor;

pub use gradient_boosting::{HistGradientBoostingParams, HistGradientBoostingRegressor};
pub use linear::{LinearRegression, LinearRegressionParams};
pub use regressor::Regressor;

/// Errors that can occur while fitting or evaluating an estimator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Estimator is not fitted: {0}")]
    NotFitted(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for estimator operations
pub type Result<T> = std::result::Result<T, MathError>;
