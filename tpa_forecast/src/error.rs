//! Error types for the tpa_forecast crate

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;
use tpa_math::MathError;

/// Errors raised while reading or validating the configuration.
///
/// All of these surface before any data is loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing fields, wrong value types or out-of-range values
    #[error("Schema validation failed: {0}")]
    Schema(String),

    /// `use_estimator_class` is not a family of the estimator registry
    #[error("Unknown estimator family '{name}'. Allowed values are {allowed:?}")]
    UnknownFamily { name: String, allowed: Vec<String> },

    /// `use_estimator` has no entry under the selected family
    #[error("Estimator '{name}' is not configured under family '{family}'")]
    UnknownEstimator { family: String, name: String },

    /// `estimator_type` is not registered for the selected family
    #[error("Estimator type '{estimator_type}' is not registered for family '{family}'")]
    UnknownEstimatorType {
        family: String,
        estimator_type: String,
    },

    /// Keyword arguments that the estimator does not accept
    #[error("Invalid keyword arguments for {estimator_type}: {message}")]
    InvalidKwargs {
        estimator_type: String,
        message: String,
    },

    /// The configuration file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Custom error types for the tpa_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A column required by the pipeline is absent
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An operation needs a loaded price series
    #[error("No df is loaded in the object.")]
    NoDataLoaded,

    /// The estimator family is known but has no implementation
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Error from configuration parsing or validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error raised by an estimator
    #[error("Estimator error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
