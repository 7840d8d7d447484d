//! Estimator registry and forecast configuration

pub mod config;
pub mod registry;

pub use config::{create_forecast_config, EstimatorSpec, ForecastConfig};
pub use registry::{
    EstimatorFactory, EstimatorFamily, EstimatorKind, EstimatorKwargs, EstimatorRegistry,
};
