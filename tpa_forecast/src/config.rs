//! Application configuration loaded from YAML

use crate::data::DataConfig;
use crate::error::ConfigError;
use crate::models::{create_forecast_config, EstimatorRegistry, ForecastConfig};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Read a YAML configuration file into a generic value
pub fn get_config(path: impl AsRef<Path>) -> std::result::Result<Value, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&text).map_err(|e| ConfigError::Schema(e.to_string()))
}

/// Every section the forecast pipeline reads.
///
/// Other top-level keys of the document are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_config: DataConfig,
    pub forecast_config: ForecastConfig,
}

impl AppConfig {
    /// Build from a parsed configuration document
    pub fn from_value(
        value: &Value,
        registry: &EstimatorRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        let data_config = value
            .get("data_config")
            .cloned()
            .ok_or_else(|| ConfigError::Schema("missing data_config section".to_string()))?;
        let data_config: DataConfig = serde_yaml::from_value(data_config)
            .map_err(|e| ConfigError::Schema(format!("data_config: {}", e)))?;

        Ok(Self {
            data_config,
            forecast_config: create_forecast_config(value, registry)?,
        })
    }

    /// Read and validate a configuration file
    pub fn from_path(
        path: impl AsRef<Path>,
        registry: &EstimatorRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        Self::from_value(&get_config(path)?, registry)
    }
}
