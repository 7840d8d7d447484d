//! Forecast configuration, validated against an estimator registry

use super::registry::{EstimatorFamily, EstimatorKind, EstimatorKwargs, EstimatorRegistry};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// How one configured estimator is built and which columns it reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorSpec {
    /// Registered estimator kind, e.g. `HistGradientBoostingRegressor`
    pub estimator_type: String,
    /// Keyword arguments for the estimator constructor
    pub estimator_kwargs: EstimatorKwargs,
    /// Feature columns, in the order they form the feature matrix
    pub exogenous_vars: Vec<String>,
}

/// `forecast_config` section as it appears in the YAML file
#[derive(Debug, Deserialize)]
struct RawForecastConfig {
    n_before: usize,
    use_estimator_class: String,
    use_estimator: String,
    estimators: BTreeMap<String, BTreeMap<String, EstimatorSpec>>,
}

/// Validated forecast configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    n_before: usize,
    use_estimator_class: EstimatorFamily,
    use_estimator: String,
    estimators: BTreeMap<String, BTreeMap<String, EstimatorSpec>>,
}

impl ForecastConfig {
    /// Parse and validate a `forecast_config` mapping.
    ///
    /// Checks run in order: field types and `n_before > 0`, the family, the
    /// `(use_estimator_class, use_estimator)` pair, the estimator type, its
    /// keyword arguments and finally a non-empty `exogenous_vars`.
    pub fn from_value(
        value: &Value,
        registry: &EstimatorRegistry,
    ) -> std::result::Result<Self, ConfigError> {
        let raw: RawForecastConfig = serde_yaml::from_value(value.clone())
            .map_err(|e| ConfigError::Schema(e.to_string()))?;

        if raw.n_before == 0 {
            return Err(ConfigError::Schema(
                "n_before must be greater than 0".to_string(),
            ));
        }

        let family: EstimatorFamily = raw.use_estimator_class.parse()?;
        if !registry.contains_family(family) {
            return Err(ConfigError::UnknownFamily {
                name: raw.use_estimator_class,
                allowed: registry
                    .families()
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
            });
        }

        let config = Self {
            n_before: raw.n_before,
            use_estimator_class: family,
            use_estimator: raw.use_estimator,
            estimators: raw.estimators,
        };

        let (kind, spec) = config.resolve_estimator()?;
        registry.build(family, kind, &spec.estimator_kwargs)?;
        if spec.exogenous_vars.is_empty() {
            return Err(ConfigError::Schema(format!(
                "estimator '{}' needs at least one exogenous variable",
                config.use_estimator
            )));
        }

        debug!(
            family = %family,
            estimator = %config.use_estimator,
            kind = %kind,
            n_before = config.n_before,
            "validated forecast config"
        );
        Ok(config)
    }

    /// Number of most recent days used for training
    pub fn n_before(&self) -> usize {
        self.n_before
    }

    /// Selected estimator family
    pub fn use_estimator_class(&self) -> EstimatorFamily {
        self.use_estimator_class
    }

    /// Name of the selected estimator within its family
    pub fn use_estimator(&self) -> &str {
        &self.use_estimator
    }

    /// All configured estimators, by family name and estimator name
    pub fn estimators(&self) -> &BTreeMap<String, BTreeMap<String, EstimatorSpec>> {
        &self.estimators
    }

    /// Kind and spec of the selected estimator
    pub fn resolve_estimator(
        &self,
    ) -> std::result::Result<(EstimatorKind, &EstimatorSpec), ConfigError> {
        let family = self.use_estimator_class;
        let spec = self
            .estimators
            .get(family.as_str())
            .and_then(|by_name| by_name.get(&self.use_estimator))
            .ok_or_else(|| ConfigError::UnknownEstimator {
                family: family.to_string(),
                name: self.use_estimator.clone(),
            })?;

        let kind = EstimatorKind::from_name(&spec.estimator_type)
            .filter(|kind| kind.family() == family)
            .ok_or_else(|| ConfigError::UnknownEstimatorType {
                family: family.to_string(),
                estimator_type: spec.estimator_type.clone(),
            })?;

        Ok((kind, spec))
    }
}

/// Build the forecast configuration from the whole configuration document.
///
/// Reads the `forecast_config` key; a missing section fails validation.
pub fn create_forecast_config(
    config: &Value,
    registry: &EstimatorRegistry,
) -> std::result::Result<ForecastConfig, ConfigError> {
    let section = config
        .get("forecast_config")
        .cloned()
        .unwrap_or_else(|| Value::Mapping(Default::default()));
    ForecastConfig::from_value(&section, registry)
}
