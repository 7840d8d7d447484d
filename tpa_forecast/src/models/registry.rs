//! Estimator families, kinds and the factories that build them

use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tpa_math::{
    HistGradientBoostingParams, HistGradientBoostingRegressor, LinearRegression,
    LinearRegressionParams, Regressor,
};

/// Keyword arguments passed to an estimator constructor
pub type EstimatorKwargs = Mapping;

/// Builds an unfitted estimator from its keyword arguments
pub type EstimatorFactory =
    fn(&EstimatorKwargs) -> std::result::Result<Box<dyn Regressor>, ConfigError>;

/// Group of estimators sharing one fit/predict contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimatorFamily {
    /// Tabular regressors fitted on a dense feature matrix
    Sklearn,
}

impl EstimatorFamily {
    /// Every family, in declaration order
    pub const ALL: [EstimatorFamily; 1] = [EstimatorFamily::Sklearn];

    /// Name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorFamily::Sklearn => "sklearn",
        }
    }
}

impl fmt::Display for EstimatorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimatorFamily {
    type Err = ConfigError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownFamily {
                name: name.to_string(),
                allowed: Self::ALL.iter().map(|f| f.as_str().to_string()).collect(),
            })
    }
}

/// A concrete estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EstimatorKind {
    HistGradientBoostingRegressor,
    LinearRegression,
}

impl EstimatorKind {
    /// Every kind, in declaration order
    pub const ALL: [EstimatorKind; 2] = [
        EstimatorKind::HistGradientBoostingRegressor,
        EstimatorKind::LinearRegression,
    ];

    /// Family the estimator belongs to
    pub fn family(&self) -> EstimatorFamily {
        match self {
            EstimatorKind::HistGradientBoostingRegressor | EstimatorKind::LinearRegression => {
                EstimatorFamily::Sklearn
            }
        }
    }

    /// Name used for `estimator_type` in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorKind::HistGradientBoostingRegressor => "HistGradientBoostingRegressor",
            EstimatorKind::LinearRegression => "LinearRegression",
        }
    }

    /// Look up a kind by its configuration name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps estimator kinds to the factories that construct them.
///
/// A registry is an immutable value: it is assembled once and then passed
/// to config validation and to the forecast runner.
#[derive(Clone)]
pub struct EstimatorRegistry {
    factories: BTreeMap<EstimatorKind, EstimatorFactory>,
}

impl EstimatorRegistry {
    /// Registry with every built-in estimator
    pub fn builtin() -> Self {
        Self::empty()
            .with_estimator(
                EstimatorKind::HistGradientBoostingRegressor,
                build_hist_gradient_boosting,
            )
            .with_estimator(EstimatorKind::LinearRegression, build_linear_regression)
    }

    /// Registry without any estimator
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register (or replace) the factory of `kind`
    pub fn with_estimator(mut self, kind: EstimatorKind, factory: EstimatorFactory) -> Self {
        self.factories.insert(kind, factory);
        self
    }

    /// Whether any estimator of `family` is registered
    pub fn contains_family(&self, family: EstimatorFamily) -> bool {
        self.factories.keys().any(|kind| kind.family() == family)
    }

    /// Registered kinds of `family`
    pub fn kinds(&self, family: EstimatorFamily) -> Vec<EstimatorKind> {
        self.factories
            .keys()
            .filter(|kind| kind.family() == family)
            .copied()
            .collect()
    }

    /// Families with at least one registered estimator
    pub fn families(&self) -> Vec<EstimatorFamily> {
        EstimatorFamily::ALL
            .into_iter()
            .filter(|family| self.contains_family(*family))
            .collect()
    }

    /// Build an unfitted estimator of `kind` within `family`
    pub fn build(
        &self,
        family: EstimatorFamily,
        kind: EstimatorKind,
        kwargs: &EstimatorKwargs,
    ) -> std::result::Result<Box<dyn Regressor>, ConfigError> {
        let factory = self
            .factories
            .get(&kind)
            .filter(|_| kind.family() == family)
            .ok_or_else(|| ConfigError::UnknownEstimatorType {
                family: family.to_string(),
                estimator_type: kind.to_string(),
            })?;

        factory(kwargs)
    }
}

impl Default for EstimatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for EstimatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstimatorRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn parse_kwargs<P: DeserializeOwned>(
    kind: EstimatorKind,
    kwargs: &EstimatorKwargs,
) -> std::result::Result<P, ConfigError> {
    serde_yaml::from_value(Value::Mapping(kwargs.clone())).map_err(|e| invalid_kwargs(kind, e))
}

fn invalid_kwargs(kind: EstimatorKind, err: impl fmt::Display) -> ConfigError {
    ConfigError::InvalidKwargs {
        estimator_type: kind.to_string(),
        message: err.to_string(),
    }
}

fn build_hist_gradient_boosting(
    kwargs: &EstimatorKwargs,
) -> std::result::Result<Box<dyn Regressor>, ConfigError> {
    let kind = EstimatorKind::HistGradientBoostingRegressor;
    let params: HistGradientBoostingParams = parse_kwargs(kind, kwargs)?;
    let model = HistGradientBoostingRegressor::new(params).map_err(|e| invalid_kwargs(kind, e))?;
    Ok(Box::new(model))
}

fn build_linear_regression(
    kwargs: &EstimatorKwargs,
) -> std::result::Result<Box<dyn Regressor>, ConfigError> {
    let params: LinearRegressionParams = parse_kwargs(EstimatorKind::LinearRegression, kwargs)?;
    Ok(Box::new(LinearRegression::new(params)))
}
