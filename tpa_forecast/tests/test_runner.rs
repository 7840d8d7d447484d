mod common;

use approx::assert_relative_eq;
use common::{date, forecast_config, fuel_price, hourly_frame};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tpa_forecast::columns::{HOUR, IS_LAST, PRED, PRICE};
use tpa_forecast::models::EstimatorKwargs;
use tpa_forecast::{
    add_columns, run, ConfigError, EstimatorKind, EstimatorRegistry, ForecastError, PriceFrame,
    DEFAULT_FORECAST_COLUMN,
};
use tpa_math::{MathError, Regressor};

const FEATURES: &str = "[hour, day_of_week, trend, avg_daily_price_lag1, avg_daily_price_lag2]";

#[test]
fn test_gradient_boosting_predicts_target_rows() {
    // Three weeks of history plus target rows for the following day
    let history = hourly_frame(date(2024, 6, 3), 21, fuel_price);
    let with_target = history.append_target_rows(date(2024, 6, 24)).unwrap();
    let enriched = add_columns(&with_target).unwrap();

    let config = forecast_config("HistGradientBoostingRegressor", "{}", FEATURES);
    let forecast = run(
        &enriched,
        &config,
        &EstimatorRegistry::builtin(),
        DEFAULT_FORECAST_COLUMN,
    )
    .unwrap();

    let is_last = forecast.is_last().unwrap();
    let pred = forecast.column_f64(PRED).unwrap();
    assert_eq!(is_last.iter().filter(|flag| **flag).count(), 24);

    for (flag, value) in is_last.iter().zip(&pred) {
        if *flag {
            let value = value.unwrap();
            assert!(value > 0.0);
            assert!((1.6..2.0).contains(&value), "implausible prediction {}", value);
        } else {
            assert!(value.is_none());
        }
    }

    // The evening discount is learned
    let hours = forecast.column_f64(HOUR).unwrap();
    let predicted_at = |hour: f64| {
        hours
            .iter()
            .zip(&pred)
            .find(|(h, p)| **h == Some(hour) && p.is_some())
            .and_then(|(_, p)| *p)
            .unwrap()
    };
    assert!(predicted_at(20.0) < predicted_at(12.0));
}

#[test]
fn test_linear_regression_recovers_hourly_profile() {
    let frame = hourly_frame(date(2024, 6, 3), 4, |_, hour| 1.5 + 0.01 * hour as f64);
    let enriched = add_columns(&frame).unwrap();

    let config = forecast_config("LinearRegression", "{}", "[hour]");
    let forecast = run(&enriched, &config, &EstimatorRegistry::builtin(), PRICE).unwrap();

    let is_last = forecast.is_last().unwrap();
    let prices = forecast.column_f64(PRICE).unwrap();
    let pred = forecast.column_f64(PRED).unwrap();
    for row in (0..forecast.len()).filter(|&row| is_last[row]) {
        assert_relative_eq!(pred[row].unwrap(), prices[row].unwrap(), epsilon = 1e-8);
    }
}

#[test]
fn test_run_leaves_input_untouched() {
    let enriched = add_columns(&hourly_frame(date(2024, 6, 3), 3, fuel_price)).unwrap();
    let config = forecast_config("LinearRegression", "{}", "[hour, trend]");

    let forecast = run(&enriched, &config, &EstimatorRegistry::builtin(), PRICE).unwrap();
    assert!(forecast.has_column(PRED));
    assert!(!enriched.has_column(PRED));
    assert_eq!(forecast.len(), enriched.len());
}

#[test]
fn test_no_target_rows_predicts_nothing() {
    let enriched = add_columns(&hourly_frame(date(2024, 6, 3), 3, fuel_price)).unwrap();
    let mut df = enriched.dataframe().clone();
    df.with_column(Series::new(IS_LAST.into(), vec![false; df.height()]))
        .unwrap();
    let frame = PriceFrame::new(df, enriched.time_column()).unwrap();

    let config = forecast_config("LinearRegression", "{}", "[hour]");
    let forecast = run(&frame, &config, &EstimatorRegistry::builtin(), PRICE).unwrap();

    assert!(forecast
        .column_f64(PRED)
        .unwrap()
        .iter()
        .all(|value| value.is_none()));
}

#[test]
fn test_no_training_rows_is_an_estimator_error() {
    // A single day is entirely `is_last`
    let enriched = add_columns(&hourly_frame(date(2024, 6, 3), 1, fuel_price)).unwrap();
    let config = forecast_config("HistGradientBoostingRegressor", "{}", "[hour]");

    let result = run(&enriched, &config, &EstimatorRegistry::builtin(), PRICE);
    assert!(matches!(
        result,
        Err(ForecastError::Math(MathError::InsufficientData(_)))
    ));
}

#[test]
fn test_registry_without_family_is_not_implemented() {
    let enriched = add_columns(&hourly_frame(date(2024, 6, 3), 3, fuel_price)).unwrap();
    let config = forecast_config("LinearRegression", "{}", "[hour]");

    let result = run(&enriched, &config, &EstimatorRegistry::empty(), PRICE);
    assert!(matches!(result, Err(ForecastError::NotImplemented(_))));
}

#[test]
fn test_unknown_columns_are_reported() {
    let enriched = add_columns(&hourly_frame(date(2024, 6, 3), 3, fuel_price)).unwrap();

    let config = forecast_config("LinearRegression", "{}", "[hour, temperature]");
    assert!(matches!(
        run(&enriched, &config, &EstimatorRegistry::builtin(), PRICE),
        Err(ForecastError::MissingColumn(name)) if name == "temperature"
    ));

    let config = forecast_config("LinearRegression", "{}", "[hour]");
    assert!(matches!(
        run(&enriched, &config, &EstimatorRegistry::builtin(), "diesel_price"),
        Err(ForecastError::MissingColumn(_))
    ));

    // Without features there is no `is_last` to split on
    let raw = hourly_frame(date(2024, 6, 3), 3, fuel_price);
    assert!(matches!(
        run(&raw, &config, &EstimatorRegistry::builtin(), PRICE),
        Err(ForecastError::MissingColumn(name)) if name == IS_LAST
    ));
}

/// Predicts the mean of the training target
#[derive(Debug, Default)]
struct MeanRegressor {
    mean: Option<f64>,
}

impl Regressor for MeanRegressor {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> tpa_math::Result<()> {
        self.mean = y.mean();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> tpa_math::Result<Array1<f64>> {
        let mean = self
            .mean
            .ok_or_else(|| MathError::NotFitted(self.name().to_string()))?;
        Ok(Array1::from_elem(x.nrows(), mean))
    }

    fn name(&self) -> &str {
        "MeanRegressor"
    }
}

fn build_mean_regressor(_kwargs: &EstimatorKwargs) -> Result<Box<dyn Regressor>, ConfigError> {
    Ok(Box::new(MeanRegressor::default()))
}

#[test]
fn test_custom_factory_replaces_builtin() {
    let registry = EstimatorRegistry::builtin()
        .with_estimator(EstimatorKind::LinearRegression, build_mean_regressor);
    let enriched = add_columns(&hourly_frame(date(2024, 6, 3), 2, |day, _| {
        if day == 0 {
            1.70
        } else {
            1.90
        }
    }))
    .unwrap();

    let config = forecast_config("LinearRegression", "{}", "[hour]");
    let forecast = run(&enriched, &config, &registry, PRICE).unwrap();

    let pred: Vec<f64> = forecast
        .column_f64(PRED)
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(pred.len(), 24);
    assert!(pred.iter().all(|value| (value - 1.70).abs() < 1e-12));
}
