mod common;

use common::{date, fuel_price, hourly_observations, raw_price_table};
use polars::prelude::*;
use std::fs::{self, File};
use tempfile::TempDir;
use tpa_forecast::columns::PRED;
use tpa_forecast::{EstimatorRegistry, Forecast, ForecastError, LocalDataSource, SummaryColumn};

const CONFIG: &str = r#"
data_config:
  df_path: prices/stations.parquet
  df_format: parquet
  date_column: date
forecast_config:
  n_before: 14
  use_estimator_class: sklearn
  use_estimator: hgb
  estimators:
    sklearn:
      hgb:
        estimator_type: HistGradientBoostingRegressor
        estimator_kwargs:
          max_iter: 60
        exogenous_vars: [hour, day_of_week, trend, avg_daily_price_lag1]
"#;

/// Temp directory holding a config file and three weeks of station prices
fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.yaml"), CONFIG).unwrap();
    fs::create_dir(dir.path().join("prices")).unwrap();

    let observations = hourly_observations(date(2024, 6, 3), 21, fuel_price);
    let diesel: Vec<Option<f64>> = observations.iter().map(|(_, p)| Some(*p)).collect();
    let empty: Vec<Option<f64>> = vec![None; observations.len()];
    let mut df = raw_price_table(
        &observations,
        &[("diesel_aral1", diesel), ("e10_aral1", empty)],
    );

    let file = File::create(dir.path().join("prices/stations.parquet")).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();
    dir
}

fn forecast(dir: &TempDir) -> Forecast<LocalDataSource> {
    Forecast::from_config_path(
        dir.path().join("config.yaml"),
        EstimatorRegistry::builtin(),
        LocalDataSource::new(dir.path()),
    )
    .unwrap()
}

#[test]
fn test_forecast_workflow() {
    let dir = setup();
    let mut forecast = forecast(&dir);
    assert_eq!(forecast.config().forecast_config.n_before(), 14);

    let loaded = forecast
        .load_df_on("aral1", "diesel", true, date(2024, 6, 24))
        .unwrap();
    assert_eq!(loaded.len(), 22 * 24);

    let predicted = forecast.create_forecast().unwrap();
    // The window keeps the 14 most recent days
    assert_eq!(predicted.n_days().unwrap(), 14);
    assert_eq!(predicted.len(), 14 * 24);

    let is_last = predicted.is_last().unwrap();
    let pred = predicted.column_f64(PRED).unwrap();
    for (flag, value) in is_last.iter().zip(&pred) {
        assert_eq!(*flag, value.is_some());
        if let Some(value) = value {
            assert!(*value > 0.0);
        }
    }
}

#[test]
fn test_create_summaries() {
    let dir = setup();
    let mut forecast = forecast(&dir);
    forecast.load_df("aral1", "diesel", false).unwrap();

    let by_hour = forecast.create_summaries(SummaryColumn::Hour).unwrap();
    assert_eq!(by_hour.len(), 24);
    let mean = by_hour.values().iter().sum::<f64>() / 24.0;
    assert!(mean.abs() < 1e-12);

    let by_weekday = forecast.create_summaries(SummaryColumn::DayOfWeek).unwrap();
    assert_eq!(by_weekday.len(), 7);

    let by_trend = forecast.create_summaries(SummaryColumn::Trend).unwrap();
    assert_eq!(by_trend.len(), 21);
}

#[test]
fn test_no_data_loaded() {
    let dir = setup();
    let mut forecast = forecast(&dir);

    assert!(forecast.df().is_none());
    assert!(matches!(
        forecast.create_forecast(),
        Err(ForecastError::NoDataLoaded)
    ));
    assert!(matches!(
        forecast.create_summaries(SummaryColumn::Hour),
        Err(ForecastError::NoDataLoaded)
    ));

    // A fuel type without any recorded price loads as an empty series
    let loaded = forecast.load_df("aral1", "e10", false).unwrap();
    assert!(loaded.is_empty());
    assert!(matches!(
        forecast.create_forecast(),
        Err(ForecastError::NoDataLoaded)
    ));
}

#[test]
fn test_invalid_config_fails_before_loading() {
    let dir = setup();
    let invalid = CONFIG.replace("use_estimator: hgb", "use_estimator: xgb");
    fs::write(dir.path().join("config.yaml"), invalid).unwrap();

    let result = Forecast::from_config_path(
        dir.path().join("config.yaml"),
        EstimatorRegistry::builtin(),
        LocalDataSource::new(dir.path()),
    );
    assert!(matches!(result, Err(ForecastError::Config(_))));
}
