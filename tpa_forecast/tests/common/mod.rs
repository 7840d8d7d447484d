#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tpa_forecast::{EstimatorRegistry, ForecastConfig, PriceFrame};

pub const TIME_COLUMN: &str = "date";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// One observation per hour for `n_days` days; `price(day_index, hour)`
pub fn hourly_observations(
    start: NaiveDate,
    n_days: u32,
    price: impl Fn(u32, u32) -> f64,
) -> Vec<(NaiveDateTime, f64)> {
    (0..n_days)
        .flat_map(|d| (0..24).map(move |h| (d, h)))
        .map(|(d, h)| {
            let day = start + chrono::Days::new(d as u64);
            (day.and_hms_opt(h, 0, 0).unwrap(), price(d, h))
        })
        .collect()
}

pub fn hourly_frame(start: NaiveDate, n_days: u32, price: impl Fn(u32, u32) -> f64) -> PriceFrame {
    PriceFrame::from_observations(TIME_COLUMN, &hourly_observations(start, n_days, price)).unwrap()
}

/// Typical daily cycle: cheap in the evening, expensive in the morning
pub fn fuel_price(day: u32, hour: u32) -> f64 {
    let daily = 1.80 + 0.002 * (day % 5) as f64;
    if hour >= 18 {
        daily - 0.06
    } else if hour < 8 {
        daily + 0.04
    } else {
        daily
    }
}

/// Raw table with one `{sorte}_{station}` column per entry of `columns`
pub fn raw_price_table(
    observations: &[(NaiveDateTime, f64)],
    columns: &[(&str, Vec<Option<f64>>)],
) -> DataFrame {
    let millis: Vec<i64> = observations
        .iter()
        .map(|(ts, _)| ts.and_utc().timestamp_millis())
        .collect();
    let mut series: Vec<Column> = vec![Series::new(TIME_COLUMN.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .unwrap()
        .into()];
    for (name, values) in columns {
        series.push(Series::new((*name).into(), values.clone()).into());
    }
    DataFrame::new(series).unwrap()
}

pub fn forecast_yaml(estimator_type: &str, kwargs: &str, exogenous_vars: &str) -> String {
    format!(
        r#"
n_before: 30
use_estimator_class: sklearn
use_estimator: selected
estimators:
  sklearn:
    selected:
      estimator_type: {estimator_type}
      estimator_kwargs: {kwargs}
      exogenous_vars: {exogenous_vars}
"#
    )
}

pub fn forecast_config(estimator_type: &str, kwargs: &str, exogenous_vars: &str) -> ForecastConfig {
    let value: serde_yaml::Value =
        serde_yaml::from_str(&forecast_yaml(estimator_type, kwargs, exogenous_vars)).unwrap();
    ForecastConfig::from_value(&value, &EstimatorRegistry::builtin()).unwrap()
}
