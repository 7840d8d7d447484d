//! Calendar and lag features derived from the price timestamps
//!
//! [`add_columns`] enriches a price series with the columns every estimator
//! draws its exogenous variables from. Daily price lags are computed once per
//! distinct day and broadcast back onto every row of that day.

use crate::columns::{
    AVG_DAILY_PRICE_LAGS, DAY, DAY_OF_WEEK, HOUR, HOUR_FORMAT, IS_LAST, PRICE, TREND, WEEK,
};
use crate::data::{date_to_epoch_days, PriceFrame};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Derive the calendar, trend, lag and `is_last` columns.
///
/// Row count and row order are preserved. Derived columns that already exist
/// are replaced, so enriching an enriched frame gives the same frame back.
pub fn add_columns(frame: &PriceFrame) -> Result<PriceFrame> {
    if frame.is_empty() {
        return Err(ForecastError::DataError(
            "cannot derive features from an empty price series".to_string(),
        ));
    }

    let timestamps = required(frame.timestamps()?, frame.time_column())?;
    let prices = required(frame.column_f64(PRICE)?, PRICE)?;
    let days: Vec<NaiveDate> = timestamps.iter().map(|ts| ts.date()).collect();

    let first_day = days.iter().min().copied().unwrap_or_default();
    let last_day = days.iter().max().copied().unwrap_or_default();

    let day_lags = daily_price_lags(&days, &prices);

    let mut df = frame.dataframe().clone();
    df.with_column(date_series(DAY, &days)?)?;
    df.with_column(Series::new(
        DAY_OF_WEEK.into(),
        days.iter()
            .map(|d| d.weekday().num_days_from_monday() as i32)
            .collect::<Vec<i32>>(),
    ))?;
    df.with_column(Series::new(
        HOUR.into(),
        timestamps.iter().map(half_hour).collect::<Vec<f64>>(),
    ))?;
    df.with_column(Series::new(
        HOUR_FORMAT.into(),
        timestamps
            .iter()
            .map(|ts| ts.format("%H:%M").to_string())
            .collect::<Vec<String>>(),
    ))?;
    df.with_column(Series::new(
        TREND.into(),
        days.iter()
            .map(|d| (*d - first_day).num_days())
            .collect::<Vec<i64>>(),
    ))?;
    df.with_column(Series::new(
        WEEK.into(),
        days.iter()
            .map(|d| d.format("%Y-%W").to_string())
            .collect::<Vec<String>>(),
    ))?;

    for (lag_index, name) in AVG_DAILY_PRICE_LAGS.iter().enumerate() {
        let values: Vec<f64> = days
            .iter()
            .map(|d| day_lags.get(d).map_or(f64::NAN, |lags| lags[lag_index]))
            .collect();
        df.with_column(Series::new((*name).into(), values))?;
    }

    df.with_column(Series::new(
        IS_LAST.into(),
        days.iter().map(|d| *d == last_day).collect::<Vec<bool>>(),
    ))?;

    debug!(
        rows = df.height(),
        days = day_lags.len(),
        %first_day,
        %last_day,
        "derived feature columns"
    );

    Ok(frame.with_dataframe(df))
}

/// Hour of the day in half-hour steps
fn half_hour(ts: &NaiveDateTime) -> f64 {
    let bucket = if ts.minute() >= 30 { 0.5 } else { 0.0 };
    ts.hour() as f64 + bucket
}

/// Lagged daily mean prices keyed by day.
///
/// Lag `k` of the `i`-th distinct day is the mean of day `i - k`; the first
/// `k` days take the earliest day's mean.
fn daily_price_lags(
    days: &[NaiveDate],
    prices: &[f64],
) -> BTreeMap<NaiveDate, [f64; AVG_DAILY_PRICE_LAGS.len()]> {
    let mut totals: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (day, price) in days.iter().zip(prices) {
        let entry = totals.entry(*day).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    let means: Vec<f64> = totals
        .values()
        .map(|(sum, count)| sum / *count as f64)
        .collect();

    totals
        .keys()
        .enumerate()
        .map(|(i, day)| {
            let mut lags = [0.0; AVG_DAILY_PRICE_LAGS.len()];
            for (k, lag) in lags.iter_mut().enumerate() {
                *lag = means[i.saturating_sub(k + 1)];
            }
            (*day, lags)
        })
        .collect()
}

fn required<T>(values: Vec<Option<T>>, name: &str) -> Result<Vec<T>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                ForecastError::DataError(format!("column '{}' is null at row {}", name, row))
            })
        })
        .collect()
}

fn date_series(name: &str, days: &[NaiveDate]) -> Result<Series> {
    let physical: Vec<i32> = days.iter().map(|d| date_to_epoch_days(*d)).collect();
    Ok(Series::new(name.into(), physical).cast(&DataType::Date)?)
}
