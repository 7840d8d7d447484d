//! Training window selection

use crate::columns::DAY;
use crate::data::PriceFrame;
use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use tracing::{info, warn};

/// Keep the rows of the `n_before` most recent calendar days.
///
/// The window is `[max_day - (n_before - 1), max_day]`. A `day` column is
/// derived from the timestamps when the frame does not carry one yet.
pub fn filter_n_days_before(frame: &PriceFrame, n_before: usize) -> Result<PriceFrame> {
    if n_before == 0 {
        return Err(ForecastError::InvalidParameter(
            "n_before must be at least 1".to_string(),
        ));
    }

    let days = frame.days()?;
    let max_day = days.iter().flatten().max().copied().ok_or_else(|| {
        ForecastError::DataError("cannot window a price series without days".to_string())
    })?;
    let min_day = max_day
        .checked_sub_days(Days::new(n_before as u64 - 1))
        .unwrap_or(NaiveDate::MIN);

    let frame = if frame.has_column(DAY) {
        frame.clone()
    } else {
        with_day_column(frame, &days)?
    };

    let mask: Vec<bool> = days
        .iter()
        .map(|day| day.is_some_and(|d| d >= min_day && d <= max_day))
        .collect();
    let windowed = frame.filter_rows(&mask)?;

    let n_days = windowed.n_days()?;
    if n_days < n_before {
        warn!(n_before, n_days, "window holds fewer days than requested");
    }
    info!(
        %min_day,
        %max_day,
        rows = windowed.len(),
        dropped = frame.len() - windowed.len(),
        "applied training window"
    );

    Ok(windowed)
}

fn with_day_column(frame: &PriceFrame, days: &[Option<NaiveDate>]) -> Result<PriceFrame> {
    let physical: Vec<Option<i32>> = days
        .iter()
        .map(|day| day.map(crate::data::date_to_epoch_days))
        .collect();
    let day_series = Series::new(DAY.into(), physical).cast(&DataType::Date)?;

    let mut df = frame.dataframe().clone();
    df.with_column(day_series)?;
    Ok(frame.with_dataframe(df))
}
