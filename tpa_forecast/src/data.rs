//! Price series handling for forecasting
//!
//! A [`PriceFrame`] owns a polars `DataFrame` together with the name of its
//! timestamp column. Pipeline stages borrow a frame and hand back a new one,
//! so a caller's table is never modified behind its back.

use crate::columns::{DAY, IS_LAST, PRICE};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Days between 0001-01-01 and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days between a 7-days-ago observation and its target row
const TARGET_OFFSET_DAYS: u64 = 7;

/// On-disk format of the price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DfFormat {
    /// Feather / Arrow IPC
    Ftr,
    /// Apache Parquet
    Parquet,
}

/// Where the price table lives and how its timestamps are named
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    pub df_path: String,
    pub df_format: DfFormat,
    pub date_column: String,
}

/// Retrieves raw price tables
pub trait DataSource {
    /// Read the table at `path`, projected onto `columns`
    fn retrieve_df(&self, path: &str, format: DfFormat, columns: &[String]) -> Result<DataFrame>;
}

/// Reads price tables from a local directory
#[derive(Debug, Clone)]
pub struct LocalDataSource {
    root: PathBuf,
}

impl LocalDataSource {
    /// Create a data source resolving paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory that table paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for LocalDataSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl DataSource for LocalDataSource {
    fn retrieve_df(&self, path: &str, format: DfFormat, columns: &[String]) -> Result<DataFrame> {
        let full_path = self.root.join(path);
        let file = File::open(&full_path)?;
        let projection = Some(columns.to_vec());

        let df = match format {
            DfFormat::Parquet => ParquetReader::new(file).with_columns(projection).finish()?,
            DfFormat::Ftr => IpcReader::new(file).with_columns(projection).finish()?,
        };

        debug!(path = %full_path.display(), rows = df.height(), "retrieved price table");
        Ok(df)
    }
}

/// Load the price series of one station and fuel type.
///
/// The `{sorte}_{station}` column is renamed to `price` and rows with a
/// missing timestamp or price are dropped. With `add_pred`, the rows of
/// `today - 7 days` are appended again, re-stamped onto `today` with a price
/// of 0; these are the rows the forecast later predicts.
pub fn load_station_sorte<S: DataSource + ?Sized>(
    source: &S,
    data_config: &DataConfig,
    station: &str,
    sorte: &str,
    add_pred: bool,
    today: NaiveDate,
) -> Result<PriceFrame> {
    let price_column = format!("{}_{}", sorte, station);
    let mut df = source.retrieve_df(
        &data_config.df_path,
        data_config.df_format,
        &[data_config.date_column.clone(), price_column.clone()],
    )?;

    df.rename(&price_column, PRICE.into())?;
    let price = column(&df, PRICE)?.cast(&DataType::Float64)?;
    df.with_column(price)?;

    // Drop incomplete observations
    let timestamps = column_as_datetimes(&df, &data_config.date_column)?;
    let prices = column_as_f64(&df, PRICE)?;
    let keep: Vec<bool> = timestamps
        .iter()
        .zip(prices.iter())
        .map(|(ts, price)| ts.is_some() && price.is_some_and(|p| !p.is_nan()))
        .collect();
    let df = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;

    let frame = PriceFrame::new(df, data_config.date_column.clone())?;
    info!(
        station,
        sorte,
        rows = frame.len(),
        dropped = keep.len() - frame.len(),
        "loaded price series"
    );

    if add_pred {
        frame.append_target_rows(today)
    } else {
        Ok(frame)
    }
}

/// A price table with a known timestamp column
#[derive(Debug, Clone)]
pub struct PriceFrame {
    /// Data frame containing the price series and derived columns
    df: DataFrame,
    /// Name of the timestamp column
    time_column: String,
}

impl PriceFrame {
    /// Wrap an existing DataFrame; `time_column` must be a Datetime or Date column
    pub fn new(df: DataFrame, time_column: impl Into<String>) -> Result<Self> {
        let time_column = time_column.into();
        match column(&df, &time_column)?.dtype() {
            DataType::Datetime(_, _) | DataType::Date => {}
            other => {
                return Err(ForecastError::DataError(format!(
                    "Time column '{}' must be temporal, found {}",
                    time_column, other
                )))
            }
        }

        Ok(Self { df, time_column })
    }

    /// Create a price frame from `(timestamp, price)` pairs
    pub fn from_observations(
        time_column: &str,
        observations: &[(NaiveDateTime, f64)],
    ) -> Result<Self> {
        let millis: Vec<i64> = observations
            .iter()
            .map(|(ts, _)| ts.and_utc().timestamp_millis())
            .collect();
        let prices: Vec<f64> = observations.iter().map(|(_, price)| *price).collect();

        let time_series = Series::new(time_column.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        let price_series = Series::new(PRICE.into(), prices);
        let df = DataFrame::new(vec![time_series.into(), price_series.into()])?;

        Self::new(df, time_column)
    }

    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Take ownership of the DataFrame
    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Get the time column name
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Whether a column of that name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Timestamps of every row
    pub fn timestamps(&self) -> Result<Vec<Option<NaiveDateTime>>> {
        column_as_datetimes(&self.df, &self.time_column)
    }

    /// Calendar day of every row, read from `day` when it exists
    pub fn days(&self) -> Result<Vec<Option<NaiveDate>>> {
        if self.has_column(DAY) {
            column_as_dates(&self.df, DAY)
        } else {
            column_as_dates(&self.df, &self.time_column)
        }
    }

    /// A numeric column converted to `f64`
    pub fn column_f64(&self, name: &str) -> Result<Vec<Option<f64>>> {
        column_as_f64(&self.df, name)
    }

    /// The `is_last` flags; missing values count as false
    pub fn is_last(&self) -> Result<Vec<bool>> {
        column_as_bools(&self.df, IS_LAST)
    }

    /// Number of distinct calendar days
    pub fn n_days(&self) -> Result<usize> {
        let mut days: Vec<NaiveDate> = self.days()?.into_iter().flatten().collect();
        days.sort_unstable();
        days.dedup();
        Ok(days.len())
    }

    /// Keep the rows where `mask` is true
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self> {
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(self.with_dataframe(self.df.filter(&mask)?))
    }

    /// Append the target rows for `today`: a copy of the rows observed
    /// exactly 7 days earlier, moved onto `today` with a price of 0.
    pub fn append_target_rows(&self, today: NaiveDate) -> Result<Self> {
        let source_day = today
            .checked_sub_days(Days::new(TARGET_OFFSET_DAYS))
            .ok_or_else(|| ForecastError::InvalidParameter(format!("invalid date {}", today)))?;

        let mask: Vec<bool> = column_as_dates(&self.df, &self.time_column)?
            .into_iter()
            .map(|day| day == Some(source_day))
            .collect();
        let mut target = self
            .df
            .filter(&BooleanChunked::from_slice("mask".into(), &mask))?;

        if target.height() == 0 {
            warn!(%source_day, "no observations to copy into target rows");
            return Ok(self.clone());
        }

        // Move the timestamps forward in their physical unit
        let time_dtype = column(&target, &self.time_column)?.dtype().clone();
        let name: PlSmallStr = self.time_column.as_str().into();
        let shifted = match &time_dtype {
            DataType::Datetime(unit, _) => {
                let delta = TARGET_OFFSET_DAYS as i64 * 86_400 * units_per_second(*unit);
                let physical = column(&target, &self.time_column)?.cast(&DataType::Int64)?;
                let values: Vec<Option<i64>> = physical
                    .i64()?
                    .into_iter()
                    .map(|value| value.map(|v| v + delta))
                    .collect();
                Series::new(name, values).cast(&time_dtype)?
            }
            _ => {
                let physical = column(&target, &self.time_column)?.cast(&DataType::Int32)?;
                let values: Vec<Option<i32>> = physical
                    .i32()?
                    .into_iter()
                    .map(|value| value.map(|v| v + TARGET_OFFSET_DAYS as i32))
                    .collect();
                Series::new(name, values).cast(&DataType::Date)?
            }
        };

        let n_target = target.height();
        target.with_column(shifted)?;
        target.with_column(Series::new(PRICE.into(), vec![0.0f64; n_target]))?;

        let df = self.df.vstack(&target)?;
        info!(%today, rows = n_target, "appended target rows");
        Ok(self.with_dataframe(df))
    }

    /// Same time column, different data
    pub(crate) fn with_dataframe(&self, df: DataFrame) -> Self {
        Self {
            df,
            time_column: self.time_column.clone(),
        }
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))
}

fn units_per_second(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    }
}

fn physical_to_datetime(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let per_second = units_per_second(unit);
    let seconds = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(seconds, nanos as u32).map(|dt| dt.naive_utc())
}

pub(crate) fn date_to_epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

/// Helper to get a column as f64 values
pub(crate) fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = column(df, name)?;
    if matches!(
        col.dtype(),
        DataType::String | DataType::Date | DataType::Datetime(_, _)
    ) {
        return Err(ForecastError::DataError(format!(
            "Column '{}' cannot be converted to f64",
            name
        )));
    }

    let values = col.cast(&DataType::Float64)?;
    let values = values.f64()?;
    Ok(values.into_iter().collect())
}

/// Helper to get a Datetime or Date column as naive timestamps
pub(crate) fn column_as_datetimes(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let col = column(df, name)?;
    match col.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = col.cast(&DataType::Int64)?;
            let physical = physical.i64()?;
            Ok(physical
                .into_iter()
                .map(|value| value.and_then(|v| physical_to_datetime(v, unit)))
                .collect())
        }
        DataType::Date => Ok(column_as_dates(df, name)?
            .into_iter()
            .map(|day| day.and_then(|d| d.and_hms_opt(0, 0, 0)))
            .collect()),
        other => Err(ForecastError::DataError(format!(
            "Column '{}' is not temporal, found {}",
            name, other
        ))),
    }
}

/// Helper to get the calendar date of a Date or Datetime column
pub(crate) fn column_as_dates(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let col = column(df, name)?;
    match col.dtype() {
        DataType::Date => {
            let physical = col.cast(&DataType::Int32)?;
            let physical = physical.i32()?;
            Ok(physical
                .into_iter()
                .map(|value| value.and_then(epoch_days_to_date))
                .collect())
        }
        _ => Ok(column_as_datetimes(df, name)?
            .into_iter()
            .map(|ts| ts.map(|t| t.date()))
            .collect()),
    }
}

/// Helper to get a flag column; integers are accepted as 0/1
pub(crate) fn column_as_bools(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    let col = column(df, name)?;
    let flags = col.cast(&DataType::Boolean)?;
    let flags = flags.bool()?;
    Ok(flags.into_iter().map(|flag| flag.unwrap_or(false)).collect())
}
