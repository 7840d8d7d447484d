//! Grouped price summaries

use crate::columns::{DAY_OF_WEEK, HOUR, TREND};
use crate::data::{column_as_f64, PriceFrame};
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Columns a price summary can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryColumn {
    DayOfWeek,
    Hour,
    Trend,
}

impl SummaryColumn {
    /// Name of the grouping column
    pub fn column_name(&self) -> &'static str {
        match self {
            SummaryColumn::DayOfWeek => DAY_OF_WEEK,
            SummaryColumn::Hour => HOUR,
            SummaryColumn::Trend => TREND,
        }
    }
}

impl fmt::Display for SummaryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for SummaryColumn {
    type Err = ForecastError;

    fn from_str(name: &str) -> Result<Self> {
        [Self::DayOfWeek, Self::Hour, Self::Trend]
            .into_iter()
            .find(|column| column.column_name() == name)
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "cannot summarize by '{}', expected one of day_of_week, hour, trend",
                    name
                ))
            })
    }
}

/// Mean of one column per group, ordered by group key
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    group_column: String,
    agg_column: String,
    keys: Vec<f64>,
    values: Vec<f64>,
}

impl Summary {
    pub fn group_column(&self) -> &str {
        &self.group_column
    }

    pub fn agg_column(&self) -> &str {
        &self.agg_column
    }

    /// Group keys in ascending order
    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    /// Aggregated value of every group
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value of the group with key `key`
    pub fn get(&self, key: f64) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| *k == key)
            .map(|i| self.values[i])
    }

    /// Subtract the mean of all group values
    pub fn mean_centralize(&self) -> Summary {
        let mean = if self.values.is_empty() {
            0.0
        } else {
            self.values.iter().sum::<f64>() / self.values.len() as f64
        };

        Summary {
            values: self.values.iter().map(|v| v - mean).collect(),
            ..self.clone()
        }
    }

    /// Two-column table of keys and values
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let keys = Series::new(self.group_column.as_str().into(), self.keys.clone());
        let values = Series::new(self.agg_column.as_str().into(), self.values.clone());
        Ok(DataFrame::new(vec![keys.into(), values.into()])?)
    }
}

/// Mean of `agg_col` grouped by `group_col`, sorted by group
pub fn summarize(frame: &PriceFrame, group_col: &str, agg_col: &str) -> Result<Summary> {
    for name in [group_col, agg_col] {
        if !frame.has_column(name) {
            return Err(ForecastError::MissingColumn(name.to_string()));
        }
    }

    let grouped = frame
        .dataframe()
        .clone()
        .lazy()
        .group_by([col(group_col)])
        .agg([col(agg_col).cast(DataType::Float64).mean()])
        .collect()?;

    let keys = column_as_f64(&grouped, group_col)?;
    let values = column_as_f64(&grouped, agg_col)?;

    let mut groups: Vec<(f64, f64)> = keys
        .into_iter()
        .zip(values)
        .filter_map(|(key, value)| Some((key?, value?)))
        .collect();
    groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(Summary {
        group_column: group_col.to_string(),
        agg_column: agg_col.to_string(),
        keys: groups.iter().map(|(key, _)| *key).collect(),
        values: groups.iter().map(|(_, value)| *value).collect(),
    })
}
