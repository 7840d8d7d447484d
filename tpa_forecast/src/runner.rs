//! Fit the configured estimator on history and predict the latest day

use crate::columns::{PRED, PRICE};
use crate::data::PriceFrame;
use crate::error::{ForecastError, Result};
use crate::models::{EstimatorFamily, EstimatorRegistry, ForecastConfig};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::{debug, info};

/// Column predicted when the caller does not choose one
pub const DEFAULT_FORECAST_COLUMN: &str = PRICE;

/// Fit on the rows with `is_last == false` and write `pred` for the
/// `is_last` rows. Every other row gets a null prediction.
pub fn run(
    frame: &PriceFrame,
    config: &ForecastConfig,
    registry: &EstimatorRegistry,
    forecast_col: &str,
) -> Result<PriceFrame> {
    let family = config.use_estimator_class();
    if !registry.contains_family(family) {
        return Err(ForecastError::NotImplemented(format!(
            "no estimator of family '{}' is registered",
            family
        )));
    }

    match family {
        EstimatorFamily::Sklearn => forecast_sklearn(frame, config, registry, forecast_col),
    }
}

/// Forecast with a tabular regressor on a dense feature matrix
pub fn forecast_sklearn(
    frame: &PriceFrame,
    config: &ForecastConfig,
    registry: &EstimatorRegistry,
    forecast_col: &str,
) -> Result<PriceFrame> {
    let (kind, spec) = config.resolve_estimator()?;
    let mut estimator = registry.build(config.use_estimator_class(), kind, &spec.estimator_kwargs)?;

    let is_last = frame.is_last()?;
    let target = frame.column_f64(forecast_col)?;
    let features = spec
        .exogenous_vars
        .iter()
        .map(|name| frame.column_f64(name))
        .collect::<Result<Vec<_>>>()?;

    let (predict_rows, fit_rows): (Vec<usize>, Vec<usize>) =
        (0..frame.len()).partition(|&row| is_last[row]);

    let x_fit = feature_matrix(&features, &spec.exogenous_vars, &fit_rows)?;
    let y_fit = fit_rows
        .iter()
        .map(|&row| {
            target[row].ok_or_else(|| {
                ForecastError::DataError(format!(
                    "column '{}' is null at row {}",
                    forecast_col, row
                ))
            })
        })
        .collect::<Result<Array1<f64>>>()?;

    estimator.fit(&x_fit, &y_fit)?;
    info!(
        estimator = estimator.name(),
        rows = fit_rows.len(),
        features = spec.exogenous_vars.len(),
        "fitted estimator"
    );

    let x_predict = feature_matrix(&features, &spec.exogenous_vars, &predict_rows)?;
    let predictions = estimator.predict(&x_predict)?;

    let mut pred: Vec<Option<f64>> = vec![None; frame.len()];
    for (&row, &value) in predict_rows.iter().zip(predictions.iter()) {
        pred[row] = Some(value);
    }
    debug!(rows = predict_rows.len(), "predicted target rows");

    let mut df = frame.dataframe().clone();
    df.with_column(Series::new(PRED.into(), pred))?;
    Ok(frame.with_dataframe(df))
}

/// Dense matrix of the selected rows, one column per feature
fn feature_matrix(
    features: &[Vec<Option<f64>>],
    names: &[String],
    rows: &[usize],
) -> Result<Array2<f64>> {
    for (values, name) in features.iter().zip(names) {
        if let Some(&row) = rows.iter().find(|&&row| values[row].is_none()) {
            return Err(ForecastError::DataError(format!(
                "feature '{}' is null at row {}",
                name, row
            )));
        }
    }

    Ok(Array2::from_shape_fn(
        (rows.len(), features.len()),
        |(r, c)| features[c][rows[r]].unwrap_or(f64::NAN),
    ))
}
