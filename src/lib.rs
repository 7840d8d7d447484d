//! # TPA Analytics Engine
//!
//! `tpa_analytics_engine` bundles the fuel price forecasting pipeline.
//!
//! - [`forecast`]: price series loading, feature derivation, windowing,
//!   estimator configuration and forecasting (`tpa_forecast`)
//! - [`math`]: the regression estimators the forecasts are fitted with (`tpa_math`)
//!
//! ## Example
//!
//! ```
//! use tpa_analytics_engine::forecast::{add_columns, PriceFrame};
//! use tpa_analytics_engine::forecast::columns::IS_LAST;
//!
//! let day = chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
//! let observations: Vec<_> = (0..24)
//!     .map(|h| (day.and_hms_opt(h, 0, 0).unwrap(), 1.79))
//!     .collect();
//!
//! let frame = PriceFrame::from_observations("date", &observations).unwrap();
//! let enriched = add_columns(&frame).unwrap();
//! assert!(enriched.has_column(IS_LAST));
//! assert_eq!(enriched.len(), 24);
//! ```

pub use tpa_forecast as forecast;
pub use tpa_math as math;

pub use tpa_forecast::{Forecast, ForecastError};
pub use tpa_math::{MathError, Regressor};

#[cfg(test)]
mod tests {
    use super::forecast::{EstimatorFamily, EstimatorKind, EstimatorRegistry};

    #[test]
    fn test_builtin_estimators() {
        let registry = EstimatorRegistry::builtin();
        assert_eq!(
            registry.kinds(EstimatorFamily::Sklearn),
            EstimatorKind::ALL.to_vec()
        );
    }
}
