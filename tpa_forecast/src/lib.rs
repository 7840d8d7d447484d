//! # TPA Forecast
//!
//! Short-horizon fuel price forecasts for a single station and fuel type.
//!
//! ## Pipeline
//!
//! - Price series loading from Feather/IPC or Parquet files ([`data`])
//! - Calendar, trend and daily lag features ([`features`])
//! - Training window of the most recent `n_before` days ([`window`])
//! - Estimator registry and validated configuration ([`models`])
//! - Fitting on history and predicting the latest day ([`runner`])
//! - Grouped, mean-centered price summaries ([`summaries`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use tpa_forecast::{add_columns, filter_n_days_before, run, AppConfig};
//! use tpa_forecast::{load_station_sorte, EstimatorRegistry, LocalDataSource};
//!
//! let registry = EstimatorRegistry::builtin();
//! let config = AppConfig::from_path("config.yaml", &registry)?;
//! let source = LocalDataSource::new("data");
//!
//! let today = chrono::Local::now().date_naive();
//! let series = load_station_sorte(&source, &config.data_config, "aral_1", "e5", true, today)?;
//! let enriched = add_columns(&series)?;
//! let window = filter_n_days_before(&enriched, config.forecast_config.n_before())?;
//! let forecast = run(&window, &config.forecast_config, &registry, "price")?;
//! # Ok::<(), tpa_forecast::ForecastError>(())
//! ```

pub mod api;
pub mod columns;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod runner;
pub mod summaries;
pub mod window;

pub use api::Forecast;
pub use config::{get_config, AppConfig};
pub use data::{load_station_sorte, DataConfig, DataSource, DfFormat, LocalDataSource, PriceFrame};
pub use error::{ConfigError, ForecastError, Result};
pub use features::add_columns;
pub use models::{
    create_forecast_config, EstimatorFamily, EstimatorKind, EstimatorRegistry, EstimatorSpec,
    ForecastConfig,
};
pub use runner::{run, DEFAULT_FORECAST_COLUMN};
pub use summaries::{summarize, Summary, SummaryColumn};
pub use window::filter_n_days_before;
