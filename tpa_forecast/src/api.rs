//! High-level entry point tying configuration, data and estimators together

use crate::columns::PRICE;
use crate::config::AppConfig;
use crate::data::{load_station_sorte, DataSource, PriceFrame};
use crate::error::{ForecastError, Result};
use crate::features::add_columns;
use crate::models::EstimatorRegistry;
use crate::runner::{run, DEFAULT_FORECAST_COLUMN};
use crate::summaries::{summarize, Summary, SummaryColumn};
use crate::window::filter_n_days_before;
use chrono::{Local, NaiveDate};
use std::path::Path;
use tracing::warn;

/// Forecasts for one station and fuel type at a time.
///
/// ```no_run
/// use tpa_forecast::{EstimatorRegistry, Forecast, LocalDataSource};
///
/// let mut forecast = Forecast::from_config_path(
///     "config.yaml",
///     EstimatorRegistry::builtin(),
///     LocalDataSource::new("data"),
/// )?;
/// forecast.load_df("aral_1", "diesel", true)?;
/// let predicted = forecast.create_forecast()?;
/// println!("{}", predicted.dataframe());
/// # Ok::<(), tpa_forecast::ForecastError>(())
/// ```
#[derive(Debug)]
pub struct Forecast<S: DataSource> {
    config: AppConfig,
    registry: EstimatorRegistry,
    source: S,
    df: Option<PriceFrame>,
}

impl<S: DataSource> Forecast<S> {
    /// Create a forecast without loaded data
    pub fn new(config: AppConfig, registry: EstimatorRegistry, source: S) -> Self {
        Self {
            config,
            registry,
            source,
            df: None,
        }
    }

    /// Read and validate the configuration file at `path`
    pub fn from_config_path(
        path: impl AsRef<Path>,
        registry: EstimatorRegistry,
        source: S,
    ) -> Result<Self> {
        let config = AppConfig::from_path(path, &registry)?;
        Ok(Self::new(config, registry, source))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &EstimatorRegistry {
        &self.registry
    }

    /// The loaded and enriched price series, if any
    pub fn df(&self) -> Option<&PriceFrame> {
        self.df.as_ref()
    }

    /// Load and enrich the series of `station` and `sorte`, with target rows
    /// dated today when `add_pred` is set
    pub fn load_df(&mut self, station: &str, sorte: &str, add_pred: bool) -> Result<&PriceFrame> {
        self.load_df_on(station, sorte, add_pred, Local::now().date_naive())
    }

    /// Like [`Forecast::load_df`] with an explicit current date
    pub fn load_df_on(
        &mut self,
        station: &str,
        sorte: &str,
        add_pred: bool,
        today: NaiveDate,
    ) -> Result<&PriceFrame> {
        let frame = load_station_sorte(
            &self.source,
            &self.config.data_config,
            station,
            sorte,
            add_pred,
            today,
        )?;

        let frame = if frame.is_empty() {
            warn!(station, sorte, "price series is empty");
            frame
        } else {
            add_columns(&frame)?
        };

        Ok(&*self.df.insert(frame))
    }

    /// Window the loaded series and predict its latest day
    pub fn create_forecast(&self) -> Result<PriceFrame> {
        let frame = self.loaded()?;
        let windowed = filter_n_days_before(frame, self.config.forecast_config.n_before())?;
        run(
            &windowed,
            &self.config.forecast_config,
            &self.registry,
            DEFAULT_FORECAST_COLUMN,
        )
    }

    /// Mean-centered price per `group`
    pub fn create_summaries(&self, group: SummaryColumn) -> Result<Summary> {
        let frame = self.loaded()?;
        Ok(summarize(frame, group.column_name(), PRICE)?.mean_centralize())
    }

    fn loaded(&self) -> Result<&PriceFrame> {
        self.df
            .as_ref()
            .filter(|frame| !frame.is_empty())
            .ok_or(ForecastError::NoDataLoaded)
    }
}
