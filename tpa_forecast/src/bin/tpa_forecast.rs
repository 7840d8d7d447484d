//! TPA forecast CLI
//!
//! Predicts the latest day of a station's fuel prices, or prints
//! mean-centered price profiles.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use tpa_forecast::{EstimatorRegistry, Forecast, LocalDataSource, Result, SummaryColumn};

#[derive(Parser)]
#[command(name = "tpa-forecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fuel price forecasts for a single station", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SeriesArgs {
    /// YAML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Short id of the station
    #[arg(long)]
    station: String,

    /// Fuel type, e.g. diesel, e5 or e10
    #[arg(long)]
    sorte: String,

    /// Directory that `data_config.df_path` is relative to
    #[arg(long, default_value = ".")]
    data_root: PathBuf,

    /// Append target rows for today before processing
    #[arg(long)]
    add_pred: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the prices of the latest day
    Forecast {
        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Print the mean-centered price per group
    Summarize {
        #[command(flatten)]
        series: SeriesArgs,

        /// Grouping column (day_of_week, hour, trend)
        #[arg(long, default_value = "day_of_week")]
        by: SummaryColumn,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tpa_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Forecast { series } => {
            let forecast = load(&series)?;
            let predicted = forecast.create_forecast()?;
            let is_last = predicted.is_last()?;
            let latest = predicted.filter_rows(&is_last)?;
            println!("{}", latest.dataframe());
        }
        Commands::Summarize { series, by } => {
            let forecast = load(&series)?;
            let summary = forecast.create_summaries(by)?;
            println!("{}", summary.to_dataframe()?);
        }
    }

    Ok(())
}

fn load(series: &SeriesArgs) -> Result<Forecast<LocalDataSource>> {
    let mut forecast = Forecast::from_config_path(
        &series.config,
        EstimatorRegistry::builtin(),
        LocalDataSource::new(&series.data_root),
    )?;
    forecast.load_df(&series.station, &series.sorte, series.add_pred)?;
    Ok(forecast)
}
