//! tenki - JMA weekly forecasts through a local SQLite cache.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tenki_core::{AppError, Config};
use tenki_forecast::{CacheCoordinator, ForecastStore, JmaClient};

mod cli;
mod display;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but could not produce data.
async fn run(cli: Cli) -> Result<bool, AppError> {
    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    tenki_core::init(&config.logging.filter)?;

    let coordinator = coordinator(&config)?;
    tracing::info!("tenki started, database at {}", config.storage.database_path.display());

    match cli.command {
        Commands::Regions => {
            if let Err(e) = coordinator.refresh_region_catalog().await {
                eprintln!("{}", e.user_message());
            }

            let groups = coordinator.region_groups();
            let lines = if groups.is_empty() {
                let stored = coordinator
                    .store()
                    .list_regions()
                    .map_err(|e| AppError::Storage(e.to_string()))?;
                display::regions(&stored)
            } else {
                display::groups(&groups)
            };

            print_lines(&lines);
            Ok(!lines.is_empty())
        }
        Commands::Forecast { code } => {
            refresh_catalog(&coordinator).await;
            let outcome = coordinator.get_forecasts_for_region(&code).await;
            let (lines, ok) = display::outcome(&outcome);
            print_lines(&lines);
            Ok(ok)
        }
        Commands::Refresh { code } => {
            refresh_catalog(&coordinator).await;
            let outcome = coordinator.refresh_forecasts_for_region(&code).await;
            let (lines, ok) = display::outcome(&outcome);
            print_lines(&lines);
            Ok(ok)
        }
    }
}

fn coordinator(config: &Config) -> Result<CacheCoordinator<JmaClient>, AppError> {
    let store = ForecastStore::open(&config.storage.database_path)
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let client = JmaClient::with_endpoints(
        &config.source.area_url,
        &config.source.forecast_base_url,
        Duration::from_secs(config.source.timeout_secs),
        &config.source.user_agent,
    )
    .map_err(|e| AppError::Service(e.to_string()))?;

    Ok(CacheCoordinator::new(client, Arc::new(store)))
}

/// Region names come from the catalog; a failure here only costs names.
async fn refresh_catalog(coordinator: &CacheCoordinator<JmaClient>) {
    if let Err(e) = coordinator.refresh_region_catalog().await {
        tracing::warn!("Continuing with stored regions: {}", e);
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
