//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tenki - JMA weekly forecasts, cached locally in SQLite.
#[derive(Parser, Debug)]
#[command(name = "tenki")]
#[command(
    author,
    version,
    about,
    long_about = r#"tenki reads JMA weekly forecasts through a local SQLite cache.

A region's forecast is fetched from JMA the first time it is requested and
served from the local database afterwards. Use `refresh` to re-fetch.

Examples:
    tenki regions
    tenki forecast 130000
    tenki refresh 270000
"#
)]
pub struct Cli {
    /// Path to a config file.
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        long_help = "Read configuration from PATH instead of the default location.\n\n\
The file must exist. Without this flag the default config file is created on first run."
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Refresh the region catalog and list forecast regions.
    Regions,

    /// Show the weekly forecast for a region, fetching it on first use.
    Forecast {
        /// Region (forecast office) code, e.g. 130000.
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Re-fetch the weekly forecast for a region and show it.
    Refresh {
        /// Region (forecast office) code, e.g. 130000.
        #[arg(value_name = "CODE")]
        code: String,
    },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_forecast_with_config() {
        let cli = Cli::try_parse_from(["tenki", "forecast", "130000", "--config", "/tmp/t.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        match cli.command {
            Commands::Forecast { code } => assert_eq!(code, "130000"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_forecast_requires_code() {
        assert!(Cli::try_parse_from(["tenki", "forecast"]).is_err());
    }
}
