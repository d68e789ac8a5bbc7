//! Application-level error types for tenki.
//!
//! Crate-specific failures (forecast fetches, the SQLite store) carry their own
//! enums; this module is what the binary reports to the terminal.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a terminal-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for the terminal.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Storage(_) => "Unable to open the local forecast database.",
            AppError::Service(_) => "Weather data is unavailable right now. Please try again.",
            AppError::Other(e) => match e.downcast_ref::<ConfigError>() {
                Some(config) => config.user_message(),
                None => "An unexpected error occurred. Please try again.",
            },
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration file not found. Check the --config path.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}
