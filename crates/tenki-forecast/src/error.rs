//! Forecast-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    /// The SQLite medium could not be opened, read or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The remote source was unreachable or answered with an error status.
    #[error("Fetch failed{}: {message}", fetch_context(.status, .region_code))]
    Fetch {
        status: Option<u16>,
        region_code: Option<String>,
        message: String,
    },

    /// The remote payload did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

fn fetch_context(status: &Option<u16>, region_code: &Option<String>) -> String {
    match (status, region_code) {
        (Some(s), Some(code)) => format!(" ({} for region {})", s, code),
        (Some(s), None) => format!(" ({})", s),
        (None, Some(code)) => format!(" (region {})", code),
        (None, None) => String::new(),
    }
}

impl ForecastError {
    pub fn fetch(status: Option<u16>, region_code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            region_code: region_code.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// A 404 from the forecast endpoint: nothing is published for this code.
    pub fn is_not_published(&self) -> bool {
        matches!(self, Self::Fetch { status: Some(404), .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// User-friendly error message for display.
    ///
    /// Fetch and malformed-response failures read the same to the user; the
    /// distinction only matters in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::StorageUnavailable(_) => "Local forecast database is unavailable".to_string(),
            Self::Fetch { .. } if self.is_not_published() => {
                "No forecast is published for this region".to_string()
            }
            Self::Fetch { .. } | Self::MalformedResponse(_) => {
                "Weather data could not be retrieved".to_string()
            }
        }
    }

    /// Whether a caller may reasonably try again later. Nothing in this crate
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { status: None, .. } => true,
            Self::Fetch { status: Some(s), .. } => *s == 429 || *s >= 500,
            Self::StorageUnavailable(_) | Self::MalformedResponse(_) => false,
        }
    }
}

impl From<rusqlite::Error> for ForecastError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase
                ) =>
            {
                Self::StorageUnavailable(format!("database corrupt: {}", e))
            }
            _ => Self::StorageUnavailable(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(e: reqwest::Error) -> Self {
        Self::Fetch {
            status: e.status().map(|s| s.as_u16()),
            region_code: None,
            message: e.to_string(),
        }
    }
}
