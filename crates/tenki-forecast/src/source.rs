//! Remote JMA endpoints: the region catalog and per-region forecasts.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::instrument;

use crate::error::ForecastError;
use crate::parse::parse_area_catalog;
use crate::types::AreaCatalog;

pub const JMA_AREA_URL: &str = "https://www.jma.go.jp/bosai/common/const/area.json";
pub const JMA_FORECAST_BASE_URL: &str = "https://www.jma.go.jp/bosai/forecast/data/forecast";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where forecasts and region metadata come from.
///
/// Each call is a single attempt; implementations do not retry.
pub trait ForecastSource: Send + Sync {
    /// Fetch the region catalog.
    fn fetch_regions(&self) -> impl Future<Output = Result<AreaCatalog, ForecastError>> + Send;

    /// Fetch the raw forecast document for one region code.
    ///
    /// A 404 is reported as `Fetch { status: Some(404), .. }`.
    fn fetch_forecast(
        &self,
        region_code: &str,
    ) -> impl Future<Output = Result<Value, ForecastError>> + Send;
}

/// HTTP client for the JMA bosai JSON API.
#[derive(Debug, Clone)]
pub struct JmaClient {
    client: Client,
    area_url: String,
    forecast_base_url: String,
}

impl JmaClient {
    /// Client against the public JMA endpoints.
    pub fn new() -> Result<Self, ForecastError> {
        Self::with_endpoints(
            JMA_AREA_URL,
            JMA_FORECAST_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concat!("tenki/", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Client against explicit endpoints (configuration, mock servers).
    pub fn with_endpoints(
        area_url: &str,
        forecast_base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            area_url: area_url.to_string(),
            forecast_base_url: forecast_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/{region_code}.json`
    pub fn forecast_url(&self, region_code: &str) -> String {
        format!("{}/{}.json", self.forecast_base_url, region_code)
    }

    async fn get_json(&self, url: &str, region_code: Option<&str>) -> Result<Value, ForecastError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ForecastError::fetch(None, region_code, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ForecastError::fetch(
                Some(status.as_u16()),
                region_code,
                format!("{}: {}", status, text.trim()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ForecastError::malformed(format!("JSON parse error: {}", e)))
    }
}

impl ForecastSource for JmaClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_regions(&self) -> Result<AreaCatalog, ForecastError> {
        let body = self.get_json(&self.area_url, None).await?;
        let catalog = parse_area_catalog(body)?;
        tracing::info!(
            "Fetched region catalog: {} centers, {} offices",
            catalog.centers.len(),
            catalog.offices.len()
        );
        Ok(catalog)
    }

    #[instrument(skip(self), level = "info")]
    async fn fetch_forecast(&self, region_code: &str) -> Result<Value, ForecastError> {
        let url = self.forecast_url(region_code);
        self.get_json(&url, Some(region_code)).await
    }
}
