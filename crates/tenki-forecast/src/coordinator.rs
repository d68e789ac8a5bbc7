//! Cache-aside coordination between the forecast store and a remote source.
//!
//! A request walks an explicit sequence of steps:
//!
//! ```text
//! LocalLookup --hit--> Return(data)
//!      | miss
//!      v
//! RemoteFetch --error--> Return(failed)          (store untouched)
//!      v
//! Persist     --error--> Return(failed)
//!      v
//! ReReadLocal --none---> Return(empty)
//!      v
//! Return(data)
//! ```
//!
//! What a caller sees after a fetch is always read back out of the store, never
//! the freshly parsed payload.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::instrument;

use crate::error::ForecastError;
use crate::parse::parse_weekly_forecast;
use crate::source::ForecastSource;
use crate::store::ForecastStore;
use crate::types::{
    AreaCatalog, ForecastOutcome, RegionForecasts, RegionGroup, UNKNOWN_REGION_NAME,
};

/// One state of a cache-aside cycle.
#[derive(Debug)]
enum Step {
    LocalLookup,
    RemoteFetch,
    Persist(Value),
    ReReadLocal,
    Return(ForecastOutcome),
}

/// Read-through cache over a `ForecastStore` and a `ForecastSource`.
pub struct CacheCoordinator<S> {
    source: S,
    store: Arc<ForecastStore>,
    /// One async lock per region code; cycles for the same code never interleave.
    region_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    /// Last catalog fetched by this process, for navigation.
    catalog: RwLock<Option<AreaCatalog>>,
}

impl<S: ForecastSource> CacheCoordinator<S> {
    pub fn new(source: S, store: Arc<ForecastStore>) -> Self {
        Self {
            source,
            store,
            region_locks: Mutex::new(HashMap::new()),
            catalog: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &ForecastStore {
        &self.store
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the region catalog and insert any offices not yet stored.
    ///
    /// Runs unconditionally, whether or not regions already exist. On failure the
    /// stored regions stay as they are and the error is returned for the caller to
    /// report; it is not fatal to anything else.
    #[instrument(skip(self), level = "info")]
    pub async fn refresh_region_catalog(&self) -> Result<(), ForecastError> {
        let catalog = match self.source.fetch_regions().await {
            Ok(catalog) => catalog,
            Err(e) => {
                log_fetch_failure("region catalog", &e);
                return Err(e);
            }
        };

        let inserted = self.store.upsert_regions_if_absent(&catalog.regions())?;
        tracing::info!(
            "Region catalog refreshed: {} offices, {} newly stored",
            catalog.offices.len(),
            inserted
        );

        *self.catalog.write() = Some(catalog);
        Ok(())
    }

    /// Forecasts for a region, served from the store when present and fetched
    /// (then stored and re-read) otherwise.
    #[instrument(skip(self), level = "info")]
    pub async fn get_forecasts_for_region(&self, region_code: &str) -> ForecastOutcome {
        let lock = self.region_lock(region_code);
        let _guard = lock.lock().await;
        self.run(region_code, Step::LocalLookup).await
    }

    /// Re-fetch a region even if it is already stored.
    ///
    /// A failed fetch returns `Failed` and leaves stored rows as they were; stale
    /// rows are not substituted for the failure.
    #[instrument(skip(self), level = "info")]
    pub async fn refresh_forecasts_for_region(&self, region_code: &str) -> ForecastOutcome {
        let lock = self.region_lock(region_code);
        let _guard = lock.lock().await;
        self.run(region_code, Step::RemoteFetch).await
    }

    /// Centers and their offices from the last catalog fetched by this process.
    pub fn region_groups(&self) -> Vec<RegionGroup> {
        self.catalog
            .read()
            .as_ref()
            .map(AreaCatalog::groups)
            .unwrap_or_default()
    }

    async fn run(&self, region_code: &str, mut step: Step) -> ForecastOutcome {
        loop {
            tracing::trace!("{}: {:?}", region_code, StepName(&step));
            step = match step {
                Step::LocalLookup => match self.read_local(region_code) {
                    Ok(Some(data)) => {
                        tracing::debug!("Cache hit for {} ({} days)", region_code, data.days.len());
                        Step::Return(ForecastOutcome::Data(data))
                    }
                    Ok(None) => Step::RemoteFetch,
                    Err(e) => Step::Return(ForecastOutcome::Failed(e)),
                },

                Step::RemoteFetch => match self.source.fetch_forecast(region_code).await {
                    Ok(body) => Step::Persist(body),
                    Err(e) => {
                        log_fetch_failure(region_code, &e);
                        Step::Return(ForecastOutcome::Failed(e))
                    }
                },

                Step::Persist(body) => match parse_weekly_forecast(body) {
                    Ok(days) => match self.store.replace_forecasts(region_code, &days) {
                        Ok(()) => {
                            tracing::info!("Stored {} forecast days for {}", days.len(), region_code);
                            Step::ReReadLocal
                        }
                        Err(e) => {
                            tracing::error!("Failed to store forecasts for {}: {}", region_code, e);
                            Step::Return(ForecastOutcome::Failed(e))
                        }
                    },
                    Err(e) => {
                        log_fetch_failure(region_code, &e);
                        Step::Return(ForecastOutcome::Failed(e))
                    }
                },

                Step::ReReadLocal => match self.read_local(region_code) {
                    Ok(Some(data)) => Step::Return(ForecastOutcome::Data(data)),
                    Ok(None) => Step::Return(ForecastOutcome::Empty {
                        region_code: region_code.to_string(),
                    }),
                    Err(e) => Step::Return(ForecastOutcome::Failed(e)),
                },

                Step::Return(outcome) => return outcome,
            };
        }
    }

    /// Stored forecasts with their region name, or `None` when no days are stored.
    fn read_local(&self, region_code: &str) -> Result<Option<RegionForecasts>, ForecastError> {
        let region_name = self.store.lookup_region_name(region_code)?;
        let days = self.store.lookup_forecasts(region_code)?;
        if days.is_empty() {
            return Ok(None);
        }

        Ok(Some(RegionForecasts {
            region_code: region_code.to_string(),
            region_name: region_name.unwrap_or_else(|| UNKNOWN_REGION_NAME.to_string()),
            days,
        }))
    }

    fn region_lock(&self, region_code: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.region_locks
            .lock()
            .entry(region_code.to_string())
            .or_default()
            .clone()
    }
}

/// Malformed payloads and fetch errors look the same to callers; logs keep them apart.
fn log_fetch_failure(what: &str, err: &ForecastError) {
    match err {
        ForecastError::MalformedResponse(msg) => {
            tracing::warn!("Malformed response for {}: {}", what, msg);
        }
        e if e.is_not_published() => {
            tracing::warn!("No forecast published for {}", what);
        }
        e => tracing::warn!("Fetch failed for {}: {}", what, e),
    }
}

/// Step label without the payload.
struct StepName<'a>(&'a Step);

impl std::fmt::Debug for StepName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.0 {
            Step::LocalLookup => "LocalLookup",
            Step::RemoteFetch => "RemoteFetch",
            Step::Persist(_) => "Persist",
            Step::ReReadLocal => "ReReadLocal",
            Step::Return(_) => "Return",
        };
        f.write_str(name)
    }
}
