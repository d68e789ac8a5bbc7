//! Region and forecast cache for JMA weather data.
//!
//! Provides the SQLite store, the JMA HTTP source, and the cache-aside
//! coordinator that sits between them.

pub mod coordinator;
pub mod error;
pub mod parse;
pub mod source;
pub mod store;
pub mod types;

pub use coordinator::CacheCoordinator;
pub use error::ForecastError;
pub use parse::{parse_area_catalog, parse_weekly_forecast};
pub use source::{ForecastSource, JmaClient};
pub use store::ForecastStore;
pub use types::{
    AreaCatalog, AreaEntry, DailyForecast, ForecastOutcome, Region, RegionForecasts, RegionGroup,
    UNKNOWN_REGION_NAME,
};
