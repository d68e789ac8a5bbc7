//! Forecast records, the region catalog, and the read result handed to callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ForecastError;

/// Name reported for a region code with no stored Region row.
pub const UNKNOWN_REGION_NAME: &str = "不明";

/// A forecast area (JMA "office") identified by a stable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
}

impl Region {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Both code and name are non-blank.
    pub fn is_well_formed(&self) -> bool {
        !self.code.trim().is_empty() && !self.name.trim().is_empty()
    }
}

/// One day's forecast for a region, keyed by `(region_code, date)` in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub weather_code: String,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

/// Stored forecasts for one region, ordered by ascending date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionForecasts {
    pub region_code: String,
    pub region_name: String,
    pub days: Vec<DailyForecast>,
}

/// Result of a cache-aside read.
///
/// `Empty` means the source answered but had nothing to store; `Failed` means the
/// data could not be obtained at all.
#[derive(Debug)]
pub enum ForecastOutcome {
    Data(RegionForecasts),
    Empty { region_code: String },
    Failed(ForecastError),
}

impl ForecastOutcome {
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn data(&self) -> Option<&RegionForecasts> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ForecastError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// An entry of `area.json` (`centers` or `offices`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaEntry {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "enName", default, skip_serializing_if = "Option::is_none")]
    pub en_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// The JMA region catalog, reduced to the two levels the cache uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaCatalog {
    /// Regional forecast centers; navigation only, never stored.
    pub centers: BTreeMap<String, AreaEntry>,
    /// Forecast offices; these become Region rows.
    pub offices: BTreeMap<String, AreaEntry>,
}

/// A center with its member offices resolved to regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGroup {
    pub code: String,
    pub name: String,
    pub members: Vec<Region>,
}

impl AreaCatalog {
    /// Offices as Region rows, in code order. A nameless office is named
    /// `UNKNOWN_REGION_NAME`.
    pub fn regions(&self) -> Vec<Region> {
        self.offices
            .iter()
            .map(|(code, entry)| Region::new(code.clone(), office_name(entry)))
            .collect()
    }

    /// Centers with their children. A child missing from `offices` keeps its code
    /// and gets the unknown-region name.
    pub fn groups(&self) -> Vec<RegionGroup> {
        self.centers
            .iter()
            .map(|(code, center)| RegionGroup {
                code: code.clone(),
                name: center.name.clone(),
                members: center
                    .children
                    .iter()
                    .map(|child| {
                        let name = self.offices.get(child).map_or(UNKNOWN_REGION_NAME, office_name);
                        Region::new(child.clone(), name)
                    })
                    .collect(),
            })
            .collect()
    }
}

fn office_name(entry: &AreaEntry) -> &str {
    if entry.name.trim().is_empty() {
        UNKNOWN_REGION_NAME
    } else {
        &entry.name
    }
}
