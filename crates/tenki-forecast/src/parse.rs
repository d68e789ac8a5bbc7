//! Parsing of JMA `area.json` and `forecast/{code}.json` payloads.
//!
//! Only the weekly period (index 1) of a forecast response is consumed: its
//! first time series carries dates and weather codes, its second (optional)
//! carries daily minimum and maximum temperatures.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ForecastError;
use crate::types::{AreaCatalog, AreaEntry, DailyForecast};

const WEEKLY_PERIOD: usize = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPeriod {
    time_series: Option<Vec<ApiTimeSeries>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTimeSeries {
    time_defines: Option<Vec<String>>,
    #[serde(default)]
    areas: Vec<ApiArea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArea {
    weather_codes: Option<Vec<String>>,
    temps_min: Option<Vec<Value>>,
    temps_max: Option<Vec<Value>>,
}

/// Turn a forecast response into one `DailyForecast` per weekly `timeDefines` entry.
///
/// Missing or short temperature arrays yield `None`; a missing period, time series,
/// area or weather code is a `MalformedResponse`.
pub fn parse_weekly_forecast(body: Value) -> Result<Vec<DailyForecast>, ForecastError> {
    let periods: Vec<ApiPeriod> = serde_json::from_value(body)
        .map_err(|e| ForecastError::malformed(format!("unexpected forecast layout: {}", e)))?;

    if periods.len() <= WEEKLY_PERIOD {
        return Err(ForecastError::malformed(format!(
            "expected at least 2 forecast periods, got {}",
            periods.len()
        )));
    }

    let series = periods
        .into_iter()
        .nth(WEEKLY_PERIOD)
        .and_then(|p| p.time_series)
        .ok_or_else(|| ForecastError::malformed("weekly period has no timeSeries"))?;

    let mut series = series.into_iter();
    let weather = series
        .next()
        .ok_or_else(|| ForecastError::malformed("weekly timeSeries is empty"))?;
    let temps = series.next();

    let weather_area = weather
        .areas
        .into_iter()
        .next()
        .ok_or_else(|| ForecastError::malformed("weekly weather series has no areas"))?;
    let codes = weather_area
        .weather_codes
        .ok_or_else(|| ForecastError::malformed("weekly area has no weatherCodes"))?;
    let time_defines = weather
        .time_defines
        .ok_or_else(|| ForecastError::malformed("weekly series has no timeDefines"))?;

    if codes.len() < time_defines.len() {
        return Err(ForecastError::malformed(format!(
            "{} weatherCodes for {} timeDefines",
            codes.len(),
            time_defines.len()
        )));
    }

    let temp_area = temps.and_then(|t| t.areas.into_iter().next());
    let (mins, maxs) = match temp_area {
        Some(area) => (
            area.temps_min.unwrap_or_default(),
            area.temps_max.unwrap_or_default(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    time_defines
        .iter()
        .zip(codes)
        .enumerate()
        .map(|(i, (time_define, weather_code))| -> Result<_, ForecastError> {
            Ok(DailyForecast {
                date: forecast_date(time_define)?,
                weather_code,
                min_temp: mins.get(i).and_then(temperature),
                max_temp: maxs.get(i).and_then(temperature),
            })
        })
        .collect()
}

/// Date portion of an ISO-8601 date-time such as `2024-05-02T00:00:00+09:00`.
fn forecast_date(time_define: &str) -> Result<NaiveDate, ForecastError> {
    let date_part = time_define.split('T').next().unwrap_or(time_define);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| ForecastError::malformed(format!("bad timeDefine {:?}: {}", time_define, e)))
}

/// JMA sends temperatures as strings, with `""` for "not forecast".
fn temperature(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse `area.json` into centers and offices.
///
/// Entries that do not deserialize are skipped with a warning so one bad row does
/// not discard the catalog. A missing `offices` map is a `MalformedResponse`.
pub fn parse_area_catalog(body: Value) -> Result<AreaCatalog, ForecastError> {
    let Value::Object(mut root) = body else {
        return Err(ForecastError::malformed("area catalog is not an object"));
    };

    let offices = match root.remove("offices") {
        Some(Value::Object(map)) => area_entries("offices", map),
        _ => return Err(ForecastError::malformed("area catalog has no offices")),
    };

    let centers = match root.remove("centers") {
        Some(Value::Object(map)) => area_entries("centers", map),
        _ => BTreeMap::new(),
    };

    Ok(AreaCatalog { centers, offices })
}

fn area_entries(
    section: &str,
    map: serde_json::Map<String, Value>,
) -> BTreeMap<String, AreaEntry> {
    map.into_iter()
        .filter_map(|(code, raw)| match serde_json::from_value::<AreaEntry>(raw) {
            Ok(entry) => Some((code, entry)),
            Err(e) => {
                tracing::warn!("Skipping malformed {} entry {}: {}", section, code, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{Region, UNKNOWN_REGION_NAME};
    use serde_json::json;

    fn weekly_response(temps: Value) -> Value {
        json!([
            {
                "publishingOffice": "気象庁",
                "timeSeries": [{
                    "timeDefines": ["2024-05-01T11:00:00+09:00"],
                    "areas": [{"area": {"name": "東京地方", "code": "130010"}, "weathers": ["晴れ"]}]
                }]
            },
            {
                "publishingOffice": "気象庁",
                "timeSeries": [
                    {
                        "timeDefines": [
                            "2024-05-02T00:00:00+09:00",
                            "2024-05-03T00:00:00+09:00",
                            "2024-05-04T00:00:00+09:00"
                        ],
                        "areas": [{
                            "area": {"name": "東京地方", "code": "130010"},
                            "weatherCodes": ["100", "201", "300"],
                            "pops": ["", "20", "60"]
                        }]
                    },
                    temps
                ]
            }
        ])
    }

    #[test]
    fn test_parse_weekly_with_string_temps() {
        let body = weekly_response(json!({
            "timeDefines": [],
            "areas": [{
                "area": {"name": "東京", "code": "44132"},
                "tempsMin": ["", "14", "15"],
                "tempsMax": ["", "24", "22"]
            }]
        }));

        let days = parse_weekly_forecast(body).unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(days[0].weather_code, "100");
        assert_eq!(days[0].min_temp, None);
        assert_eq!(days[1].min_temp, Some(14.0));
        assert_eq!(days[2].max_temp, Some(22.0));
    }

    #[test]
    fn test_numeric_temps_accepted() {
        let body = weekly_response(json!({
            "areas": [{"tempsMin": [10, 11.5, null], "tempsMax": [20, 21, 22]}]
        }));

        let days = parse_weekly_forecast(body).unwrap();
        assert_eq!(days[1].min_temp, Some(11.5));
        assert_eq!(days[2].min_temp, None);
        assert_eq!(days[2].max_temp, Some(22.0));
    }

    #[test]
    fn test_absent_temps_yield_null() {
        let body = weekly_response(json!({"areas": [{"area": {"code": "44132"}}]}));

        let days = parse_weekly_forecast(body).unwrap();
        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|d| d.min_temp.is_none() && d.max_temp.is_none()));
        assert!(days.iter().all(|d| !d.weather_code.is_empty()));
    }

    #[test]
    fn test_short_temps_pad_with_null() {
        let body = weekly_response(json!({"areas": [{"tempsMin": ["9"], "tempsMax": ["18", "19"]}]}));

        let days = parse_weekly_forecast(body).unwrap();
        assert_eq!(days[0].min_temp, Some(9.0));
        assert_eq!(days[1].min_temp, None);
        assert_eq!(days[1].max_temp, Some(19.0));
        assert_eq!(days[2].max_temp, None);
    }

    #[test]
    fn test_missing_temperature_series_yields_null() {
        let mut body = weekly_response(json!({}));
        body[1]["timeSeries"].as_array_mut().unwrap().truncate(1);

        let days = parse_weekly_forecast(body).unwrap();
        assert_eq!(days.len(), 3);
        assert!(days.iter().all(|d| d.max_temp.is_none()));
    }

    #[test]
    fn test_single_period_is_malformed() {
        let mut body = weekly_response(json!({}));
        body.as_array_mut().unwrap().truncate(1);

        let err = parse_weekly_forecast(body).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_time_series_is_malformed() {
        let body = json!([{"timeSeries": []}, {"publishingOffice": "気象庁"}]);
        let err = parse_weekly_forecast(body).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));
    }

    #[test]
    fn test_missing_time_defines_is_malformed() {
        let body = json!([
            {"timeSeries": []},
            {"timeSeries": [{"areas": [{"weatherCodes": ["100", "200"]}]}]}
        ]);
        let err = parse_weekly_forecast(body).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));
    }

    #[test]
    fn test_non_array_is_malformed() {
        let err = parse_weekly_forecast(json!({"error": "nope"})).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));
    }

    #[test]
    fn test_short_weather_codes_is_malformed() {
        let mut body = weekly_response(json!({}));
        body[1]["timeSeries"][0]["areas"][0]["weatherCodes"] = json!(["100"]);

        let err = parse_weekly_forecast(body).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_time_defines_yields_no_days() {
        let body = json!([
            {"timeSeries": []},
            {"timeSeries": [{"timeDefines": [], "areas": [{"weatherCodes": []}]}]}
        ]);
        assert!(parse_weekly_forecast(body).unwrap().is_empty());
    }

    #[test]
    fn test_forecast_date_without_time() {
        assert_eq!(
            forecast_date("2024-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert!(forecast_date("tomorrow").is_err());
    }

    #[test]
    fn test_parse_area_catalog() {
        let body = json!({
            "centers": {
                "010300": {"name": "関東甲信地方", "enName": "Kanto Koshin", "children": ["130000"]}
            },
            "offices": {
                "130000": {"name": "東京都", "enName": "Tokyo", "officeName": "気象庁", "parent": "010300", "children": ["130010"]},
                "999999": {"enName": "No Japanese name"},
                "888888": "not an entry"
            },
            "class10s": {}
        });

        let catalog = parse_area_catalog(body).unwrap();
        assert_eq!(catalog.offices.len(), 2);
        assert_eq!(catalog.regions()[1], Region::new("999999", UNKNOWN_REGION_NAME));
        assert_eq!(catalog.offices["130000"].parent.as_deref(), Some("010300"));
        assert_eq!(catalog.centers["010300"].children, vec!["130000"]);
    }

    #[test]
    fn test_area_catalog_without_offices_is_malformed() {
        let err = parse_area_catalog(json!({"centers": {}})).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));

        let err = parse_area_catalog(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ForecastError::MalformedResponse(_)));
    }
}
