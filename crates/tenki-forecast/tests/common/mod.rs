//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tenki_forecast::{CacheCoordinator, ForecastStore, JmaClient};
use wiremock::MockServer;

pub const WEEK_CODES: [&str; 7] = ["100", "101", "200", "201", "300", "301", "400"];

/// A JMA-shaped forecast document whose weekly period starts on 2024-05-02.
///
/// `temps` is `Some((mins, maxs))` to include the temperature series.
pub fn forecast_document(codes: &[&str], temps: Option<(&[&str], &[&str])>) -> Value {
    let dates: Vec<String> = (0..codes.len())
        .map(|i| format!("2024-05-{:02}T00:00:00+09:00", i + 2))
        .collect();

    let mut weekly_series = vec![json!({
        "timeDefines": dates,
        "areas": [{
            "area": {"name": "東京地方", "code": "130010"},
            "weatherCodes": codes,
            "pops": vec![""; codes.len()],
            "reliabilities": vec![""; codes.len()]
        }]
    })];

    if let Some((mins, maxs)) = temps {
        weekly_series.push(json!({
            "timeDefines": dates,
            "areas": [{
                "area": {"name": "東京", "code": "44132"},
                "tempsMin": mins,
                "tempsMax": maxs
            }]
        }));
    }

    json!([
        {
            "publishingOffice": "気象庁",
            "reportDatetime": "2024-05-01T11:00:00+09:00",
            "timeSeries": [{
                "timeDefines": ["2024-05-01T11:00:00+09:00"],
                "areas": [{"area": {"name": "東京地方", "code": "130010"}, "weatherCodes": ["100"]}]
            }]
        },
        {
            "publishingOffice": "気象庁",
            "reportDatetime": "2024-05-01T11:00:00+09:00",
            "timeSeries": weekly_series
        }
    ])
}

pub fn area_document() -> Value {
    json!({
        "centers": {
            "010300": {"name": "関東甲信地方", "enName": "Kanto Koshin", "officeName": "気象庁", "children": ["130000", "140000"]},
            "010600": {"name": "近畿地方", "enName": "Kinki", "children": ["270000"]}
        },
        "offices": {
            "130000": {"name": "東京都", "enName": "Tokyo", "officeName": "気象庁", "parent": "010300", "children": ["130010"]},
            "140000": {"name": "神奈川県", "enName": "Kanagawa", "parent": "010300", "children": ["140010"]},
            "270000": {"name": "大阪府", "enName": "Osaka", "parent": "010600", "children": ["270000"]}
        },
        "class10s": {}
    })
}

pub fn client_for(server: &MockServer) -> JmaClient {
    JmaClient::with_endpoints(
        &format!("{}/bosai/common/const/area.json", server.uri()),
        &format!("{}/bosai/forecast/data/forecast", server.uri()),
        Duration::from_secs(5),
        "tenki-integration",
    )
    .unwrap()
}

pub fn coordinator_for(server: &MockServer) -> CacheCoordinator<JmaClient> {
    CacheCoordinator::new(
        client_for(server),
        Arc::new(ForecastStore::in_memory().unwrap()),
    )
}
