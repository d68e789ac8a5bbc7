//! Terminal rendering of forecasts and regions.

use tenki_forecast::{DailyForecast, ForecastOutcome, Region, RegionForecasts, RegionGroup};

/// Display names for the JMA weather codes the terminal knows about.
const WEATHER_CODES: &[(&str, &str)] = &[
    ("100", "晴れ"),
    ("101", "晴れ 時々 くもり"),
    ("103", "晴れ 時々 雨"),
    ("105", "晴れ 時々 雪"),
    ("111", "晴れ のち くもり"),
    ("200", "くもり"),
    ("201", "くもり 時々 晴れ"),
    ("203", "くもり 時々 雨"),
    ("205", "くもり 時々 雪"),
    ("206", "くもり のち 雨"),
    ("260", "くもり のち 時々 雨"),
    ("300", "雨"),
    ("301", "雨 時々 晴れ"),
    ("303", "雨 時々 雪"),
    ("306", "大雨"),
    ("400", "雪"),
    ("401", "雪 時々 晴れ"),
    ("402", "雪 時々止む"),
    ("403", "雪 時々 雨"),
    ("405", "大雪"),
];

/// Coarse sky condition, from the leading digit of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sky {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Unknown,
}

impl Sky {
    pub fn from_code(code: &str) -> Self {
        match code.as_bytes().first() {
            Some(b'1') => Sky::Clear,
            Some(b'2') => Sky::Cloudy,
            Some(b'3') => Sky::Rain,
            Some(b'4') => Sky::Snow,
            _ => Sky::Unknown,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Sky::Clear => "☀",
            Sky::Cloudy => "☁",
            Sky::Rain => "☂",
            Sky::Snow => "❄",
            Sky::Unknown => "?",
        }
    }
}

/// Display name for a weather code; unlisted codes get a generic label.
pub fn weather_name(code: &str) -> &'static str {
    WEATHER_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("不明な天気", |&(_, name)| name)
}

fn temperature(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |t| format!("{}℃", t))
}

pub fn day_line(day: &DailyForecast) -> String {
    format!(
        "{}  {} {} ({})  {} / {}",
        day.date.format("%Y-%m-%d"),
        Sky::from_code(&day.weather_code).symbol(),
        weather_name(&day.weather_code),
        day.weather_code,
        temperature(day.min_temp),
        temperature(day.max_temp),
    )
}

pub fn forecasts(data: &RegionForecasts) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", data.region_name, data.region_code)];
    lines.extend(data.days.iter().map(day_line));
    lines
}

/// Lines for any outcome. The bool is false for `Failed`.
pub fn outcome(outcome: &ForecastOutcome) -> (Vec<String>, bool) {
    match outcome {
        ForecastOutcome::Data(data) => (forecasts(data), true),
        ForecastOutcome::Empty { region_code } => (
            vec![format!("No forecast days published for {}.", region_code)],
            true,
        ),
        ForecastOutcome::Failed(e) => {
            let mut lines = vec![e.user_message()];
            if e.is_retryable() {
                lines.push("This looks temporary; try again later.".to_string());
            }
            (lines, false)
        }
    }
}

pub fn groups(groups: &[RegionGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!("{} ({})", group.name, group.code));
        lines.extend(
            group
                .members
                .iter()
                .map(|r| format!("  {}  {}", r.code, r.name)),
        );
    }
    lines
}

pub fn regions(regions: &[Region]) -> Vec<String> {
    regions
        .iter()
        .map(|r| format!("{}  {}", r.code, r.name))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDate;
    use tenki_forecast::ForecastError;

    fn day(code: &str, min: Option<f64>, max: Option<f64>) -> DailyForecast {
        DailyForecast {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            weather_code: code.to_string(),
            min_temp: min,
            max_temp: max,
        }
    }

    #[test]
    fn test_weather_name_lookup() {
        assert_eq!(weather_name("100"), "晴れ");
        assert_eq!(weather_name("405"), "大雪");
        assert_eq!(weather_name("999"), "不明な天気");
    }

    #[test]
    fn test_sky_by_code_family() {
        assert_eq!(Sky::from_code("111"), Sky::Clear);
        assert_eq!(Sky::from_code("260"), Sky::Cloudy);
        assert_eq!(Sky::from_code("306"), Sky::Rain);
        assert_eq!(Sky::from_code("402"), Sky::Snow);
        assert_eq!(Sky::from_code(""), Sky::Unknown);
    }

    #[test]
    fn test_day_line_with_missing_temps() {
        let line = day_line(&day("300", None, Some(21.5)));
        assert_eq!(line, "2024-05-02  ☂ 雨 (300)  - / 21.5℃");
    }

    #[test]
    fn test_failed_outcome_is_not_ok() {
        let failed = ForecastOutcome::Failed(ForecastError::fetch(Some(404), Some("999999"), "Not Found"));
        let (lines, ok) = outcome(&failed);
        assert!(!ok);
        assert_eq!(lines.len(), 1);

        let empty = ForecastOutcome::Empty {
            region_code: "130000".into(),
        };
        assert!(outcome(&empty).1);
    }

    #[test]
    fn test_transient_failure_suggests_retry() {
        let (lines, ok) = outcome(&ForecastOutcome::Failed(ForecastError::fetch(
            Some(503),
            Some("130000"),
            "Service Unavailable",
        )));
        assert!(!ok);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("try again later"));
    }

    #[test]
    fn test_groups_indent_members() {
        let lines = groups(&[RegionGroup {
            code: "010300".into(),
            name: "関東甲信地方".into(),
            members: vec![Region::new("130000", "東京都")],
        }]);
        assert_eq!(lines, vec!["関東甲信地方 (010300)", "  130000  東京都"]);
    }
}
