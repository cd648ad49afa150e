use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::models::DayRecord;

pub const TITLE: &str = "Repository";
pub const DATE: &str = "Date";
pub const COMMITS: &str = "Commits";
pub const ISSUES: &str = "Issues";
pub const PULL_REQUESTS: &str = "Pull_Requests";
pub const REVIEWS: &str = "Reviews";
pub const SLEEP_SCORE: &str = "Sleep_Score";
pub const RECOVERY_SCORE: &str = "Recovery_Score";
pub const STRAIN_SCORE: &str = "Strain_Score";
pub const HRV_RMSSD: &str = "HRV_RMSSD";
pub const RESTING_HR: &str = "Resting_HR";
pub const SLEEP_EFFICIENCY: &str = "Sleep_Efficiency";
pub const SLEEP_DURATION: &str = "Sleep_Duration";
pub const DEEP_SLEEP: &str = "Deep_Sleep";
pub const REM_SLEEP: &str = "REM_Sleep";

pub const WRITTEN_PROPERTIES: &[(&str, &str)] = &[
    (TITLE, "title"),
    (DATE, "date"),
    (COMMITS, "number"),
    (ISSUES, "number"),
    (PULL_REQUESTS, "number"),
    (REVIEWS, "number"),
    (SLEEP_SCORE, "number"),
    (RECOVERY_SCORE, "number"),
    (STRAIN_SCORE, "number"),
    (HRV_RMSSD, "number"),
    (RESTING_HR, "number"),
    (SLEEP_EFFICIENCY, "number"),
    (SLEEP_DURATION, "rich_text"),
    (DEEP_SLEEP, "rich_text"),
    (REM_SLEEP, "rich_text"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(String),
    RichText(String),
    Date(NaiveDate),
    Number(f64),
}

impl PropertyValue {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Title(content) => json!({ "title": [{ "text": { "content": content } }] }),
            Self::RichText(content) => {
                json!({ "rich_text": [{ "text": { "content": content } }] })
            }
            Self::Date(date) => json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } }),
            Self::Number(value) => json!({ "number": value }),
        }
    }
}

pub type PropertyMap = BTreeMap<String, PropertyValue>;

pub fn to_json_map(properties: &PropertyMap) -> serde_json::Map<String, Value> {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

pub fn record_properties(record: &DayRecord) -> PropertyMap {
    let mut properties = PropertyMap::new();
    let health = &record.health;

    let counts = [
        (COMMITS, record.commit_count),
        (ISSUES, record.issue_count),
        (PULL_REQUESTS, record.pull_request_count),
        (REVIEWS, record.review_count),
    ];
    for (name, count) in counts {
        if let Some(count) = count {
            properties.insert(name.to_string(), PropertyValue::Number(count as f64));
        }
    }

    let numbers = [
        (SLEEP_SCORE, health.sleep_score),
        (RECOVERY_SCORE, health.recovery_score),
        (STRAIN_SCORE, health.strain_score),
        (HRV_RMSSD, health.hrv_rmssd),
        (RESTING_HR, health.resting_heart_rate),
        (SLEEP_EFFICIENCY, health.sleep_efficiency),
    ];
    for (name, value) in numbers {
        if let Some(value) = value {
            properties.insert(name.to_string(), PropertyValue::Number(value));
        }
    }

    let durations = [
        (SLEEP_DURATION, health.sleep_duration_millis),
        (DEEP_SLEEP, health.deep_sleep_millis),
        (REM_SLEEP, health.rem_sleep_millis),
    ];
    for (name, millis) in durations {
        if let Some(text) = millis.and_then(format_duration) {
            properties.insert(name.to_string(), PropertyValue::RichText(text));
        }
    }

    properties
}

pub fn format_duration(millis: u64) -> Option<String> {
    if millis == 0 {
        return None;
    }
    let total_minutes = millis / 60_000;
    Some(format!("{}h {}m", total_minutes / 60, total_minutes % 60))
}
