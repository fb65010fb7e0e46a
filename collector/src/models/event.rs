//! Event model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One event as sent by the SDK. `props` is stored as-is, unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventIn {
    pub event_id: String,
    pub name: String,
    /// Timestamps without an offset are taken as UTC
    #[serde(deserialize_with = "utc_or_naive::deserialize")]
    pub ts: DateTime<Utc>,
    pub user_id: String,
    pub session_id: String,
    pub platform: String,
    pub app_version: String,
    pub os_version: String,
    pub device_model: String,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl EventIn {
    pub fn is_api_error(&self) -> bool {
        self.name == "api_error"
    }

    /// `props.api_ms` as a float, when present and numeric
    pub fn api_ms(&self) -> Option<f64> {
        self.props.get("api_ms").and_then(Value::as_f64)
    }
}

#[derive(Debug, Deserialize)]
pub struct EventBatchIn {
    pub events: Vec<EventIn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ingested: usize,
}

mod utc_or_naive {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
