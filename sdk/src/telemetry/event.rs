//! Telemetry Event Definition
//!
//! One [`Event`] per tracked occurrence. Events snapshot the session
//! context at creation and are never modified afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::session::{Platform, SessionContext};

// ============================================================================
// TRACK OPTIONS
// ============================================================================

/// Optional screen, source and extra properties for `track_event`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackOptions {
    pub screen: Option<String>,
    pub source: Option<String>,
    pub props: Map<String, Value>,
}

impl TrackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn maybe_source(mut self, source: Option<impl Into<String>>) -> Self {
        self.source = source.map(Into::into);
        self
    }

    /// Add one extra property (a repeated key overwrites the earlier value)
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_props(mut self, props: Map<String, Value>) -> Self {
        self.props.extend(props);
        self
    }
}

// ============================================================================
// EVENT
// ============================================================================

/// A single timestamped occurrence destined for the collector.
///
/// Field names are the wire contract of the batch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub name: String,
    #[serde(with = "iso_millis")]
    pub ts: DateTime<Utc>,
    pub user_id: String,
    pub session_id: String,
    pub platform: Platform,
    pub app_version: String,
    pub os_version: String,
    pub device_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl Event {
    /// Create an event from the current session context.
    ///
    /// `screen` and `source` are also copied into `props` when present.
    pub fn new(name: &str, ctx: &SessionContext, opts: TrackOptions) -> Self {
        let TrackOptions { screen, source, mut props } = opts;

        if let Some(screen) = &screen {
            props.insert("screen".to_string(), Value::String(screen.clone()));
        }
        if let Some(source) = &source {
            props.insert("source".to_string(), Value::String(source.clone()));
        }

        Self {
            event_id: new_event_id(),
            name: name.to_string(),
            ts: Utc::now(),
            user_id: ctx.user_id.clone(),
            session_id: ctx.session_id.clone(),
            platform: ctx.platform,
            app_version: ctx.app_version.clone(),
            os_version: ctx.os_version.clone(),
            device_model: ctx.device_model.clone(),
            screen,
            source,
            props,
        }
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }
}

/// `evt_` followed by a random v4 UUID in simple form
fn new_event_id() -> String {
    format!("evt_{}", Uuid::new_v4().simple())
}

/// ISO-8601 with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
