//! Issue Read Client
//!
//! Read-only access to the issues the collector derives from events.
//! Consumed by editor tooling to list and inspect issues.

pub mod client;

pub use client::IssuesClient;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Issue record as served by `GET /v1/issues`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub category: String,
    pub impact: String,
    pub confidence: f64,
    #[serde(default)]
    pub screen: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub evidence: Map<String, Value>,
    #[serde(default)]
    pub recommendation: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Issue {
    /// Short label for list views: `[impact] title`
    pub fn label(&self) -> String {
        format!("[{}] {}", self.impact, self.title)
    }
}
