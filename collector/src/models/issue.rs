//! Issue model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub category: String,
    pub impact: String,
    pub confidence: f64,
    pub screen: Option<String>,
    pub source: Option<String>,
    pub evidence: Value,
    pub recommendation: Value,
    pub created_at: DateTime<Utc>,
}

/// Insert-or-update payload, keyed by `key`
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub key: String,
    pub title: String,
    pub category: String,
    pub impact: String,
    pub confidence: f64,
    pub screen: Option<String>,
    pub source: Option<String>,
    pub evidence: Value,
    pub recommendation: Value,
}

#[derive(Debug, Deserialize, Default)]
pub struct IssueFilter {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationOut {
    pub issue_key: String,
    pub title: String,
    pub recommendation: Value,
    pub confidence: f64,
}

#[derive(Debug, Deserialize, Default)]
pub struct MetricsQuery {
    pub window_hours: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenMetrics {
    pub screen: String,
    pub window_hours: i64,
    pub total_events: usize,
    pub api_error_count: usize,
    pub api_error_rate: f64,
    pub p95_api_ms: Option<f64>,
}
