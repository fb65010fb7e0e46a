//! In-memory event and issue store

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::models::{EventIn, Issue, LinkCodeIn, NewIssue, ScreenLink, ScreenMetrics};

#[derive(Debug, Default)]
pub struct Store {
    events: RwLock<Vec<EventIn>>,
    issues: RwLock<Vec<Issue>>,
    screen_links: RwLock<HashMap<String, ScreenLink>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch, returning how many events were stored
    pub async fn ingest(&self, batch: Vec<EventIn>) -> usize {
        let count = batch.len();
        self.events.write().await.extend(batch);
        count
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// All stored events, in arrival order
    pub async fn events(&self) -> Vec<EventIn> {
        self.events.read().await.clone()
    }

    /// Events with `ts >= start`
    pub async fn events_since(&self, start: DateTime<Utc>) -> Vec<EventIn> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.ts >= start)
            .cloned()
            .collect()
    }

    /// Traffic, error share and p95 latency of one screen over a window
    pub async fn screen_metrics(&self, screen: &str, window_hours: i64, now: DateTime<Utc>) -> ScreenMetrics {
        let start = now - Duration::hours(window_hours);
        let events = self.events.read().await;
        let rows: Vec<&EventIn> = events
            .iter()
            .filter(|e| e.screen.as_deref() == Some(screen) && e.ts >= start)
            .collect();

        let total = rows.len();
        let api_errors = rows.iter().filter(|e| e.is_api_error()).count();

        let mut latencies: Vec<f64> = rows.iter().filter_map(|e| e.api_ms()).collect();
        let p95 = if latencies.is_empty() {
            None
        } else {
            latencies.sort_by(|a, b| a.total_cmp(b));
            let idx = (0.95 * (latencies.len() - 1) as f64) as usize;
            Some(latencies[idx])
        };

        let rate = if total > 0 { api_errors as f64 / total as f64 } else { 0.0 };

        ScreenMetrics {
            screen: screen.to_string(),
            window_hours,
            total_events: total,
            api_error_count: api_errors,
            api_error_rate: round4(rate),
            p95_api_ms: p95,
        }
    }

    /// Insert or replace the issue with the same key. The id is kept on update.
    pub async fn upsert_issue(&self, new: NewIssue, now: DateTime<Utc>) -> Issue {
        let mut issues = self.issues.write().await;

        let id = match issues.iter().position(|i| i.key == new.key) {
            Some(pos) => issues.remove(pos).id,
            None => issues.iter().map(|i| i.id).max().unwrap_or(0) + 1,
        };

        let issue = Issue {
            id,
            key: new.key,
            title: new.title,
            category: new.category,
            impact: new.impact,
            confidence: new.confidence,
            screen: new.screen,
            source: new.source,
            evidence: new.evidence,
            recommendation: new.recommendation,
            created_at: now,
        };
        issues.push(issue.clone());
        issue
    }

    /// Newest first
    pub async fn list_issues(&self, limit: usize) -> Vec<Issue> {
        let mut issues = self.issues.read().await.clone();
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        issues.truncate(limit);
        issues
    }

    pub async fn get_issue(&self, key: &str) -> Option<Issue> {
        self.issues.read().await.iter().find(|i| i.key == key).cloned()
    }

    /// Insert or replace the source linked to a screen
    pub async fn link_screen(&self, link: LinkCodeIn, now: DateTime<Utc>) -> ScreenLink {
        let stored = ScreenLink {
            screen: link.screen,
            source: link.source,
            updated_at: now,
        };
        self.screen_links
            .write()
            .await
            .insert(stored.screen.clone(), stored.clone());
        stored
    }

    pub async fn screen_link(&self, screen: &str) -> Option<ScreenLink> {
        self.screen_links.read().await.get(screen).cloned()
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str, screen: Option<&str>, api_ms: Option<u64>, ts: DateTime<Utc>) -> EventIn {
        let mut props = serde_json::Map::new();
        if let Some(ms) = api_ms {
            props.insert("api_ms".to_string(), json!(ms));
        }
        EventIn {
            event_id: format!("evt_{}", name),
            name: name.to_string(),
            ts,
            user_id: "u1".to_string(),
            session_id: "s1".to_string(),
            platform: "ios".to_string(),
            app_version: "1.0".to_string(),
            os_version: "17".to_string(),
            device_model: "iPhone".to_string(),
            screen: screen.map(str::to_string),
            source: None,
            props,
        }
    }

    fn new_issue(key: &str, title: &str) -> NewIssue {
        NewIssue {
            key: key.to_string(),
            title: title.to_string(),
            category: "reliability".to_string(),
            impact: "low".to_string(),
            confidence: 0.65,
            screen: None,
            source: None,
            evidence: json!({}),
            recommendation: json!({}),
        }
    }

    #[tokio::test]
    async fn test_ingest_and_count() {
        let store = Store::new();
        let now = Utc::now();
        let n = store
            .ingest(vec![event("a", None, None, now), event("b", None, None, now)])
            .await;
        assert_eq!(n, 2);
        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn test_screen_metrics() {
        let store = Store::new();
        let now = Utc::now();
        let mut batch = Vec::new();
        for ms in [100, 200, 300, 400] {
            batch.push(event("api_ok", Some("Cart"), Some(ms), now));
        }
        batch.push(event("api_error", Some("Cart"), Some(900), now));
        batch.push(event("screen_view", Some("Cart"), None, now));
        batch.push(event("api_error", Some("Home"), Some(50), now));
        batch.push(event("api_error", Some("Cart"), Some(10), now - Duration::hours(30)));
        store.ingest(batch).await;

        let metrics = store.screen_metrics("Cart", 24, now).await;
        assert_eq!(metrics.total_events, 6);
        assert_eq!(metrics.api_error_count, 1);
        assert_eq!(metrics.api_error_rate, 0.1667);
        // sorted [100,200,300,400,900], idx = floor(0.95 * 4) = 3
        assert_eq!(metrics.p95_api_ms, Some(400.0));
    }

    #[tokio::test]
    async fn test_screen_metrics_empty() {
        let store = Store::new();
        let metrics = store.screen_metrics("Nowhere", 24, Utc::now()).await;
        assert_eq!(metrics.total_events, 0);
        assert_eq!(metrics.api_error_rate, 0.0);
        assert_eq!(metrics.p95_api_ms, None);
    }

    #[tokio::test]
    async fn test_link_screen_replaces_source() {
        let store = Store::new();
        let t0 = Utc::now();
        let link = |source: &str| LinkCodeIn {
            screen: "Home".to_string(),
            source: source.to_string(),
        };

        store.link_screen(link("src/Home.tsx"), t0).await;
        let updated = store
            .link_screen(link("src/screens/Home.tsx"), t0 + Duration::seconds(5))
            .await;
        assert_eq!(updated.updated_at, t0 + Duration::seconds(5));

        let stored = store.screen_link("Home").await.unwrap();
        assert_eq!(stored.source, "src/screens/Home.tsx");
        assert!(store.screen_link("Cart").await.is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_id() {
        let store = Store::new();
        let t0 = Utc::now();
        let first = store.upsert_issue(new_issue("k1", "one"), t0).await;
        let other = store.upsert_issue(new_issue("k2", "two"), t0).await;
        let updated = store
            .upsert_issue(new_issue("k1", "one again"), t0 + Duration::seconds(5))
            .await;

        assert_eq!(first.id, 1);
        assert_eq!(other.id, 2);
        assert_eq!(updated.id, 1);
        assert_eq!(store.get_issue("k1").await.unwrap().title, "one again");

        let listed = store.list_issues(10).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].key, "k1");
        assert_eq!(store.list_issues(1).await.len(), 1);
    }
}
