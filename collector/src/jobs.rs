//! Reliability Issue Job
//!
//! Background task that turns per-screen API error rates into issues.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::models::{EventIn, NewIssue};
use crate::store::round4;
use crate::AppState;

/// At most this many screens are reported per run
const MAX_ISSUES_PER_RUN: usize = 8;

const UNKNOWN_SCREEN: &str = "(unknown)";

#[derive(Debug, Default)]
struct ScreenStats<'a> {
    source: Option<&'a str>,
    errors: usize,
    total: usize,
}

/// Derive reliability issues from a window of events.
///
/// Screens with fewer than `min_events` events are ignored; the rest are
/// ranked by API error share and the top ones returned.
pub fn derive_reliability_issues(
    events: &[EventIn],
    min_events: usize,
    window_hours: i64,
) -> Vec<NewIssue> {
    let mut by_screen: BTreeMap<&str, ScreenStats> = BTreeMap::new();

    for event in events {
        let screen = event.screen.as_deref().unwrap_or(UNKNOWN_SCREEN);
        let stats = by_screen.entry(screen).or_default();
        stats.total += 1;
        if event.is_api_error() {
            stats.errors += 1;
        }
        if let Some(source) = event.source.as_deref() {
            if stats.source.map_or(true, |s| source > s) {
                stats.source = Some(source);
            }
        }
    }

    let mut ranked: Vec<(&str, ScreenStats, f64)> = by_screen
        .into_iter()
        .filter(|(_, s)| s.total > 0 && s.total >= min_events)
        .map(|(screen, s)| {
            let rate = s.errors as f64 / s.total as f64;
            (screen, s, rate)
        })
        .collect();
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));
    ranked.truncate(MAX_ISSUES_PER_RUN);

    ranked
        .into_iter()
        .map(|(screen, stats, rate)| {
            let error_rate = round4(rate);
            let impact = if rate >= 0.15 {
                "high"
            } else if rate >= 0.07 {
                "medium"
            } else {
                "low"
            };

            NewIssue {
                key: format!("reliability:{}:{}h", screen, window_hours),
                title: format!("High API error rate on {} ({:.1}%)", screen, error_rate * 100.0),
                category: "reliability".to_string(),
                impact: impact.to_string(),
                confidence: 0.65,
                screen: (screen != UNKNOWN_SCREEN).then(|| screen.to_string()),
                source: stats.source.map(str::to_string),
                evidence: json!({
                    "window_hours": window_hours,
                    "error_rate": error_rate,
                    "errors": stats.errors,
                    "total_events": stats.total,
                }),
                recommendation: json!({
                    "hypothesis": "API failures correlate with checkout abandonment.",
                    "suggested_fixes": [
                        "Add retry/backoff for transient errors",
                        "Add timeout-specific UX feedback",
                        "Capture endpoint + latency instrumentation",
                    ],
                    "experiment": {
                        "variantA": "Current error handling",
                        "variantB": "Retry + explicit user messaging",
                        "primaryMetric": "checkout_completion_rate",
                    },
                }),
            }
        })
        .collect()
}

/// One pass over the configured window. Returns the number of issues upserted.
pub async fn run_issue_job(state: &AppState, now: DateTime<Utc>) -> usize {
    let window_hours = state.config.issue_window_hours;
    let events = state
        .store
        .events_since(now - chrono::Duration::hours(window_hours))
        .await;

    let issues = derive_reliability_issues(&events, state.config.min_events_for_issue, window_hours);
    let count = issues.len();
    for issue in issues {
        tracing::debug!("Upserting issue {}", issue.key);
        state.store.upsert_issue(issue, now).await;
    }
    count
}

/// Spawn the periodic issue job
pub fn start_issue_job(state: AppState) -> tokio::task::JoinHandle<()> {
    let period = Duration::from_secs(state.config.issue_job_interval_secs);
    tracing::info!("Issue job running every {}s", period.as_secs());

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let count = run_issue_job(&state, Utc::now()).await;
            if count > 0 {
                tracing::info!("Issue job upserted {} issues", count);
            }
        }
    })
}
