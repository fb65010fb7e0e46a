//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Seconds between reliability issue runs
    pub issue_job_interval_secs: u64,

    /// Minimum events a screen needs before an issue is raised for it
    pub min_events_for_issue: usize,

    /// Look-back window of the issue job, in hours
    pub issue_window_hours: i64,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            issue_job_interval_secs: 60,
            min_events_for_issue: 5,
            issue_window_hours: 24,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_env("PORT").unwrap_or(defaults.port),

            issue_job_interval_secs: parse_env("ISSUE_JOB_INTERVAL_SECS")
                .filter(|s| *s > 0)
                .unwrap_or(defaults.issue_job_interval_secs),

            min_events_for_issue: parse_env("MIN_EVENTS_FOR_ISSUE")
                .unwrap_or(defaults.min_events_for_issue),

            issue_window_hours: parse_env("ISSUE_WINDOW_HOURS")
                .filter(|h| *h > 0)
                .unwrap_or(defaults.issue_window_hours),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
