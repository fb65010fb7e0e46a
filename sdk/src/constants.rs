//! Central Configuration Constants
//!
//! Single source of truth for SDK defaults.
//! Every value can be overridden from the environment.

/// Default collector URL
///
/// Fallback when `UXPULSE_BASE_URL` is not set.
/// Matches the port the local collector binds to by default.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default flush period (milliseconds)
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 5000;

/// Path of the batch ingestion endpoint, appended to the base URL
pub const BATCH_PATH: &str = "/v1/events/batch";

/// Path of the issue listing endpoint
pub const ISSUES_PATH: &str = "/v1/issues";

/// Default number of issues requested by the issue client
pub const DEFAULT_ISSUE_LIMIT: usize = 100;

/// SDK version
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Event names emitted by the SDK itself
// ============================================

pub const EVENT_SCREEN_VIEW: &str = "screen_view";
pub const EVENT_API_OK: &str = "api_ok";
pub const EVENT_API_ERROR: &str = "api_error";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get collector base URL from environment or use default
pub fn get_base_url() -> String {
    std::env::var("UXPULSE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// Get flush interval from environment or use default
pub fn get_flush_interval_ms() -> u64 {
    std::env::var("UXPULSE_FLUSH_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|ms| *ms > 0)
        .unwrap_or(DEFAULT_FLUSH_INTERVAL_MS)
}

/// Read an env var, falling back to `default` when unset or empty
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
