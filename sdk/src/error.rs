//! Error types

use thiserror::Error;

/// Failure of the underlying fetch primitive (no HTTP response was received).
///
/// HTTP error statuses are not errors at this level; they come back as an
/// [`HttpResponse`](crate::telemetry::HttpResponse) with a non-2xx status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Message recorded in the `error` property of an `api_error` event
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_builder() {
            FetchError::InvalidRequest(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Issue client errors
#[derive(Debug, Clone, Error)]
pub enum IssuesError {
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    #[error("Server error: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Configuration errors raised while loading [`SdkConfig`](crate::telemetry::SdkConfig)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown platform: {0} (expected ios or android)")]
    UnknownPlatform(String),
}
