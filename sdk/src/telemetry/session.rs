//! Session Context
//!
//! Identity and environment fields attached to every event,
//! plus the configuration accepted by `initialize`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants;
use crate::error::ConfigError;

// ============================================================================
// PLATFORM
// ============================================================================

/// Client platform (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "mobile-ios")]
    Ios,
    #[serde(alias = "mobile-android")]
    Android,
}

impl Platform {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ios" | "mobile-ios" => Ok(Platform::Ios),
            "android" | "mobile-android" => Ok(Platform::Android),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

// ============================================================================
// SESSION CONTEXT
// ============================================================================

/// Immutable per-session identity, copied into every event at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub session_id: String,
    pub platform: Platform,
    pub app_version: String,
    pub os_version: String,
    pub device_model: String,
}

// ============================================================================
// SDK CONFIG
// ============================================================================

/// Configuration passed to `initialize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    /// Collector base URL, e.g. `http://localhost:8000`
    pub base_url: String,
    pub user_id: String,
    pub session_id: String,
    pub platform: Platform,
    pub app_version: String,
    pub os_version: String,
    pub device_model: String,
    /// Flush period in milliseconds
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

fn default_flush_interval_ms() -> u64 {
    constants::DEFAULT_FLUSH_INTERVAL_MS
}

impl SdkConfig {
    /// Build a config with the default flush period
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
        platform: Platform,
        app_version: impl Into<String>,
        os_version: impl Into<String>,
        device_model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            platform,
            app_version: app_version.into(),
            os_version: os_version.into(),
            device_model: device_model.into(),
            flush_interval_ms: constants::DEFAULT_FLUSH_INTERVAL_MS,
        }
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = (interval.as_millis() as u64).max(1);
        self
    }

    /// Load configuration from `UXPULSE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let platform = constants::env_or("UXPULSE_PLATFORM", "ios").parse()?;

        Ok(Self {
            base_url: constants::get_base_url(),
            user_id: constants::env_or("UXPULSE_USER_ID", "anonymous"),
            session_id: std::env::var("UXPULSE_SESSION_ID")
                .unwrap_or_else(|_| Uuid::new_v4().to_string()),
            platform,
            app_version: constants::env_or("UXPULSE_APP_VERSION", constants::SDK_VERSION),
            os_version: constants::env_or("UXPULSE_OS_VERSION", std::env::consts::OS),
            device_model: constants::env_or("UXPULSE_DEVICE_MODEL", std::env::consts::ARCH),
            flush_interval_ms: constants::get_flush_interval_ms(),
        })
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }

    /// Session fields of this config
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
            platform: self.platform,
            app_version: self.app_version.clone(),
            os_version: self.os_version.clone(),
            device_model: self.device_model.clone(),
        }
    }

    /// Base URL without trailing slashes
    pub fn collector_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

// ============================================================================
// TESTS
// ============================================================================
