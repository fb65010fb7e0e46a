//! UXPulse SDK
//!
//! Collects usage and diagnostic events from client applications and
//! delivers them in batches to a UXPulse collector.
//!
//! - Events are buffered in memory and flushed every 5 s (configurable)
//!   or on demand.
//! - `tracked_fetch` instruments outbound calls with `api_ok` / `api_error`
//!   events carrying latency and status.
//! - Delivery is fire-and-forget: a batch whose POST fails is dropped,
//!   never retried or re-queued.
//!
//! # Example
//!
//! ```no_run
//! use uxpulse::{FetchInit, Platform, SdkConfig, TelemetryClient, TrackOptions};
//!
//! # async fn run() {
//! let client = TelemetryClient::with_reqwest();
//! client.initialize(SdkConfig::new(
//!     "http://localhost:8000", "u1", "s1", Platform::Ios, "1.0", "17", "iPhone",
//! ));
//!
//! client.track_screen("Home", Some("src/screens/Home.tsx"));
//! client.track_event("add_to_cart", TrackOptions::new().screen("Home").prop("sku", "A-1"));
//! let _ = client.tracked_fetch("https://api.example.com/cart", FetchInit::new().screen("Home")).await;
//!
//! client.shutdown().await;
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod global;
pub mod issues;
pub mod telemetry;

pub use error::{ConfigError, FetchError, IssuesError};
pub use issues::{Issue, IssuesClient};
pub use telemetry::{
    ClientStats, Event, EventBatch, FetchInit, FlushOutcome, HttpFetch, HttpRequest, HttpResponse,
    Platform, ReqwestFetch, SchedulerState, SdkConfig, SessionContext, SkipReason, TelemetryClient,
    TrackOptions,
};
