//! Telemetry Module
//!
//! Event tracking, buffering and batch delivery to the collector.
//!
//! ## Structure
//! - `session.rs` - Platform, SessionContext, SdkConfig
//! - `event.rs` - Event struct (immutable, timestamped) + TrackOptions
//! - `queue.rs` - FIFO buffer with atomic drain
//! - `transport.rs` - HttpFetch primitive + batch delivery
//! - `fetch.rs` - Instrumented fetch (api_ok / api_error events)
//! - `scheduler.rs` - Periodic flush timer
//! - `client.rs` - TelemetryClient tying it all together
//!
//! ## Usage
//! ```ignore
//! let client = TelemetryClient::with_reqwest();
//! client.initialize(SdkConfig::from_env()?);
//!
//! client.track_screen("Home", None);
//! let res = client.tracked_fetch("https://api.example.com/cart", FetchInit::new().screen("Home")).await?;
//!
//! client.shutdown().await;
//! ```

pub mod client;
pub mod event;
pub mod fetch;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientStats, FlushOutcome, SkipReason, TelemetryClient};
pub use event::{Event, TrackOptions};
pub use fetch::FetchInit;
pub use queue::EventQueue;
pub use scheduler::{FlushScheduler, SchedulerState};
pub use session::{Platform, SdkConfig, SessionContext};
pub use transport::{EventBatch, HttpFetch, HttpRequest, HttpResponse, ReqwestFetch};
