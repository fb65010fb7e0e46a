//! Process-wide default client
//!
//! Module-level functions for hosts that want a single ambient tracker.
//! All of them delegate to one lazily-built [`TelemetryClient`] backed by
//! `reqwest`. Tracking before [`init`] is a no-op.

use once_cell::sync::Lazy;

use crate::error::FetchError;
use crate::telemetry::{
    ClientStats, FetchInit, FlushOutcome, HttpResponse, SdkConfig, TelemetryClient, TrackOptions,
};

static CLIENT: Lazy<TelemetryClient> = Lazy::new(TelemetryClient::with_reqwest);

/// The shared client (e.g. to hand to code that takes a `TelemetryClient`)
pub fn client() -> TelemetryClient {
    CLIENT.clone()
}

/// Initialize or re-initialize the global client
pub fn init(config: SdkConfig) {
    CLIENT.initialize(config);
}

pub fn track_event(name: &str, opts: TrackOptions) {
    CLIENT.track_event(name, opts);
}

pub fn track_screen(screen: &str, source: Option<&str>) {
    CLIENT.track_screen(screen, source);
}

pub async fn tracked_fetch(endpoint: &str, init: FetchInit) -> Result<HttpResponse, FetchError> {
    CLIENT.tracked_fetch(endpoint, init).await
}

pub async fn flush() -> FlushOutcome {
    CLIENT.flush().await
}

/// Stop the timer and flush what is left
pub async fn shutdown() -> FlushOutcome {
    CLIENT.shutdown().await
}

pub fn queue_len() -> usize {
    CLIENT.queue_len()
}

pub fn stats() -> ClientStats {
    CLIENT.stats()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_global_noop_before_init() {
        track_event("custom", TrackOptions::new().prop("foo", 1));
        track_screen("Home", Some("src/Home.tsx"));

        assert_eq!(queue_len(), 0);
        assert!(!stats().initialized);
        assert_eq!(
            flush().await,
            FlushOutcome::Skipped(crate::telemetry::SkipReason::Uninitialized)
        );
    }
}
