//! Telemetry Client
//!
//! Owns the session, queue, scheduler and fetch primitive.
//! Cheap to clone; clones share the same state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;

use super::event::{Event, TrackOptions};
use super::fetch::{instrumented_fetch, FetchInit};
use super::queue::EventQueue;
use super::scheduler::{FlushScheduler, SchedulerState};
use super::session::{SdkConfig, SessionContext};
use super::transport::{deliver_batch, HttpFetch, HttpResponse, ReqwestFetch};
use crate::constants::EVENT_SCREEN_VIEW;
use crate::error::FetchError;

// ============================================================================
// FLUSH OUTCOME
// ============================================================================

/// Why a flush did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Uninitialized,
    EmptyQueue,
}

/// Result of one drain-and-deliver. Never an error: a failed delivery is
/// reported here and the batch is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    Skipped(SkipReason),
    /// The collector answered (any status)
    Delivered { events: usize, status: u16 },
    /// Transport failure; the batch was dropped
    Dropped { events: usize, error: FetchError },
}

impl FlushOutcome {
    /// Number of events removed from the queue by this flush
    pub fn drained(&self) -> usize {
        match self {
            FlushOutcome::Skipped(_) => 0,
            FlushOutcome::Delivered { events, .. } | FlushOutcome::Dropped { events, .. } => *events,
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Counters for this client since construction
#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub initialized: bool,
    pub scheduler: SchedulerState,
    pub queued: usize,
    pub events_tracked: u64,
    pub batches_sent: u64,
    pub batches_rejected: u64,
    pub events_sent: u64,
    pub events_dropped: u64,
}

#[derive(Default)]
struct Counters {
    events_tracked: AtomicU64,
    batches_sent: AtomicU64,
    batches_rejected: AtomicU64,
    events_sent: AtomicU64,
    events_dropped: AtomicU64,
}

// ============================================================================
// CLIENT
// ============================================================================

struct ActiveSession {
    base_url: String,
    context: SessionContext,
}

struct ClientInner {
    fetch: Arc<dyn HttpFetch>,
    session: RwLock<Option<ActiveSession>>,
    queue: EventQueue,
    scheduler: FlushScheduler,
    /// Held across drain + send so batches leave in drain order
    delivery: tokio::sync::Mutex<()>,
    counters: Counters,
}

/// Event telemetry client
#[derive(Clone)]
pub struct TelemetryClient {
    inner: Arc<ClientInner>,
}

impl TelemetryClient {
    /// Uninitialized client using the given fetch primitive
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                fetch,
                session: RwLock::new(None),
                queue: EventQueue::new(),
                scheduler: FlushScheduler::new(),
                delivery: tokio::sync::Mutex::new(()),
                counters: Counters::default(),
            }),
        }
    }

    /// Uninitialized client backed by `reqwest`
    pub fn with_reqwest() -> Self {
        Self::new(Arc::new(ReqwestFetch::new()))
    }

    /// Store (or wholesale replace) the session and start the flush timer
    /// if it has never run. Already-queued events keep their old context.
    pub fn initialize(&self, config: SdkConfig) {
        let period = config.flush_interval();
        let session = ActiveSession {
            base_url: config.collector_url().to_string(),
            context: config.session_context(),
        };

        let replaced = self.inner.session.write().replace(session).is_some();
        if replaced {
            log::info!("Telemetry re-initialized (session {})", config.session_id);
        } else {
            log::info!(
                "Telemetry initialized: {} ({} {})",
                config.collector_url(),
                config.platform,
                config.app_version
            );
        }

        let weak: Weak<ClientInner> = Arc::downgrade(&self.inner);
        self.inner.scheduler.start(period, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => {
                        inner.flush().await;
                        true
                    }
                    None => false,
                }
            }
        });
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.session.read().is_some()
    }

    /// Current session context, if initialized
    pub fn session(&self) -> Option<SessionContext> {
        self.inner.session.read().as_ref().map(|s| s.context.clone())
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.inner.scheduler.state()
    }

    /// Append an event to the queue. No-op before `initialize`.
    pub fn track_event(&self, name: &str, opts: TrackOptions) {
        self.inner.track_event(name, opts);
    }

    /// `track_event("screen_view", { screen, source })`
    pub fn track_screen(&self, screen: &str, source: Option<&str>) {
        let opts = TrackOptions::new().screen(screen).maybe_source(source);
        self.track_event(EVENT_SCREEN_VIEW, opts);
    }

    /// Perform a request through the fetch primitive and record one
    /// `api_ok`/`api_error` event. The fetch result is returned unchanged.
    pub async fn tracked_fetch(
        &self,
        endpoint: &str,
        init: FetchInit,
    ) -> Result<HttpResponse, FetchError> {
        instrumented_fetch(self.inner.fetch.as_ref(), endpoint, init, |name, opts| {
            self.track_event(name, opts)
        })
        .await
    }

    /// Drain the queue and deliver it as one batch
    pub async fn flush(&self) -> FlushOutcome {
        self.inner.flush().await
    }

    /// Fire-and-forget flush. `None` when no tokio runtime is available.
    pub fn spawn_flush(&self) -> Option<JoinHandle<FlushOutcome>> {
        let handle = tokio::runtime::Handle::try_current().ok()?;
        let inner = self.inner.clone();
        Some(handle.spawn(async move { inner.flush().await }))
    }

    /// Stop the timer for good, then flush what is left
    pub async fn shutdown(&self) -> FlushOutcome {
        self.inner.scheduler.stop().await;
        let outcome = self.inner.flush().await;
        log::info!(
            "Telemetry shutdown. Total events tracked: {}",
            self.inner.counters.events_tracked.load(Ordering::SeqCst)
        );
        outcome
    }

    pub fn queue_len(&self) -> usize {
        self.inner.queue.len()
    }

    /// Pending events, oldest first (does not drain)
    pub fn pending_events(&self) -> Vec<Event> {
        self.inner.queue.snapshot()
    }

    pub fn stats(&self) -> ClientStats {
        let c = &self.inner.counters;
        ClientStats {
            initialized: self.is_initialized(),
            scheduler: self.scheduler_state(),
            queued: self.queue_len(),
            events_tracked: c.events_tracked.load(Ordering::SeqCst),
            batches_sent: c.batches_sent.load(Ordering::SeqCst),
            batches_rejected: c.batches_rejected.load(Ordering::SeqCst),
            events_sent: c.events_sent.load(Ordering::SeqCst),
            events_dropped: c.events_dropped.load(Ordering::SeqCst),
        }
    }
}

impl ClientInner {
    fn track_event(&self, name: &str, opts: TrackOptions) {
        let event = {
            let session = self.session.read();
            match session.as_ref() {
                Some(s) => Event::new(name, &s.context, opts),
                None => return,
            }
        };

        log::trace!("Queued event {} ({})", event.name, event.event_id);
        self.queue.push(event);
        self.counters.events_tracked.fetch_add(1, Ordering::SeqCst);
    }

    async fn flush(&self) -> FlushOutcome {
        let _delivery = self.delivery.lock().await;

        let base_url = match self.session.read().as_ref() {
            Some(s) => s.base_url.clone(),
            None => return FlushOutcome::Skipped(SkipReason::Uninitialized),
        };

        let batch = self.queue.drain_all();
        if batch.is_empty() {
            return FlushOutcome::Skipped(SkipReason::EmptyQueue);
        }

        let count = batch.len();
        log::debug!("Flushing {} events to {}", count, base_url);

        match deliver_batch(self.fetch.as_ref(), &base_url, batch).await {
            Ok(response) => {
                self.counters.batches_sent.fetch_add(1, Ordering::SeqCst);
                self.counters.events_sent.fetch_add(count as u64, Ordering::SeqCst);
                if !response.is_success() {
                    self.counters.batches_rejected.fetch_add(1, Ordering::SeqCst);
                    log::warn!("Collector answered {} for batch of {} events", response.status, count);
                }
                FlushOutcome::Delivered {
                    events: count,
                    status: response.status,
                }
            }
            Err(error) => {
                self.counters.events_dropped.fetch_add(count as u64, Ordering::SeqCst);
                log::warn!("Batch delivery failed, {} events dropped: {}", count, error);
                FlushOutcome::Dropped { events: count, error }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::session::Platform;
    use crate::telemetry::test_support::RecordingFetch;
    use std::time::Duration;

    fn config(session_id: &str) -> SdkConfig {
        SdkConfig::new("http://x", "u1", session_id, Platform::Ios, "1.0", "17", "iPhone")
    }

    fn client(fetch: &RecordingFetch) -> TelemetryClient {
        TelemetryClient::new(Arc::new(fetch.clone()))
    }

    fn event_names(body: &serde_json::Value) -> Vec<String> {
        body["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_tracking_before_init_is_noop() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);

        client.track_event("custom", TrackOptions::new().prop("foo", 1));
        client.track_screen("Home", None);
        assert_eq!(client.queue_len(), 0);
        assert!(!client.is_initialized());

        assert_eq!(client.flush().await, FlushOutcome::Skipped(SkipReason::Uninitialized));
        assert_eq!(fetch.call_count(), 0);
    }

    #[tokio::test]
    async fn test_screen_view_scenario() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));

        client.track_screen("Home", None);
        let outcome = client.flush().await;
        assert_eq!(outcome, FlushOutcome::Delivered { events: 1, status: 200 });

        let requests = fetch.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://x/v1/events/batch");

        let body = &fetch.json_bodies()[0];
        let event = &body["events"][0];
        assert_eq!(event["name"], "screen_view");
        assert_eq!(event["screen"], "Home");
        assert_eq!(event["user_id"], "u1");
        assert_eq!(event["session_id"], "s1");
        assert_eq!(event["platform"], "ios");
        assert!(event.get("source").is_none());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_batch_of_three() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));

        for _ in 0..3 {
            client.track_event("custom", TrackOptions::new().prop("foo", 1));
        }
        assert_eq!(client.queue_len(), 3);

        client.flush().await;
        assert_eq!(client.queue_len(), 0);
        assert_eq!(fetch.call_count(), 1);

        let body = &fetch.json_bodies()[0];
        assert_eq!(body["events"].as_array().unwrap().len(), 3);
        assert_eq!(body["events"][0]["props"]["foo"], 1);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_fifo_order_preserved() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));

        let names: Vec<String> = (0..50).map(|i| format!("e{}", i)).collect();
        for name in &names {
            client.track_event(name, TrackOptions::new());
        }
        client.flush().await;

        assert_eq!(event_names(&fetch.json_bodies()[0]), names);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_flush_makes_no_request() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));

        assert_eq!(client.flush().await, FlushOutcome::Skipped(SkipReason::EmptyQueue));
        assert_eq!(fetch.call_count(), 0);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_delivery_drops_batch() {
        let fetch = RecordingFetch::failing("unreachable");
        let client = client(&fetch);
        client.initialize(config("s1"));

        client.track_event("a", TrackOptions::new());
        client.track_event("b", TrackOptions::new());

        let outcome = client.flush().await;
        assert_eq!(
            outcome,
            FlushOutcome::Dropped {
                events: 2,
                error: FetchError::Network("unreachable".to_string())
            }
        );
        assert_eq!(client.queue_len(), 0);

        // Nothing re-queued: the next flush has nothing to send
        assert_eq!(client.flush().await, FlushOutcome::Skipped(SkipReason::EmptyQueue));
        assert_eq!(fetch.call_count(), 1);
        assert_eq!(client.stats().events_dropped, 2);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_collector_going_down_drops_only_later_batches() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));

        client.track_event("a", TrackOptions::new());
        assert_eq!(client.flush().await, FlushOutcome::Delivered { events: 1, status: 200 });

        fetch.set_failing("connection reset");
        client.track_event("b", TrackOptions::new());
        client.track_event("c", TrackOptions::new());
        assert_eq!(client.flush().await.drained(), 2);

        let stats = client.stats();
        assert_eq!(stats.events_sent, 1);
        assert_eq!(stats.events_dropped, 2);
        assert_eq!(stats.queued, 0);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_error_status_counts_as_delivered() {
        let fetch = RecordingFetch::with_status(500);
        let client = client(&fetch);
        client.initialize(config("s1"));

        client.track_event("a", TrackOptions::new());
        assert_eq!(client.flush().await, FlushOutcome::Delivered { events: 1, status: 500 });

        let stats = client.stats();
        assert_eq!(stats.batches_sent, 1);
        assert_eq!(stats.batches_rejected, 1);
        assert_eq!(client.queue_len(), 0);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_reinit_does_not_rewrite_queued_events() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("old"));
        client.track_event("before", TrackOptions::new());

        client.initialize(config("new"));
        client.track_event("after", TrackOptions::new());
        assert_eq!(client.session().unwrap().session_id, "new");

        client.flush().await;
        let body = &fetch.json_bodies()[0];
        assert_eq!(body["events"][0]["session_id"], "old");
        assert_eq!(body["events"][1]["session_id"], "new");

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_tracked_fetch_transport_failure() {
        let fetch = RecordingFetch::failing("socket closed");
        let client = client(&fetch);
        client.initialize(config("s1"));

        let err = client
            .tracked_fetch("http://api/orders", FetchInit::new().screen("Checkout"))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Network("socket closed".to_string()));

        let events = client.pending_events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.name, "api_error");
        assert_eq!(event.screen.as_deref(), Some("Checkout"));
        assert_eq!(event.props["endpoint"], "http://api/orders");
        assert!(event.props["error"].as_str().unwrap().contains("socket closed"));
        assert!(event.props["api_ms"].as_u64().is_some());
        assert!(!event.props.contains_key("status"));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_tracked_fetch_error_status() {
        let fetch = RecordingFetch::with_status(404);
        let client = client(&fetch);
        client.initialize(config("s1"));

        let response = client.tracked_fetch("http://api/missing", FetchInit::new()).await.unwrap();
        assert_eq!(response.status, 404);

        let events = client.pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "api_error");
        assert_eq!(events[0].props["status"], 404);
        assert!(!events[0].props.contains_key("error"));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_tracked_fetch_ok() {
        let fetch = RecordingFetch::with_body(200, r#"{"items":[]}"#);
        let client = client(&fetch);
        client.initialize(config("s1"));

        let response = client
            .tracked_fetch("http://api/items", FetchInit::new().source("src/Items.tsx"))
            .await
            .unwrap();
        assert_eq!(response.text(), r#"{"items":[]}"#);

        let events = client.pending_events();
        assert_eq!(events[0].name, "api_ok");
        assert_eq!(events[0].props["status"], 200);
        assert_eq!(events[0].source.as_deref(), Some("src/Items.tsx"));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_tracked_fetch_before_init_still_fetches() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);

        client.tracked_fetch("http://api/items", FetchInit::new()).await.unwrap();
        assert_eq!(fetch.call_count(), 1);
        assert_eq!(client.queue_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_flushes_periodically() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1").with_flush_interval(Duration::from_millis(5000)));
        assert_eq!(client.scheduler_state(), SchedulerState::Active);

        client.track_event("a", TrackOptions::new());
        tokio::time::sleep(Duration::from_millis(5001)).await;
        assert_eq!(fetch.call_count(), 1);
        assert_eq!(client.queue_len(), 0);

        client.track_event("b", TrackOptions::new());
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(fetch.call_count(), 2);

        client.shutdown().await;
        assert_eq!(client.scheduler_state(), SchedulerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reinit_keeps_single_timer() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        // Timer ticks at 1000, 2000, 3000
        client.initialize(config("s1").with_flush_interval(Duration::from_secs(1)));

        // A timer started here would tick at 1500 and 2500 as well
        tokio::time::sleep(Duration::from_millis(500)).await;
        client.initialize(config("s2").with_flush_interval(Duration::from_secs(1)));
        assert_eq!(client.scheduler_state(), SchedulerState::Active);

        // Events at 750, 1250, 1750, 2250, 2750 leave something queued before every half-period
        tokio::time::sleep(Duration::from_millis(250)).await;
        for i in 0..5 {
            client.track_event(&format!("e{}", i), TrackOptions::new());
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        let batches: Vec<Vec<String>> = fetch.json_bodies().iter().map(event_names).collect();
        assert_eq!(batches, vec![vec!["e0"], vec!["e1", "e2"], vec!["e3", "e4"]]);
        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_flushes_never_double_send() {
        let fetch = RecordingFetch::ok().delayed(Duration::from_millis(100));
        let client = client(&fetch);
        client.initialize(config("s1"));

        for i in 0..10 {
            client.track_event(&format!("e{}", i), TrackOptions::new());
        }

        let (a, b) = tokio::join!(client.flush(), client.flush());
        assert_eq!(a.drained() + b.drained(), 10);
        assert_eq!(fetch.call_count(), 1);

        let sent: Vec<String> = fetch.json_bodies().iter().flat_map(event_names).collect();
        assert_eq!(sent.len(), 10);

        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_tracked_during_delivery_go_to_next_batch() {
        let fetch = RecordingFetch::ok().delayed(Duration::from_millis(100));
        let client = client(&fetch);
        client.initialize(config("s1"));

        client.track_event("first", TrackOptions::new());
        let in_flight = client.spawn_flush().unwrap();
        tokio::task::yield_now().await;

        client.track_event("second", TrackOptions::new());
        assert_eq!(client.queue_len(), 1);
        assert_eq!(in_flight.await.unwrap().drained(), 1);

        client.flush().await;
        let bodies = fetch.json_bodies();
        assert_eq!(event_names(&bodies[0]), vec!["first"]);
        assert_eq!(event_names(&bodies[1]), vec!["second"]);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_flushes_remaining() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));
        client.track_event("last", TrackOptions::new());

        let outcome = client.shutdown().await;
        assert_eq!(outcome, FlushOutcome::Delivered { events: 1, status: 200 });
        assert_eq!(client.scheduler_state(), SchedulerState::Stopped);

        // Second shutdown is harmless
        assert_eq!(client.shutdown().await, FlushOutcome::Skipped(SkipReason::EmptyQueue));
    }

    #[test]
    fn test_initialize_without_runtime() {
        let fetch = RecordingFetch::ok();
        let client = client(&fetch);
        client.initialize(config("s1"));

        assert!(client.is_initialized());
        assert_eq!(client.scheduler_state(), SchedulerState::Idle);

        client.track_event("a", TrackOptions::new());
        assert_eq!(client.queue_len(), 1);
    }

    #[tokio::test]
    async fn test_independent_clients() {
        let fetch_a = RecordingFetch::ok();
        let fetch_b = RecordingFetch::ok();
        let a = client(&fetch_a);
        let b = client(&fetch_b);
        a.initialize(config("a"));

        a.track_event("x", TrackOptions::new());
        b.track_event("x", TrackOptions::new());
        assert_eq!(a.queue_len(), 1);
        assert_eq!(b.queue_len(), 0);

        a.shutdown().await;
        b.shutdown().await;
        assert_eq!(fetch_a.call_count(), 1);
        assert_eq!(fetch_b.call_count(), 0);
    }
}
