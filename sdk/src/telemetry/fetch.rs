//! Instrumented Fetch
//!
//! Wraps one call to the fetch primitive, measures its latency and
//! emits exactly one `api_ok` / `api_error` event per call.

use reqwest::Method;
use serde_json::Value;
use tokio::time::Instant;

use super::event::TrackOptions;
use super::transport::{HttpFetch, HttpRequest, HttpResponse};
use crate::constants::{EVENT_API_ERROR, EVENT_API_OK};
use crate::error::FetchError;

/// Request options for `tracked_fetch`, plus the screen/source to tag
#[derive(Debug, Clone)]
pub struct FetchInit {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub screen: Option<String>,
    pub source: Option<String>,
}

impl Default for FetchInit {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            screen: None,
            source: None,
        }
    }
}

impl FetchInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn into_parts(self, endpoint: &str) -> (HttpRequest, TrackOptions) {
        let request = HttpRequest {
            method: self.method,
            url: endpoint.to_string(),
            headers: self.headers,
            body: self.body,
        };
        let mut opts = TrackOptions::new();
        opts.screen = self.screen;
        opts.source = self.source;
        (request, opts)
    }
}

/// Name and properties of the event describing one fetch outcome
pub fn outcome_event(
    endpoint: &str,
    result: &Result<HttpResponse, FetchError>,
    api_ms: u64,
    opts: TrackOptions,
) -> (&'static str, TrackOptions) {
    let opts = opts.prop("endpoint", endpoint).prop("api_ms", api_ms);

    match result {
        Ok(response) if response.is_success() => {
            (EVENT_API_OK, opts.prop("status", response.status))
        }
        Ok(response) => (EVENT_API_ERROR, opts.prop("status", response.status)),
        Err(err) => (EVENT_API_ERROR, opts.prop("error", Value::String(err.message()))),
    }
}

/// Perform the request, hand the outcome event to `record`, then return the
/// fetch result unchanged. Timing brackets only the fetch call.
pub async fn instrumented_fetch<F>(
    fetch: &dyn HttpFetch,
    endpoint: &str,
    init: FetchInit,
    record: F,
) -> Result<HttpResponse, FetchError>
where
    F: FnOnce(&str, TrackOptions),
{
    let (request, opts) = init.into_parts(endpoint);

    let start = Instant::now();
    let result = fetch.fetch(request).await;
    let api_ms = start.elapsed().as_millis() as u64;

    let (name, opts) = outcome_event(endpoint, &result, api_ms, opts);
    record(name, opts);

    if let Err(e) = &result {
        log::debug!("Tracked fetch to {} failed after {}ms: {}", endpoint, api_ms, e);
    }
    result
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::test_support::RecordingFetch;
    use std::time::Duration;

    #[test]
    fn test_outcome_ok() {
        let result = Ok(HttpResponse::new(200, ""));
        let (name, opts) = outcome_event("/api/cart", &result, 12, TrackOptions::new().screen("Cart"));

        assert_eq!(name, "api_ok");
        assert_eq!(opts.props["status"], 200);
        assert_eq!(opts.props["api_ms"], 12);
        assert_eq!(opts.props["endpoint"], "/api/cart");
        assert_eq!(opts.screen.as_deref(), Some("Cart"));
        assert!(!opts.props.contains_key("error"));
    }

    #[test]
    fn test_outcome_error_status() {
        let result = Ok(HttpResponse::new(502, ""));
        let (name, opts) = outcome_event("/api/cart", &result, 3, TrackOptions::new());

        assert_eq!(name, "api_error");
        assert_eq!(opts.props["status"], 502);
        assert!(!opts.props.contains_key("error"));
    }

    #[test]
    fn test_outcome_transport_failure() {
        let result = Err(FetchError::Network("dns failure".to_string()));
        let (name, opts) = outcome_event("/api/cart", &result, 0, TrackOptions::new());

        assert_eq!(name, "api_error");
        assert_eq!(opts.props["error"], "network error: dns failure");
        assert!(!opts.props.contains_key("status"));
    }

    #[tokio::test]
    async fn test_request_passed_through() {
        let fetch = RecordingFetch::ok();
        let init = FetchInit::new()
            .method(Method::PUT)
            .header("X-Trace", "abc")
            .body("payload")
            .screen("Home");

        instrumented_fetch(&fetch, "http://api/items", init, |_, _| {}).await.unwrap();

        let request = &fetch.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.url, "http://api/items");
        assert_eq!(request.header_value("x-trace"), Some("abc"));
        assert_eq!(request.body.as_deref(), Some(&b"payload"[..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_measured_around_call() {
        let fetch = RecordingFetch::ok().delayed(Duration::from_millis(250));
        let mut recorded = None;

        instrumented_fetch(&fetch, "http://api/slow", FetchInit::new(), |name, opts| {
            recorded = Some((name.to_string(), opts));
        })
        .await
        .unwrap();

        let (name, opts) = recorded.unwrap();
        assert_eq!(name, "api_ok");
        assert_eq!(opts.props["api_ms"], 250);
    }

    #[tokio::test]
    async fn test_failure_recorded_then_returned() {
        let fetch = RecordingFetch::failing("connection reset");
        let mut calls = 0;

        let err = instrumented_fetch(&fetch, "http://api/x", FetchInit::new(), |name, _| {
            assert_eq!(name, "api_error");
            calls += 1;
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 1);
        assert_eq!(err, FetchError::Network("connection reset".to_string()));
    }
}
