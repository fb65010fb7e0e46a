//! Delivery Transport
//!
//! The host fetch primitive ([`HttpFetch`]) and batch delivery to
//! `POST {base_url}/v1/events/batch`. Only this layer talks to the network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::event::Event;
use crate::constants;
use crate::error::FetchError;

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

/// Outbound request handed to the fetch primitive
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// POST with a JSON body and `Content-Type: application/json`
    pub fn post_json<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self, FetchError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| FetchError::InvalidRequest(format!("failed to encode body: {}", e)))?;

        Ok(Self::new(Method::POST, url)
            .header("Content-Type", "application/json")
            .body(bytes))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response from the fetch primitive: status code plus raw body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

// ============================================================================
// FETCH PRIMITIVE
// ============================================================================

/// Generic HTTP fetch capability provided by the host.
///
/// Implementations return `Ok` for every HTTP response, whatever its status,
/// and `Err` only when no response was obtained.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// [`HttpFetch`] backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    /// Client with reqwest's default settings (no request timeout)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

// ============================================================================
// BATCH DELIVERY
// ============================================================================

/// Wire body of the batch endpoint: `{"events": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<Event>,
}

/// Full URL of the batch endpoint for a base URL
pub fn batch_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), constants::BATCH_PATH)
}

/// Send one batch in a single POST. Any HTTP status counts as delivered;
/// only a transport failure is an error. No retry.
pub async fn deliver_batch(
    fetch: &dyn HttpFetch,
    base_url: &str,
    events: Vec<Event>,
) -> Result<HttpResponse, FetchError> {
    let url = batch_url(base_url);
    let request = HttpRequest::post_json(&url, &EventBatch { events })?;
    fetch.fetch(request).await
}

// ============================================================================
// TESTS
// ============================================================================
