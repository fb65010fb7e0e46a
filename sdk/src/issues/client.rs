//! Issues API Client
//!
//! HTTP client for the collector's issue endpoints.

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;

use super::Issue;
use crate::constants;
use crate::error::IssuesError;
use crate::telemetry::{HttpFetch, HttpRequest, ReqwestFetch};

/// Issues API client
#[derive(Clone)]
pub struct IssuesClient {
    base_url: String,
    fetch: Arc<dyn HttpFetch>,
}

impl IssuesClient {
    pub fn new(base_url: impl Into<String>, fetch: Arc<dyn HttpFetch>) -> Self {
        Self {
            base_url: base_url.into(),
            fetch,
        }
    }

    /// Client for `UXPULSE_BASE_URL` (or the default collector) over reqwest
    pub fn from_env() -> Self {
        Self::new(constants::get_base_url(), Arc::new(ReqwestFetch::new()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/v1/issues?limit=N`
    pub async fn fetch_issues(&self, limit: usize) -> Result<Vec<Issue>, IssuesError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    /// `GET {base}/v1/issues/{key}` (key sent as one encoded path segment)
    pub async fn fetch_issue(&self, key: &str) -> Result<Issue, IssuesError> {
        let url = self.endpoint(&[key])?;
        self.get_json(url).await
    }

    /// Build `{base}/v1/issues[/segments...]`
    fn endpoint(&self, extra: &[&str]) -> Result<Url, IssuesError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| IssuesError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| IssuesError::InvalidUrl(self.base_url.clone()))?;
            segments.pop_if_empty();
            for part in constants::ISSUES_PATH.split('/').filter(|s| !s.is_empty()) {
                segments.push(part);
            }
            for part in extra {
                segments.push(part);
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, IssuesError> {
        let response = self.fetch.fetch(HttpRequest::get(url.as_str())).await?;

        if !response.is_success() {
            log::warn!("Issue request {} failed: {}", url, response.status);
            return Err(IssuesError::Status(response.status));
        }

        response
            .json()
            .map_err(|e| IssuesError::Parse(e.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
