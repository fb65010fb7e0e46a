//! Recording fake of the fetch primitive used by unit tests

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::transport::{HttpFetch, HttpRequest, HttpResponse};
use crate::error::FetchError;

#[derive(Debug, Clone)]
enum Reply {
    Status(u16, Vec<u8>),
    Fail(String),
}

/// Records every request and answers with a fixed reply
#[derive(Debug, Clone)]
pub struct RecordingFetch {
    reply: Arc<Mutex<Reply>>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl RecordingFetch {
    fn new(reply: Reply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok() -> Self {
        Self::with_status(200)
    }

    pub fn with_status(status: u16) -> Self {
        Self::new(Reply::Status(status, b"{}".to_vec()))
    }

    pub fn with_body(status: u16, body: &str) -> Self {
        Self::new(Reply::Status(status, body.as_bytes().to_vec()))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(Reply::Fail(message.to_string()))
    }

    /// Sleep before answering (tokio clock)
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, message: &str) {
        *self.reply.lock() = Reply::Fail(message.to_string());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Bodies of recorded requests parsed as JSON
    pub fn json_bodies(&self) -> Vec<serde_json::Value> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.body.as_ref())
            .filter_map(|b| serde_json::from_slice(b).ok())
            .collect()
    }
}

#[async_trait]
impl HttpFetch for RecordingFetch {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        self.requests.lock().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.reply.lock().clone();
        match reply {
            Reply::Status(status, body) => Ok(HttpResponse::new(status, body)),
            Reply::Fail(message) => Err(FetchError::Network(message)),
        }
    }
}
