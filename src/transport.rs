//! The HTTP seam between the dispatch loop and the remote model.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::{AgentError, Result};
use crate::wire::ChatRequest;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";

/// One chat-completions round-trip. The response comes back as raw JSON;
/// classification happens in the dispatch loop.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn round_trip(&self, request: &ChatRequest) -> Result<Value>;
}

/// Posts requests with reqwest. The client is built on first use and reused
/// for the lifetime of the transport.
pub struct HttpTransport {
    endpoint: String,
    timeout: Duration,
    client: OnceCell<reqwest::Client>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(60),
            client: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn client(&self) -> Result<&reqwest::Client> {
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(|err| AgentError::Transport(format!("http client error: {err}")))
            })
            .await
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn round_trip(&self, request: &ChatRequest) -> Result<Value> {
        let response = self
            .client()
            .await?
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| {
                AgentError::Transport(format!("request to {} failed: {err}", self.endpoint))
            })?;

        // Non-2xx statuses are not rejected here: an OpenAI-style error body
        // has no `choices` and fails classification instead.
        let body = response
            .text()
            .await
            .map_err(|err| AgentError::Transport(format!("failed reading response body: {err}")))?;

        serde_json::from_str(&body)
            .map_err(|err| AgentError::MalformedResponse(format!("response is not JSON: {err}")))
    }
}

/// A scripted transport for tests and demos. Pops one canned outcome per
/// round and records every request body it saw.
pub struct StubTransport {
    outcomes: Mutex<VecDeque<Result<Value>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubTransport {
    pub fn new(responses: Vec<Value>) -> std::sync::Arc<Self> {
        Self::with_outcomes(responses.into_iter().map(Ok).collect())
    }

    pub fn with_outcomes(outcomes: Vec<Result<Value>>) -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Request bodies observed so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("stub transport poisoned").clone()
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn round_trip(&self, request: &ChatRequest) -> Result<Value> {
        self.requests
            .lock()
            .expect("stub transport poisoned")
            .push(request.clone());
        self.outcomes
            .lock()
            .expect("stub transport poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(AgentError::Transport(
                    "stub transport ran out of scripted responses".into(),
                ))
            })
    }
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for std::sync::Arc<T> {
    async fn round_trip(&self, request: &ChatRequest) -> Result<Value> {
        (**self).round_trip(request).await
    }
}
