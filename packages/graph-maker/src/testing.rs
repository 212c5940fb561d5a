//! Testing utilities including a mock oracle.
//!
//! Useful for testing applications that use the graph-maker library
//! without making real LLM calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{OracleError, OracleResult};
use crate::traits::oracle::{ExtractionOracle, OracleRequest};

/// Response returned when nothing else is scripted.
pub const EMPTY_EXTRACTION: &str = r#"{"nodes": [], "relationships": []}"#;

/// A scripted oracle reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Error(OracleError),
}

/// A mock oracle for testing.
///
/// Replies are chosen in this order:
/// 1. a keyed reply whose needle starts the request's chunk text
/// 2. the next reply in the sequential queue
/// 3. [`EMPTY_EXTRACTION`]
///
/// Clones share scripts and call history, so a clone can be handed to the
/// pipeline while the original is kept for assertions.
#[derive(Clone, Default)]
pub struct MockOracle {
    /// Sequential replies
    queue: Arc<RwLock<VecDeque<MockResponse>>>,

    /// Replies keyed by chunk prefix
    keyed: Arc<RwLock<Vec<(String, MockResponse)>>>,

    /// Delays keyed by chunk prefix
    keyed_delays: Arc<RwLock<Vec<(String, Duration)>>>,

    /// Delay applied to every call
    delay: Option<Duration>,

    /// Call tracking for assertions
    requests: Arc<RwLock<Vec<OracleRequest>>>,

    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockOracle {
    /// Create a new mock oracle that answers with empty extractions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text reply.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.queue
            .write()
            .unwrap()
            .push_back(MockResponse::Text(text.into()));
        self
    }

    /// Queue a failure.
    pub fn fail_with(self, error: OracleError) -> Self {
        self.queue
            .write()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Reply with `text` whenever the chunk starts with `needle`.
    pub fn respond_to(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.keyed
            .write()
            .unwrap()
            .push((needle.into(), MockResponse::Text(text.into())));
        self
    }

    /// Fail whenever the chunk starts with `needle`.
    pub fn fail_on(self, needle: impl Into<String>, error: OracleError) -> Self {
        self.keyed
            .write()
            .unwrap()
            .push((needle.into(), MockResponse::Error(error)));
        self
    }

    /// Delay every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay calls whose chunk starts with `needle`.
    pub fn with_delay_for(self, needle: impl Into<String>, delay: Duration) -> Self {
        self.keyed_delays
            .write()
            .unwrap()
            .push((needle.into(), delay));
        self
    }

    /// Get all requests made to this mock.
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Number of calls made.
    pub fn call_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn chunk_starts_with(request: &OracleRequest, needle: &str) -> bool {
        request.prompt.contains(&format!("Text: {}", needle))
    }

    fn pick_response(&self, request: &OracleRequest) -> MockResponse {
        if let Some((_, response)) = self
            .keyed
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| Self::chunk_starts_with(request, needle))
        {
            return response.clone();
        }

        self.queue
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Text(EMPTY_EXTRACTION.to_string()))
    }

    fn pick_delay(&self, request: &OracleRequest) -> Option<Duration> {
        self.keyed_delays
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| Self::chunk_starts_with(request, needle))
            .map(|(_, delay)| *delay)
            .or(self.delay)
    }
}

#[async_trait]
impl ExtractionOracle for MockOracle {
    async fn complete(&self, request: &OracleRequest) -> OracleResult<String> {
        self.requests.write().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Pick before sleeping so queue order follows call order.
        let response = self.pick_response(request);
        if let Some(delay) = self.pick_delay(request) {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match response {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
