//! Oracle adapter - turn one chunk into a partial graph, never failing.
//!
//! Every failure on this path degrades: a transport error or a response that
//! is not the expected JSON shape yields [`PartialGraphResult::Degraded`],
//! which merges as the empty partial graph. The chunk contributes nothing and
//! the document keeps going.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::OracleError;
use crate::pipeline::prompts::{format_extract_prompt, SYSTEM_PROMPT};
use crate::traits::oracle::{ExtractionOracle, OracleRequest};
use crate::types::{
    ontology::Ontology,
    partial::{DegradeReason, PartialGraph, PartialGraphResult},
};

/// Configuration for oracle invocation.
#[derive(Debug, Clone, Default)]
pub struct OracleConfig {
    /// Per-call deadline. `None` leaves timing to the transport.
    pub timeout: Option<Duration>,
}

impl OracleConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Builds oracle requests and parses responses defensively.
pub struct OracleAdapter<O: ExtractionOracle> {
    oracle: O,
    config: OracleConfig,
}

impl<O: ExtractionOracle> OracleAdapter<O> {
    /// Create an adapter around an oracle.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            config: OracleConfig::default(),
        }
    }

    /// Create with custom configuration.
    pub fn with_config(oracle: O, config: OracleConfig) -> Self {
        Self { oracle, config }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Build the request for one chunk. Temperature is pinned to 0.0.
    pub fn build_request(&self, chunk: &str, ontology: &Ontology) -> OracleRequest {
        OracleRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: format_extract_prompt(chunk, ontology),
            temperature: 0.0,
        }
    }

    /// Extract a partial graph from one chunk.
    pub async fn extract(&self, chunk: &str, ontology: &Ontology) -> PartialGraphResult {
        let request = self.build_request(chunk, ontology);

        let call = self.oracle.complete(&request);
        let response = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(OracleError::Timeout(limit)),
            },
            None => call.await,
        };

        let text = match response {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    oracle = self.oracle.name(),
                    error = %e,
                    chunk_chars = chunk.chars().count(),
                    "Oracle call failed, chunk contributes nothing"
                );
                return PartialGraphResult::Degraded {
                    reason: DegradeReason::Oracle(e),
                };
            }
        };

        match parse_extraction_response(&text) {
            Ok(partial) => {
                debug!(
                    nodes = partial.nodes.len(),
                    relationships = partial.relationships.len(),
                    "Parsed oracle response"
                );
                PartialGraphResult::Extracted(partial)
            }
            Err(e) => {
                warn!(
                    oracle = self.oracle.name(),
                    error = %e,
                    response_len = text.len(),
                    "Could not parse oracle response, chunk contributes nothing"
                );
                PartialGraphResult::Degraded {
                    reason: DegradeReason::Parse(e.to_string()),
                }
            }
        }
    }
}

/// Parse oracle text into a partial graph.
///
/// Accepts the object bare or inside a Markdown code fence. Missing `nodes`
/// or `relationships` default to empty; anything other than a JSON object
/// with array-valued keys is an error.
pub fn parse_extraction_response(response: &str) -> Result<PartialGraph, serde_json::Error> {
    let value: Value = serde_json::from_str(response)
        .or_else(|_| serde_json::from_str(strip_code_blocks(response)))?;

    if !value.is_object() {
        return Err(serde::de::Error::custom(
            "expected a JSON object with `nodes` and `relationships`",
        ));
    }

    serde_json::from_value(value)
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
