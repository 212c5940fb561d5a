//! Extraction oracle trait.
//!
//! The oracle is the LLM behind the pipeline. It receives a fully built
//! request and returns the raw assistant text; prompting lives in
//! [`crate::pipeline::prompts`] and parsing in [`crate::pipeline::extract`],
//! so implementations only deal with transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::OracleResult;

/// One chat-style request to the oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleRequest {
    /// System instruction
    pub system: String,

    /// User prompt (the filled extraction template)
    pub prompt: String,

    /// Sampling temperature; extraction always sends 0.0
    pub temperature: f32,
}

/// Extraction oracle trait.
///
/// Implementations wrap specific LLM providers (OpenAI, local models, etc.).
/// Errors are reported, never swallowed; the adapter decides what a failure
/// means for the pipeline.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Send the request and return the assistant's text content.
    async fn complete(&self, request: &OracleRequest) -> OracleResult<String>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "oracle"
    }
}

#[async_trait]
impl<T: ExtractionOracle + ?Sized> ExtractionOracle for Arc<T> {
    async fn complete(&self, request: &OracleRequest) -> OracleResult<String> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: ExtractionOracle + ?Sized> ExtractionOracle for Box<T> {
    async fn complete(&self, request: &OracleRequest) -> OracleResult<String> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
