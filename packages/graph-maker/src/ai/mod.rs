//! Oracle implementations for the graph-maker library.
//!
//! This module provides reference implementations of the `ExtractionOracle`
//! trait. Users can use these directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::{OpenAIOracle, DEFAULT_BASE_URL, DEFAULT_MODEL};
