//! Partial graphs - one chunk's raw extraction output.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OracleError;

/// Raw oracle output for one chunk.
///
/// Records are kept as untyped JSON. Shape checks happen when the
/// accumulator merges them, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialGraph {
    #[serde(default)]
    pub nodes: Vec<Value>,

    #[serde(default)]
    pub relationships: Vec<Value>,
}

impl PartialGraph {
    /// The empty partial graph (what a failed chunk contributes).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }
}

/// Why a chunk produced no usable extraction.
#[derive(Debug, Clone)]
pub enum DegradeReason {
    /// The oracle call itself failed
    Oracle(OracleError),

    /// The oracle answered but the text was not the expected JSON shape
    Parse(String),
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Oracle(e) => write!(f, "oracle call failed: {}", e),
            DegradeReason::Parse(msg) => write!(f, "response parse failed: {}", msg),
        }
    }
}

/// Outcome of extracting one chunk.
///
/// `Degraded` always merges as the empty partial graph, but keeps the reason
/// so a legitimately empty extraction can be told apart from a failure.
#[derive(Debug, Clone)]
pub enum PartialGraphResult {
    Extracted(PartialGraph),
    Degraded { reason: DegradeReason },
}

impl PartialGraphResult {
    pub fn is_degraded(&self) -> bool {
        matches!(self, PartialGraphResult::Degraded { .. })
    }

    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match self {
            PartialGraphResult::Degraded { reason } => Some(reason),
            PartialGraphResult::Extracted(_) => None,
        }
    }

    /// The partial graph to merge; empty for degraded chunks.
    pub fn into_partial(self) -> PartialGraph {
        match self {
            PartialGraphResult::Extracted(partial) => partial,
            PartialGraphResult::Degraded { .. } => PartialGraph::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_merges_as_empty() {
        let result = PartialGraphResult::Degraded {
            reason: DegradeReason::Parse("expected value".into()),
        };
        assert!(result.is_degraded());
        assert!(result.degrade_reason().unwrap().to_string().contains("parse"));
        assert_eq!(result.into_partial(), PartialGraph::empty());
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let partial: PartialGraph = serde_json::from_str(r#"{"nodes": []}"#).unwrap();
        assert!(partial.relationships.is_empty());
        assert!(partial.is_empty());
    }
}
