//! Typed errors for the graph-maker library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use std::fmt;

use thiserror::Error;

/// Errors that can escape a pipeline call.
///
/// Oracle and parse failures are absent on purpose: they are recovered
/// inside the oracle adapter and surface as a degraded chunk instead.
#[derive(Debug, Error)]
pub enum GraphMakerError {
    /// A node or relationship record from the oracle violated the record contract
    #[error("chunk {chunk}: malformed record: {source}")]
    Record {
        chunk: usize,
        #[source]
        source: RecordError,
    },

    /// A sink failed while consuming the graph
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Ontology could not be built from its transport form
    #[error("ontology error: {0}")]
    Ontology(#[from] OntologyError),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Reading document input failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by an extraction oracle invocation.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, DNS, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, auth)
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The call did not finish within the configured timeout
    #[error("oracle call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The oracle answered without any content
    #[error("empty response from oracle")]
    EmptyResponse,

    /// The transport envelope could not be decoded
    #[error("could not decode oracle response: {0}")]
    Decode(String),
}

/// Which array of the partial graph a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Node,
    Relationship,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Node => f.write_str("node"),
            RecordKind::Relationship => f.write_str("relationship"),
        }
    }
}

/// A single malformed record, identified by kind and position in its array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record is not a JSON object
    #[error("{kind} #{index} is not an object")]
    NotAnObject { kind: RecordKind, index: usize },

    /// A required field is absent or null
    #[error("{kind} #{index} is missing field `{field}`")]
    MissingField {
        kind: RecordKind,
        index: usize,
        field: &'static str,
    },

    /// A field holds a value of the wrong JSON type
    #[error("{kind} #{index} field `{field}` must be a {expected}")]
    WrongType {
        kind: RecordKind,
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    /// Node label is not part of the ontology (only under `LabelPolicy::Reject`)
    #[error("node #{index} has label `{label}` outside the ontology")]
    UnknownLabel { index: usize, label: String },
}

/// Errors raised by graph sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    /// An edge references a node id that has no node entry
    #[error("edge {source_id} -> {target_id} references missing node `{missing}`")]
    MissingEndpoint {
        source_id: String,
        target_id: String,
        missing: String,
    },

    /// Graph database rejected a statement or the connection failed
    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Writing an export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing export data failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors rebuilding an ontology from its transport form.
#[derive(Debug, Error)]
pub enum OntologyError {
    /// Transport form lacks a field
    #[error("ontology is missing `{0}`")]
    MissingField(&'static str),

    /// Transport field has the wrong shape
    #[error("ontology field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    /// Ontology JSON could not be parsed
    #[error("ontology JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, GraphMakerError>;

/// Result type alias for oracle invocations.
pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Result type alias for sink operations.
pub type SinkResult<T> = std::result::Result<T, SinkError>;
