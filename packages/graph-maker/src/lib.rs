//! Knowledge Graph Extraction Library
//!
//! Turns unstructured text into a directed knowledge graph by asking an LLM
//! oracle to extract entities and relationships from each chunk of a
//! document, then merging the per-chunk results into one graph.
//!
//! # Design
//!
//! - Chunk order is merge order, even with concurrent oracle calls
//! - Oracle and parse failures degrade a chunk instead of failing the run
//! - Records are validated before they touch the graph
//! - Node identity is the oracle-assigned `id`; later writes win
//!
//! # Usage
//!
//! ```rust,ignore
//! use graph_maker::{Document, GraphMaker, Ontology};
//! use graph_maker::ai::OpenAIOracle;
//! use graph_maker::sinks::HtmlSink;
//!
//! let ontology = Ontology::new(["Person", "Place"], "where people live");
//! let mut maker = GraphMaker::new(ontology, OpenAIOracle::from_env()?);
//!
//! maker.process_document(&Document::new(text)).await?;
//! maker.export_to(&HtmlSink::new("graph.html")).await?;
//! ```
//!
//! # Modules
//!
//! - [`chunking`] - Word-packing and character-offset chunkers
//! - [`types`] - Documents, ontology, graph and partial-graph types
//! - [`traits`] - Core trait abstractions (ExtractionOracle, GraphSink, TextExtractor)
//! - [`pipeline`] - Prompting, fail-open extraction, merging, orchestration
//! - [`sinks`] - HTML, JSON and Neo4j exports
//! - [`testing`] - Mock oracle for testing

pub mod chunking;
pub mod error;
pub mod pipeline;
pub mod sinks;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use chunking::{chunk_chars, chunk_words, ChunkMode};
pub use error::{
    GraphMakerError, OntologyError, OracleError, RecordError, RecordKind, Result, SinkError,
};
pub use traits::{
    extractor::{PlainTextExtractor, TextExtractor},
    oracle::{ExtractionOracle, OracleRequest},
    sink::GraphSink,
};
pub use types::{
    document::{Document, DEFAULT_CHUNK_SIZE},
    graph::{Edge, Graph, GraphExport, Node, NodeAttributes},
    ontology::Ontology,
    partial::{DegradeReason, PartialGraph, PartialGraphResult},
};

// Re-export pipeline components
pub use pipeline::{
    extract_prompt_hash, format_extract_prompt, parse_extraction_response, Accumulator,
    GraphMaker, GraphMakerConfig, LabelPolicy, MergeReport, OracleAdapter, OracleConfig,
    ProcessReport, RecordPolicy,
};

#[cfg(feature = "openai")]
pub use ai::OpenAIOracle;
