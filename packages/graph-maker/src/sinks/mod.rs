//! Graph sink implementations.
//!
//! - [`HtmlSink`] - interactive vis-network page
//! - [`JsonSink`] - plain JSON export
//! - `Neo4jSink` - graph database export (feature `neo4j`)
//!
//! [`cypher`] holds the pure statement planning shared by database sinks.

pub mod cypher;
pub mod json;
pub mod visualization;

#[cfg(feature = "neo4j")]
pub mod neo4j;

pub use cypher::{normalize_relationship_type, plan_statements, CypherStatement};
pub use json::JsonSink;
pub use visualization::{palette, HtmlSink, VisGraph};

#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jSink;
