//! Domain data types.

pub mod document;
pub mod graph;
pub mod ontology;
pub mod partial;
