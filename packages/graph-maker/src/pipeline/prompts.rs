//! LLM prompts for graph extraction.
//!
//! The extraction template is a fixed contract with the oracle: it demands a
//! JSON object with exactly two arrays, `nodes` and `relationships`.

use sha2::{Digest, Sha256};

use crate::types::ontology::Ontology;

/// System instruction sent with every extraction request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts entities and relationships from text.";

/// Prompt for extracting a partial graph from one chunk.
pub const EXTRACT_PROMPT: &str = r#"Given the following text, extract entities and their relationships.

Text: {text}

Entity types: {labels}
Relationship descriptor: {relationship_descriptor}

Format the output as a JSON object with two lists:
1. "nodes": List of objects with "id" (string), "label" (one of the entity types), "name" (string)
2. "relationships": List of objects with "source" (node id), "target" (node id), "type" (string)

Example format:
{
    "nodes": [
        {"id": "1", "label": "Person", "name": "John"},
        {"id": "2", "label": "Place", "name": "New York"}
    ],
    "relationships": [
        {"source": "1", "target": "2", "type": "lives in"}
    ]
}

Extract only the most relevant and important entities and relationships. Ensure all relationships use the relationship descriptor as context."#;

/// Hash of the extraction template, reported per run so output produced
/// under different prompt versions can be told apart.
pub fn extract_prompt_hash() -> String {
    let mut hasher = Sha256::new();
    hasher.update(SYSTEM_PROMPT.as_bytes());
    hasher.update(EXTRACT_PROMPT.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Format the extraction prompt for one chunk.
///
/// The chunk text is substituted last so placeholder-like text inside the
/// document is never expanded.
pub fn format_extract_prompt(text: &str, ontology: &Ontology) -> String {
    EXTRACT_PROMPT
        .replace("{labels}", &ontology.label_list())
        .replace("{relationship_descriptor}", &ontology.relationship_descriptor)
        .replacen("{text}", text, 1)
}
