//! Cypher statement planning for the graph-database export.
//!
//! Planning is pure: the whole statement list is built and checked before
//! any executor touches the database.

use crate::error::{SinkError, SinkResult};
use crate::types::graph::Graph;

/// Statement that wipes the target database.
pub const CLEAR_STATEMENT: &str = "MATCH (n) DETACH DELETE n";

/// One parameterized Cypher statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CypherStatement {
    pub query: String,
    /// String parameters in binding order
    pub params: Vec<(&'static str, String)>,
}

impl CypherStatement {
    fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
        }
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Normalize a free-form relationship type: uppercase, spaces and hyphens
/// become underscores.
pub fn normalize_relationship_type(edge_type: &str) -> String {
    edge_type.to_uppercase().replace([' ', '-'], "_")
}

/// Quote a label or relationship type as a Cypher identifier.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Build the full export plan for a graph.
///
/// The plan is the clear statement, one `CREATE` per node in insertion
/// order, then one `MATCH ... CREATE` per edge in edge order. An edge whose
/// endpoint has no node entry fails the whole plan with
/// [`SinkError::MissingEndpoint`], or is left out when `skip_dangling` is set.
pub fn plan_statements(graph: &Graph, skip_dangling: bool) -> SinkResult<Vec<CypherStatement>> {
    let mut plan = Vec::with_capacity(1 + graph.node_count() + graph.edge_count());
    plan.push(CypherStatement::new(CLEAR_STATEMENT));

    for (id, attrs) in graph.nodes() {
        plan.push(
            CypherStatement::new(format!(
                "CREATE (n:{} {{id: $id, name: $name}})",
                quote_identifier(&attrs.label)
            ))
            .param("id", id)
            .param("name", attrs.name.as_str()),
        );
    }

    for edge in graph.edges() {
        let endpoints = (graph.node(&edge.source), graph.node(&edge.target));
        let (source, target) = match endpoints {
            (Some(source), Some(target)) => (source, target),
            (source, _) => {
                if skip_dangling {
                    tracing::debug!(
                        source = %edge.source,
                        target = %edge.target,
                        "Skipping dangling edge"
                    );
                    continue;
                }
                let missing = if source.is_none() {
                    &edge.source
                } else {
                    &edge.target
                };
                return Err(SinkError::MissingEndpoint {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    missing: missing.clone(),
                });
            }
        };

        plan.push(
            CypherStatement::new(format!(
                "MATCH (s:{} {{id: $source_id}}) MATCH (t:{} {{id: $target_id}}) CREATE (s)-[r:{}]->(t)",
                quote_identifier(&source.label),
                quote_identifier(&target.label),
                quote_identifier(&normalize_relationship_type(&edge.edge_type)),
            ))
            .param("source_id", edge.source.as_str())
            .param("target_id", edge.target.as_str()),
        );
    }

    Ok(plan)
}
