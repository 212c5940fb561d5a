//! Accumulator - merge partial graphs into the owned graph.
//!
//! Merge rules:
//! - nodes before relationships, each in record order
//! - node upsert keyed by `id`, last write wins
//! - relationships always appended, dangling endpoints allowed
//!
//! Records arrive from an untrusted text generator, so each one is checked
//! here and turned into a typed [`Node`] or [`Edge`] before the graph is
//! touched.

use std::collections::HashSet;
use std::ops::AddAssign;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{RecordError, RecordKind};
use crate::types::{
    graph::{Edge, Graph, Node},
    ontology::Ontology,
    partial::PartialGraph,
};

/// What to do with a malformed record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordPolicy {
    /// Reject the whole partial graph; the graph is left untouched.
    #[default]
    AbortChunk,

    /// Drop the offending record, merge the rest.
    SkipRecord,
}

/// What to do with a node whose label is not in the ontology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelPolicy {
    /// Store it and count it as an unknown label.
    #[default]
    Accept,

    /// Treat it as a malformed record.
    Reject,
}

/// Counters describing one or more merges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub nodes_inserted: usize,
    pub nodes_overwritten: usize,
    pub edges_appended: usize,
    pub dangling_edges: usize,
    pub records_skipped: usize,
    pub unknown_labels: usize,
}

impl AddAssign for MergeReport {
    fn add_assign(&mut self, other: Self) {
        self.nodes_inserted += other.nodes_inserted;
        self.nodes_overwritten += other.nodes_overwritten;
        self.edges_appended += other.edges_appended;
        self.dangling_edges += other.dangling_edges;
        self.records_skipped += other.records_skipped;
        self.unknown_labels += other.unknown_labels;
    }
}

/// Owns the running graph and applies merges to it.
#[derive(Debug)]
pub struct Accumulator {
    graph: Graph,
    known_labels: HashSet<String>,
    record_policy: RecordPolicy,
    label_policy: LabelPolicy,
}

impl Accumulator {
    /// Create an accumulator with an empty graph and default policies.
    pub fn new(ontology: &Ontology) -> Self {
        Self {
            graph: Graph::new(),
            known_labels: ontology.labels.iter().cloned().collect(),
            record_policy: RecordPolicy::default(),
            label_policy: LabelPolicy::default(),
        }
    }

    pub fn with_record_policy(mut self, policy: RecordPolicy) -> Self {
        self.record_policy = policy;
        self
    }

    pub fn with_label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Merge one chunk's partial graph.
    ///
    /// Under [`RecordPolicy::AbortChunk`] every record is validated before
    /// any mutation, so an error leaves the graph exactly as it was.
    pub fn merge(&mut self, partial: PartialGraph) -> Result<MergeReport, RecordError> {
        let mut report = MergeReport::default();

        let mut nodes = Vec::with_capacity(partial.nodes.len());
        for (index, record) in partial.nodes.iter().enumerate() {
            match self.validate_node(index, record) {
                Ok((node, known)) => {
                    if !known {
                        debug!(id = %node.id, label = %node.label, "Node label outside ontology");
                        report.unknown_labels += 1;
                    }
                    nodes.push(node);
                }
                Err(e) => self.reject(e, &mut report)?,
            }
        }

        let mut edges = Vec::with_capacity(partial.relationships.len());
        for (index, record) in partial.relationships.iter().enumerate() {
            match validate_edge(index, record) {
                Ok(edge) => edges.push(edge),
                Err(e) => self.reject(e, &mut report)?,
            }
        }

        for node in nodes {
            if self.graph.upsert_node(node).is_some() {
                report.nodes_overwritten += 1;
            } else {
                report.nodes_inserted += 1;
            }
        }

        for edge in edges {
            if !self.graph.contains_node(&edge.source) || !self.graph.contains_node(&edge.target) {
                report.dangling_edges += 1;
            }
            self.graph.push_edge(edge);
            report.edges_appended += 1;
        }

        debug!(
            nodes_inserted = report.nodes_inserted,
            nodes_overwritten = report.nodes_overwritten,
            edges_appended = report.edges_appended,
            records_skipped = report.records_skipped,
            "Merged partial graph"
        );

        Ok(report)
    }

    fn reject(&self, error: RecordError, report: &mut MergeReport) -> Result<(), RecordError> {
        match self.record_policy {
            RecordPolicy::AbortChunk => Err(error),
            RecordPolicy::SkipRecord => {
                warn!(error = %error, "Skipping malformed record");
                report.records_skipped += 1;
                Ok(())
            }
        }
    }

    /// Returns the node and whether its label is in the ontology.
    fn validate_node(&self, index: usize, record: &Value) -> Result<(Node, bool), RecordError> {
        let kind = RecordKind::Node;
        let obj = as_object(kind, index, record)?;

        let node = Node {
            id: key_field(obj, kind, index, "id")?,
            label: text_field(obj, kind, index, "label")?,
            name: text_field(obj, kind, index, "name")?,
        };

        let known = self.known_labels.contains(&node.label);
        if !known && self.label_policy == LabelPolicy::Reject {
            return Err(RecordError::UnknownLabel {
                index,
                label: node.label,
            });
        }

        Ok((node, known))
    }
}

fn validate_edge(index: usize, record: &Value) -> Result<Edge, RecordError> {
    let kind = RecordKind::Relationship;
    let obj = as_object(kind, index, record)?;

    Ok(Edge {
        source: key_field(obj, kind, index, "source")?,
        target: key_field(obj, kind, index, "target")?,
        edge_type: text_field(obj, kind, index, "type")?,
    })
}

fn as_object(kind: RecordKind, index: usize, record: &Value) -> Result<&Map<String, Value>, RecordError> {
    record
        .as_object()
        .ok_or(RecordError::NotAnObject { kind, index })
}

/// Node ids and endpoints: strings, or numbers normalized to decimal text.
fn key_field(
    obj: &Map<String, Value>,
    kind: RecordKind,
    index: usize,
    field: &'static str,
) -> Result<String, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField { kind, index, field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(RecordError::WrongType {
            kind,
            index,
            field,
            expected: "string or number",
        }),
    }
}

fn text_field(
    obj: &Map<String, Value>,
    kind: RecordKind,
    index: usize,
    field: &'static str,
) -> Result<String, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField { kind, index, field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(RecordError::WrongType {
            kind,
            index,
            field,
            expected: "string",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ontology() -> Ontology {
        Ontology::new(["Person", "Place"], "relations")
    }

    fn partial(nodes: Value, relationships: Value) -> PartialGraph {
        serde_json::from_value(json!({"nodes": nodes, "relationships": relationships})).unwrap()
    }

    #[test]
    fn test_later_node_overwrites_earlier() {
        let mut acc = Accumulator::new(&ontology());
        acc.merge(partial(json!([{"id": "1", "label": "Person", "name": "A"}]), json!([])))
            .unwrap();
        let report = acc
            .merge(partial(json!([{"id": "1", "label": "Person", "name": "B"}]), json!([])))
            .unwrap();

        assert_eq!(report.nodes_overwritten, 1);
        assert_eq!(acc.graph().node_count(), 1);
        assert_eq!(acc.graph().node("1").unwrap().name, "B");
    }

    #[test]
    fn test_identical_edges_from_two_chunks_both_kept() {
        let mut acc = Accumulator::new(&ontology());
        let edge = json!([{"source": "1", "target": "2", "type": "knows"}]);
        acc.merge(partial(json!([]), edge.clone())).unwrap();
        acc.merge(partial(json!([]), edge)).unwrap();

        assert_eq!(acc.graph().edge_count(), 2);
        assert_eq!(acc.graph().edges()[0], acc.graph().edges()[1]);
    }

    #[test]
    fn test_dangling_edge_kept_without_node() {
        let mut acc = Accumulator::new(&ontology());
        let report = acc
            .merge(partial(
                json!([{"id": "1", "label": "Person", "name": "A"}]),
                json!([{"source": "1", "target": "99", "type": "knows"}]),
            ))
            .unwrap();

        assert_eq!(report.dangling_edges, 1);
        assert_eq!(acc.graph().edge_count(), 1);
        assert!(!acc.graph().contains_node("99"));
        assert_eq!(acc.graph().node_count(), 1);
    }

    #[test]
    fn test_same_chunk_nodes_resolve_before_edges() {
        let mut acc = Accumulator::new(&ontology());
        let report = acc
            .merge(partial(
                json!([
                    {"id": "1", "label": "Person", "name": "A"},
                    {"id": "2", "label": "Place", "name": "B"}
                ]),
                json!([{"source": "1", "target": "2", "type": "lives in"}]),
            ))
            .unwrap();

        assert_eq!(report.dangling_edges, 0);
        assert_eq!(report.nodes_inserted, 2);
    }

    #[test]
    fn test_malformed_record_aborts_without_mutation() {
        let mut acc = Accumulator::new(&ontology());
        acc.merge(partial(json!([{"id": "1", "label": "Person", "name": "A"}]), json!([])))
            .unwrap();
        let before = acc.graph().clone();

        let err = acc
            .merge(partial(
                json!([
                    {"id": "2", "label": "Person", "name": "B"},
                    {"label": "Person", "name": "no id"}
                ]),
                json!([{"source": "1", "target": "2", "type": "knows"}]),
            ))
            .unwrap_err();

        assert_eq!(
            err,
            RecordError::MissingField {
                kind: RecordKind::Node,
                index: 1,
                field: "id"
            }
        );
        assert_eq!(acc.graph(), &before);
    }

    #[test]
    fn test_skip_policy_drops_only_bad_records() {
        let mut acc = Accumulator::new(&ontology()).with_record_policy(RecordPolicy::SkipRecord);
        let report = acc
            .merge(partial(
                json!([
                    {"id": "1", "label": "Person", "name": "A"},
                    "not an object"
                ]),
                json!([
                    {"source": "1", "target": "1", "type": 5},
                    {"source": "1", "target": "1", "type": "self"}
                ]),
            ))
            .unwrap();

        assert_eq!(report.records_skipped, 2);
        assert_eq!(acc.graph().node_count(), 1);
        assert_eq!(acc.graph().edge_count(), 1);
    }

    #[test]
    fn test_numeric_ids_normalized() {
        let mut acc = Accumulator::new(&ontology());
        acc.merge(partial(
            json!([{"id": 7, "label": "Person", "name": "Seven"}]),
            json!([{"source": 7, "target": "7", "type": "is"}]),
        ))
        .unwrap();

        assert!(acc.graph().contains_node("7"));
        assert_eq!(acc.graph().dangling_edges().count(), 0);
    }

    #[test]
    fn test_wrong_type_reported() {
        let mut acc = Accumulator::new(&ontology());
        let err = acc
            .merge(partial(json!([{"id": "1", "label": ["Person"], "name": "A"}]), json!([])))
            .unwrap_err();
        assert!(matches!(err, RecordError::WrongType { field: "label", .. }));
    }

    #[test]
    fn test_unknown_label_accepted_and_counted() {
        let mut acc = Accumulator::new(&ontology());
        let report = acc
            .merge(partial(json!([{"id": "1", "label": "Spaceship", "name": "X"}]), json!([])))
            .unwrap();

        assert_eq!(report.unknown_labels, 1);
        assert_eq!(acc.graph().node("1").unwrap().label, "Spaceship");
    }

    #[test]
    fn test_unknown_label_rejected_under_reject_policy() {
        let mut acc = Accumulator::new(&ontology()).with_label_policy(LabelPolicy::Reject);
        let err = acc
            .merge(partial(json!([{"id": "1", "label": "Spaceship", "name": "X"}]), json!([])))
            .unwrap_err();

        assert!(matches!(err, RecordError::UnknownLabel { index: 0, .. }));
        assert!(acc.graph().is_empty());
    }

    #[test]
    fn test_reports_add_up() {
        let mut total = MergeReport::default();
        total += MergeReport {
            nodes_inserted: 2,
            edges_appended: 1,
            ..Default::default()
        };
        total += MergeReport {
            nodes_inserted: 1,
            dangling_edges: 1,
            ..Default::default()
        };
        assert_eq!(total.nodes_inserted, 3);
        assert_eq!(total.edges_appended, 1);
        assert_eq!(total.dangling_edges, 1);
    }
}
