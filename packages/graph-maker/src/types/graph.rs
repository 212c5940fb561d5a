//! Graph types - nodes, edges and the accumulated directed graph.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An entity extracted from text.
///
/// Identity is `id` alone; `label` and `name` are attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub name: String,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            name: name.into(),
        }
    }
}

/// Attributes stored per node id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    pub label: String,
    pub name: String,
}

/// A directed, typed relationship between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

impl Edge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        edge_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            edge_type: edge_type.into(),
        }
    }
}

/// Directed multigraph accumulated from chunk extractions.
///
/// - Node ids are unique; re-inserting an id overwrites its attributes and
///   keeps its original position.
/// - Edges are kept in arrival order and never deduplicated.
/// - Edges may reference ids with no node entry.
///
/// There is no removal API; the graph only grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: IndexMap<String, NodeAttributes>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a node. Returns the previous attributes, if any.
    pub fn upsert_node(&mut self, node: Node) -> Option<NodeAttributes> {
        self.nodes.insert(
            node.id,
            NodeAttributes {
                label: node.label,
                name: node.name,
            },
        )
    }

    /// Append an edge unconditionally.
    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn node(&self, id: &str) -> Option<&NodeAttributes> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in first-insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttributes)> {
        self.nodes.iter().map(|(id, attrs)| (id.as_str(), attrs))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges whose source or target has no node entry.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| !self.contains_node(&e.source) || !self.contains_node(&e.target))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Owned node list, in insertion order.
    pub fn to_nodes(&self) -> Vec<Node> {
        self.nodes()
            .map(|(id, attrs)| Node::new(id, &attrs.label, &attrs.name))
            .collect()
    }
}

/// Serializable snapshot of a graph, used by the JSON sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl From<&Graph> for GraphExport {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.to_nodes(),
            edges: graph.edges.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_overwrites_and_keeps_position() {
        let mut graph = Graph::new();
        assert!(graph.upsert_node(Node::new("1", "Person", "A")).is_none());
        graph.upsert_node(Node::new("2", "Place", "Paris"));
        let previous = graph.upsert_node(Node::new("1", "Person", "B"));

        assert_eq!(previous.unwrap().name, "A");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node("1").unwrap().name, "B");

        let order: Vec<&str> = graph.nodes().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["1", "2"]);
    }

    #[test]
    fn test_edges_not_deduplicated() {
        let mut graph = Graph::new();
        graph.push_edge(Edge::new("1", "2", "knows"));
        graph.push_edge(Edge::new("1", "2", "knows"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_dangling_edges_reported_without_synthetic_nodes() {
        let mut graph = Graph::new();
        graph.upsert_node(Node::new("1", "Person", "A"));
        graph.push_edge(Edge::new("1", "ghost", "haunts"));

        assert_eq!(graph.node_count(), 1);
        assert!(!graph.contains_node("ghost"));
        assert_eq!(graph.dangling_edges().count(), 1);
    }

    #[test]
    fn test_export_serializes_type_field() {
        let mut graph = Graph::new();
        graph.upsert_node(Node::new("1", "Person", "A"));
        graph.push_edge(Edge::new("1", "1", "self"));

        let json = serde_json::to_value(GraphExport::from(&graph)).unwrap();
        assert_eq!(json["edges"][0]["type"], "self");
        assert_eq!(json["nodes"][0]["name"], "A");
    }
}
