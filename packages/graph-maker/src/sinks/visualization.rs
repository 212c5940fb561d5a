//! Interactive HTML visualization of a graph.
//!
//! Nodes are colored by label from a categorical palette built over the
//! ontology labels. The page is standalone and draws with vis-network.

use std::path::PathBuf;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::error::SinkResult;
use crate::traits::sink::GraphSink;
use crate::types::{graph::Graph, ontology::Ontology};

/// Color for nodes whose label is not in the ontology.
pub const FALLBACK_COLOR: &str = "#000000";

/// Canvas height used when none is configured.
pub const DEFAULT_HEIGHT: &str = "750px";

const SATURATION: f64 = 0.65;
const LIGHTNESS: f64 = 0.55;

/// One color per distinct ontology label, hues evenly spaced around the
/// HSL wheel in label order. Repeated labels keep their first color.
pub fn palette(labels: &[String]) -> IndexMap<String, String> {
    let mut colors = IndexMap::new();
    let count = labels.len().max(1) as f64;

    for (i, label) in labels.iter().enumerate() {
        let hue = 360.0 * i as f64 / count;
        colors
            .entry(label.clone())
            .or_insert_with(|| hsl_to_hex(hue, SATURATION, LIGHTNESS));
    }

    colors
}

fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub title: String,
}

/// Renderer-neutral visualization data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisGraph {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

impl VisGraph {
    pub fn build(graph: &Graph, ontology: &Ontology) -> Self {
        let colors = palette(&ontology.labels);

        let nodes = graph
            .nodes()
            .map(|(id, attrs)| VisNode {
                id: id.to_string(),
                label: attrs.name.clone(),
                title: format!("{}: {}", attrs.label, attrs.name),
                color: colors
                    .get(&attrs.label)
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_COLOR.to_string()),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| VisEdge {
                from: edge.source.clone(),
                to: edge.target.clone(),
                title: edge.edge_type.clone(),
            })
            .collect();

        Self { nodes, edges }
    }

    /// Render a standalone HTML page.
    pub fn to_html(&self, height: &str) -> SinkResult<String> {
        // `<` is escaped so names can never close the script element.
        let nodes = serde_json::to_string(&self.nodes)?.replace('<', "\\u003c");
        let edges = serde_json::to_string(&self.edges)?.replace('<', "\\u003c");

        let height = html_attr_escape(height);
        Ok(fill_template(
            HTML_TEMPLATE,
            &[
                ("{height}", height.as_str()),
                ("{nodes}", nodes.as_str()),
                ("{edges}", edges.as_str()),
            ],
        ))
    }
}

/// Substitute placeholders in a single left-to-right pass. Inserted values
/// are never scanned again, so graph text that looks like a placeholder
/// stays literal.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(*key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn html_attr_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Knowledge Graph</title>
<script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
<style>
  body { margin: 0; background: #ffffff; }
  #graph { width: 100%; height: {height}; border: 1px solid lightgray; }
</style>
</head>
<body>
<div id="graph"></div>
<script>
  var nodes = new vis.DataSet({nodes});
  var edges = new vis.DataSet({edges});
  var options = {
    edges: { arrows: { to: { enabled: true } } },
    physics: { stabilization: true }
  };
  new vis.Network(document.getElementById("graph"), { nodes: nodes, edges: edges }, options);
</script>
</body>
</html>
"#;

/// Sink writing the visualization to an HTML file.
#[derive(Debug, Clone)]
pub struct HtmlSink {
    path: PathBuf,
    height: String,
}

impl HtmlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            height: DEFAULT_HEIGHT.to_string(),
        }
    }

    /// Set the canvas height (default: 750px).
    pub fn with_height(mut self, height: impl Into<String>) -> Self {
        self.height = height.into();
        self
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl GraphSink for HtmlSink {
    async fn write(&self, graph: &Graph, ontology: &Ontology) -> SinkResult<()> {
        let html = VisGraph::build(graph, ontology).to_html(&self.height)?;
        tokio::fs::write(&self.path, html).await?;
        info!(path = %self.path.display(), "Visualization written");
        Ok(())
    }

    fn name(&self) -> &str {
        "html"
    }
}
