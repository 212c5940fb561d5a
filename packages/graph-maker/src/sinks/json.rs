//! JSON file export of the graph.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::error::SinkResult;
use crate::traits::sink::GraphSink;
use crate::types::graph::{Graph, GraphExport};
use crate::types::ontology::Ontology;

/// Writes `{"nodes": [...], "edges": [...]}` to a file.
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

#[async_trait]
impl GraphSink for JsonSink {
    async fn write(&self, graph: &Graph, _ontology: &Ontology) -> SinkResult<()> {
        let export = GraphExport::from(graph);
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&export)?
        } else {
            serde_json::to_vec(&export)?
        };
        tokio::fs::write(&self.path, bytes).await?;
        info!(path = %self.path.display(), "Graph JSON written");
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
