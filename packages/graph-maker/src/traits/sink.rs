//! Graph sink trait - consumers of the finished graph.

use async_trait::async_trait;

use crate::error::SinkResult;
use crate::types::{graph::Graph, ontology::Ontology};

/// A read-only consumer of a finished graph (file export, database, ...).
///
/// Failures are fatal to the caller. Sinks do not roll back partial writes.
#[async_trait]
pub trait GraphSink: Send + Sync {
    /// Write the graph. The ontology is available for label-driven output
    /// such as colors.
    async fn write(&self, graph: &Graph, ontology: &Ontology) -> SinkResult<()>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
