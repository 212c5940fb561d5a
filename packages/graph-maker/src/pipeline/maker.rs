//! GraphMaker - the main entry point of the library.
//!
//! Drives a document's chunks through the oracle adapter and the
//! accumulator. Chunks are merged strictly in document order. With
//! `concurrency > 1` up to that many oracle calls are in flight at once, but
//! results are still merged in chunk order, so the final graph is the same
//! as with sequential processing.

use futures::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{GraphMakerError, Result};
use crate::pipeline::{
    accumulate::{Accumulator, LabelPolicy, MergeReport, RecordPolicy},
    extract::{OracleAdapter, OracleConfig},
    prompts::extract_prompt_hash,
};
use crate::traits::{oracle::ExtractionOracle, sink::GraphSink};
use crate::types::{document::Document, graph::Graph, ontology::Ontology};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct GraphMakerConfig {
    /// Maximum oracle calls in flight for one document. Default: 1.
    pub concurrency: usize,

    /// Oracle invocation settings (timeout).
    pub oracle: OracleConfig,

    /// Handling of malformed records. Default: abort the chunk.
    pub record_policy: RecordPolicy,

    /// Handling of labels outside the ontology. Default: accept.
    pub label_policy: LabelPolicy,
}

impl Default for GraphMakerConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            oracle: OracleConfig::default(),
            record_policy: RecordPolicy::default(),
            label_policy: LabelPolicy::default(),
        }
    }
}

impl GraphMakerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of concurrent oracle calls (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_oracle_config(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_record_policy(mut self, policy: RecordPolicy) -> Self {
        self.record_policy = policy;
        self
    }

    pub fn with_label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }
}

/// Summary of one `process_document` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub doc_id: String,
    pub chunks: usize,
    pub chunks_extracted: usize,
    pub chunks_degraded: usize,
    pub merge: MergeReport,
    /// SHA-256 of the prompt template in use
    pub prompt_hash: String,
}

/// Extracts documents into one accumulated graph.
///
/// # Example
///
/// ```rust,ignore
/// let ontology = Ontology::new(["Person", "Place"], "who lives where");
/// let mut maker = GraphMaker::new(ontology, OpenAIOracle::from_env()?);
///
/// maker.process_document(&Document::new(text)).await?;
/// println!("{} nodes", maker.graph().node_count());
/// ```
///
/// Every document processed by one instance lands in the same graph.
/// Processing takes `&mut self`, so calls against one instance are
/// serialized; use one instance per document for isolated graphs.
pub struct GraphMaker<O: ExtractionOracle> {
    ontology: Ontology,
    adapter: OracleAdapter<O>,
    accumulator: Accumulator,
    concurrency: usize,
}

impl<O: ExtractionOracle> GraphMaker<O> {
    /// Create a graph maker with default configuration.
    pub fn new(ontology: Ontology, oracle: O) -> Self {
        Self::with_config(ontology, oracle, GraphMakerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(ontology: Ontology, oracle: O, config: GraphMakerConfig) -> Self {
        let accumulator = Accumulator::new(&ontology)
            .with_record_policy(config.record_policy)
            .with_label_policy(config.label_policy);

        Self {
            ontology,
            adapter: OracleAdapter::with_config(oracle, config.oracle),
            accumulator,
            concurrency: config.concurrency.max(1),
        }
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    pub fn oracle(&self) -> &O {
        self.adapter.oracle()
    }

    /// The accumulated graph so far.
    pub fn graph(&self) -> &Graph {
        self.accumulator.graph()
    }

    pub fn into_graph(self) -> Graph {
        self.accumulator.into_graph()
    }

    /// Process every chunk of a document and merge the results.
    ///
    /// Oracle and parse failures degrade the affected chunk and are counted
    /// in the report. A malformed record aborts the call; chunks merged
    /// before it stay in the graph.
    pub async fn process_document(&mut self, document: &Document) -> Result<ProcessReport> {
        self.run(document, None).await
    }

    /// Like [`GraphMaker::process_document`], stopping when `cancel` fires.
    ///
    /// In-flight oracle calls are dropped. Chunks already merged remain.
    pub async fn process_document_with_cancel(
        &mut self,
        document: &Document,
        cancel: CancellationToken,
    ) -> Result<ProcessReport> {
        self.run(document, Some(&cancel)).await
    }

    /// Hand the finished graph to a sink.
    pub async fn export_to(&self, sink: &dyn GraphSink) -> Result<()> {
        info!(
            sink = sink.name(),
            nodes = self.graph().node_count(),
            edges = self.graph().edge_count(),
            "Exporting graph"
        );
        sink.write(self.graph(), &self.ontology).await?;
        Ok(())
    }

    async fn run(
        &mut self,
        document: &Document,
        cancel: Option<&CancellationToken>,
    ) -> Result<ProcessReport> {
        let chunks = document.chunks();
        info!(
            doc_id = %document.doc_id(),
            chunks = chunks.len(),
            concurrency = self.concurrency,
            "Processing document"
        );

        let mut report = ProcessReport {
            doc_id: document.doc_id().to_string(),
            chunks: chunks.len(),
            chunks_extracted: 0,
            chunks_degraded: 0,
            merge: MergeReport::default(),
            prompt_hash: extract_prompt_hash(),
        };

        let adapter = &self.adapter;
        let ontology = &self.ontology;

        // `buffered` yields in input order regardless of completion order.
        let mut results = futures::stream::iter(chunks.iter().enumerate())
            .map(|(index, chunk)| async move { (index, adapter.extract(chunk, ontology).await) })
            .buffered(self.concurrency);

        loop {
            let next = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    next = results.next() => Some(next),
                },
                None => Some(results.next().await),
            };

            let Some(next) = next else {
                warn!(
                    doc_id = %document.doc_id(),
                    merged = report.chunks_extracted + report.chunks_degraded,
                    "Document processing cancelled"
                );
                return Err(GraphMakerError::Cancelled);
            };

            let Some((index, result)) = next else {
                break;
            };

            if result.is_degraded() {
                report.chunks_degraded += 1;
            } else {
                report.chunks_extracted += 1;
            }

            let merged = self
                .accumulator
                .merge(result.into_partial())
                .map_err(|source| GraphMakerError::Record {
                    chunk: index,
                    source,
                })?;
            report.merge += merged;

            debug!(chunk = index, "Chunk merged");
        }

        info!(
            doc_id = %report.doc_id,
            extracted = report.chunks_extracted,
            degraded = report.chunks_degraded,
            nodes = self.accumulator.graph().node_count(),
            edges = self.accumulator.graph().edge_count(),
            "Document processed"
        );

        Ok(report)
    }
}
