//! Integration tests for the extraction pipeline.
//!
//! These tests drive whole documents through:
//! 1. Chunking
//! 2. Oracle extraction (mocked)
//! 3. Merging into the accumulated graph
//! 4. Export through file sinks

use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use graph_maker::{
    error::OracleResult,
    sinks::{plan_statements, HtmlSink, JsonSink},
    testing::MockOracle,
    Document, ExtractionOracle, GraphMaker, GraphMakerConfig, GraphMakerError, Ontology,
    OracleConfig, OracleError, OracleRequest, RecordPolicy, SinkError,
};

mock! {
    pub Transport {}

    #[async_trait]
    impl ExtractionOracle for Transport {
        async fn complete(&self, request: &OracleRequest) -> OracleResult<String>;
    }
}

fn ontology() -> Ontology {
    Ontology::new(["Person", "Place"], "where people live")
}

/// Two chunks: "first" and "second".
fn two_chunk_document() -> Document {
    Document::new("first second").with_chunk_size(6)
}

const FIRST_CHUNK: &str = r#"{
    "nodes": [
        {"id": "1", "label": "Person", "name": "John"},
        {"id": "2", "label": "Place", "name": "New York"}
    ],
    "relationships": [{"source": "1", "target": "2", "type": "lives in"}]
}"#;

const SECOND_CHUNK: &str = r#"```json
{
    "nodes": [
        {"id": "2", "label": "Place", "name": "NYC"},
        {"id": "3", "label": "Person", "name": "Mary"}
    ],
    "relationships": [{"source": "3", "target": "2", "type": "lives in"}]
}
```"#;

#[tokio::test]
async fn test_two_chunks_end_to_end() {
    let oracle = MockOracle::new().respond(FIRST_CHUNK).respond(SECOND_CHUNK);
    let mut maker = GraphMaker::new(ontology(), oracle.clone());

    let report = maker.process_document(&two_chunk_document()).await.unwrap();

    assert_eq!(report.chunks, 2);
    assert_eq!(report.chunks_extracted, 2);
    assert_eq!(report.merge.nodes_inserted, 3);
    assert_eq!(report.merge.nodes_overwritten, 1);
    assert_eq!(report.merge.edges_appended, 2);

    let graph = maker.graph();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.node("2").unwrap().name, "NYC");

    // One request per chunk, in order
    let requests = oracle.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].prompt.contains("Text: first"));
    assert!(requests[1].prompt.contains("Text: second"));
}

#[tokio::test]
async fn test_failed_chunk_does_not_stop_document() {
    let oracle = MockOracle::new()
        .fail_with(OracleError::Network("connection reset".into()))
        .respond(SECOND_CHUNK);
    let mut maker = GraphMaker::new(ontology(), oracle);

    let report = maker.process_document(&two_chunk_document()).await.unwrap();

    assert_eq!(report.chunks_degraded, 1);
    assert_eq!(report.chunks_extracted, 1);
    assert_eq!(maker.graph().node_count(), 2);
    assert!(maker.graph().contains_node("3"));
}

#[tokio::test]
async fn test_unparseable_response_degrades() {
    let oracle = MockOracle::new()
        .respond("I could not find any entities, sorry.")
        .respond(FIRST_CHUNK);
    let mut maker = GraphMaker::new(ontology(), oracle);

    let report = maker.process_document(&two_chunk_document()).await.unwrap();

    assert_eq!(report.chunks_degraded, 1);
    assert_eq!(maker.graph().node_count(), 2);
}

#[tokio::test]
async fn test_timeout_degrades_chunk() {
    let oracle = MockOracle::new()
        .respond(FIRST_CHUNK)
        .with_delay(Duration::from_millis(500));
    let config = GraphMakerConfig::new()
        .with_oracle_config(OracleConfig::default().with_timeout(Duration::from_millis(20)));
    let mut maker = GraphMaker::with_config(ontology(), oracle, config);

    let report = maker.process_document(&Document::new("slow")).await.unwrap();

    assert_eq!(report.chunks_degraded, 1);
    assert!(maker.graph().is_empty());
}

#[tokio::test]
async fn test_concurrent_processing_matches_sequential() {
    // Each word is its own chunk; "aaa" and "bbb" both write node x, so the
    // final name depends on merge order.
    let script = |oracle: MockOracle| {
        oracle
            .respond_to("aaa", r#"{"nodes": [{"id": "x", "label": "Person", "name": "from aaa"}]}"#)
            .respond_to(
                "bbb",
                r#"{"nodes": [{"id": "x", "label": "Person", "name": "from bbb"}],
                    "relationships": [{"source": "x", "target": "y", "type": "knows"}]}"#,
            )
            .respond_to("ccc", r#"{"nodes": [{"id": "y", "label": "Place", "name": "Y"}]}"#)
    };
    let document = || Document::new("aaa bbb ccc").with_chunk_size(4).with_id("doc");

    let mut sequential = GraphMaker::new(ontology(), script(MockOracle::new()));
    sequential.process_document(&document()).await.unwrap();

    // The first chunk is the slowest, so it finishes last.
    let oracle = script(MockOracle::new())
        .with_delay(Duration::from_millis(10))
        .with_delay_for("aaa", Duration::from_millis(80));
    let config = GraphMakerConfig::new().with_concurrency(3);
    let mut concurrent = GraphMaker::with_config(ontology(), oracle.clone(), config);
    let report = concurrent.process_document(&document()).await.unwrap();

    assert_eq!(report.chunks, 3);
    assert_eq!(concurrent.graph(), sequential.graph());
    assert_eq!(concurrent.graph().node("x").unwrap().name, "from bbb");
    assert!(oracle.max_in_flight() > 1);
    assert!(oracle.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let oracle = MockOracle::new().with_delay(Duration::from_millis(10));
    let config = GraphMakerConfig::new().with_concurrency(2);
    let mut maker = GraphMaker::with_config(ontology(), oracle.clone(), config);

    let document = Document::new("a b c d e f g h").with_chunk_size(2);
    let report = maker.process_document(&document).await.unwrap();

    assert_eq!(report.chunks, 8);
    assert_eq!(oracle.call_count(), 8);
    assert!(oracle.max_in_flight() <= 2);
}

#[tokio::test]
async fn test_cancel_before_start_touches_nothing() {
    let oracle = MockOracle::new().respond(FIRST_CHUNK);
    let mut maker = GraphMaker::new(ontology(), oracle);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = maker
        .process_document_with_cancel(&two_chunk_document(), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, GraphMakerError::Cancelled));
    assert!(maker.graph().is_empty());
}

#[tokio::test]
async fn test_cancel_mid_document_keeps_merged_chunks() {
    let oracle = MockOracle::new()
        .respond_to("first", FIRST_CHUNK)
        .respond_to("second", SECOND_CHUNK)
        .with_delay_for("second", Duration::from_secs(30));
    let mut maker = GraphMaker::new(ontology(), oracle);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = maker
        .process_document_with_cancel(&two_chunk_document(), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, GraphMakerError::Cancelled));
    assert_eq!(maker.graph().node_count(), 2);
    assert!(!maker.graph().contains_node("3"));
}

#[tokio::test]
async fn test_skip_record_policy_keeps_valid_records() {
    let oracle = MockOracle::new().respond(
        r#"{"nodes": [
            {"id": "1", "label": "Person", "name": "Ada"},
            {"label": "Person", "name": "nobody"},
            "not even an object"
        ]}"#,
    );
    let config = GraphMakerConfig::new().with_record_policy(RecordPolicy::SkipRecord);
    let mut maker = GraphMaker::with_config(ontology(), oracle, config);

    let report = maker.process_document(&Document::new("text")).await.unwrap();

    assert_eq!(report.merge.records_skipped, 2);
    assert_eq!(maker.graph().node_count(), 1);
}

#[tokio::test]
async fn test_one_call_per_chunk_at_zero_temperature() {
    let mut oracle = MockTransport::new();
    oracle
        .expect_complete()
        .withf(|request| {
            request.temperature == 0.0
                && request.system.contains("extracts entities and relationships")
                && request.prompt.contains("Entity types: Person, Place")
        })
        .times(2)
        .returning(|_| Ok(r#"{"nodes": [], "relationships": []}"#.to_string()));

    let mut maker = GraphMaker::new(ontology(), oracle);
    let report = maker.process_document(&two_chunk_document()).await.unwrap();

    assert_eq!(report.chunks_extracted, 2);
    assert!(maker.graph().is_empty());
}

#[tokio::test]
async fn test_file_sinks_export_accumulated_graph() {
    let oracle = MockOracle::new().respond(FIRST_CHUNK).respond(SECOND_CHUNK);
    let mut maker = GraphMaker::new(ontology(), oracle);
    maker.process_document(&two_chunk_document()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("graph.json");
    let html_path = dir.path().join("graph.html");

    maker.export_to(&JsonSink::new(&json_path)).await.unwrap();
    maker.export_to(&HtmlSink::new(&html_path)).await.unwrap();

    let exported: Value = serde_json::from_slice(&std::fs::read(&json_path).unwrap()).unwrap();
    assert_eq!(exported["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(
        exported["edges"][1],
        json!({"source": "3", "target": "2", "type": "lives in"})
    );

    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("height: 750px"));
    assert!(html.contains("Person: Mary"));
}

#[tokio::test]
async fn test_database_plan_rejects_dangling_edges() {
    let oracle = MockOracle::new()
        .respond(r#"{"relationships": [{"source": "1", "target": "ghost", "type": "haunts"}]}"#);
    let mut maker = GraphMaker::new(ontology(), oracle);

    let report = maker.process_document(&Document::new("boo")).await.unwrap();
    assert_eq!(report.merge.dangling_edges, 1);

    let err = plan_statements(maker.graph(), false).unwrap_err();
    assert!(matches!(err, SinkError::MissingEndpoint { .. }));
    assert_eq!(plan_statements(maker.graph(), true).unwrap().len(), 1);
}
