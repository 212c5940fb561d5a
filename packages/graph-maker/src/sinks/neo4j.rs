//! Neo4j graph sink.
//!
//! Destructive: every write clears the target database first. The plan is
//! built before the first statement runs; statements then run one by one
//! with no rollback on failure.

use async_trait::async_trait;
use neo4rs::{query, Graph as Neo4jGraph};
use tracing::{debug, info};

use crate::error::{SinkError, SinkResult};
use crate::sinks::cypher::plan_statements;
use crate::traits::sink::GraphSink;
use crate::types::{graph::Graph, ontology::Ontology};

fn database_error(error: neo4rs::Error) -> SinkError {
    SinkError::Database(Box::new(error))
}

/// Sink that replaces the contents of a Neo4j database with the graph.
pub struct Neo4jSink {
    graph: Neo4jGraph,
    skip_dangling: bool,
}

impl Neo4jSink {
    /// Connect to a Neo4j instance.
    pub async fn connect(uri: &str, user: &str, password: &str) -> SinkResult<Self> {
        let graph = Neo4jGraph::new(uri, user, password)
            .await
            .map_err(database_error)?;
        info!(uri = %uri, "Connected to Neo4j");
        Ok(Self {
            graph,
            skip_dangling: false,
        })
    }

    /// Connect using `NEO4J_URI`, `NEO4J_USERNAME` and `NEO4J_PASSWORD`.
    pub async fn from_env() -> SinkResult<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| SinkError::Database(format!("{} not set", name).into()))
        };
        let uri = var("NEO4J_URI")?;
        let user = var("NEO4J_USERNAME")?;
        let password = var("NEO4J_PASSWORD")?;
        Self::connect(&uri, &user, &password).await
    }

    /// Leave out edges with a missing endpoint instead of failing.
    pub fn with_skip_dangling(mut self, skip: bool) -> Self {
        self.skip_dangling = skip;
        self
    }

    /// Run a trivial query to check connectivity.
    pub async fn ping(&self) -> SinkResult<()> {
        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(database_error)
    }
}

#[async_trait]
impl GraphSink for Neo4jSink {
    async fn write(&self, graph: &Graph, _ontology: &Ontology) -> SinkResult<()> {
        let plan = plan_statements(graph, self.skip_dangling)?;
        info!(statements = plan.len(), "Writing graph to Neo4j");

        for statement in plan {
            let q = statement
                .params
                .into_iter()
                .fold(query(&statement.query), |q, (name, value)| q.param(name, value));
            self.graph.run(q).await.map_err(database_error)?;
            debug!(query = %statement.query, "Statement applied");
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}
