//! graph-maker CLI
//!
//! Extracts a knowledge graph from text files and exports it. Configuration
//! comes from the environment (and `.env`); flags override it.

mod config;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use graph_maker::{
    sinks::{HtmlSink, JsonSink, Neo4jSink},
    ChunkMode, Document, ExtractionOracle, GraphMaker, GraphMakerConfig, LabelPolicy,
    MergeReport, Ontology, OpenAIOracle, OracleConfig, OracleRequest, PlainTextExtractor,
    ProcessReport, RecordPolicy, TextExtractor,
};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "graph-maker")]
#[command(about = "Extract knowledge graphs from text with an LLM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a graph from one or more text files
    Extract(ExtractArgs),

    /// Send a trivial completion to check OpenAI credentials
    CheckOpenai,

    /// Connect to Neo4j and run a trivial query
    CheckNeo4j,

    /// Print the effective configuration with secrets masked
    Env,
}

#[derive(Args)]
struct ExtractArgs {
    /// Input files (plain text; form feeds separate pages)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Ontology JSON file: {"labels": [...], "relationship_descriptor": "..."}
    #[arg(long, conflicts_with = "labels")]
    ontology: Option<PathBuf>,

    /// Entity labels, comma separated
    #[arg(long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Relationship descriptor used with --labels
    #[arg(long, default_value = "")]
    relationships: String,

    /// Target chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Chunking mode (defaults to words for single-page input)
    #[arg(long, value_enum)]
    chunk_mode: Option<ChunkModeArg>,

    /// Maximum concurrent oracle calls per document
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-call oracle timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Chat model override
    #[arg(long)]
    model: Option<String>,

    /// Skip malformed records instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Treat labels outside the ontology as malformed
    #[arg(long)]
    reject_unknown_labels: bool,

    /// Write an HTML visualization to this path
    #[arg(long)]
    html: Option<PathBuf>,

    /// Visualization canvas height
    #[arg(long, default_value = "750px")]
    height: String,

    /// Write the graph as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Replace the contents of the configured Neo4j database with the graph
    #[arg(long)]
    neo4j: bool,

    /// Leave out edges with a missing endpoint when writing to Neo4j
    #[arg(long)]
    skip_dangling: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChunkModeArg {
    Words,
    Characters,
}

impl From<ChunkModeArg> for ChunkMode {
    fn from(arg: ChunkModeArg) -> Self {
        match arg {
            ChunkModeArg::Words => ChunkMode::Words,
            ChunkModeArg::Characters => ChunkMode::Characters,
        }
    }
}

// ============================================================================
// JSON Response Types
// ============================================================================

#[derive(Serialize)]
struct ExtractSummary {
    documents: Vec<ProcessReport>,
    nodes: usize,
    edges: usize,
    merge: MergeReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,graph_maker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Extract(args) => extract(&config, args).await,
        Commands::CheckOpenai => check_openai(&config).await,
        Commands::CheckNeo4j => check_neo4j(&config).await,
        Commands::Env => {
            println!("{}", serde_json::to_string_pretty(&config.masked())?);
            Ok(())
        }
    }
}

fn build_oracle(config: &Config, model: Option<&str>) -> Result<OpenAIOracle> {
    let mut oracle = OpenAIOracle::new(config.openai_api_key()?);
    if let Some(model) = model.or(config.openai_model.as_deref()) {
        oracle = oracle.with_model(model);
    }
    if let Some(url) = &config.openai_base_url {
        oracle = oracle.with_base_url(url);
    }
    Ok(oracle)
}

async fn load_ontology(args: &ExtractArgs) -> Result<Ontology> {
    if let Some(path) = &args.ontology {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read ontology {}", path.display()))?;
        return Ontology::from_json_str(&json)
            .with_context(|| format!("Invalid ontology {}", path.display()));
    }

    if args.labels.is_empty() {
        bail!("Provide either --ontology or --labels");
    }
    Ok(Ontology::new(
        args.labels.iter().map(|l| l.trim()),
        args.relationships.as_str(),
    ))
}

async fn load_document(path: &Path, config: &Config, args: &ExtractArgs) -> Result<Document> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut document = PlainTextExtractor
        .to_document(&bytes)?
        .with_id(path.display().to_string())
        .with_chunk_size(args.chunk_size.unwrap_or(config.chunk_size));
    if let Some(mode) = args.chunk_mode {
        document = document.with_chunk_mode(mode.into());
    }
    Ok(document)
}

async fn extract(config: &Config, args: ExtractArgs) -> Result<()> {
    let ontology = load_ontology(&args).await?;
    let oracle = build_oracle(config, args.model.as_deref())?;

    let mut oracle_config = OracleConfig::default();
    if let Some(timeout) = args
        .timeout_secs
        .map(Duration::from_secs)
        .or(config.oracle_timeout)
    {
        oracle_config = oracle_config.with_timeout(timeout);
    }

    let maker_config = GraphMakerConfig::new()
        .with_concurrency(args.concurrency.unwrap_or(config.concurrency))
        .with_oracle_config(oracle_config)
        .with_record_policy(if args.skip_malformed {
            RecordPolicy::SkipRecord
        } else {
            RecordPolicy::AbortChunk
        })
        .with_label_policy(if args.reject_unknown_labels {
            LabelPolicy::Reject
        } else {
            LabelPolicy::Accept
        });

    let mut maker = GraphMaker::with_config(ontology, oracle, maker_config);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            on_signal.cancel();
        }
    });

    let mut reports = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let document = load_document(path, config, &args).await?;
        let report = maker
            .process_document_with_cancel(&document, cancel.clone())
            .await
            .with_context(|| format!("Extraction failed for {}", path.display()))?;
        reports.push(report);
    }

    if let Some(path) = &args.json {
        maker.export_to(&JsonSink::new(path)).await?;
    }
    if let Some(path) = &args.html {
        maker
            .export_to(&HtmlSink::new(path).with_height(args.height.as_str()))
            .await?;
    }
    if args.neo4j {
        let (uri, user, password) = config.neo4j_credentials()?;
        let sink = Neo4jSink::connect(uri, user, password)
            .await?
            .with_skip_dangling(args.skip_dangling);
        maker.export_to(&sink).await?;
    }

    let mut merge = MergeReport::default();
    for report in &reports {
        merge += report.merge;
    }
    let summary = ExtractSummary {
        nodes: maker.graph().node_count(),
        edges: maker.graph().edge_count(),
        documents: reports,
        merge,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

async fn check_openai(config: &Config) -> Result<()> {
    let oracle = build_oracle(config, None)?;
    let request = OracleRequest {
        system: "You are a connectivity check.".to_string(),
        prompt: "Reply with the single word OK.".to_string(),
        temperature: 0.0,
    };

    let reply = oracle
        .complete(&request)
        .await
        .context("OpenAI request failed")?;
    println!("OpenAI reachable (model {}): {}", oracle.model(), reply.trim());
    Ok(())
}

async fn check_neo4j(config: &Config) -> Result<()> {
    let (uri, user, password) = config.neo4j_credentials()?;
    let sink = Neo4jSink::connect(uri, user, password)
        .await
        .context("Failed to connect to Neo4j")?;
    sink.ping().await.context("Neo4j query failed")?;
    println!("Neo4j reachable at {}", uri);
    Ok(())
}
