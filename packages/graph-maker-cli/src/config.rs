use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Serialize;

use graph_maker::DEFAULT_CHUNK_SIZE;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub neo4j_uri: Option<String>,
    pub neo4j_username: Option<String>,
    pub neo4j_password: Option<String>,
    pub chunk_size: usize,
    pub concurrency: usize,
    pub oracle_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL"),
            openai_base_url: var("OPENAI_BASE_URL"),
            neo4j_uri: var("NEO4J_URI"),
            neo4j_username: var("NEO4J_USERNAME"),
            neo4j_password: var("NEO4J_PASSWORD"),
            chunk_size: var("GRAPH_MAKER_CHUNK_SIZE")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("GRAPH_MAKER_CHUNK_SIZE must be a valid number")?
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            concurrency: var("GRAPH_MAKER_CONCURRENCY")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("GRAPH_MAKER_CONCURRENCY must be a valid number")?
                .unwrap_or(1),
            oracle_timeout: var("GRAPH_MAKER_ORACLE_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>().map(Duration::from_secs))
                .transpose()
                .context("GRAPH_MAKER_ORACLE_TIMEOUT_SECS must be a whole number of seconds")?,
        })
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY must be set")
    }

    /// URI, username and password for Neo4j.
    pub fn neo4j_credentials(&self) -> Result<(&str, &str, &str)> {
        Ok((
            self.neo4j_uri.as_deref().context("NEO4J_URI must be set")?,
            self.neo4j_username
                .as_deref()
                .context("NEO4J_USERNAME must be set")?,
            self.neo4j_password
                .as_deref()
                .context("NEO4J_PASSWORD must be set")?,
        ))
    }

    /// Printable view with credentials masked.
    pub fn masked(&self) -> MaskedConfig {
        MaskedConfig {
            openai_api_key: self.openai_api_key.as_deref().map(mask),
            openai_model: self.openai_model.clone(),
            openai_base_url: self.openai_base_url.clone(),
            neo4j_uri: self.neo4j_uri.clone(),
            neo4j_username: self.neo4j_username.clone(),
            neo4j_password: self.neo4j_password.as_deref().map(mask),
            chunk_size: self.chunk_size,
            concurrency: self.concurrency,
            oracle_timeout_secs: self.oracle_timeout.map(|t| t.as_secs()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MaskedConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub neo4j_uri: Option<String>,
    pub neo4j_username: Option<String>,
    pub neo4j_password: Option<String>,
    pub chunk_size: usize,
    pub concurrency: usize,
    pub oracle_timeout_secs: Option<u64>,
}

/// Keep the first four characters of long secrets, hide the rest.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}
