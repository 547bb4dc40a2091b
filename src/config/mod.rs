//! Configuration management for kbase
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::record::IdDigest;
use crate::store::Distance;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Qdrant connection URL
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Environment variable name for Qdrant API key
    #[serde(default = "default_qdrant_api_key_env")]
    pub qdrant_api_key_env: String,

    /// Qdrant collection name
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunk: ChunkConfig,

    /// Ingestion configuration
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Vector store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Web search tool configuration
    #[serde(default)]
    pub web_search: WebSearchConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Backend kind: "local" (fastembed) or "http"
    #[serde(default = "default_embedding_backend")]
    pub backend: String,

    /// Model name/identifier
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Base URL of the HTTP embedding backend
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Batch size for embedding
    #[serde(default = "default_embedding_batch_size")]
    pub batch_size: usize,
}

/// Chunking configuration for free-text files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Split Markdown/text files longer than `max_chars`
    #[serde(default = "default_chunk_enabled")]
    pub enabled: bool,

    /// Maximum characters per chunk
    #[serde(default = "default_chunk_max_chars")]
    pub max_chars: usize,
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Where the JSON snapshot of all records is written
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Digest used to derive record ids
    #[serde(default = "default_id_digest")]
    pub id_digest: IdDigest,

    /// Abort the whole run on the first file that fails to load
    #[serde(default)]
    pub fail_fast: bool,
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Distance metric used when creating the collection
    #[serde(default = "default_distance")]
    pub distance: Distance,

    /// Optimizer indexing threshold set after collection setup
    #[serde(default = "default_indexing_threshold")]
    pub indexing_threshold: u64,
}

/// Query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default number of results
    #[serde(default = "default_query_top_k")]
    pub top_k: usize,

    /// Minimum similarity score
    #[serde(default = "default_query_score_threshold")]
    pub score_threshold: f32,
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Search endpoint URL
    #[serde(default = "default_web_search_url")]
    pub url: String,

    /// Environment variable name for the API key
    #[serde(default = "default_web_search_api_key_env")]
    pub api_key_env: String,

    /// Timeout forwarded to the search API (milliseconds)
    #[serde(default = "default_web_search_timeout_ms")]
    pub timeout_ms: u64,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Path to config file
    pub config_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
            qdrant_api_key_env: default_qdrant_api_key_env(),
            collection_name: default_collection_name(),
            embedding: EmbeddingConfig::default(),
            chunk: ChunkConfig::default(),
            ingest: IngestConfig::default(),
            store: StoreConfig::default(),
            query: QueryConfig::default(),
            web_search: WebSearchConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: default_embedding_backend(),
            model: default_embedding_model(),
            url: default_embedding_url(),
            batch_size: default_embedding_batch_size(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            enabled: default_chunk_enabled(),
            max_chars: default_chunk_max_chars(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            id_digest: default_id_digest(),
            fail_fast: false,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            distance: default_distance(),
            indexing_threshold: default_indexing_threshold(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_query_top_k(),
            score_threshold: default_query_score_threshold(),
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            url: default_web_search_url(),
            api_key_env: default_web_search_api_key_env(),
            timeout_ms: default_web_search_timeout_ms(),
        }
    }
}

impl Config {
    /// Get the default base directory for kbase (~/.kbase)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kbase")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Point this config at a config file location
    pub fn with_config_file(mut self, config_path: &Path) -> Self {
        self.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
        };
        self
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;
        let config = config.with_config_file(config_path);

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file if it exists, otherwise use defaults
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            debug!("No config file at {:?}, using defaults", config_path);
            Ok(Config::default().with_config_file(config_path))
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Get the Qdrant API key from environment
    pub fn qdrant_api_key(&self) -> Option<String> {
        if self.qdrant_api_key_env.is_empty() {
            return None;
        }
        std::env::var(&self.qdrant_api_key_env).ok()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk.max_chars == 0 {
            return Err(Error::Config("chunk.max_chars must be > 0".to_string()));
        }

        if self.embedding.batch_size == 0 {
            return Err(Error::Config(
                "embedding.batch_size must be > 0".to_string(),
            ));
        }

        if self.query.top_k == 0 {
            return Err(Error::Config("query.top_k must be > 0".to_string()));
        }

        // Dot-product scores are unbounded above, so only the floor is checked
        if self.query.score_threshold < 0.0 {
            return Err(Error::Config(
                "query.score_threshold must not be negative".to_string(),
            ));
        }

        if self.ingest.snapshot_path.trim().is_empty() {
            return Err(Error::Config(
                "ingest.snapshot_path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
