//! FastEmbed implementation for local embeddings

use super::{Embedder, PROBE_TEXT};
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Map a model identifier to the fastembed model enum
pub fn fastembed_model(name: &str) -> Option<EmbeddingModel> {
    let model = match name {
        "nomic-ai/nomic-embed-text-v1.5" => EmbeddingModel::NomicEmbedTextV15,
        "nomic-ai/nomic-embed-text-v1" => EmbeddingModel::NomicEmbedTextV1,
        "BAAI/bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "BAAI/bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        "BAAI/bge-large-en-v1.5" => EmbeddingModel::BGELargeENV15,
        "sentence-transformers/all-MiniLM-L6-v2" => EmbeddingModel::AllMiniLML6V2,
        _ => return None,
    };
    Some(model)
}

/// FastEmbed-based embedder
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedder {
    /// Load the model and probe its output dimension
    pub async fn new(config: &EmbeddingConfig) -> Result<Self> {
        info!("Initializing FastEmbed with model: {}", config.model);

        let model_enum = fastembed_model(&config.model).unwrap_or_else(|| {
            warn!(
                "Unknown model '{}', using default NomicEmbedTextV15",
                config.model
            );
            EmbeddingModel::NomicEmbedTextV15
        });

        let options = InitOptions::new(model_enum).with_show_download_progress(true);

        let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
            .await
            .map_err(|e| Error::Embedding(format!("Task join error: {}", e)))?
            .map_err(|e| Error::Embedding(format!("Failed to initialize model: {}", e)))?;

        let mut embedder = Self {
            model: Arc::new(Mutex::new(model)),
            model_name: config.model.clone(),
            dimension: 0,
        };

        let probe = embedder.embed_one(PROBE_TEXT).await?;
        embedder.dimension = probe.len();
        info!(
            "FastEmbed model loaded ({} dimensions)",
            embedder.dimension
        );

        Ok(embedder)
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts", texts.len());

        // FastEmbed is synchronous, so we wrap in blocking task
        let model = self.model.clone();
        let embeddings = tokio::task::spawn_blocking(move || {
            let model = model.blocking_lock();
            model.embed(texts, None)
        })
        .await
        .map_err(|e| Error::Embedding(format!("Task join error: {}", e)))?
        .map_err(|e| Error::Embedding(format!("Embedding failed: {}", e)))?;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_models_map() {
        assert!(matches!(
            fastembed_model("nomic-ai/nomic-embed-text-v1.5"),
            Some(EmbeddingModel::NomicEmbedTextV15)
        ));
        assert!(matches!(
            fastembed_model("BAAI/bge-small-en-v1.5"),
            Some(EmbeddingModel::BGESmallENV15)
        ));
        assert!(fastembed_model("unknown-model").is_none());
    }

    // Integration test - requires model download
    #[tokio::test]
    #[ignore] // Run manually with: cargo test -- --ignored
    async fn test_fastembed_integration() {
        let config = EmbeddingConfig {
            model: "BAAI/bge-small-en-v1.5".to_string(),
            ..Default::default()
        };

        let embedder = FastEmbedder::new(&config).await.unwrap();
        assert_eq!(embedder.dimension(), 384);

        let texts = vec!["Hello world".to_string(), "Test embedding".to_string()];
        let embeddings = embedder.embed(texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);
    }
}
