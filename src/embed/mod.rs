//! Embedding generation
//!
//! This module provides an abstraction over embedding models with:
//! - A trait for different embedding backends
//! - Local embedding support via fastembed (feature `local-embed`)
//! - An HTTP embedding backend
//! - Batch processing with a progress bar

#[cfg(feature = "local-embed")]
mod fastembed_impl;
mod http_backend;

#[cfg(feature = "local-embed")]
pub use fastembed_impl::*;
pub use http_backend::*;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::progress;
use async_trait::async_trait;
use tracing::{debug, info};

/// Text used to discover a model's output dimension
pub(crate) const PROBE_TEXT: &str = "test";

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in input order
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Backend returned no embedding".to_string()))
    }

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Backends selectable through `embedding.backend`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackendKind {
    Local,
    Http,
}

impl std::str::FromStr for EmbeddingBackendKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "local" | "fastembed" => Ok(Self::Local),
            "http" | "https" => Ok(Self::Http),
            _ => Err(Error::Config(format!(
                "Unsupported embedding backend '{}'; use 'local' or 'http'",
                value
            ))),
        }
    }
}

/// Create an embedder based on configuration
pub async fn create_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    let kind: EmbeddingBackendKind = config.backend.parse()?;
    info!("Using {:?} embedding backend with model {}", kind, config.model);

    match kind {
        #[cfg(feature = "local-embed")]
        EmbeddingBackendKind::Local => Ok(Box::new(FastEmbedder::new(config).await?)),
        #[cfg(not(feature = "local-embed"))]
        EmbeddingBackendKind::Local => Err(Error::Config(
            "Local embeddings need the 'local-embed' feature; set embedding.backend = \"http\""
                .to_string(),
        )),
        EmbeddingBackendKind::Http => Ok(Box::new(HttpEmbedder::connect(config).await?)),
    }
}

/// Embed `texts` in batches of `batch_size`, reporting progress
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: Vec<String>,
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let batch_size = batch_size.max(1);
    let mut all_embeddings = Vec::with_capacity(texts.len());
    let bar = progress::batch_bar(texts.len() as u64, "Embedding");

    for chunk in texts.chunks(batch_size) {
        debug!("Embedding batch of {}", chunk.len());
        let embeddings = embedder.embed(chunk.to_vec()).await?;
        if embeddings.len() != chunk.len() {
            bar.abandon();
            return Err(Error::Embedding(format!(
                "Backend returned {} embeddings for {} inputs",
                embeddings.len(),
                chunk.len()
            )));
        }
        bar.inc(chunk.len() as u64);
        all_embeddings.extend(embeddings);
    }

    bar.finish_and_clear();
    Ok(all_embeddings)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder: a bag-of-letters vector per text
    pub struct LetterEmbedder {
        pub calls: AtomicUsize,
    }

    impl LetterEmbedder {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        pub fn vector(text: &str) -> Vec<f32> {
            let mut v = vec![0.0; 26];
            for c in text.to_lowercase().chars() {
                if c.is_ascii_lowercase() {
                    v[(c as u8 - b'a') as usize] += 1.0;
                }
            }
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                v.iter_mut().for_each(|x| *x /= norm);
            }
            v
        }
    }

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| Self::vector(t)).collect())
        }

        fn dimension(&self) -> usize {
            26
        }

        fn model_name(&self) -> &str {
            "letters"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::LetterEmbedder;
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let embedder = LetterEmbedder::new();
        let texts: Vec<String> = (0..10).map(|i| "ab".repeat(i + 1)).collect();

        let vectors = embed_in_batches(&embedder, texts.clone(), 3).await.unwrap();

        assert_eq!(vectors.len(), 10);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4); // 3 + 3 + 3 + 1
        for (text, vector) in texts.iter().zip(&vectors) {
            assert_eq!(vector, &LetterEmbedder::vector(text));
        }
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let embedder = LetterEmbedder::new();
        let vectors = embed_in_batches(&embedder, Vec::new(), 64).await.unwrap();
        assert!(vectors.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embed_one_default_method() {
        let embedder = LetterEmbedder::new();
        let vector = embedder.embed_one("abc").await.unwrap();
        assert_eq!(vector.len(), embedder.dimension());
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!(
            "local".parse::<EmbeddingBackendKind>().unwrap(),
            EmbeddingBackendKind::Local
        );
        assert_eq!(
            "HTTP".parse::<EmbeddingBackendKind>().unwrap(),
            EmbeddingBackendKind::Http
        );
        assert!("openai".parse::<EmbeddingBackendKind>().is_err());
    }

    #[cfg(not(feature = "local-embed"))]
    #[tokio::test]
    async fn test_local_backend_needs_feature() {
        let config = EmbeddingConfig::default();
        assert!(matches!(
            create_embedder(&config).await,
            Err(Error::Config(_))
        ));
    }
}
