//! HTTP embedding backend
//!
//! Talks to an embedding sidecar exposing `POST /v1/embed/text` with a body of
//! `{"model": ..., "inputs": [...]}`. The response may carry the vectors as
//! `embeddings`, `vectors`, or an OpenAI-style `data` list.

use super::{Embedder, PROBE_TEXT};
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const EMBED_TEXT_PATH: &str = "/v1/embed/text";

#[derive(Debug, Clone, Serialize)]
struct EmbedTextRequest<'a> {
    model: &'a str,
    inputs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Embeddings { embeddings: Vec<Vec<f32>> },
    Vectors { vectors: Vec<Vec<f32>> },
    Data { data: Vec<EmbeddingData> },
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_embeddings(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingResponse::Embeddings { embeddings } => embeddings,
            EmbeddingResponse::Vectors { vectors } => vectors,
            EmbeddingResponse::Data { data } => data.into_iter().map(|d| d.embedding).collect(),
        }
    }
}

/// Embedder backed by a remote HTTP service
pub struct HttpEmbedder {
    client: Client,
    endpoint: Url,
    model: String,
    dimension: usize,
    retries: usize,
}

impl HttpEmbedder {
    /// Build the client and probe the model's dimension
    pub async fn connect(config: &EmbeddingConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;
        let endpoint = base_url
            .join(EMBED_TEXT_PATH)
            .map_err(|e| Error::Config(format!("Invalid embedding backend URL: {}", e)))?;
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let mut embedder = Self {
            client,
            endpoint,
            model: config.model.clone(),
            dimension: 0,
            retries: 2,
        };

        let probe = embedder.embed_one(PROBE_TEXT).await?;
        if probe.is_empty() {
            return Err(Error::Embedding(format!(
                "Backend returned an empty vector for model '{}'",
                config.model
            )));
        }
        embedder.dimension = probe.len();
        info!(
            "Embedding backend at {} serves {} ({} dimensions)",
            config.url, embedder.model, embedder.dimension
        );

        Ok(embedder)
    }

    async fn request(&self, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let body = EmbedTextRequest {
            model: &self.model,
            inputs,
        };

        let mut last_err = None;
        for attempt in 0..=self.retries {
            let result = self
                .client
                .post(self.endpoint.clone())
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(response) => {
                    let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
                        Error::Embedding(format!("Unexpected backend response: {}", e))
                    })?;
                    return Ok(parsed.into_embeddings());
                }
                Err(e) => {
                    debug!("Embedding request attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(Error::Embedding(e.to_string()));
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Embedding("Embedding backend request failed".to_string())))
    }

    fn validate_dimensions(&self, embeddings: &[Vec<f32>]) -> Result<()> {
        if self.dimension == 0 {
            return Ok(());
        }
        if let Some(mismatch) = embeddings.iter().find(|v| v.len() != self.dimension) {
            return Err(Error::Embedding(format!(
                "Embedding dimension mismatch for model '{}': expected {}, got {}",
                self.model,
                self.dimension,
                mismatch.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let expected = texts.len();
        let embeddings = self.request(texts).await?;
        if embeddings.len() != expected {
            return Err(Error::Embedding(format!(
                "Backend returned {} embeddings for {} inputs",
                embeddings.len(),
                expected
            )));
        }
        self.validate_dimensions(&embeddings)?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
