//! Status and reset command implementations

use crate::config::Config;
use crate::error::Result;
use crate::store::{CollectionInfo, VectorStore};
use serde::Serialize;
use tracing::{debug, info};

/// Status information
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub config_path: String,
    pub qdrant_url: String,
    pub collection_name: String,
    pub embedding_backend: String,
    pub embedding_model: String,
    pub store_connected: bool,
    pub collection: Option<CollectionInfo>,
}

/// Get system status; an unreachable store is reported, not returned as an error
pub async fn cmd_status(config: &Config, store: &dyn VectorStore) -> Result<StatusInfo> {
    info!("Getting status");

    let (store_connected, collection) = match store.collection_info(&config.collection_name).await
    {
        Ok(info) => (true, info),
        Err(e) => {
            debug!("Store connection error: {:?}", e);
            (false, None)
        }
    };

    Ok(StatusInfo {
        config_path: config.paths.config_file.display().to_string(),
        qdrant_url: config.qdrant_url.clone(),
        collection_name: config.collection_name.clone(),
        embedding_backend: config.embedding.backend.clone(),
        embedding_model: config.embedding.model.clone(),
        store_connected,
        collection,
    })
}

/// Drop the configured collection
pub async fn cmd_reset(config: &Config, store: &dyn VectorStore) -> Result<bool> {
    let deleted = store.delete_collection(&config.collection_name).await?;
    if deleted {
        info!("Deleted collection {}", config.collection_name);
    } else {
        info!("Collection {} did not exist", config.collection_name);
    }
    Ok(deleted)
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 kbase Status\n");
    println!("Configuration: {}", status.config_path);
    println!("\nQdrant:");
    println!("  URL: {}", status.qdrant_url);
    println!("  Collection: {}", status.collection_name);

    let connection_status = match (status.store_connected, &status.collection) {
        (true, Some(_)) => "✓ Connected",
        (true, None) => "⚠ Connected (collection not created - run 'kbase ingest' to create)",
        (false, _) => "✗ Not connected",
    };
    println!("  Status: {}", connection_status);

    if let Some(info) = &status.collection {
        println!("  Points: {}", info.points_count);
        if let Some(dimension) = info.dimension {
            println!("  Dimension: {}", dimension);
        }
        if let Some(distance) = info.distance {
            println!("  Distance: {}", distance);
        }
        println!("  Health: {}", info.status);
    }

    println!(
        "\nEmbedding: {} ({})",
        status.embedding_model, status.embedding_backend
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::{Distance, IndexedPoint, MemoryStore, SearchHit};
    use async_trait::async_trait;

    struct DownStore;

    #[async_trait]
    impl VectorStore for DownStore {
        async fn ensure_collection(&self, _: &str, _: usize, _: Distance) -> Result<()> {
            Err(Error::Qdrant("connection refused".to_string()))
        }

        async fn upsert(&self, _: &str, _: Vec<IndexedPoint>) -> Result<()> {
            Err(Error::Qdrant("connection refused".to_string()))
        }

        async fn search(
            &self,
            _: &str,
            _: Vec<f32>,
            _: usize,
            _: Option<f32>,
        ) -> Result<Vec<SearchHit>> {
            Err(Error::Qdrant("connection refused".to_string()))
        }

        async fn collection_info(&self, _: &str) -> Result<Option<CollectionInfo>> {
            Err(Error::Qdrant("connection refused".to_string()))
        }

        async fn delete_collection(&self, _: &str) -> Result<bool> {
            Err(Error::Qdrant("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_status_reports_collection() {
        let config = Config::default();
        let store = MemoryStore::new();

        let status = cmd_status(&config, &store).await.unwrap();
        assert!(status.store_connected);
        assert!(status.collection.is_none());

        store
            .ensure_collection(&config.collection_name, 4, Distance::Dot)
            .await
            .unwrap();
        let status = cmd_status(&config, &store).await.unwrap();
        let info = status.collection.unwrap();
        assert_eq!(info.dimension, Some(4));
        assert_eq!(info.points_count, 0);
    }

    #[tokio::test]
    async fn test_status_survives_unreachable_store() {
        let status = cmd_status(&Config::default(), &DownStore).await.unwrap();
        assert!(!status.store_connected);
    }

    #[tokio::test]
    async fn test_reset_drops_collection() {
        let config = Config::default();
        let store = MemoryStore::new();
        store
            .ensure_collection(&config.collection_name, 4, Distance::Dot)
            .await
            .unwrap();

        assert!(cmd_reset(&config, &store).await.unwrap());
        assert!(!cmd_reset(&config, &store).await.unwrap());
        assert!(matches!(
            cmd_reset(&config, &DownStore).await,
            Err(Error::Qdrant(_))
        ));
    }
}
