//! In-process brute-force vector store

use super::{CollectionInfo, Distance, IndexedPoint, SearchHit, VectorStore};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

struct Collection {
    dimension: usize,
    distance: Distance,
    /// Insertion order is kept so ties resolve the same way every run
    points: Vec<IndexedPoint>,
    index: HashMap<Uuid, usize>,
}

/// Vector store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(name: &str) -> Error {
    Error::Store(format!("Collection '{}' does not exist", name))
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get(name) {
            if existing.dimension != dimension {
                return Err(Error::Store(format!(
                    "Collection '{}' has vector size {}, but the embedding model produces {}",
                    name, existing.dimension, dimension
                )));
            }
            return Ok(());
        }

        collections.insert(
            name.to_string(),
            Collection {
                dimension,
                distance,
                points: Vec::new(),
                index: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(collection).ok_or_else(|| missing(collection))?;

        if let Some(bad) = points.iter().find(|p| p.vector.len() != target.dimension) {
            return Err(Error::Store(format!(
                "Vector dimension mismatch for collection '{}': expected {} (got {})",
                collection,
                target.dimension,
                bad.vector.len()
            )));
        }

        for point in points {
            match target.index.get(&point.id) {
                Some(&slot) => target.points[slot] = point,
                None => {
                    target.index.insert(point.id, target.points.len());
                    target.points.push(point);
                }
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        top_k: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchHit>> {
        let collections = self.collections.read().await;
        let target = collections.get(collection).ok_or_else(|| missing(collection))?;
        let distance = target.distance;

        if query_vector.len() != target.dimension {
            return Err(Error::Store(format!(
                "Query vector dimension mismatch for collection '{}': expected {} (got {})",
                collection,
                target.dimension,
                query_vector.len()
            )));
        }

        let mut hits: Vec<SearchHit> = target
            .points
            .iter()
            .map(|p| SearchHit {
                id: p.id.to_string(),
                score: distance.score(&query_vector, &p.vector),
                payload: p.payload.clone(),
            })
            .filter(|hit| score_threshold.map_or(true, |t| distance.passes(hit.score, t)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        hits.sort_by(|a, b| {
            let order = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
            if distance.higher_is_better() {
                order.reverse()
            } else {
                order
            }
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let collections = self.collections.read().await;
        Ok(collections.get(name).map(|c| CollectionInfo {
            name: name.to_string(),
            points_count: c.points.len() as u64,
            dimension: Some(c.dimension),
            distance: Some(c.distance),
            status: "Green".to_string(),
        }))
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        Ok(self.collections.write().await.remove(name).is_some())
    }
}
