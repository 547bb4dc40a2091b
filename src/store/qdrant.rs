//! Qdrant vector database integration

use super::{CollectionInfo, Distance, IndexedPoint, RecordPayload, SearchHit, VectorStore};
use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, GetCollectionInfoResponse, OptimizersConfigDiffBuilder,
    PointId, SearchPointsBuilder, UpdateCollectionBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

impl From<Distance> for qdrant::Distance {
    fn from(distance: Distance) -> Self {
        match distance {
            Distance::Dot => qdrant::Distance::Dot,
            Distance::Cosine => qdrant::Distance::Cosine,
            Distance::Euclid => qdrant::Distance::Euclid,
        }
    }
}

fn distance_from_qdrant(distance: qdrant::Distance) -> Option<Distance> {
    match distance {
        qdrant::Distance::Dot => Some(Distance::Dot),
        qdrant::Distance::Cosine => Some(Distance::Cosine),
        qdrant::Distance::Euclid => Some(Distance::Euclid),
        _ => None,
    }
}

/// Qdrant store handle
pub struct QdrantStore {
    client: Qdrant,
    indexing_threshold: u64,
    /// Vector size per collection, filled by `ensure_collection` or the first upsert
    dimensions: RwLock<HashMap<String, usize>>,
}

impl QdrantStore {
    /// Connect to Qdrant using config
    pub fn connect(config: &Config) -> Result<Self> {
        Self::new(
            &config.qdrant_url,
            config.qdrant_api_key(),
            config.store.indexing_threshold,
        )
    }

    /// Create a new store connection directly with URL and optional API key
    pub fn new(url: &str, api_key: Option<String>, indexing_threshold: u64) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            indexing_threshold,
            dimensions: RwLock::new(HashMap::new()),
        })
    }

    /// Cached vector size of `name`, asking Qdrant only on a miss
    async fn expected_dimension(&self, name: &str) -> Result<Option<usize>> {
        if let Some(size) = self.dimensions.read().await.get(name) {
            return Ok(Some(*size));
        }

        let size = self.collection_vector_size(name).await?;
        if let Some(size) = size {
            self.dimensions.write().await.insert(name.to_string(), size);
        }
        Ok(size)
    }

    /// Vector size of an existing collection, if it has a single unnamed vector
    async fn collection_vector_size(&self, name: &str) -> Result<Option<usize>> {
        let info = self.client.collection_info(name).await?;
        match vector_params(&info) {
            Some(VectorLayout::Single { size, .. }) => Ok(Some(size)),
            Some(VectorLayout::Named(names)) => Err(Error::Qdrant(format!(
                "Collection '{}' uses named vectors ({}) which are not supported by this store",
                name,
                names.join(", ")
            ))),
            None => Ok(None),
        }
    }
}

enum VectorLayout {
    Single {
        size: usize,
        distance: Option<Distance>,
    },
    Named(Vec<String>),
}

fn vector_params(info: &GetCollectionInfoResponse) -> Option<VectorLayout> {
    let config = info
        .result
        .as_ref()?
        .config
        .as_ref()?
        .params
        .as_ref()?
        .vectors_config
        .as_ref()?
        .config
        .as_ref()?;

    match config {
        qdrant::vectors_config::Config::Params(params) => Some(VectorLayout::Single {
            size: params.size as usize,
            distance: qdrant::Distance::try_from(params.distance)
                .ok()
                .and_then(distance_from_qdrant),
        }),
        qdrant::vectors_config::Config::ParamsMap(map) => {
            let mut names: Vec<String> = map.map.keys().cloned().collect();
            names.sort();
            Some(VectorLayout::Named(names))
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<()> {
        if self.client.collection_exists(name).await? {
            debug!("Collection {} already exists", name);

            if let Some(size) = self.collection_vector_size(name).await? {
                if size != dimension {
                    return Err(Error::Qdrant(format!(
                        "Collection '{}' has vector size {}, but the embedding model produces {}. \
                         Use a new collection name or reset the collection.",
                        name, size, dimension
                    )));
                }
            }
        } else {
            info!(
                "Creating collection {} with dimension {} ({} distance)",
                name, dimension, distance
            );

            let vectors_config =
                VectorParamsBuilder::new(dimension as u64, qdrant::Distance::from(distance));
            self.client
                .create_collection(CreateCollectionBuilder::new(name).vectors_config(vectors_config))
                .await?;
        }

        debug!(
            "Setting indexing threshold of {} to {}",
            name, self.indexing_threshold
        );
        self.client
            .update_collection(
                UpdateCollectionBuilder::new(name).optimizers_config(
                    OptimizersConfigDiffBuilder::default()
                        .indexing_threshold(self.indexing_threshold),
                ),
            )
            .await?;

        self.dimensions
            .write()
            .await
            .insert(name.to_string(), dimension);
        Ok(())
    }

    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        if let Some(expected) = self.expected_dimension(collection).await? {
            if let Some(mismatch) = points.iter().find(|p| p.vector.len() != expected) {
                return Err(Error::Qdrant(format!(
                    "Vector dimension mismatch for collection '{}': expected {} (got {})",
                    collection,
                    expected,
                    mismatch.vector.len()
                )));
            }
        }

        debug!("Upserting {} points to collection {}", points.len(), collection);

        let point_structs: Vec<_> = points.into_iter().map(|p| p.to_point_struct()).collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, point_structs).wait(true))
            .await?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        top_k: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchHit>> {
        debug!("Searching collection {} with limit {}", collection, top_k);

        let mut builder =
            SearchPointsBuilder::new(collection, query_vector, top_k as u64).with_payload(true);
        if let Some(threshold) = score_threshold {
            builder = builder.score_threshold(threshold);
        }

        let response = self.client.search_points(builder).await?;

        Ok(response
            .result
            .into_iter()
            .map(|p| SearchHit {
                id: point_id_to_string(p.id),
                score: p.score,
                payload: p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_from_qdrant_value(v)))
                    .collect::<serde_json::Map<String, Value>>()
                    .into(),
            })
            .collect())
    }

    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        if !self.client.collection_exists(name).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(name).await?;
        let (dimension, distance) = match vector_params(&info) {
            Some(VectorLayout::Single { size, distance }) => (Some(size), distance),
            _ => (None, None),
        };

        Ok(info.result.map(|result| CollectionInfo {
            name: name.to_string(),
            points_count: result.points_count.unwrap_or(0),
            dimension,
            distance,
            status: format!("{:?}", result.status()),
        }))
    }

    async fn delete_collection(&self, name: &str) -> Result<bool> {
        self.dimensions.write().await.remove(name);

        if !self.client.collection_exists(name).await? {
            return Ok(false);
        }

        info!("Deleting collection {}", name);
        self.client.delete_collection(name).await?;
        Ok(true)
    }
}

fn point_id_to_string(id: Option<PointId>) -> String {
    use qdrant::point_id::PointIdOptions;

    match id.and_then(|id| id.point_id_options) {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

/// Convert Qdrant value to serde_json Value
fn json_from_qdrant_value(v: qdrant::Value) -> Value {
    use qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(json_from_qdrant_value)
                .collect(),
        ),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
    }
}
