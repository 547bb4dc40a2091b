//! Vector storage
//!
//! This module provides:
//! - The [`VectorStore`] seam used by ingest, query and the MCP server
//! - A Qdrant implementation for real deployments
//! - An in-process brute-force implementation for offline use and tests

mod memory;
mod payload;
mod qdrant;

pub use memory::*;
pub use payload::*;
pub use qdrant::*;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Similarity metric for a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Dot,
    Cosine,
    Euclid,
}

impl Distance {
    /// Whether a larger score means a closer match
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Distance::Euclid)
    }

    /// Score of `b` against the query `a`
    pub fn score(self, a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        match self {
            Distance::Dot => dot,
            Distance::Cosine => {
                let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if na == 0.0 || nb == 0.0 {
                    0.0
                } else {
                    dot / (na * nb)
                }
            }
            Distance::Euclid => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
        }
    }

    /// Whether `score` passes `threshold` under this metric
    pub fn passes(self, score: f32, threshold: f32) -> bool {
        if self.higher_is_better() {
            score >= threshold
        } else {
            score <= threshold
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Dot => write!(f, "dot"),
            Distance::Cosine => write!(f, "cosine"),
            Distance::Euclid => write!(f, "euclid"),
        }
    }
}

impl FromStr for Distance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" => Ok(Distance::Dot),
            "cosine" => Ok(Distance::Cosine),
            "euclid" | "euclidean" => Ok(Distance::Euclid),
            other => Err(format!(
                "Unknown distance '{}'; use dot, cosine or euclid",
                other
            )),
        }
    }
}

/// One search result, best match first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub payload: RecordPayload,
}

/// Information about a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    pub points_count: u64,
    pub dimension: Option<usize>,
    pub distance: Option<Distance>,
    pub status: String,
}

/// Storage backend for embedded records
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if missing; fail if it exists with another size
    async fn ensure_collection(&self, name: &str, dimension: usize, distance: Distance)
        -> Result<()>;

    /// Insert or replace points by id
    async fn upsert(&self, collection: &str, points: Vec<IndexedPoint>) -> Result<()>;

    /// Nearest points to `query_vector`, best first
    async fn search(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        top_k: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchHit>>;

    /// Collection details, `None` if it does not exist
    async fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>>;

    /// Drop the collection; `false` if it did not exist
    async fn delete_collection(&self, name: &str) -> Result<bool>;
}
