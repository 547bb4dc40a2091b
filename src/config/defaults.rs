//! Default values for configuration

use crate::record::IdDigest;
use crate::store::Distance;

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default environment variable name for Qdrant API key
pub fn default_qdrant_api_key_env() -> String {
    "".to_string()
}

/// Default collection name
pub fn default_collection_name() -> String {
    "python_faq_collection".to_string()
}

/// Default embedding backend ("local" runs fastembed in-process)
pub fn default_embedding_backend() -> String {
    "local".to_string()
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "nomic-ai/nomic-embed-text-v1.5".to_string()
}

/// Default HTTP embedding backend URL
pub fn default_embedding_url() -> String {
    std::env::var("KBASE_EMBEDDING_URL").unwrap_or_else(|_| "http://127.0.0.1:7997".to_string())
}

/// Default batch size for embedding
pub fn default_embedding_batch_size() -> usize {
    64
}

/// Default: chunk long free-text files
pub fn default_chunk_enabled() -> bool {
    true
}

/// Default maximum characters per chunk
pub fn default_chunk_max_chars() -> usize {
    500
}

/// Default snapshot file, relative to the working directory
pub fn default_snapshot_path() -> String {
    "all_entries.json".to_string()
}

/// Default record id digest
pub fn default_id_digest() -> IdDigest {
    IdDigest::Md5
}

/// Default distance metric
pub fn default_distance() -> Distance {
    Distance::Dot
}

/// Default optimizer indexing threshold applied after collection setup
pub fn default_indexing_threshold() -> u64 {
    20_000
}

/// Default number of query results
pub fn default_query_top_k() -> usize {
    3
}

/// Default minimum similarity score
pub fn default_query_score_threshold() -> f32 {
    0.5
}

/// Default web search endpoint
pub fn default_web_search_url() -> String {
    "https://api.firecrawl.dev/v1/search".to_string()
}

/// Default environment variable holding the web search API key
pub fn default_web_search_api_key_env() -> String {
    "FIRECRAWL_API_KEY".to_string()
}

/// Default web search timeout (milliseconds), forwarded to the search API
pub fn default_web_search_timeout_ms() -> u64 {
    60_000
}
