//! Query command implementation

use crate::config::Config;
use crate::embed::Embedder;
use crate::error::Result;
use crate::store::{SearchHit, VectorStore};
use serde::Serialize;
use tracing::{debug, info};

/// Reply when nothing clears the score threshold
pub const NO_ANSWER: &str = "I couldn't find a relevant answer in my knowledge base.";

/// Header placed above the matched contents
pub const ANSWER_HEADER: &str = "Here are the most relevant pieces of information I found:";

const HIT_SEPARATOR: &str = "\n\n---\n\n";

/// Query options; `None` falls back to the `[query]` config section
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Number of results to return
    pub top_k: Option<usize>,
    /// Minimum score threshold
    pub min_score: Option<f32>,
}

/// Query result for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

/// Embed `query` and search the configured collection
pub async fn cmd_query(
    config: &Config,
    embedder: &dyn Embedder,
    store: &dyn VectorStore,
    query: &str,
    options: QueryOptions,
) -> Result<QueryResult> {
    info!("Querying: {}", query);

    let top_k = options.top_k.unwrap_or(config.query.top_k);
    let min_score = options.min_score.unwrap_or(config.query.score_threshold);

    let query_vector = embedder.embed_one(query).await?;
    let hits = store
        .search(&config.collection_name, query_vector, top_k, Some(min_score))
        .await?;
    debug!("Got {} hits above {}", hits.len(), min_score);

    Ok(QueryResult {
        query: query.to_string(),
        hits,
    })
}

/// Render hits as the assistant-facing answer text
pub fn format_answer(result: &QueryResult) -> String {
    if result.hits.is_empty() {
        return NO_ANSWER.to_string();
    }

    let contents: Vec<&str> = result
        .hits
        .iter()
        .map(|hit| hit.payload.content.as_str())
        .collect();
    format!("{}\n\n{}", ANSWER_HEADER, contents.join(HIT_SEPARATOR))
}

/// Print query results to console
pub fn print_query_results(result: &QueryResult) {
    println!("\n🔍 Query: {}\n", result.query);
    println!("Found {} results:\n", result.hits.len());

    for (i, hit) in result.hits.iter().enumerate() {
        println!("{}. [score: {:.3}] {}", i + 1, hit.score, hit.payload.source);
        println!("   {}\n", hit.payload.content);
    }
}
