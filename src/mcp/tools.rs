//! MCP tool definitions and handlers

use super::types::{ToolDefinition, ToolResult};
use crate::commands::{cmd_query, format_answer, QueryOptions};
use crate::config::Config;
use crate::embed::Embedder;
use crate::store::VectorStore;
use crate::websearch::{WebSearchClient, NO_WEB_RESULTS};
use serde_json::{json, Map, Value};
use tracing::error;

pub const KNOWLEDGE_BASE_SEARCH: &str = "knowledge_base_search";
pub const WEB_SEARCH: &str = "web_search";

/// Collaborators the tools run against
pub struct ToolContext<'a> {
    pub config: &'a Config,
    pub embedder: &'a dyn Embedder,
    pub store: &'a dyn VectorStore,
    pub web: &'a WebSearchClient,
}

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: KNOWLEDGE_BASE_SEARCH.to_string(),
            description: "Retrieve the most relevant entries from the local knowledge base. \
                Use this for questions about the topics the knowledge base covers."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The user question to look up"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: WEB_SEARCH.to_string(),
            description: "Search the web for information on a topic. \
                Use this when the question is not covered by the knowledge base."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        },
    ]
}

fn query_argument(arguments: &Map<String, Value>) -> Result<&str, ToolResult> {
    match arguments.get("query") {
        Some(Value::String(q)) => Ok(q.as_str()),
        Some(_) => Err(ToolResult::error("Parameter 'query' must be a string")),
        None => Err(ToolResult::error("Missing required parameter: query")),
    }
}

/// Handle a tool call
pub async fn handle_tool_call(
    name: &str,
    arguments: &Map<String, Value>,
    ctx: &ToolContext<'_>,
) -> ToolResult {
    let query = match query_argument(arguments) {
        Ok(q) => q,
        Err(result) if name == KNOWLEDGE_BASE_SEARCH || name == WEB_SEARCH => return result,
        Err(_) => return ToolResult::error(format!("Unknown tool: {}", name)),
    };

    match name {
        KNOWLEDGE_BASE_SEARCH => handle_knowledge_base_search(query, ctx).await,
        WEB_SEARCH => handle_web_search(query, ctx).await,
        _ => ToolResult::error(format!("Unknown tool: {}", name)),
    }
}

async fn handle_knowledge_base_search(query: &str, ctx: &ToolContext<'_>) -> ToolResult {
    match cmd_query(ctx.config, ctx.embedder, ctx.store, query, QueryOptions::default()).await {
        Ok(result) => ToolResult::text(format_answer(&result)),
        Err(e) => {
            error!("Knowledge base search failed: {}", e);
            ToolResult::error(format!("Search failed: {}", e))
        }
    }
}

async fn handle_web_search(query: &str, ctx: &ToolContext<'_>) -> ToolResult {
    match ctx.web.search(query).await {
        Ok(Some(data)) => match serde_json::to_string_pretty(&data) {
            Ok(text) => ToolResult::text(text),
            Err(e) => ToolResult::error(format!("Failed to render results: {}", e)),
        },
        Ok(None) => ToolResult::text(NO_WEB_RESULTS),
        Err(e) => {
            error!("Web search failed: {}", e);
            ToolResult::error(format!("Error: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NO_ANSWER;
    use crate::embed::testing::LetterEmbedder;
    use crate::store::MemoryStore;
    use crate::mcp::types::ToolContent;

    fn text(result: &ToolResult) -> &str {
        match &result.content[0] {
            ToolContent::Text { text } => text.as_str(),
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_definitions_require_query() {
        let tools = get_tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec![KNOWLEDGE_BASE_SEARCH, WEB_SEARCH]);
        for tool in &tools {
            assert_eq!(tool.input_schema["required"], json!(["query"]));
        }
    }

    #[tokio::test]
    async fn test_query_argument_validation() {
        let config = Config::default();
        let embedder = LetterEmbedder::new();
        let store = MemoryStore::new();
        let web = WebSearchClient::new(&config.web_search, None).unwrap();
        let ctx = ToolContext {
            config: &config,
            embedder: &embedder,
            store: &store,
            web: &web,
        };

        let missing = handle_tool_call(KNOWLEDGE_BASE_SEARCH, &args(json!({})), &ctx).await;
        assert_eq!(missing.is_error, Some(true));

        let wrong = handle_tool_call(WEB_SEARCH, &args(json!({"query": 3})), &ctx).await;
        assert_eq!(wrong.is_error, Some(true));
        assert!(text(&wrong).contains("string"));

        let unknown = handle_tool_call("add", &args(json!({"query": "x"})), &ctx).await;
        assert!(text(&unknown).contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_search_against_missing_collection_is_tool_error() {
        let config = Config::default();
        let embedder = LetterEmbedder::new();
        let store = MemoryStore::new();
        let web = WebSearchClient::new(&config.web_search, None).unwrap();
        let ctx = ToolContext {
            config: &config,
            embedder: &embedder,
            store: &store,
            web: &web,
        };

        let result =
            handle_tool_call(KNOWLEDGE_BASE_SEARCH, &args(json!({"query": "x"})), &ctx).await;
        assert_eq!(result.is_error, Some(true));

        store
            .ensure_collection(&config.collection_name, 26, config.store.distance)
            .await
            .unwrap();
        let result =
            handle_tool_call(KNOWLEDGE_BASE_SEARCH, &args(json!({"query": "x"})), &ctx).await;
        assert_eq!(result.is_error, None);
        assert_eq!(text(&result), NO_ANSWER);
    }

    #[tokio::test]
    async fn test_web_search_without_key_is_tool_error() {
        let config = Config::default();
        let embedder = LetterEmbedder::new();
        let store = MemoryStore::new();
        let web = WebSearchClient::new(&config.web_search, None).unwrap();
        let ctx = ToolContext {
            config: &config,
            embedder: &embedder,
            store: &store,
            web: &web,
        };

        let result = handle_tool_call(WEB_SEARCH, &args(json!({"query": "rust"})), &ctx).await;
        assert_eq!(result.is_error, Some(true));
        assert!(text(&result).contains("FIRECRAWL_API_KEY"));
    }
}
