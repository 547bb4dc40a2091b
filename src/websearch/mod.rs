//! Web search through a Firecrawl-compatible search API

use crate::config::WebSearchConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Text returned when the API answers without a `data` field
pub const NO_WEB_RESULTS: &str = "No results found from web search.";

/// Slack on top of the server-side timeout before the client gives up
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Option<Value>,
}

/// Client for the web search tool
pub struct WebSearchClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    api_key_env: String,
    timeout_ms: u64,
}

impl WebSearchClient {
    /// Build a client, reading the API key from the configured env var
    pub fn from_config(config: &WebSearchConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::new(config, api_key)
    }

    /// Build a client with an explicit API key
    pub fn new(config: &WebSearchConfig, api_key: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(&config.url)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms) + CLIENT_TIMEOUT_MARGIN)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            api_key_env: config.api_key_env.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    /// Run a search; `Ok(None)` when the API returned no `data`
    pub async fn search(&self, query: &str) -> Result<Option<Value>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::WebSearch(format!(
                "{} environment variable is not set.",
                self.api_key_env
            ))
        })?;

        debug!("Web search: {}", query);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&SearchRequest {
                query,
                timeout: self.timeout_ms,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::WebSearch(format!("Error connecting to search API: {}", e)))?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::WebSearch(format!("Unexpected search API response: {}", e)))?;

        Ok(body.data)
    }
}
