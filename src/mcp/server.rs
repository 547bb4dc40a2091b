//! MCP stdio server implementation

use super::tools::{get_tool_definitions, handle_tool_call, ToolContext};
use super::types::{McpError, McpMessage, McpNotification, McpRequest, McpResponse};
use crate::config::Config;
use crate::embed::Embedder;
use crate::error::Result;
use crate::store::VectorStore;
use crate::websearch::WebSearchClient;
use serde_json::{json, Map, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, error, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Server implementation
pub struct McpServer {
    config: Config,
    embedder: Box<dyn Embedder>,
    store: Box<dyn VectorStore>,
    web: WebSearchClient,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(
        config: Config,
        embedder: Box<dyn Embedder>,
        store: Box<dyn VectorStore>,
        web: WebSearchClient,
    ) -> Self {
        Self {
            config,
            embedder,
            store,
            web,
        }
    }

    /// Run the MCP server loop over stdio
    pub async fn run(&self) -> Result<()> {
        info!("MCP server starting on stdio");
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock()).await?;
        info!("MCP server shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC until `reader` is exhausted
    pub async fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(response) = self.handle_line(&line).await {
                let response_str = serde_json::to_string(&response)?;
                debug!("Sending: {}", response_str);
                writeln!(writer, "{}", response_str)?;
                writer.flush()?;
            }
        }

        Ok(())
    }

    /// Handle one raw message; notifications and stray responses get no reply
    async fn handle_line(&self, line: &str) -> Option<McpResponse> {
        let message: McpMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                error!("Failed to parse message: {}", e);
                return Some(McpResponse::error(
                    None,
                    McpError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        match message {
            McpMessage::Request(req) => Some(self.handle_request(req).await),
            McpMessage::Notification(notif) => {
                self.handle_notification(notif);
                None
            }
            McpMessage::Response(_) => {
                warn!("Unexpected response message received");
                None
            }
        }
    }

    /// Handle an MCP request
    async fn handle_request(&self, request: McpRequest) -> McpResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => McpResponse::success(id, json!({ "tools": get_tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => McpResponse::success(id, json!({ "resources": [] })),
            "prompts/list" => McpResponse::success(id, json!({ "prompts": [] })),
            "ping" => McpResponse::success(id, json!({})),
            _ => McpResponse::error(id, McpError::method_not_found(&request.method)),
        }
    }

    /// Handle notifications (fire-and-forget)
    fn handle_notification(&self, notification: McpNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => info!("Client initialized"),
            "notifications/cancelled" => info!("Request cancelled"),
            _ => debug!("Unknown notification: {}", notification.method),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> McpResponse {
        McpResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "resources": { "subscribe": false, "listChanged": false },
                    "prompts": { "listChanged": false }
                },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> McpResponse {
        let Some(params) = params else {
            return McpResponse::error(id, McpError::invalid_params("Missing params"));
        };

        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return McpResponse::error(id, McpError::invalid_params("Missing tool name"));
        };

        let arguments: Map<String, Value> = params
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        debug!("Calling tool: {} with args: {:?}", name, arguments);

        let ctx = ToolContext {
            config: &self.config,
            embedder: self.embedder.as_ref(),
            store: self.store.as_ref(),
            web: &self.web,
        };
        let result = handle_tool_call(name, &arguments, &ctx).await;

        match serde_json::to_value(&result) {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, McpError::parse_error(e.to_string())),
        }
    }
}
