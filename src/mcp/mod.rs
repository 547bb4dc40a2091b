//! MCP (Model Context Protocol) server implementation
//!
//! Exposes knowledge-base search and web search as tools over stdio.

mod server;
mod tools;
mod types;

pub use server::McpServer;
pub use tools::{get_tool_definitions, KNOWLEDGE_BASE_SEARCH, WEB_SEARCH};
pub use types::{McpError, McpRequest, McpResponse, ToolDefinition, ToolResult};
