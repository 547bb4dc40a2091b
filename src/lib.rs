//! kbase: normalize mixed document files into a vector knowledge base
//!
//! Files (CSV, JSON, YAML, Markdown, plain text) are reduced to uniform
//! records with content-derived ids, embedded, and upserted into Qdrant.
//! The knowledge base is then searchable from the CLI or as an MCP tool.

pub mod chunk;
pub mod commands;
pub mod config;
pub mod embed;
pub mod error;
pub mod load;
pub mod mcp;
pub mod progress;
pub mod record;
pub mod store;
pub mod websearch;
