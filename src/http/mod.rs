//! HTTP transport for the Model Context Protocol
//!
//! Provides the external API routing: the `/mcp` JSON-RPC listener and metadata endpoints.

pub mod handlers;
