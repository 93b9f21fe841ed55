//! MCP (Model Context Protocol) Server Implementation
//!
//! This module provides a complete MCP server implementation following the
//! JSON-RPC 2.0 specification and MCP protocol version 2025-06-18, along with
//! the mock stack tools and static resources it serves.

pub mod errors;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;
pub mod validation;

#[cfg(test)]
mod tests;

pub use protocol::*;
pub use server::{ConnectionState, McpServer, MessageHandler, ResourceHandler, ToolHandler};

use crate::config::ServerConfig;

/// Assemble the stack server with every tool and resource registered
#[inline]
pub async fn build_stack_server(config: &ServerConfig) -> McpServer {
    let server = McpServer::new(
        config.name.clone(),
        env!("CARGO_PKG_VERSION").to_string(),
    )
    .with_instructions(config.instructions.clone());

    tools::register_stack_tools(&server).await;
    resources::register_stack_resources(&server).await;

    server
}
