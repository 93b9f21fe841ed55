//! MCP Error Handling
//!
//! Error classification for the MCP server and conversion of failures into
//! JSON-RPC error responses.

use crate::mcp::protocol::*;
use thiserror::Error;
use tracing::error;

/// MCP-specific errors that can occur during server operation
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Tool execution failed for {tool}: {message}")]
    ToolExecutionFailed { tool: String, message: String },

    #[error("Resource access failed for {uri}: {message}")]
    ResourceAccessFailed { uri: String, message: String },

    #[error("JSON-RPC parse error: {message}")]
    ParseError { message: String },

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl McpError {
    /// Convert MCP error to JSON-RPC error
    #[inline]
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            Self::InvalidRequest { message } => {
                JsonRpcError::new(error_codes::INVALID_REQUEST, message.clone(), None)
            }
            Self::MethodNotFound { method } => JsonRpcError::method_not_found(method),
            Self::InvalidParameters { message } => {
                JsonRpcError::invalid_params(Some(message.clone()))
            }
            Self::ToolExecutionFailed { tool, message } => JsonRpcError::internal_error(Some(
                format!("Tool '{}' execution failed: {}", tool, message),
            )),
            Self::ResourceAccessFailed { uri, message } => JsonRpcError::internal_error(Some(
                format!("Resource '{}' access failed: {}", uri, message),
            )),
            Self::ParseError { message } => JsonRpcError {
                data: Some(serde_json::Value::String(message.clone())),
                ..JsonRpcError::parse_error()
            },
            Self::InternalError { message } => JsonRpcError::internal_error(Some(message.clone())),
        }
    }

    /// Create error response message
    #[inline]
    pub fn to_error_response(&self, id: Option<RequestId>) -> JsonRpcMessage {
        let error_response = JsonRpcErrorResponse::new(self.to_jsonrpc_error(), id);
        JsonRpcMessage::ErrorResponse(error_response)
    }

    /// Log the error with appropriate level
    #[inline]
    pub fn log(&self) {
        match self {
            Self::ParseError { .. }
            | Self::InvalidRequest { .. }
            | Self::InvalidParameters { .. }
            | Self::MethodNotFound { .. } => {
                error!("Client error: {}", self);
            }
            Self::ToolExecutionFailed { .. }
            | Self::ResourceAccessFailed { .. }
            | Self::InternalError { .. } => {
                error!("Server error: {}", self);
            }
        }
    }
}

/// Error handler utility for consistent error processing
pub struct ErrorHandler;

impl ErrorHandler {
    /// Convert any handler failure into a JSON-RPC error response
    #[inline]
    pub fn handle_error(error: &anyhow::Error, id: Option<RequestId>) -> JsonRpcMessage {
        if let Some(mcp_error) = error.downcast_ref::<McpError>() {
            mcp_error.log();
            return mcp_error.to_error_response(id);
        }

        error!("Unexpected error: {:#}", error);
        let internal_error = McpError::InternalError {
            message: format!("{:#}", error),
        };
        internal_error.to_error_response(id)
    }
}

/// Result type for MCP operations
pub type McpResult<T> = Result<T, McpError>;

impl From<serde_json::Error> for McpError {
    #[inline]
    fn from(error: serde_json::Error) -> Self {
        Self::ParseError {
            message: error.to_string(),
        }
    }
}
