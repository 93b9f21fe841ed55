//! MCP Message Validation
//!
//! Structural validation of incoming JSON-RPC messages and of the parameters
//! of the methods this server understands.

use crate::mcp::errors::{McpError, McpResult};
use crate::mcp::protocol::*;
use serde_json::Value;
use tracing::debug;

/// JSON type a required parameter must have
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    String,
    Object,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("a string"),
            Self::Object => f.write_str("an object"),
        }
    }
}

const INITIALIZE_FIELDS: &[(&str, FieldKind)] = &[
    ("protocolVersion", FieldKind::String),
    ("capabilities", FieldKind::Object),
    ("clientInfo", FieldKind::Object),
];

const CALL_TOOL_FIELDS: &[(&str, FieldKind)] = &[("name", FieldKind::String)];

const READ_RESOURCE_FIELDS: &[(&str, FieldKind)] = &[("uri", FieldKind::String)];

/// Validator for incoming MCP messages
#[derive(Debug, Default)]
pub struct McpValidator;

impl McpValidator {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw JSON value as a JSON-RPC message
    #[inline]
    pub fn validate_raw_message(&self, value: &Value) -> McpResult<JsonRpcMessage> {
        let object = value.as_object().ok_or_else(|| McpError::InvalidRequest {
            message: "JSON-RPC message must be an object".to_string(),
        })?;

        match object.get("jsonrpc").and_then(Value::as_str) {
            Some(JSONRPC_VERSION) => {}
            Some(other) => {
                return Err(McpError::InvalidRequest {
                    message: format!("Unsupported JSON-RPC version: {}", other),
                });
            }
            None => {
                return Err(McpError::InvalidRequest {
                    message: "Missing jsonrpc version".to_string(),
                });
            }
        }

        let message: JsonRpcMessage =
            serde_json::from_value(value.clone()).map_err(|e| McpError::InvalidRequest {
                message: format!("Value does not match any JSON-RPC message type: {}", e),
            })?;

        if let JsonRpcMessage::Request(request) = &message {
            self.validate_method_params(&request.method, request.params.as_ref())?;
        }

        Ok(message)
    }

    /// Validate method-specific parameters
    #[inline]
    pub fn validate_method_params(&self, method: &str, params: Option<&Value>) -> McpResult<()> {
        let required = match method {
            "initialize" => INITIALIZE_FIELDS,
            "tools/call" => CALL_TOOL_FIELDS,
            "resources/read" => READ_RESOURCE_FIELDS,
            _ => {
                debug!("No parameter validation for method: {}", method);
                return Ok(());
            }
        };

        let params = params
            .and_then(Value::as_object)
            .ok_or_else(|| McpError::InvalidParameters {
                message: format!("{} requires a params object", method),
            })?;

        for &(field, kind) in required {
            match params.get(field) {
                Some(value) if kind.matches(value) => {}
                Some(_) => {
                    return Err(McpError::InvalidParameters {
                        message: format!("{}: field '{}' must be {}", method, field, kind),
                    });
                }
                None => {
                    return Err(McpError::InvalidParameters {
                        message: format!("{}: missing required field '{}'", method, field),
                    });
                }
            }
        }

        Ok(())
    }

    /// Pick the version to answer an initialize request with
    #[inline]
    pub fn negotiate_protocol_version(&self, requested: &str) -> &'static str {
        SUPPORTED_PROTOCOL_VERSIONS
            .iter()
            .copied()
            .find(|v| *v == requested)
            .unwrap_or(MCP_VERSION)
    }
}
