//! MCP Server Implementation
//!
//! This module provides the core MCP server framework with connection handling,
//! message routing, and protocol compliance.

use crate::mcp::errors::{ErrorHandler, McpError};
use crate::mcp::protocol::*;
use crate::mcp::validation::McpValidator;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// MCP Server state and configuration
pub struct McpServer {
    /// Server implementation information
    pub server_info: Implementation,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Instructions returned to the client on initialize
    pub instructions: Option<String>,
    /// Registered tools, in registration order
    pub tools: Arc<RwLock<Vec<Tool>>>,
    /// Registered resources, in registration order
    pub resources: Arc<RwLock<Vec<Resource>>>,
    /// Tool handlers
    pub tool_handlers: Arc<RwLock<HashMap<String, Box<dyn ToolHandler>>>>,
    /// Resource handlers
    pub resource_handlers: Arc<RwLock<HashMap<String, Box<dyn ResourceHandler>>>>,
    /// Connection state
    pub connection_state: Arc<RwLock<ConnectionState>>,
    /// Message validator
    pub validator: Arc<McpValidator>,
}

/// Connection state tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Uninitialized,
    Initializing,
    Ready,
    Closed,
}

/// Tool handler trait for implementing tool execution
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult>;
}

/// Resource handler trait for implementing resource access
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn handle(&self, uri: &str) -> Result<ResourceContents>;
}

/// Counts of what the server exposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerHealthStatus {
    pub connection_state: ConnectionState,
    pub tools_registered: usize,
    pub resources_registered: usize,
}

/// Message handler for processing incoming messages
pub struct MessageHandler {
    server: Arc<McpServer>,
}

impl McpServer {
    /// Create a new MCP server
    #[inline]
    pub fn new(name: String, version: String) -> Self {
        let server_info = Implementation { name, version };

        let capabilities = ServerCapabilities {
            experimental: None,
            logging: Some(LoggingCapability {}),
            resources: Some(ResourcesCapability {
                subscribe: Some(false),
                list_changed: Some(false),
            }),
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        };

        Self {
            server_info,
            capabilities,
            instructions: None,
            tools: Arc::new(RwLock::new(Vec::new())),
            resources: Arc::new(RwLock::new(Vec::new())),
            tool_handlers: Arc::new(RwLock::new(HashMap::new())),
            resource_handlers: Arc::new(RwLock::new(HashMap::new())),
            connection_state: Arc::new(RwLock::new(ConnectionState::Uninitialized)),
            validator: Arc::new(McpValidator::new()),
        }
    }

    /// Set the instructions sent back from `initialize`
    #[inline]
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Register a tool with the server
    ///
    /// Registering a tool name twice replaces the earlier definition in place.
    #[inline]
    pub async fn register_tool<H>(&self, tool: Tool, handler: H)
    where
        H: ToolHandler + 'static,
    {
        let tool_name = tool.name.clone();

        {
            let mut tools = self.tools.write().await;
            match tools.iter_mut().find(|t| t.name == tool_name) {
                Some(existing) => *existing = tool,
                None => tools.push(tool),
            }
        }

        {
            let mut handlers = self.tool_handlers.write().await;
            handlers.insert(tool_name.clone(), Box::new(handler));
        }

        debug!("Registered tool: {}", tool_name);
    }

    /// Register a resource with the server
    #[inline]
    pub async fn register_resource<H>(&self, resource: Resource, handler: H)
    where
        H: ResourceHandler + 'static,
    {
        let resource_uri = resource.uri.clone();

        {
            let mut resources = self.resources.write().await;
            match resources.iter_mut().find(|r| r.uri == resource_uri) {
                Some(existing) => *existing = resource,
                None => resources.push(resource),
            }
        }

        {
            let mut handlers = self.resource_handlers.write().await;
            handlers.insert(resource_uri.clone(), Box::new(handler));
        }

        debug!("Registered resource: {}", resource_uri);
    }

    /// Start the server using stdio transport
    #[inline]
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        info!("Starting MCP server with stdio transport");
        self.serve(BufReader::new(io::stdin()), io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC messages until the reader hits EOF
    #[inline]
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWriteExt + Unpin,
    {
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("EOF reached, closing connection");
                    break;
                }
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let raw_value: Value = match serde_json::from_str(line) {
                        Ok(value) => value,
                        Err(e) => {
                            let error = McpError::from(e);
                            error.log();
                            self.send_message(&mut writer, &error.to_error_response(None))
                                .await?;
                            continue;
                        }
                    };

                    match self.validator.validate_raw_message(&raw_value) {
                        Ok(message) => {
                            let handler = MessageHandler::new(Arc::clone(&self));
                            if let Err(e) = handler.process_message(message, &mut writer).await {
                                error!("Error processing message: {}", e);
                            }
                        }
                        Err(e) => {
                            e.log();
                            let id = raw_value
                                .get("id")
                                .cloned()
                                .and_then(|id| serde_json::from_value::<RequestId>(id).ok());
                            self.send_message(&mut writer, &e.to_error_response(id))
                                .await?;
                        }
                    }
                }
                Err(e) => {
                    error!("Error reading input: {}", e);
                    break;
                }
            }
        }

        {
            let mut state = self.connection_state.write().await;
            *state = ConnectionState::Closed;
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Send a message to the client
    async fn send_message<W>(&self, writer: &mut W, message: &JsonRpcMessage) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        let json = serde_json::to_string(message)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Get current connection state
    #[inline]
    pub async fn connection_state(&self) -> ConnectionState {
        self.connection_state.read().await.clone()
    }

    /// Snapshot of the connection state and registration counts
    #[inline]
    pub async fn health_status(&self) -> ServerHealthStatus {
        ServerHealthStatus {
            connection_state: self.connection_state().await,
            tools_registered: self.tools.read().await.len(),
            resources_registered: self.resources.read().await.len(),
        }
    }

    /// Invoke a tool by name
    ///
    /// An unregistered name is answered with an `Unknown tool` text block
    /// rather than an error.
    #[inline]
    pub async fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult> {
        let handlers = self.tool_handlers.read().await;
        let Some(handler) = handlers.get(&params.name) else {
            warn!("Call to unknown tool: {}", params.name);
            return Ok(CallToolResult::text(format!("Unknown tool: {}", params.name)));
        };

        let tool = params.name.clone();
        handler.handle(params).await.map_err(|e| {
            McpError::ToolExecutionFailed {
                tool,
                message: format!("{:#}", e),
            }
            .into()
        })
    }

    /// Read a resource by URI
    ///
    /// An unregistered URI is answered with a `Resource not found` text payload.
    #[inline]
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceContents> {
        let handlers = self.resource_handlers.read().await;
        let Some(handler) = handlers.get(uri) else {
            warn!("Read of unknown resource: {}", uri);
            return Ok(ResourceContents {
                uri: uri.to_string(),
                mime_type: Some("text/plain".to_string()),
                text: format!("Resource not found: {}", uri),
            });
        };

        handler.handle(uri).await.map_err(|e| {
            McpError::ResourceAccessFailed {
                uri: uri.to_string(),
                message: format!("{:#}", e),
            }
            .into()
        })
    }
}

impl MessageHandler {
    /// Create a new message handler
    #[inline]
    pub fn new(server: Arc<McpServer>) -> Self {
        Self { server }
    }

    /// Process an incoming message
    #[inline]
    pub async fn process_message<W>(&self, message: JsonRpcMessage, writer: &mut W) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        match message {
            JsonRpcMessage::Request(request) => self.handle_request(request, writer).await,
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification).await;
                Ok(())
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::ErrorResponse(_) => {
                warn!("Received unexpected response message from client");
                Ok(())
            }
        }
    }

    /// Handle a JSON-RPC request
    async fn handle_request<W>(&self, request: JsonRpcRequest, writer: &mut W) -> Result<()>
    where
        W: AsyncWriteExt + Unpin,
    {
        debug!("Handling request: {}", request.method);

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_list_tools().await,
            "tools/call" => self.handle_call_tool(request.params).await,
            "resources/list" => self.handle_list_resources().await,
            "resources/read" => self.handle_read_resource(request.params).await,
            other => Err(McpError::MethodNotFound {
                method: other.to_string(),
            }
            .into()),
        };

        let message = match response {
            Ok(result) => JsonRpcMessage::Response(JsonRpcResponse::new(result, request.id)),
            Err(e) => ErrorHandler::handle_error(&e, Some(request.id)),
        };

        self.server.send_message(writer, &message).await
    }

    /// Handle a JSON-RPC notification
    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                let mut state = self.server.connection_state.write().await;
                *state = ConnectionState::Ready;
                info!("Server ready to handle requests");
            }
            "notifications/cancelled" => {
                debug!("Received cancellation notification");
            }
            _ => {
                warn!("Unknown notification method: {}", notification.method);
            }
        }
    }

    /// Handle initialize request
    #[inline]
    pub async fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        let params: InitializeParams = parse_params(params, "initialize")?;

        let protocol_version = self
            .server
            .validator
            .negotiate_protocol_version(&params.protocol_version);
        if protocol_version != params.protocol_version {
            warn!(
                "Client requested protocol version {}, answering with {}",
                params.protocol_version, protocol_version
            );
        }

        {
            let mut state = self.server.connection_state.write().await;
            *state = ConnectionState::Initializing;
        }

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: self.server.capabilities.clone(),
            server_info: self.server.server_info.clone(),
            instructions: self.server.instructions.clone(),
        };

        info!(
            "Client initialized: {} {}",
            params.client_info.name, params.client_info.version
        );
        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    #[inline]
    pub async fn handle_list_tools(&self) -> Result<Value> {
        let tools = self.server.tools.read().await.clone();
        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    /// Handle call tool request
    #[inline]
    pub async fn handle_call_tool(&self, params: Option<Value>) -> Result<Value> {
        let params: CallToolParams = parse_params(params, "tools/call")?;
        debug!("Calling tool: {}", params.name);

        let result = self.server.call_tool(params).await?;
        Ok(serde_json::to_value(result)?)
    }

    /// Handle list resources request
    #[inline]
    pub async fn handle_list_resources(&self) -> Result<Value> {
        let resources = self.server.resources.read().await.clone();
        Ok(serde_json::to_value(ListResourcesResult { resources })?)
    }

    /// Handle read resource request
    #[inline]
    pub async fn handle_read_resource(&self, params: Option<Value>) -> Result<Value> {
        let params: ReadResourceParams = parse_params(params, "resources/read")?;
        debug!("Reading resource: {}", params.uri);

        let contents = self.server.read_resource(&params.uri).await?;
        let result = ReadResourceResult {
            contents: vec![contents],
        };
        Ok(serde_json::to_value(result)?)
    }
}

/// Deserialize request params, reporting failures as invalid params
fn parse_params<T>(params: Option<Value>, method: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let params = params.ok_or_else(|| McpError::InvalidParameters {
        message: format!("{} request missing parameters", method),
    })?;

    serde_json::from_value(params).map_err(|e| {
        McpError::InvalidParameters {
            message: format!("{}: {}", method, e),
        }
        .into()
    })
}
