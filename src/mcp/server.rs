//! MCP Server Implementation
//!
//! This module provides the core MCP server framework with connection handling,
//! message routing, and protocol compliance.

use crate::mcp::errors::{McpError, McpResult};
use crate::mcp::protocol::*;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// MCP Server state and configuration
pub struct McpServer {
    /// Server implementation information
    pub server_info: Implementation,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Usage hints sent to the client on initialize
    pub instructions: Option<String>,
    /// Registered tools
    pub tools: Arc<RwLock<HashMap<String, Tool>>>,
    /// Tool handlers
    pub tool_handlers: Arc<RwLock<HashMap<String, Arc<dyn ToolHandler>>>>,
    /// Resource templates with the handler serving each
    pub resource_templates: Arc<RwLock<Vec<(ResourceTemplate, Arc<dyn ResourceHandler>)>>>,
    /// Connection state
    pub connection_state: Arc<RwLock<ConnectionState>>,
}

/// Connection state tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Initializing,
    Ready,
    Closed,
}

/// Tool handler trait for implementing tool execution
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, params: CallToolParams) -> McpResult<CallToolResult>;
}

/// Resource handler trait for implementing templated resource access
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Whether this handler serves the given URI
    fn matches(&self, uri: &str) -> bool;

    async fn read(&self, uri: &str) -> McpResult<ReadResourceResult>;
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
            tools: Arc::new(RwLock::new(HashMap::new())),
            tool_handlers: Arc::new(RwLock::new(HashMap::new())),
            resource_templates: Arc::new(RwLock::new(Vec::new())),
            connection_state: Arc::new(RwLock::new(ConnectionState::Uninitialized)),
        }
    }

    /// Set the instructions returned from `initialize`
    #[inline]
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Register a tool with the server
    #[inline]
    pub async fn register_tool<H>(&self, tool: Tool, handler: H)
    where
        H: ToolHandler + 'static,
    {
        let tool_name = tool.name.clone();

        {
            let mut tools = self.tools.write().await;
            tools.insert(tool_name.clone(), tool);
        }

        {
            let mut handlers = self.tool_handlers.write().await;
            handlers.insert(tool_name.clone(), Arc::new(handler));
        }

        debug!("Registered tool: {}", tool_name);
    }

    /// Register a resource template with the server
    #[inline]
    pub async fn register_resource_template<H>(&self, template: ResourceTemplate, handler: H)
    where
        H: ResourceHandler + 'static,
    {
        let uri_template = template.uri_template.clone();
        self.resource_templates
            .write()
            .await
            .push((template, Arc::new(handler)));

        debug!("Registered resource template: {}", uri_template);
    }

    /// Start the server using stdio transport
    #[inline]
    pub async fn serve_stdio(self: Arc<Self>) -> Result<()> {
        info!("Starting MCP server with stdio transport");
        self.serve(BufReader::new(io::stdin()), io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC messages until the reader is exhausted
    #[inline]
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
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

                    let handler = MessageHandler::new(Arc::clone(&self));
                    if let Some(reply) = handler.process_line(line).await {
                        self.send_message(&mut writer, &reply).await?;
                    }
                }
                Err(e) => {
                    error!("Error reading from input: {}", e);
                    break;
                }
            }
        }

        *self.connection_state.write().await = ConnectionState::Closed;

        info!("MCP server stopped");
        Ok(())
    }

    /// Send a message to the client
    async fn send_message<W>(&self, writer: &mut W, message: &JsonRpcMessage) -> Result<()>
    where
        W: AsyncWrite + Unpin,
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
}

impl MessageHandler {
    /// Create a new message handler
    #[inline]
    pub fn new(server: Arc<McpServer>) -> Self {
        Self { server }
    }

    /// Process one raw input line, returning the reply to send if any
    #[inline]
    pub async fn process_line(&self, line: &str) -> Option<JsonRpcMessage> {
        let raw_value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse JSON: {}", e);
                return Some(JsonRpcMessage::ErrorResponse(JsonRpcErrorResponse::new(
                    JsonRpcError::parse_error(),
                    None,
                )));
            }
        };

        let raw_id = raw_value.get("id");
        let request_id = raw_id
            .cloned()
            .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

        // A method call carrying an id must carry a usable one, `"id": null`
        // is neither a request nor a notification
        if raw_value.get("method").is_some() && raw_id.is_some() && request_id.is_none() {
            let error = McpError::InvalidRequest {
                message: "id must be a string or an integer".to_string(),
            };
            error.log();
            return Some(error.to_error_response(None));
        }

        let message = match serde_json::from_value::<JsonRpcMessage>(raw_value) {
            Ok(message) if message.version() == JSONRPC_VERSION => message,
            Ok(message) => {
                let error = McpError::InvalidRequest {
                    message: format!("unsupported JSON-RPC version: {}", message.version()),
                };
                error.log();
                return Some(error.to_error_response(request_id));
            }
            Err(e) => {
                let error = McpError::InvalidRequest {
                    message: e.to_string(),
                };
                error.log();
                return Some(error.to_error_response(request_id));
            }
        };

        self.process_message(message).await
    }

    /// Process an incoming message
    #[inline]
    pub async fn process_message(&self, message: JsonRpcMessage) -> Option<JsonRpcMessage> {
        match message {
            JsonRpcMessage::Request(request) => Some(self.handle_request(request).await),
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification).await;
                None
            }
            JsonRpcMessage::Response(_) | JsonRpcMessage::ErrorResponse(_) => {
                warn!("Received unexpected response message from client");
                None
            }
        }
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcMessage {
        debug!("Handling request: {}", request.method);

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_list_tools().await,
            "tools/call" => self.handle_call_tool(request.params).await,
            "resources/list" => self.handle_list_resources(),
            "resources/templates/list" => self.handle_list_resource_templates().await,
            "resources/read" => self.handle_read_resource(request.params).await,
            _ => Err(McpError::MethodNotFound {
                method: request.method.clone(),
            }),
        };

        match response {
            Ok(result) => JsonRpcMessage::Response(JsonRpcResponse::new(result, request.id)),
            Err(e) => {
                e.log();
                e.to_error_response(Some(request.id))
            }
        }
    }

    /// Handle a JSON-RPC notification
    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" | "initialized" => {
                *self.server.connection_state.write().await = ConnectionState::Ready;
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
    pub async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let params: InitializeParams = parse_params(params, "initialize")?;

        let protocol_version = if SUPPORTED_MCP_VERSIONS.contains(&params.protocol_version.as_str())
        {
            params.protocol_version
        } else {
            warn!(
                "Client requested unsupported protocol version {}, offering {}",
                params.protocol_version, MCP_VERSION
            );
            MCP_VERSION.to_string()
        };

        *self.server.connection_state.write().await = ConnectionState::Initializing;

        let result = InitializeResult {
            protocol_version,
            capabilities: self.server.capabilities.clone(),
            server_info: self.server.server_info.clone(),
            instructions: self.server.instructions.clone(),
        };

        info!("Client initialized: {}", params.client_info.name);
        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    #[inline]
    pub async fn handle_list_tools(&self) -> McpResult<Value> {
        let mut tools: Vec<Tool> = self.server.tools.read().await.values().cloned().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    /// Handle call tool request
    #[inline]
    pub async fn handle_call_tool(&self, params: Option<Value>) -> McpResult<Value> {
        let params: CallToolParams = parse_params(params, "tools/call")?;

        let handler = self
            .server
            .tool_handlers
            .read()
            .await
            .get(&params.name)
            .cloned()
            .ok_or_else(|| McpError::ToolNotFound {
                name: params.name.clone(),
            })?;

        let result = handler.handle(params).await?;
        Ok(serde_json::to_value(result)?)
    }

    /// Static resources; every weather resource is templated
    fn handle_list_resources(&self) -> McpResult<Value> {
        Ok(serde_json::to_value(ListResourcesResult {
            resources: Vec::new(),
        })?)
    }

    async fn handle_list_resource_templates(&self) -> McpResult<Value> {
        let resource_templates = self
            .server
            .resource_templates
            .read()
            .await
            .iter()
            .map(|(template, _)| template.clone())
            .collect();

        Ok(serde_json::to_value(ListResourceTemplatesResult {
            resource_templates,
        })?)
    }

    /// Handle read resource request
    #[inline]
    pub async fn handle_read_resource(&self, params: Option<Value>) -> McpResult<Value> {
        let params: ReadResourceParams = parse_params(params, "resources/read")?;

        let handler = self
            .server
            .resource_templates
            .read()
            .await
            .iter()
            .find(|(_, handler)| handler.matches(&params.uri))
            .map(|(_, handler)| Arc::clone(handler))
            .ok_or_else(|| McpError::ResourceNotFound {
                uri: params.uri.clone(),
            })?;

        let result = handler.read(&params.uri).await?;
        Ok(serde_json::to_value(result)?)
    }
}

fn parse_params<T>(params: Option<Value>, method: &str) -> McpResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let params = params.ok_or_else(|| McpError::InvalidParameters {
        message: format!("{} request missing parameters", method),
    })?;

    serde_json::from_value(params).map_err(|e| McpError::InvalidParameters {
        message: format!("{} parameters are invalid: {}", method, e),
    })
}
