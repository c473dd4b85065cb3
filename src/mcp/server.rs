//! MCP Server implementation
//!
//! This module provides the server side of the Model Context Protocol: the
//! [`MCPServer`] trait that tool providers implement, and [`MCPServerHandler`]
//! which owns JSON-RPC routing and the request loop over a transport.
//!
//! Requests are handled strictly one at a time: the loop reads a message,
//! awaits its handler to completion, writes the response, then reads the next.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::mcp::error::MCPOperationError;
use crate::mcp::transport::{MCPTransport, TransportStreams};
use crate::mcp::types::{
    methods, CallToolRequest, CallToolResult, InitializeRequest, InitializeResult,
    ListToolsRequest, ListToolsResult, MCPMessage, MCPNotification, MCPRequest,
    MCPResponse, ServerCapabilities, ToolsCapability, PROTOCOL_VERSION,
};

/// Core trait for MCP server implementations
#[async_trait]
pub trait MCPServer: Send + Sync {
    /// Answer the client's initialize request
    ///
    /// The default implementation advertises the configured name and version and
    /// the capabilities returned by [`MCPServer::capabilities`].
    async fn initialize(
        &self,
        request: InitializeRequest,
    ) -> Result<InitializeResult, MCPOperationError> {
        debug!(
            client_protocol = %request.protocol_version,
            client = %request.client_info,
            "Client initializing"
        );
        let config = self.config();
        Ok(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: self.capabilities(),
            server_info: serde_json::json!({
                "name": config.name,
                "version": config.version
            }),
            instructions: config.instructions.clone(),
        })
    }

    /// List available tools that this server provides
    async fn list_tools(
        &self,
        request: ListToolsRequest,
    ) -> Result<ListToolsResult, MCPOperationError>;

    /// Execute a tool with the given parameters
    async fn call_tool(
        &self,
        request: CallToolRequest,
    ) -> Result<CallToolResult, MCPOperationError>;

    /// Identification advertised during the handshake
    fn config(&self) -> &MCPServerConfig;

    /// Get the server's capabilities
    fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            tools: Some(ToolsCapability::default()),
        }
    }

    /// Handle server shutdown and cleanup
    async fn shutdown(&self) -> Result<(), MCPOperationError> {
        Ok(())
    }
}

/// Configuration for MCP server instances
#[derive(Debug, Clone)]
pub struct MCPServerConfig {
    /// Server name for identification
    pub name: String,
    /// Server version
    pub version: String,
    /// Optional usage hint returned from initialize
    pub instructions: Option<String>,
}

impl Default for MCPServerConfig {
    fn default() -> Self {
        Self {
            name: "hitl-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
        }
    }
}

/// MCP Server handler that manages request routing
///
/// This handles the JSON-RPC protocol and routes requests to the appropriate
/// server methods based on the MCP specification.
pub struct MCPServerHandler<S: MCPServer> {
    server: Arc<S>,
}

impl<S: MCPServer> MCPServerHandler<S> {
    pub fn new(server: Arc<S>) -> Self {
        Self { server }
    }

    /// Handle an incoming MCP request and generate a response
    pub async fn handle_request(
        &self,
        request: MCPRequest,
    ) -> Result<MCPResponse, MCPOperationError> {
        let id = request.id.clone();
        let result = match request.method.as_str() {
            methods::INITIALIZE => {
                let params: InitializeRequest = decode_params(request.params, "initialize")?;
                encode_result(self.server.initialize(params).await?)?
            }
            methods::PING => serde_json::json!({}),
            methods::LIST_TOOLS => {
                let params: ListToolsRequest = decode_params(request.params, "tools/list")?;
                encode_result(self.server.list_tools(params).await?)?
            }
            methods::CALL_TOOL => {
                let params: CallToolRequest = decode_params(request.params, "tools/call")?;
                encode_result(self.server.call_tool(params).await?)?
            }
            unknown => {
                return Err(MCPOperationError::method_not_found(format!(
                    "Method not found: {}",
                    unknown
                )));
            }
        };

        Ok(MCPResponse::success(id, result))
    }

    /// Handle a notification; notifications never produce a response
    pub fn handle_notification(&self, notification: MCPNotification) {
        match notification.method.as_str() {
            methods::INITIALIZED => info!("Client completed MCP handshake"),
            other => debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handle an error and convert it to an error response
    pub fn handle_error(&self, request_id: serde_json::Value, error: MCPOperationError) -> MCPResponse {
        MCPResponse::error(request_id, error.to_mcp_error())
    }

    /// Route one inbound message, returning the response to send (if any)
    pub async fn handle_message(&self, message: MCPMessage) -> Option<MCPResponse> {
        match message {
            MCPMessage::Request(request) => {
                let id = request.id.clone();
                let method = request.method.clone();
                match self.handle_request(request).await {
                    Ok(response) => Some(response),
                    Err(error) => {
                        debug!(method = %method, code = error.code(), "Request failed: {}", error);
                        Some(self.handle_error(id, error))
                    }
                }
            }
            MCPMessage::Notification(notification) => {
                self.handle_notification(notification);
                None
            }
            MCPMessage::Response(response) => {
                // The server never issues requests, so there is nothing to correlate
                warn!(id = %response.id, "Dropping unsolicited response");
                None
            }
        }
    }

    /// Serve requests from the streams until the input ends
    pub async fn serve_streams(&self, streams: TransportStreams) -> Result<(), MCPOperationError> {
        let TransportStreams {
            mut read_stream,
            mut write_stream,
        } = streams;

        while let Some(incoming) = read_stream.next().await {
            let reply = match incoming {
                Ok(message) => self.handle_message(message).await,
                Err(error) if error.is_connection_error() => return Err(error),
                Err(error) => {
                    warn!("Rejecting malformed message: {}", error);
                    Some(MCPResponse::error(
                        serde_json::Value::Null,
                        error.to_mcp_error(),
                    ))
                }
            };

            if let Some(response) = reply {
                write_stream.send(MCPMessage::Response(response)).await?;
            }
        }

        write_stream.close().await?;
        Ok(())
    }

    /// Connect the transport and serve until the client disconnects
    pub async fn serve<T: MCPTransport + ?Sized>(
        &self,
        transport: &mut T,
    ) -> Result<(), MCPOperationError> {
        let streams = transport.connect().await?;
        let info = transport.transport_info();
        info!(
            transport = %info.transport_type,
            endpoint = %info.endpoint,
            "MCP server connected"
        );

        let outcome = self.serve_streams(streams).await;

        self.server.shutdown().await?;
        transport.disconnect().await?;
        info!("MCP server stopped");
        outcome
    }
}

fn decode_params<T: DeserializeOwned>(
    params: Option<serde_json::Value>,
    method: &str,
) -> Result<T, MCPOperationError> {
    let params = match params {
        Some(serde_json::Value::Null) | None => serde_json::json!({}),
        Some(value) => value,
    };
    serde_json::from_value(params).map_err(|e| {
        MCPOperationError::invalid_params(format!("Invalid {} params: {}", method, e))
    })
}

fn encode_result<T: Serialize>(result: T) -> Result<serde_json::Value, MCPOperationError> {
    serde_json::to_value(result).map_err(|e| {
        MCPOperationError::internal(format!("Failed to serialize result: {}", e))
    })
}
