//! MCP protocol message types and data structures
//!
//! The server side of the Model Context Protocol only needs a small slice of the
//! full type system: JSON-RPC envelopes, the handshake, and the two tool requests.
//!
//! # Message Types
//!
//! MCP uses JSON-RPC 2.0 as its foundation with three core message types:
//!
//! ```rust
//! use hitl_mcp::mcp::types::{MCPNotification, MCPRequest, MCPResponse};
//! use serde_json::json;
//!
//! let request = MCPRequest::new(json!(1), "tools/list", None);
//! let response = MCPResponse::success(json!(1), json!({"tools": []}));
//! let notification = MCPNotification::new("notifications/initialized", None);
//! ```
//!
//! Messages are distinguished by shape: requests carry both `id` and `method`,
//! responses carry `id` and either `result` or `error`, notifications carry a
//! `method` but no `id`.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 version identifier
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision advertised during the handshake
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Unique identifier for JSON-RPC requests
pub type RequestId = serde_json::Value;

/// Core MCP message variants following JSON-RPC 2.0 specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MCPMessage {
    /// A request message initiating an operation
    Request(MCPRequest),
    /// A response message containing results or errors
    Response(MCPResponse),
    /// A notification message (request without expecting response)
    Notification(MCPNotification),
}

/// Request message for initiating MCP operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Unique identifier for this request
    pub id: RequestId,
    /// Method name to invoke
    pub method: String,
    /// Optional parameters for the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Response message containing operation results or errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request identifier this response corresponds to
    pub id: RequestId,
    /// Either result or error, but not both
    #[serde(flatten)]
    pub payload: MCPResponsePayload,
}

/// Response content - either successful result data or error details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MCPResponsePayload {
    /// Successful response with result data
    Success { result: serde_json::Value },
    /// Error response with error details
    Error { error: MCPError },
}

/// Notification message for events that don't expect responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPNotification {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Method name to invoke
    pub method: String,
    /// Optional parameters for the method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Error information following JSON-RPC 2.0 error format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPError {
    /// Numeric error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Standard JSON-RPC 2.0 error codes
impl MCPError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Build an error with an explicit code
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Server feature support advertised during connection handshake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// Present when the server supports listing and calling tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tool-related server capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolsCapability {
    /// Whether the server emits list-changed notifications
    #[serde(skip_serializing_if = "Option::is_none", rename = "listChanged")]
    pub list_changed: Option<bool>,
}

/// Content formats for tool results
///
/// The escalation tools only ever produce text, so text is the single variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    /// Plain text content
    #[serde(rename = "text")]
    Text(TextContent),
}

impl Content {
    /// Shorthand for a text block
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    /// Borrow the text of this block
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text(t) => &t.text,
        }
    }
}

/// Text content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text content
    pub text: String,
}

/// Tool metadata including name, description, and parameter schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Name of the tool
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON schema for the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Tool execution results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Content returned by the tool
    pub content: Vec<Content>,
    /// Whether the tool call resulted in an error
    #[serde(skip_serializing_if = "Option::is_none", rename = "isError")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// A successful result holding a single text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: None,
        }
    }
}

/// Initialize request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Protocol version requested by client
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Client capabilities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<serde_json::Value>,
    /// Information about the client
    #[serde(rename = "clientInfo", default)]
    pub client_info: serde_json::Value,
}

/// Initialize response result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeResult {
    /// Protocol version supported by server
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Information about the server
    #[serde(rename = "serverInfo")]
    pub server_info: serde_json::Value,
    /// Optional setup instructions for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// List tools request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ListToolsRequest {
    /// Pagination cursor; the catalog fits in one page so it is ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// List tools response result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Available tools
    pub tools: Vec<Tool>,
}

/// Call tool request parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolRequest {
    /// Name of the tool to call
    pub name: String,
    /// Arguments to pass to the tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

/// Standard MCP method names used by the server
pub mod methods {
    /// Initialize the MCP session
    pub const INITIALIZE: &str = "initialize";
    /// Liveness check
    pub const PING: &str = "ping";
    /// List available tools
    pub const LIST_TOOLS: &str = "tools/list";
    /// Call a specific tool
    pub const CALL_TOOL: &str = "tools/call";
    /// Client finished the handshake
    pub const INITIALIZED: &str = "notifications/initialized";
}

impl MCPRequest {
    /// Create a new request with the given method and parameters
    pub fn new(
        id: RequestId,
        method: impl Into<String>,
        params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

impl MCPResponse {
    /// Create a successful response
    pub fn success(id: RequestId, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: MCPResponsePayload::Success { result },
        }
    }

    /// Create an error response
    pub fn error(id: RequestId, error: MCPError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            payload: MCPResponsePayload::Error { error },
        }
    }
}

impl MCPNotification {
    /// Create a new notification
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_shape_detection() {
        let request: MCPMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#).unwrap();
        assert!(matches!(request, MCPMessage::Request(ref r) if r.id == json!(7)));

        let notification: MCPMessage =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(matches!(notification, MCPMessage::Notification(_)));
    }

    #[test]
    fn test_error_response_wire_format() {
        let response = MCPResponse::error(
            json!("abc"),
            MCPError::new(MCPError::METHOD_NOT_FOUND, "Method not found: foo/bar"),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], "abc");
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: foo/bar");
        assert!(value.get("result").is_none());
        assert!(value["error"].get("data").is_none());
    }

    #[test]
    fn test_call_tool_result_wire_format() {
        let result = CallToolResult::text("hello");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value, json!({"content": [{"type": "text", "text": "hello"}]}));
        assert_eq!(result.content[0].as_text(), "hello");
    }

    #[test]
    fn test_initialize_request_without_client_info() {
        let request: InitializeRequest =
            serde_json::from_value(json!({"protocolVersion": "2024-11-05"})).unwrap();
        assert_eq!(request.protocol_version, PROTOCOL_VERSION);
        assert!(request.client_info.is_null());
    }

    #[test]
    fn test_capabilities_serialization() {
        let caps = ServerCapabilities {
            tools: Some(ToolsCapability::default()),
        };
        assert_eq!(serde_json::to_value(&caps).unwrap(), json!({"tools": {}}));
    }
}
