//! Error handling for MCP server operations
//!
//! Failures are grouped by where they happen:
//!
//! - **Transport Errors** - stdio read/write failures and closed channels
//! - **Protocol Errors** - malformed JSON-RPC, unknown methods, bad params
//! - **Tool Errors** - unknown tools and failed tool executions
//!
//! Every variant maps onto a JSON-RPC error code through
//! [`MCPOperationError::to_mcp_error`], which is the only form that ever crosses
//! the protocol boundary.
//!
//! ```rust
//! use hitl_mcp::mcp::error::MCPOperationError;
//! use hitl_mcp::mcp::types::MCPError;
//!
//! let error = MCPOperationError::method_not_found("Unknown tool: delete_hitl");
//! let wire = error.to_mcp_error();
//! assert_eq!(wire.code, MCPError::METHOD_NOT_FOUND);
//! assert!(wire.message.contains("delete_hitl"));
//! ```

use crate::mcp::types::MCPError;
use thiserror::Error;

/// Primary error type for all MCP server operations
#[derive(Error, Debug, Clone)]
pub enum MCPOperationError {
    /// Stdio transport errors (reading stdin, writing stdout)
    #[error("Stdio transport error: {message}")]
    StdioError { message: String },

    /// The peer went away or a channel closed
    #[error("Connection lost: {message}")]
    ConnectionLostError { message: String },

    /// Incoming bytes were not valid JSON
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// JSON was valid but not a usable JSON-RPC message
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The requested method or tool does not exist
    #[error("Method not found: {message}")]
    MethodNotFound { message: String },

    /// Method parameters could not be decoded
    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    /// A tool ran and failed; the message is already flattened for the client
    #[error("{message}")]
    InternalError { message: String },
}

impl MCPOperationError {
    /// Create a stdio transport error
    pub fn stdio(message: impl Into<String>) -> Self {
        Self::StdioError {
            message: message.into(),
        }
    }

    /// Create a connection lost error
    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::ConnectionLostError {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a method not found error
    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::MethodNotFound {
            message: message.into(),
        }
    }

    /// Create an invalid params error
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// JSON-RPC error code for this failure
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError { .. } => MCPError::PARSE_ERROR,
            Self::InvalidRequest { .. } => MCPError::INVALID_REQUEST,
            Self::MethodNotFound { .. } => MCPError::METHOD_NOT_FOUND,
            Self::InvalidParams { .. } => MCPError::INVALID_PARAMS,
            Self::StdioError { .. }
            | Self::ConnectionLostError { .. }
            | Self::InternalError { .. } => MCPError::INTERNAL_ERROR,
        }
    }

    /// Convert into the wire error object sent back to the client
    pub fn to_mcp_error(&self) -> MCPError {
        let message = match self {
            Self::MethodNotFound { message } | Self::InternalError { message } => message.clone(),
            other => other.to_string(),
        };
        MCPError::new(self.code(), message)
    }

    /// Whether the transport can no longer be used
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::StdioError { .. } | Self::ConnectionLostError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MCPOperationError::parse("x").code(), -32700);
        assert_eq!(MCPOperationError::invalid_request("x").code(), -32600);
        assert_eq!(MCPOperationError::method_not_found("x").code(), -32601);
        assert_eq!(MCPOperationError::invalid_params("x").code(), -32602);
        assert_eq!(MCPOperationError::internal("x").code(), -32603);
        assert_eq!(MCPOperationError::stdio("x").code(), -32603);
    }

    #[test]
    fn test_flattened_messages_pass_through_verbatim() {
        let err = MCPOperationError::internal("Failed to execute get_hitl: Failed to get HITL: gone");
        assert_eq!(
            err.to_mcp_error().message,
            "Failed to execute get_hitl: Failed to get HITL: gone"
        );

        let err = MCPOperationError::method_not_found("Unknown tool: delete_hitl");
        assert_eq!(err.to_mcp_error().message, "Unknown tool: delete_hitl");
    }

    #[test]
    fn test_other_messages_keep_their_category() {
        let wire = MCPOperationError::invalid_params("missing name").to_mcp_error();
        assert_eq!(wire.message, "Invalid params: missing name");
    }

    #[test]
    fn test_connection_classification() {
        assert!(MCPOperationError::connection_lost("stdin closed").is_connection_error());
        assert!(!MCPOperationError::internal("boom").is_connection_error());
    }
}
