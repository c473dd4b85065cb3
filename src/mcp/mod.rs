//! Model Context Protocol, server side.
//!
//! The server speaks JSON-RPC 2.0 over newline-delimited stdin/stdout. A tool
//! provider implements [`MCPServer`]; [`MCPServerHandler`] routes requests to it
//! and runs the request loop over an [`MCPTransport`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use hitl_mcp::config::HitlConfig;
//! use hitl_mcp::escalation::EscalationToolServer;
//! use hitl_mcp::mcp::{MCPServerHandler, StdioConfig, StdioServerTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = EscalationToolServer::new(&HitlConfig::load(None)?)?;
//! let handler = MCPServerHandler::new(Arc::new(server));
//! let mut transport = StdioServerTransport::new(StdioConfig::default());
//! handler.serve(&mut transport).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Transport Layer** - line framing and the reader/writer tasks
//! - **Protocol Layer** - JSON-RPC 2.0 message types and error codes
//! - **Server** - method routing and the sequential request loop
//!
//! Supported methods: `initialize`, `ping`, `tools/list`, `tools/call`.
//! Notifications are accepted and never answered.

pub mod error;
pub mod server;
pub mod transport;
pub mod types;

// Re-export comprehensive error types for proper error handling
pub use error::MCPOperationError;

// Re-export server implementation types
pub use server::{MCPServer, MCPServerConfig, MCPServerHandler};

// Re-export transport implementations and configurations
pub use transport::{MCPTransport, StdioConfig, StdioServerTransport, TransportInfo, TransportStreams};

// Re-export all MCP protocol types and message structures
pub use types::*;
