//! Human-in-the-loop escalation tools served over the Model Context Protocol.
//!
//! `hitl-mcp` runs as a stdio MCP server. It advertises six tools that let an
//! agent create an escalation, approve, modify or reject it, and inspect
//! existing escalations. Every tool call becomes one authenticated HTTPS
//! request against the AgentMP escalation service, and the JSON response is
//! returned to the caller as pretty-printed text.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hitl_mcp::config::HitlConfig;
//! use hitl_mcp::escalation::EscalationToolServer;
//! use hitl_mcp::mcp::{MCPServerHandler, StdioConfig, StdioServerTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads AGENTMP_API_KEY and optional overrides
//!     let config = HitlConfig::load(None)?;
//!
//!     let server = EscalationToolServer::new(&config)?;
//!     let handler = MCPServerHandler::new(Arc::new(server));
//!
//!     let mut transport = StdioServerTransport::new(StdioConfig::default());
//!     handler.serve(&mut transport).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`config`] - Startup configuration and the redacted credential
//! - [`escalation`] - Tool catalog, dispatcher and the escalation HTTP client
//! - [`mcp`] - JSON-RPC types, stdio transport and the request loop
//! - [`error`] - Crate-level error type
//! - [`telemetry`] - `tracing` subscriber setup (stderr and optional file)
//! - [`utils`] - Credential redaction helpers

pub mod config;
pub mod error;
pub mod escalation;
pub mod mcp;
pub mod telemetry;
pub mod utils;

pub use error::{HitlError, Result};
