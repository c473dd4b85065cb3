//! Human-in-the-loop escalation tools
//!
//! An escalation asks a human to approve, modify or reject an action an
//! autonomous agent wants to take. This module exposes the remote escalation
//! service as six MCP tools:
//!
//! | Tool | Remote call |
//! |------|-------------|
//! | `create_hitl` | `POST /api/hitl/mcp` (`hitl.create`) |
//! | `approve_hitl` | `POST /api/hitl/mcp` (`hitl.approve`) |
//! | `modify_hitl` | `POST /api/hitl/mcp` (`hitl.modify`) |
//! | `reject_hitl` | `POST /api/hitl/{id}/reject` |
//! | `get_hitl` | `GET /api/hitl/{id}` |
//! | `list_hitls` | `GET /api/hitl` |
//!
//! Typed callers can skip the protocol entirely:
//!
//! ```no_run
//! use hitl_mcp::config::HitlConfig;
//! use hitl_mcp::escalation::{Decision, EscalationToolServer, ToolCall};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let server = EscalationToolServer::new(&HitlConfig::load(None)?)?;
//! let text = server.invoke(&ToolCall::approve(&Decision::new("esc_123"))?).await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod error;
pub mod operation;
pub mod server;
pub mod types;

pub use catalog::tool_catalog;
pub use client::EscalationClient;
pub use error::EscalationError;
pub use operation::{ErrorField, Operation, ToolCall, UnknownTool};
pub use server::EscalationToolServer;
pub use types::{
    ActionModification, Decision, EscalationId, EscalationRequest, EscalationTarget, Priority,
    ProposedAction, TargetType,
};
