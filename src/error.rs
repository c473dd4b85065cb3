//! Crate-level error type
//!
//! Each layer has its own error enum ([`ConfigError`], [`MCPOperationError`],
//! [`EscalationError`]). [`HitlError`] unifies them for startup code and the
//! binary entry point.

use thiserror::Error;

use crate::config::ConfigError;
use crate::escalation::EscalationError;
use crate::mcp::error::MCPOperationError;

/// Main error type for the HITL server
#[derive(Error, Debug)]
pub enum HitlError {
    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The logging system could not be installed
    #[error("Logging error: {message}")]
    Logging { message: String },

    /// The outbound HTTP client could not be built
    #[error("HTTP client error: {message}")]
    HttpClient { message: String },

    /// MCP transport or protocol failure
    #[error("Protocol error: {0}")]
    Protocol(#[from] MCPOperationError),

    /// An escalation call failed
    #[error(transparent)]
    Escalation(#[from] EscalationError),
}

impl HitlError {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn http_client(message: impl Into<String>) -> Self {
        Self::HttpClient {
            message: message.into(),
        }
    }

    /// Whether the process should treat this as a missing-credential startup failure
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::Config(ConfigError::MissingCredential { .. }))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, HitlError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::Operation;

    #[test]
    fn test_error_display() {
        let err = HitlError::logging("directory not writable");
        assert_eq!(err.to_string(), "Logging error: directory not writable");

        let err: HitlError = ConfigError::MissingCredential {
            var: "AGENTMP_API_KEY",
        }
        .into();
        assert!(err.is_missing_credential());
        assert_eq!(
            err.to_string(),
            "Configuration error: AGENTMP_API_KEY environment variable is required"
        );
    }

    #[test]
    fn test_escalation_is_transparent() {
        let err: HitlError = EscalationError::upstream(Operation::Get, 404, "not found").into();
        assert_eq!(err.to_string(), "Failed to get HITL: not found");
        assert!(!err.is_missing_credential());
    }
}
