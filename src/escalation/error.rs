//! Escalation handler failures
//!
//! Each variant keeps the structured cause for logging and tests. `Display`
//! produces the flattened `Failed to <verb> HITL: <message>` text that the
//! dispatcher embeds in the protocol error.

use thiserror::Error;

use super::operation::Operation;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EscalationError {
    /// The service answered with a non-success status
    #[error("{}: {message}", .operation.failure_label())]
    Upstream {
        operation: Operation,
        status: u16,
        message: String,
    },

    /// The request never produced a response
    #[error("{}: {message}", .operation.failure_label())]
    Network { operation: Operation, message: String },

    /// Arguments could not be turned into a request
    #[error("{}: {message}", .operation.failure_label())]
    InvalidArguments { operation: Operation, message: String },

    /// The success body could not be rendered
    #[error("{}: {message}", .operation.failure_label())]
    InvalidResponse { operation: Operation, message: String },
}

impl EscalationError {
    pub fn upstream(operation: Operation, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation,
            status,
            message: message.into(),
        }
    }

    pub fn network(operation: Operation, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    pub fn invalid_arguments(operation: Operation, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation,
            message: message.into(),
        }
    }

    pub fn invalid_response(operation: Operation, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            operation,
            message: message.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Upstream { operation, .. }
            | Self::Network { operation, .. }
            | Self::InvalidArguments { operation, .. }
            | Self::InvalidResponse { operation, .. } => *operation,
        }
    }

    /// HTTP status of an upstream rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The message without the per-operation prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Upstream { message, .. }
            | Self::Network { message, .. }
            | Self::InvalidArguments { message, .. }
            | Self::InvalidResponse { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_display() {
        let err = EscalationError::upstream(Operation::Create, 400, "bad priority");
        assert_eq!(err.to_string(), "Failed to create HITL: bad priority");
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), "bad priority");

        let err = EscalationError::network(Operation::List, "connection refused");
        assert_eq!(err.to_string(), "Failed to list HITLs: connection refused");
        assert_eq!(err.status(), None);
        assert_eq!(err.operation(), Operation::List);
    }
}
