//! The closed set of escalation operations and their typed invocations

use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::error::EscalationError;
use super::types::{ActionModification, Decision, EscalationId, EscalationRequest};

/// One of the six escalation tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Approve,
    Modify,
    Reject,
    Get,
    List,
}

/// Where an upstream failure body carries its human-readable message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorField {
    /// `{"error": {"message": ...}}`, used by the JSON-RPC endpoint
    Nested,
    /// `{"message": ...}`, used by the resource endpoints
    Flat,
}

impl ErrorField {
    /// Pull the message out of a failure body, if it carries a usable one
    pub fn extract(&self, body: &Value) -> Option<String> {
        let message = match self {
            ErrorField::Nested => body.get("error").and_then(|e| e.get("message")),
            ErrorField::Flat => body.get("message"),
        }?;

        match message {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::String(_) | Value::Null | Value::Bool(false) => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Returned when a tool name is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl fmt::Display for UnknownTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown tool: {}", self.0)
    }
}

impl std::error::Error for UnknownTool {}

impl Operation {
    /// Catalog order
    pub const ALL: [Operation; 6] = [
        Operation::Create,
        Operation::Approve,
        Operation::Modify,
        Operation::Reject,
        Operation::Get,
        Operation::List,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            Operation::Create => "create_hitl",
            Operation::Approve => "approve_hitl",
            Operation::Modify => "modify_hitl",
            Operation::Reject => "reject_hitl",
            Operation::Get => "get_hitl",
            Operation::List => "list_hitls",
        }
    }

    /// JSON-RPC method name for operations sent through the envelope endpoint
    pub fn rpc_method(&self) -> Option<&'static str> {
        match self {
            Operation::Create => Some("hitl.create"),
            Operation::Approve => Some("hitl.approve"),
            Operation::Modify => Some("hitl.modify"),
            Operation::Reject | Operation::Get | Operation::List => None,
        }
    }

    pub fn error_field(&self) -> ErrorField {
        if self.rpc_method().is_some() {
            ErrorField::Nested
        } else {
            ErrorField::Flat
        }
    }

    /// Prefix of every failure message for this operation
    pub fn failure_label(&self) -> &'static str {
        match self {
            Operation::Create => "Failed to create HITL",
            Operation::Approve => "Failed to approve HITL",
            Operation::Modify => "Failed to modify HITL",
            Operation::Reject => "Failed to reject HITL",
            Operation::Get => "Failed to get HITL",
            Operation::List => "Failed to list HITLs",
        }
    }

    /// Text returned to the caller for a successful response
    pub fn success_text(&self, pretty_body: &str) -> String {
        match self {
            Operation::Create => format!(
                "HITL escalation created successfully!\n\nResponse: {}",
                pretty_body
            ),
            Operation::Approve => format!(
                "HITL escalation approved successfully!\n\nResponse: {}",
                pretty_body
            ),
            Operation::Modify => format!(
                "HITL escalation modified successfully!\n\nResponse: {}",
                pretty_body
            ),
            Operation::Reject => format!(
                "HITL escalation rejected successfully!\n\nResponse: {}",
                pretty_body
            ),
            Operation::Get => format!("HITL escalation details:\n\n{}", pretty_body),
            Operation::List => format!("All HITL escalations:\n\n{}", pretty_body),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

impl FromStr for Operation {
    type Err = UnknownTool;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.tool_name() == name)
            .ok_or_else(|| UnknownTool(name.to_string()))
    }
}

/// A fully-resolved tool invocation
///
/// Create, approve and modify forward the caller's arguments verbatim. Reject
/// and get need the escalation id for the URL, so it is extracted up front.
/// Reject comments keep their JSON value; only falsy values are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Create(Map<String, Value>),
    Approve(Map<String, Value>),
    Modify(Map<String, Value>),
    Reject {
        escalation_id: EscalationId,
        comments: Option<Value>,
    },
    Get {
        escalation_id: EscalationId,
    },
    List,
}

impl ToolCall {
    /// Resolve untyped protocol arguments for `operation`
    pub fn from_arguments(
        operation: Operation,
        arguments: Option<Value>,
    ) -> Result<Self, EscalationError> {
        let args = match arguments {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        match operation {
            Operation::Create => Ok(ToolCall::Create(args)),
            Operation::Approve => Ok(ToolCall::Approve(args)),
            Operation::Modify => Ok(ToolCall::Modify(args)),
            Operation::Reject => Ok(ToolCall::Reject {
                escalation_id: required_id(operation, &args)?,
                comments: args.get("comments").and_then(truthy),
            }),
            Operation::Get => Ok(ToolCall::Get {
                escalation_id: required_id(operation, &args)?,
            }),
            Operation::List => Ok(ToolCall::List),
        }
    }

    pub fn create(request: &EscalationRequest) -> Result<Self, EscalationError> {
        Ok(ToolCall::Create(to_map(Operation::Create, request)?))
    }

    pub fn approve(decision: &Decision) -> Result<Self, EscalationError> {
        Ok(ToolCall::Approve(to_map(Operation::Approve, decision)?))
    }

    pub fn modify(modification: &ActionModification) -> Result<Self, EscalationError> {
        Ok(ToolCall::Modify(to_map(Operation::Modify, modification)?))
    }

    pub fn reject(decision: &Decision) -> Self {
        ToolCall::Reject {
            escalation_id: decision.escalation_id.clone(),
            comments: decision
                .comments
                .as_ref()
                .filter(|c| !c.is_empty())
                .map(|c| Value::String(c.clone())),
        }
    }

    pub fn get(escalation_id: EscalationId) -> Self {
        ToolCall::Get { escalation_id }
    }

    pub fn operation(&self) -> Operation {
        match self {
            ToolCall::Create(_) => Operation::Create,
            ToolCall::Approve(_) => Operation::Approve,
            ToolCall::Modify(_) => Operation::Modify,
            ToolCall::Reject { .. } => Operation::Reject,
            ToolCall::Get { .. } => Operation::Get,
            ToolCall::List => Operation::List,
        }
    }
}

fn required_id(
    operation: Operation,
    args: &Map<String, Value>,
) -> Result<EscalationId, EscalationError> {
    match args.get("escalation_id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(EscalationId::new(id.clone())),
        Some(Value::Number(n)) => Ok(EscalationId::new(n.to_string())),
        _ => Err(EscalationError::invalid_arguments(
            operation,
            "escalation_id is required",
        )),
    }
}

fn truthy(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.clone()),
    }
}

fn to_map<T: serde::Serialize>(
    operation: Operation,
    value: &T,
) -> Result<Map<String, Value>, EscalationError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(EscalationError::invalid_arguments(
            operation,
            "arguments must serialize to an object",
        )),
        Err(e) => Err(EscalationError::invalid_arguments(operation, e.to_string())),
    }
}
