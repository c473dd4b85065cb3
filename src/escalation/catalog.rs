//! Static tool catalog

use serde_json::{json, Value};
use std::sync::OnceLock;

use super::operation::Operation;
use crate::mcp::types::Tool;

/// The six escalation tools, in catalog order
///
/// Built once and returned unchanged for the life of the process.
pub fn tool_catalog() -> &'static [Tool] {
    static CATALOG: OnceLock<Vec<Tool>> = OnceLock::new();
    CATALOG.get_or_init(|| Operation::ALL.into_iter().map(descriptor).collect())
}

fn descriptor(operation: Operation) -> Tool {
    let (description, input_schema) = match operation {
        Operation::Create => (
            "Create a new HITL escalation request",
            json!({
                "type": "object",
                "properties": {
                    "session_id": {
                        "type": "string",
                        "description": "Session identifier for the escalation"
                    },
                    "agent_id": {
                        "type": "string",
                        "description": "Agent identifier that is requesting escalation"
                    },
                    "user_prompt": {
                        "type": "string",
                        "description": "The user prompt that triggered the escalation"
                    },
                    "proposed_action": {
                        "type": "object",
                        "description": "The action that the agent wants to perform",
                        "properties": action_properties()
                    },
                    "escalate_to": {
                        "type": "object",
                        "description": "Who to escalate to",
                        "properties": {
                            "type": { "type": "string", "enum": ["user"] },
                            "target_id": { "type": "string" }
                        },
                        "required": ["type", "target_id"]
                    },
                    "priority": {
                        "type": "string",
                        "enum": ["low", "normal", "high"],
                        "description": "Priority level of the escalation"
                    },
                    "webhookurl": {
                        "type": "string",
                        "description": "Webhook URL for status updates (optional)"
                    },
                    "webhookverificationtoken": {
                        "type": "string",
                        "description": "Webhook verification token (optional)"
                    }
                },
                "required": [
                    "session_id",
                    "agent_id",
                    "user_prompt",
                    "proposed_action",
                    "escalate_to",
                    "priority"
                ]
            }),
        ),
        Operation::Approve => (
            "Approve a HITL escalation",
            json!({
                "type": "object",
                "properties": {
                    "escalation_id": {
                        "type": "string",
                        "description": "The ID of the escalation to approve"
                    },
                    "comments": {
                        "type": "string",
                        "description": "Optional comments for the approval"
                    }
                },
                "required": ["escalation_id"]
            }),
        ),
        Operation::Modify => (
            "Modify a HITL escalation with new action",
            json!({
                "type": "object",
                "properties": {
                    "escalation_id": {
                        "type": "string",
                        "description": "The ID of the escalation to modify"
                    },
                    "modified_action": {
                        "type": "object",
                        "description": "The modified action to replace the original",
                        "properties": action_properties()
                    },
                    "comments": {
                        "type": "string",
                        "description": "Comments explaining the modification"
                    }
                },
                "required": ["escalation_id", "modified_action"]
            }),
        ),
        Operation::Reject => (
            "Reject a HITL escalation",
            json!({
                "type": "object",
                "properties": {
                    "escalation_id": {
                        "type": "string",
                        "description": "The ID of the escalation to reject"
                    },
                    "comments": {
                        "type": "string",
                        "description": "Optional comments for the rejection"
                    }
                },
                "required": ["escalation_id"]
            }),
        ),
        Operation::Get => (
            "Get details of a specific HITL escalation",
            json!({
                "type": "object",
                "properties": {
                    "escalation_id": {
                        "type": "string",
                        "description": "The ID of the escalation to retrieve"
                    }
                },
                "required": ["escalation_id"]
            }),
        ),
        Operation::List => (
            "List all HITL escalations for the authenticated user",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
    };

    Tool {
        name: operation.tool_name().to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn action_properties() -> Value {
    json!({
        "type": { "type": "string" },
        "item": { "type": "string" },
        "amount": { "type": "number" }
    })
}
