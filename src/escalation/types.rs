//! Typed request shapes for Rust callers
//!
//! The protocol boundary forwards arguments verbatim, so these types are only
//! used when a caller builds a [`ToolCall`](super::ToolCall) in code. Field names
//! and order match the tool schemas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque escalation identifier assigned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EscalationId(String);

impl EscalationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EscalationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the agent wants to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub item: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    User,
}

/// Who the escalation is routed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationTarget {
    #[serde(rename = "type")]
    pub target_type: TargetType,
    pub target_id: String,
}

impl EscalationTarget {
    pub fn user(target_id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::User,
            target_id: target_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Arguments of `create_hitl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRequest {
    pub session_id: String,
    pub agent_id: String,
    pub user_prompt: String,
    pub proposed_action: ProposedAction,
    pub escalate_to: EscalationTarget,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub webhookurl: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub webhookverificationtoken: Option<String>,
}

/// Arguments of `modify_hitl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionModification {
    pub escalation_id: EscalationId,
    pub modified_action: ProposedAction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comments: Option<String>,
}

/// Arguments of `approve_hitl` and `reject_hitl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub escalation_id: EscalationId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comments: Option<String>,
}

impl Decision {
    pub fn new(escalation_id: impl Into<String>) -> Self {
        Self {
            escalation_id: EscalationId::new(escalation_id),
            comments: None,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escalation_request_shape() {
        let request = EscalationRequest {
            session_id: "s1".to_string(),
            agent_id: "a1".to_string(),
            user_prompt: "buy a laptop".to_string(),
            proposed_action: ProposedAction {
                action_type: "purchase".to_string(),
                item: "laptop".to_string(),
                amount: 1299.0,
            },
            escalate_to: EscalationTarget::user("u1"),
            priority: Priority::High,
            webhookurl: None,
            webhookverificationtoken: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "session_id": "s1",
                "agent_id": "a1",
                "user_prompt": "buy a laptop",
                "proposed_action": {"type": "purchase", "item": "laptop", "amount": 1299.0},
                "escalate_to": {"type": "user", "target_id": "u1"},
                "priority": "high"
            })
        );
    }

    #[test]
    fn test_target_type_is_literal_user() {
        let bad: Result<EscalationTarget, _> =
            serde_json::from_value(json!({"type": "team", "target_id": "t"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_decision_builder() {
        let decision = Decision::new("esc_9").with_comments("ok");
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({"escalation_id": "esc_9", "comments": "ok"})
        );
        assert_eq!(decision.escalation_id.to_string(), "esc_9");
    }
}
