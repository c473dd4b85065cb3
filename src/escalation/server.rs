//! MCP tool server backed by the escalation client

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};

use super::catalog::tool_catalog;
use super::client::EscalationClient;
use super::error::EscalationError;
use super::operation::{Operation, ToolCall, UnknownTool};
use crate::config::HitlConfig;
use crate::error::HitlError;
use crate::mcp::error::MCPOperationError;
use crate::mcp::server::{MCPServer, MCPServerConfig};
use crate::mcp::types::{CallToolRequest, CallToolResult, ListToolsRequest, ListToolsResult};
use crate::utils::logging::redact_secret;

/// Serves the six escalation tools over MCP
pub struct EscalationToolServer {
    client: EscalationClient,
    config: MCPServerConfig,
    redact: String,
}

impl EscalationToolServer {
    pub fn new(config: &HitlConfig) -> Result<Self, HitlError> {
        Ok(Self {
            client: EscalationClient::new(config)?,
            config: config.mcp_server_config(),
            redact: config.api_key.expose().to_string(),
        })
    }

    /// Run one typed call and render the success text
    pub async fn invoke(&self, call: &ToolCall) -> Result<String, EscalationError> {
        let operation = call.operation();
        let body = self.client.execute(call).await?;
        let pretty = render(operation, &body)?;
        Ok(operation.success_text(&pretty))
    }
}

fn render(operation: Operation, body: &Value) -> Result<String, EscalationError> {
    serde_json::to_string_pretty(body)
        .map_err(|e| EscalationError::invalid_response(operation, e.to_string()))
}

#[async_trait]
impl MCPServer for EscalationToolServer {
    async fn list_tools(
        &self,
        _request: ListToolsRequest,
    ) -> Result<ListToolsResult, MCPOperationError> {
        Ok(ListToolsResult {
            tools: tool_catalog().to_vec(),
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequest,
    ) -> Result<CallToolResult, MCPOperationError> {
        let CallToolRequest { name, arguments } = request;

        let operation: Operation = name
            .parse()
            .map_err(|unknown: UnknownTool| MCPOperationError::method_not_found(unknown.to_string()))?;

        let outcome = match ToolCall::from_arguments(operation, arguments) {
            Ok(call) => self.invoke(&call).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(text) => {
                info!(tool = %name, "Tool call completed");
                Ok(CallToolResult::text(text))
            }
            Err(e) => {
                error!(
                    tool = %name,
                    status = ?e.status(),
                    "Error in {}: {}",
                    name,
                    redact_secret(&e.to_string(), &self.redact)
                );
                Err(MCPOperationError::internal(format!(
                    "Failed to execute {}: {}",
                    name, e
                )))
            }
        }
    }

    fn config(&self) -> &MCPServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::types::MCPError;
    use serde_json::json;

    fn server() -> EscalationToolServer {
        let config = HitlConfig::new("amp_test_key").with_base_url("http://127.0.0.1:9");
        EscalationToolServer::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_list_tools_returns_catalog() {
        let result = server().list_tools(ListToolsRequest::default()).await.unwrap();
        assert_eq!(result.tools.len(), 6);
        assert_eq!(result.tools[5].name, "list_hitls");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found() {
        let err = server()
            .call_tool(CallToolRequest {
                name: "delete_hitl".to_string(),
                arguments: None,
            })
            .await
            .unwrap_err();
        let mcp = err.to_mcp_error();
        assert_eq!(mcp.code, MCPError::METHOD_NOT_FOUND);
        assert_eq!(mcp.message, "Unknown tool: delete_hitl");
    }

    #[tokio::test]
    async fn test_missing_id_is_internal_error() {
        let err = server()
            .call_tool(CallToolRequest {
                name: "get_hitl".to_string(),
                arguments: Some(json!({})),
            })
            .await
            .unwrap_err();
        let mcp = err.to_mcp_error();
        assert_eq!(mcp.code, MCPError::INTERNAL_ERROR);
        assert_eq!(
            mcp.message,
            "Failed to execute get_hitl: Failed to get HITL: escalation_id is required"
        );
    }

    #[test]
    fn test_render_pretty_keeps_key_order() {
        let body: Value = serde_json::from_str(r#"{"z":1,"a":{"b":[1,2]}}"#).unwrap();
        assert_eq!(
            render(Operation::Get, &body).unwrap(),
            "{\n  \"z\": 1,\n  \"a\": {\n    \"b\": [\n      1,\n      2\n    ]\n  }\n}"
        );
    }
}
