//! HTTP client for the remote escalation service
//!
//! Each operation issues exactly one request. No retries, no caching.
//!
//! Create, approve and modify go through the JSON-RPC endpoint
//! `POST {base}/api/hitl/mcp`. Create carries the credential as an
//! `authorization` field inside params and sends no auth header; the other
//! two use a bearer header. Reject, get and list are resource-style calls
//! with a bearer header.

use reqwest::{header, Client, RequestBuilder};
use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

use super::error::EscalationError;
use super::operation::{Operation, ToolCall};
use super::types::EscalationId;
use crate::config::{ApiKey, HitlConfig};
use crate::error::HitlError;

const JSONRPC_PATH: [&str; 3] = ["api", "hitl", "mcp"];
const ENVELOPE_ID: &str = "1";

/// Client bound to one base URL and one credential for its whole life
#[derive(Debug, Clone)]
pub struct EscalationClient {
    http: Client,
    base_url: Url,
    api_key: ApiKey,
}

impl EscalationClient {
    pub fn new(config: &HitlConfig) -> Result<Self, HitlError> {
        let base_url = Url::parse(&config.service.base_url)
            .map_err(|e| HitlError::http_client(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(HitlError::http_client(format!(
                "Base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.service.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| HitlError::http_client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Run a resolved tool call and return the decoded response body
    pub async fn execute(&self, call: &ToolCall) -> Result<Value, EscalationError> {
        match call {
            ToolCall::Create(args) => self.create(args).await,
            ToolCall::Approve(args) => self.approve(args).await,
            ToolCall::Modify(args) => self.modify(args).await,
            ToolCall::Reject {
                escalation_id,
                comments,
            } => self.reject(escalation_id, comments.as_ref()).await,
            ToolCall::Get { escalation_id } => self.get(escalation_id).await,
            ToolCall::List => self.list().await,
        }
    }

    pub async fn create(&self, args: &Map<String, Value>) -> Result<Value, EscalationError> {
        let mut params = args.clone();
        params.insert(
            "authorization".to_string(),
            Value::String(self.api_key.expose().to_string()),
        );
        let request = self
            .http
            .post(self.endpoint(Operation::Create, &JSONRPC_PATH)?)
            .json(&envelope(Operation::Create, params));
        self.send(Operation::Create, request).await
    }

    pub async fn approve(&self, args: &Map<String, Value>) -> Result<Value, EscalationError> {
        self.rpc_with_bearer(Operation::Approve, args).await
    }

    pub async fn modify(&self, args: &Map<String, Value>) -> Result<Value, EscalationError> {
        self.rpc_with_bearer(Operation::Modify, args).await
    }

    pub async fn reject(
        &self,
        escalation_id: &EscalationId,
        comments: Option<&Value>,
    ) -> Result<Value, EscalationError> {
        let url = self.endpoint(
            Operation::Reject,
            &["api", "hitl", escalation_id.as_str(), "reject"],
        )?;
        let request = self
            .authorized(self.http.post(url))
            .json(&json!({ "comments": comments.cloned().unwrap_or_else(|| json!("")) }));
        self.send(Operation::Reject, request).await
    }

    pub async fn get(&self, escalation_id: &EscalationId) -> Result<Value, EscalationError> {
        let url = self.endpoint(Operation::Get, &["api", "hitl", escalation_id.as_str()])?;
        self.send(Operation::Get, self.authorized(self.http.get(url)))
            .await
    }

    pub async fn list(&self) -> Result<Value, EscalationError> {
        let url = self.endpoint(Operation::List, &["api", "hitl"])?;
        self.send(Operation::List, self.authorized(self.http.get(url)))
            .await
    }

    async fn rpc_with_bearer(
        &self,
        operation: Operation,
        args: &Map<String, Value>,
    ) -> Result<Value, EscalationError> {
        let request = self
            .authorized(self.http.post(self.endpoint(operation, &JSONRPC_PATH)?))
            .json(&envelope(operation, args.clone()));
        self.send(operation, request).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(
            header::AUTHORIZATION,
            format!("Bearer {}", self.api_key.expose()),
        )
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, operation: Operation, segments: &[&str]) -> Result<Url, EscalationError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                EscalationError::invalid_arguments(operation, "base URL cannot carry a path")
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
    ) -> Result<Value, EscalationError> {
        let request = request
            .build()
            .map_err(|e| EscalationError::network(operation, e.to_string()))?;
        debug!(
            operation = %operation,
            method = %request.method(),
            url = %request.url(),
            "Sending escalation request"
        );

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| EscalationError::network(operation, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EscalationError::network(operation, e.to_string()))?;
        let payload = decode_body(&body);

        debug!(operation = %operation, status = status.as_u16(), "Escalation response received");

        if status.is_success() {
            Ok(payload)
        } else {
            let message = operation.error_field().extract(&payload).unwrap_or_else(|| {
                format!("Request failed with status code {}", status.as_u16())
            });
            Err(EscalationError::upstream(operation, status.as_u16(), message))
        }
    }
}

fn envelope(operation: Operation, params: Map<String, Value>) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": ENVELOPE_ID,
        "method": operation.rpc_method(),
        "params": params,
    })
}

/// JSON bodies decode as-is; anything else is kept as a string
fn decode_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
