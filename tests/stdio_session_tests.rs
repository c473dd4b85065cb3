//! Full MCP sessions over an in-memory stdio pipe

use hitl_mcp::config::HitlConfig;
use hitl_mcp::escalation::EscalationToolServer;
use hitl_mcp::mcp::{MCPServerHandler, StdioServerTransport};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Feed `input` to a fresh server and collect every line it writes
async fn run_session(base_url: &str, input: impl AsRef<[u8]>) -> Vec<Value> {
    let config = HitlConfig::new("amp_test_key").with_base_url(base_url);
    let handler = MCPServerHandler::new(Arc::new(EscalationToolServer::new(&config).unwrap()));

    let (client_side, server_side) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let (client_read, mut client_write) = tokio::io::split(client_side);

    let serve = tokio::spawn(async move {
        let mut transport = StdioServerTransport::from_handles(server_read, server_write);
        handler.serve(&mut transport).await
    });

    client_write.write_all(input.as_ref()).await.unwrap();
    client_write.shutdown().await.unwrap();

    let mut lines = BufReader::new(client_read).lines();
    let mut responses = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        responses.push(serde_json::from_str(&line).unwrap());
    }

    serve.await.unwrap().unwrap();
    responses
}

fn lines(messages: &[Value]) -> String {
    messages
        .iter()
        .map(|m| format!("{}\n", m))
        .collect::<String>()
}

#[tokio::test]
async fn test_handshake_and_list_tools() {
    let input = lines(&[
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test-client", "version": "0.1.0"}
            }
        }),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list", "params": {}}),
    ]);

    let responses = run_session("http://127.0.0.1:1", &input).await;
    assert_eq!(responses.len(), 3);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(responses[0]["result"]["capabilities"], json!({"tools": {}}));
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "hitl-mcp-server");

    let tools = responses[1]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(
        names,
        vec!["create_hitl", "approve_hitl", "modify_hitl", "reject_hitl", "get_hitl", "list_hitls"]
    );
    assert!(tools[0]["inputSchema"].is_object());

    assert_eq!(responses[1]["result"], responses[2]["result"]);
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hitl/esc_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "esc_1"})))
        .expect(1)
        .mount(&mock)
        .await;

    let input = lines(&[json!({
        "jsonrpc": "2.0",
        "id": "call-1",
        "method": "tools/call",
        "params": {"name": "get_hitl", "arguments": {"escalation_id": "esc_1"}}
    })]);

    let responses = run_session(&mock.uri(), &input).await;
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["id"], "call-1");
    assert_eq!(
        responses[0]["result"]["content"],
        json!([{"type": "text", "text": "HITL escalation details:\n\n{\n  \"id\": \"esc_1\"\n}"}])
    );
}

#[tokio::test]
async fn test_errors_keep_session_alive() {
    let input = format!(
        "{}\n{}\n{}\n{}\n",
        "this is not json",
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "delete_hitl", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
    );

    let responses = run_session("http://127.0.0.1:1", &input).await;
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], -32700);

    assert_eq!(responses[1]["id"], 1);
    assert_eq!(responses[1]["error"]["code"], -32601);
    assert_eq!(responses[1]["error"]["message"], "Unknown tool: delete_hitl");

    assert_eq!(responses[2]["error"]["code"], -32601);
    assert_eq!(responses[2]["error"]["message"], "Method not found: resources/list");

    assert_eq!(responses[3], json!({"jsonrpc": "2.0", "id": 3, "result": {}}));
}

#[tokio::test]
async fn test_undecodable_bytes_do_not_end_session() {
    let mut input = Vec::new();
    input.extend_from_slice(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string().as_bytes());
    input.extend_from_slice(b"\n\xff\xfe\n");
    input.extend_from_slice(json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}).to_string().as_bytes());
    input.push(b'\n');

    let responses = run_session("http://127.0.0.1:1", &input).await;
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["id"], Value::Null);
    assert_eq!(responses[1]["error"]["code"], -32700);
    assert_eq!(responses[2], json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
}

#[tokio::test]
async fn test_every_request_answered_before_serve_returns() {
    let config = HitlConfig::new("amp_test_key").with_base_url("http://127.0.0.1:1");
    let handler = MCPServerHandler::new(Arc::new(EscalationToolServer::new(&config).unwrap()));

    let (client_side, server_side) = tokio::io::duplex(1024 * 1024);
    let (server_read, server_write) = tokio::io::split(server_side);
    let (client_read, mut client_write) = tokio::io::split(client_side);

    let requests: Vec<Value> = (0..40)
        .map(|id| json!({"jsonrpc": "2.0", "id": id, "method": "tools/list"}))
        .collect();
    client_write.write_all(lines(&requests).as_bytes()).await.unwrap();
    client_write.shutdown().await.unwrap();

    // Output is only read once serving has finished
    let mut transport = StdioServerTransport::from_handles(server_read, server_write);
    handler.serve(&mut transport).await.unwrap();

    let mut reader = BufReader::new(client_read).lines();
    let mut ids = Vec::new();
    while let Some(line) = reader.next_line().await.unwrap() {
        let response: Value = serde_json::from_str(&line).unwrap();
        ids.push(response["id"].as_i64().unwrap());
    }
    assert_eq!(ids, (0..40).collect::<Vec<i64>>());
}
