//! Integration tests for MCP protocol handling.
//!
//! These tests verify the server's JSON-RPC 2.0 protocol implementation,
//! including request/response handling, error responses, and lifecycle
//! behaviour.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use mcp_toolkit::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use mcp_toolkit::mcp::server::{McpServer, MessageSink, ServerInfo};

/// Builds a sink that records every outbound document.
fn capture_sink() -> (MessageSink, Arc<Mutex<Vec<String>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let writer = Arc::clone(&captured);
    let sink: MessageSink = Box::new(move |msg: &str| {
        writer.lock().unwrap().push(msg.to_string());
    });
    (sink, captured)
}

fn responses(captured: &Arc<Mutex<Vec<String>>>) -> Vec<Value> {
    captured
        .lock()
        .unwrap()
        .iter()
        .map(|raw| serde_json::from_str(raw).expect("response is not valid JSON"))
        .collect()
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_list_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/list",
        "params": {}
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, RequestId::Number(2));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_invalid_json() {
    let json = "not valid json";

    let result = parse_message(json);
    assert!(result.is_err());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let result = parse_message(json);
    assert!(result.is_err());
}

// =============================================================================
// Server Round-Trip Tests
// =============================================================================

fn empty_server() -> (McpServer, Arc<Mutex<Vec<String>>>) {
    let (sink, captured) = capture_sink();
    let server = McpServer::new(ServerInfo::new("Round Trip Server", "1.0.0"), sink);
    (server, captured)
}

#[test]
fn test_initialize_round_trip() {
    let (mut server, captured) = empty_server();
    server.parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);

    let responses = responses(&captured);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["jsonrpc"], "2.0");
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "Round Trip Server");
    assert_eq!(responses[0]["result"]["serverInfo"]["version"], "1.0.0");
    assert!(server.is_initialized());
}

#[test]
fn test_initialize_idempotent() {
    let (mut server, captured) = empty_server();
    server.parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
    server.parse_message(r#"{"jsonrpc":"2.0","id":2,"method":"initialize","params":{}}"#);

    let responses = responses(&captured);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["result"], responses[1]["result"]);
    assert!(server.is_initialized());
}

#[test]
fn test_unknown_method_returns_method_not_found() {
    let (mut server, captured) = empty_server();
    server.parse_message(r#"{"jsonrpc":"2.0","id":3,"method":"prompts/list"}"#);

    let responses = responses(&captured);
    assert_eq!(responses[0]["error"]["code"], -32601);
    assert_eq!(responses[0]["id"], 3);
}

#[test]
fn test_malformed_json_returns_parse_error_with_null_id() {
    let (mut server, captured) = empty_server();
    server.parse_message("{");

    let responses = responses(&captured);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[0]["id"], Value::Null);
}

#[test]
fn test_notification_does_not_invoke_sink() {
    let (mut server, captured) = empty_server();
    server.parse_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
    server.parse_message(r#"{"jsonrpc":"2.0","method":"notifications/cancelled"}"#);

    assert!(captured.lock().unwrap().is_empty());
}

#[test]
fn test_responses_emitted_in_request_order() {
    let (mut server, captured) = empty_server();
    server.parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
    server.parse_message(r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
    server.parse_message(r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#);

    let ids: Vec<i64> = responses(&captured)
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[test]
fn test_every_response_is_well_formed_jsonrpc() {
    let (mut server, captured) = empty_server();
    let inputs = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        r#"{"jsonrpc":"2.0","id":3,"method":"nope"}"#,
        "garbage",
    ];
    for input in inputs {
        server.parse_message(input);
    }

    for response in responses(&captured) {
        assert_eq!(response["jsonrpc"], "2.0");
        assert!(response.get("id").is_some());
        assert!(
            response.get("result").is_some() || response.get("error").is_some(),
            "response carries neither result nor error: {response}"
        );
    }
}

#[test]
fn test_string_id_echoed() {
    let (mut server, captured) = empty_server();
    server.parse_message(r#"{"jsonrpc":"2.0","id":"req-7","method":"ping"}"#);

    let responses = responses(&captured);
    assert_eq!(responses[0]["id"], "req-7");
}
