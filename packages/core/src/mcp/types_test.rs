//! Tests for MCP types module
//!
//! Verifies JSON-RPC 2.0 request/response parsing and error handling.

use super::*;
use serde_json::json;

#[test]
fn test_parse_valid_request() {
    let json_str = r#"{
        "jsonrpc": "2.0",
        "id": 123,
        "method": "tools/call",
        "params": {
            "name": "find_many",
            "arguments": {"uid": "api::article.article"}
        }
    }"#;

    let request: MCPRequest = serde_json::from_str(json_str).unwrap();

    assert_eq!(request.jsonrpc, "2.0");
    assert_eq!(request.id, json!(123));
    assert_eq!(request.method, "tools/call");
    assert_eq!(request.params["arguments"]["uid"], "api::article.article");
}

#[test]
fn test_parse_request_with_string_id() {
    let request: MCPRequest =
        serde_json::from_str(r#"{"jsonrpc": "2.0", "id": "req-7", "method": "ping"}"#).unwrap();

    assert_eq!(request.id, json!("req-7"));
    assert!(request.params.is_null());
}

#[test]
fn test_parse_request_missing_jsonrpc() {
    let result: Result<MCPRequest, _> =
        serde_json::from_str(r#"{"id": 1, "method": "ping", "params": {}}"#);
    assert!(result.is_err());
}

#[test]
fn test_request_without_id_should_fail() {
    let result: Result<MCPRequest, _> =
        serde_json::from_str(r#"{"jsonrpc": "2.0", "method": "tools/list", "params": {}}"#);
    assert!(result.is_err());
}

#[test]
fn test_serialize_success_response() {
    let response = MCPResponse::success(json!(42), json!({"tools": []}));

    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["id"], 42);
    assert!(json["result"]["tools"].is_array());
    assert!(json.get("error").is_none());
}

#[test]
fn test_serialize_error_response() {
    let response = MCPResponse::error(json!("abc"), MCPError::method_not_found("resources/list"));

    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["id"], "abc");
    assert_eq!(json["error"]["code"], METHOD_NOT_FOUND);
    assert_eq!(json["error"]["message"], "Method not found: resources/list");
    assert!(json["error"].get("data").is_none());
    assert!(json.get("result").is_none());
}

#[test]
fn test_error_codes_constants() {
    assert_eq!(PARSE_ERROR, -32700);
    assert_eq!(INVALID_REQUEST, -32600);
    assert_eq!(METHOD_NOT_FOUND, -32601);
    assert_eq!(INVALID_PARAMS, -32602);
    assert_eq!(INTERNAL_ERROR, -32603);

    assert_eq!(SERVER_UNAVAILABLE, -32000);
    assert_eq!(SESSION_NOT_FOUND, -32001);
}

#[test]
fn test_mcp_error_helper_methods() {
    assert_eq!(MCPError::parse_error("Invalid JSON").code, PARSE_ERROR);
    assert_eq!(MCPError::invalid_params("Missing field").code, INVALID_PARAMS);
    assert_eq!(MCPError::internal_error("boom").code, INTERNAL_ERROR);

    let missing = MCPError::session_not_found("s-1");
    assert_eq!(missing.code, SESSION_NOT_FOUND);
    assert!(missing.message.contains("s-1"));
    assert_eq!(missing.to_string(), "Session not found: s-1 (code: -32001)");
}

// Notification tests

#[test]
fn test_parse_valid_notification() {
    let notification: MCPNotification = serde_json::from_str(
        r#"{"jsonrpc": "2.0", "method": "notifications/initialized", "params": {}}"#,
    )
    .unwrap();

    assert_eq!(notification.method, "notifications/initialized");
    assert!(notification.params.is_object());
}

#[test]
fn test_notification_invalid_jsonrpc_version() {
    let result: Result<MCPNotification, _> =
        serde_json::from_str(r#"{"jsonrpc": "1.0", "method": "notifications/initialized"}"#);
    assert!(result.is_err());
}

#[test]
fn test_notification_with_id_should_be_request() {
    let json_str = r#"{"jsonrpc": "2.0", "id": 123, "method": "initialize", "params": {}}"#;

    let request: Result<MCPRequest, _> = serde_json::from_str(json_str);
    assert!(request.is_ok());

    // deny_unknown_fields rejects 'id'
    let notification: Result<MCPNotification, _> = serde_json::from_str(json_str);
    assert!(notification.is_err());
}

#[test]
fn test_message_classification() {
    let request = MCPMessage::from_value(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})).unwrap();
    assert!(matches!(request, MCPMessage::Request(_)));
    assert_eq!(request.method(), "ping");

    let notification =
        MCPMessage::from_value(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .unwrap();
    assert!(matches!(notification, MCPMessage::Notification(_)));

    let err = MCPMessage::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
    assert_eq!(err.code, INVALID_REQUEST);
}

#[test]
fn test_outbound_notification_shape() {
    let notification = MCPNotification::new("notifications/message", json!({"level": "error"}));
    let json = serde_json::to_value(&notification).unwrap();

    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["method"], "notifications/message");
    assert_eq!(json["params"]["level"], "error");
}
