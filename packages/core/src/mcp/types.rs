//! JSON-RPC 2.0 message types for the MCP protocol
//!
//! Requests carry an `id` (number or string) and expect a response;
//! notifications carry none and are never answered.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const JSONRPC_VERSION: &str = "2.0";

// Standard JSON-RPC error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Transport-level codes (server error range)
pub const SERVER_UNAVAILABLE: i32 = -32000;
pub const SESSION_NOT_FOUND: i32 = -32001;

fn jsonrpc_version<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let version = String::deserialize(deserializer)?;
    if version == JSONRPC_VERSION {
        Ok(version)
    } else {
        Err(serde::de::Error::custom(format!(
            "unsupported jsonrpc version: {}",
            version
        )))
    }
}

/// JSON-RPC request (expects a response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPRequest {
    #[serde(deserialize_with = "jsonrpc_version")]
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC notification (no id, no response)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MCPNotification {
    #[serde(deserialize_with = "jsonrpc_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl MCPNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Any inbound client message
#[derive(Debug, Clone)]
pub enum MCPMessage {
    Request(MCPRequest),
    Notification(MCPNotification),
}

impl MCPMessage {
    /// Classify a parsed JSON body by the presence of `id`
    pub fn from_value(value: Value) -> Result<Self, MCPError> {
        let is_request = value.get("id").is_some();

        if is_request {
            serde_json::from_value(value)
                .map(MCPMessage::Request)
                .map_err(|e| MCPError::invalid_request(format!("Invalid request: {}", e)))
        } else {
            serde_json::from_value(value)
                .map(MCPMessage::Notification)
                .map_err(|e| MCPError::invalid_request(format!("Invalid notification: {}", e)))
        }
    }

    pub fn method(&self) -> &str {
        match self {
            MCPMessage::Request(request) => &request.method,
            MCPMessage::Notification(notification) => &notification.method,
        }
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, error: MCPError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl MCPError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn session_not_found(session_id: &str) -> Self {
        Self::new(SESSION_NOT_FOUND, format!("Session not found: {}", session_id))
    }

    pub fn server_unavailable(message: impl Into<String>) -> Self {
        Self::new(SERVER_UNAVAILABLE, message)
    }
}

impl fmt::Display for MCPError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

impl std::error::Error for MCPError {}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
