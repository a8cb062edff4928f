//! MCP Initialize Handler
//!
//! Handles the MCP initialization handshake and capability discovery.
//! This is the first method called on a new session.

use crate::mcp::types::MCPError;
use serde_json::{json, Value};

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "content-mcp";

/// Supported MCP protocol versions, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Usage notes returned in `instructions`
pub const INSTRUCTIONS: &str = "Call list_content_types first; every document tool takes the content type uid it returns (e.g. 'api::article.article'). \
Components are reusable field groups embedded in content types, and list_components shows their fields by category. \
find_many omits large content fields (content, body, blocks, richText, html, markdown) unless includeContent is true or fields are specified. \
create, update, delete and upload_media modify content, and update and delete require an existing documentId.";

/// Handle MCP initialize request
///
/// Echoes the client's protocol version when supported and advertises the
/// `tools` and `logging` capabilities. Tool schemas are fetched separately
/// through `tools/list`.
///
/// # Errors
///
/// Returns error if:
/// - protocolVersion is missing or not a string
/// - Client requests unsupported protocol version
pub fn handle_initialize(params: Value) -> Result<Value, MCPError> {
    let client_version = params["protocolVersion"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing protocolVersion parameter"))?;

    if !SUPPORTED_PROTOCOL_VERSIONS.contains(&client_version) {
        return Err(MCPError::invalid_request(format!(
            "Unsupported protocol version: {}. Server supports: {:?}",
            client_version, SUPPORTED_PROTOCOL_VERSIONS
        )));
    }

    Ok(json!({
        "protocolVersion": client_version,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        },
        "capabilities": {
            "tools": {
                "listChanged": false
            },
            "logging": {}
        },
        "instructions": INSTRUCTIONS
    }))
}

#[cfg(test)]
#[path = "initialize_test.rs"]
mod initialize_test;
