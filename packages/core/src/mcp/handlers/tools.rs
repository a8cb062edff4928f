//! MCP Tools Handler
//!
//! Implements `tools/list` and `tools/call`. The registry is built once from
//! the closed [`ToolName`] enum; dispatch validates the arguments into
//! [`ValidatedArguments`] and matches on the variant, so an unknown name is
//! rejected before any validation or handler logic runs.
//!
//! Every outcome is wrapped in the MCP content envelope. Failures never
//! escape as JSON-RPC errors: they become an error envelope naming the tool.

use crate::db::{DocumentStore, SchemaRegistry, UploadProvider};
use crate::logging::McpLogger;
use crate::mcp::handlers::{catalog, documents, media};
use crate::mcp::schemas::{validate_tool_input, ToolName, ValidatedArguments};
use crate::mcp::types::MCPError;
use crate::models::AuthContext;
use crate::services::{
    ComponentService, ContentTypeService, DocumentService, GatewayError, MediaService, Sanitizer,
};
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

/// Registry entry advertised through `tools/list`
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub tool: ToolName,
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl OperationDescriptor {
    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

static TOOL_REGISTRY: LazyLock<Vec<OperationDescriptor>> = LazyLock::new(|| {
    ToolName::ALL
        .into_iter()
        .map(|tool| OperationDescriptor {
            tool,
            name: tool.as_str(),
            description: tool.description(),
            input_schema: tool.input_schema(),
        })
        .collect()
});

/// All registered tools in advertised order
pub fn tool_registry() -> &'static [OperationDescriptor] {
    &TOOL_REGISTRY
}

/// Handle `tools/list`
pub fn handle_tools_list(_params: Value) -> Result<Value, MCPError> {
    let tools: Vec<Value> = tool_registry().iter().map(OperationDescriptor::to_json).collect();
    Ok(json!({ "tools": tools }))
}

/// Handle `tools/call`
///
/// Only a missing `name` is a protocol error; everything past that point is
/// reported inside the returned envelope.
pub async fn handle_tools_call(
    dispatcher: &Dispatcher,
    params: Value,
) -> Result<ToolCallOutcome, MCPError> {
    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| MCPError::invalid_params("Missing 'name' parameter"))?;

    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    Ok(dispatcher.call(tool_name, arguments).await)
}

/// Services the tool handlers are built from
#[derive(Clone)]
pub struct ToolServices {
    pub content_types: ContentTypeService,
    pub components: ComponentService,
    pub documents: DocumentService,
    pub media: MediaService,
    pub sanitizer: Sanitizer,
}

impl ToolServices {
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        store: Arc<dyn DocumentStore>,
        uploads: Arc<dyn UploadProvider>,
        logger: McpLogger,
    ) -> Self {
        Self {
            content_types: ContentTypeService::new(registry.clone()),
            components: ComponentService::new(registry.clone()),
            documents: DocumentService::new(store),
            media: MediaService::new(uploads),
            sanitizer: Sanitizer::new(registry, logger),
        }
    }

    /// Replace the media service, e.g. to inject a configured HTTP client
    pub fn with_media(mut self, media: MediaService) -> Self {
        self.media = media;
        self
    }
}

/// Result of one `tools/call`
#[derive(Debug)]
pub struct ToolCallOutcome {
    pub tool: String,
    pub envelope: Value,
    pub error: Option<GatewayError>,
}

impl ToolCallOutcome {
    fn succeeded(tool: &str, payload: &Value) -> Self {
        Self {
            tool: tool.to_string(),
            envelope: success_envelope(payload),
            error: None,
        }
    }

    fn failed(tool: &str, error: GatewayError) -> Self {
        Self {
            tool: tool.to_string(),
            envelope: error_envelope(tool, &error.to_string()),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Wrap a payload in the MCP text content envelope
pub fn success_envelope(payload: &Value) -> Value {
    json!({
        "content": [{ "type": "text", "text": pretty(payload) }]
    })
}

/// Structured error envelope carrying the tool name
pub fn error_envelope(tool: &str, message: &str) -> Value {
    let body = json!({
        "error": true,
        "message": message,
        "tool": tool,
    });

    json!({
        "content": [{ "type": "text", "text": pretty(&body) }],
        "isError": true
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Routes tool calls to handlers and converts every failure into an envelope
#[derive(Clone)]
pub struct Dispatcher {
    services: ToolServices,
    auth: Option<AuthContext>,
    logger: McpLogger,
}

impl Dispatcher {
    pub fn new(services: ToolServices, logger: McpLogger) -> Self {
        Self {
            services,
            auth: None,
            logger,
        }
    }

    /// Apply a host permission policy to every call
    pub fn with_auth(mut self, auth: Option<AuthContext>) -> Self {
        self.auth = auth;
        self
    }

    pub fn services(&self) -> &ToolServices {
        &self.services
    }

    /// Run one tool call to completion
    pub async fn call(&self, name: &str, arguments: Value) -> ToolCallOutcome {
        let started = Instant::now();

        let result = match ToolName::from_name(name) {
            Some(tool) => self.execute(tool, &arguments).await,
            None => Err(GatewayError::unknown_operation(name)),
        };

        let duration = started.elapsed();
        match result {
            Ok(payload) => {
                self.logger
                    .log_tool_execution(name, &arguments, duration, true, None);
                ToolCallOutcome::succeeded(name, &payload)
            }
            Err(error) => {
                let message = error.to_string();
                self.logger
                    .log_tool_execution(name, &arguments, duration, false, Some(&message));
                ToolCallOutcome::failed(name, error)
            }
        }
    }

    async fn execute(&self, tool: ToolName, arguments: &Value) -> Result<Value, GatewayError> {
        let services = &self.services;
        let auth = self.auth.as_ref();

        match validate_tool_input(tool, arguments)? {
            ValidatedArguments::ListContentTypes => Ok(catalog::list_content_types(services)),
            ValidatedArguments::ListComponents(args) => {
                Ok(catalog::list_components(services, args))
            }
            ValidatedArguments::FindMany(args) => {
                documents::find_many(services, args, auth).await
            }
            ValidatedArguments::FindOne(args) => documents::find_one(services, args, auth).await,
            ValidatedArguments::Create(args) => documents::create(services, args, auth).await,
            ValidatedArguments::Update(args) => documents::update(services, args, auth).await,
            ValidatedArguments::Delete(args) => documents::delete(services, args, auth).await,
            ValidatedArguments::UploadMedia(args) => media::upload_media(services, args).await,
        }
    }
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tools_test;
