//! Gateway bootstrap from on-disk catalogs and configuration

mod common;

use anyhow::Result;
use common::{catalog, initialize_request, tool_call, ARTICLE};
use content_mcp_core::db::{
    CatalogError, MemoryDocumentStore, MemoryUploadProvider, SchemaRegistry, StaticSchemaRegistry,
};
use content_mcp_core::mcp::serve_lines;
use content_mcp_core::services::{GatewayCollaborators, McpServerService};
use content_mcp_core::{ConfigError, GatewayConfig, LogLevel, McpLogger};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

fn collaborators(registry: StaticSchemaRegistry) -> GatewayCollaborators {
    GatewayCollaborators::new(
        Arc::new(registry),
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(MemoryUploadProvider::new()),
    )
}

fn write_catalog(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

// ============================================================================
// Catalog loading
// ============================================================================

#[test]
fn test_catalog_loads_from_disk() -> Result<()> {
    let file = write_catalog(&catalog().to_string())?;

    let registry = StaticSchemaRegistry::from_path(file.path())?;

    assert!(registry.content_type(ARTICLE).is_some());
    assert_eq!(registry.components().len(), 3);
    assert_eq!(
        registry.content_type(ARTICLE).unwrap().info.display_name,
        "Article"
    );
    Ok(())
}

#[test]
fn test_catalog_errors_name_the_problem() -> Result<()> {
    let missing = StaticSchemaRegistry::from_path("/nonexistent/catalog.json").unwrap_err();
    assert!(matches!(missing, CatalogError::Io { .. }));
    assert!(missing.to_string().contains("/nonexistent/catalog.json"));

    let file = write_catalog("{ not json")?;
    let invalid = StaticSchemaRegistry::from_path(file.path()).unwrap_err();
    assert!(matches!(invalid, CatalogError::Parse(_)));

    let mismatched = StaticSchemaRegistry::from_json_value(json!({
        "contentTypes": { "api::a.a": { "uid": "api::b.b" } }
    }))
    .unwrap_err();
    assert_eq!(
        mismatched.to_string(),
        "Catalog entry \"api::a.a\" declares mismatched uid \"api::b.b\""
    );
    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_disabled_gateway_does_not_bootstrap() -> Result<()> {
    let config = GatewayConfig::from_json_str(r#"{ "enabled": false }"#)?;

    let service = McpServerService::bootstrap(
        &config,
        collaborators(StaticSchemaRegistry::new()),
        McpLogger::new(config.log_level),
    );

    assert!(service.is_none());
    Ok(())
}

#[test]
fn test_config_rejects_bad_values() {
    let err = GatewayConfig::from_json_str(r#"{ "logLevel": "loud" }"#).unwrap_err();
    assert!(err
        .to_string()
        .contains("Invalid logLevel \"loud\". Must be one of: error, warn, info, debug, trace"));

    let err = GatewayConfig::from_json_str(r#"{ "port": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = GatewayConfig::from_lookup(|name| {
        (name == "CONTENT_MCP_ENABLED").then(|| "maybe".to_string())
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_config_overrides_from_lookup() -> Result<()> {
    let config = GatewayConfig::from_lookup(|name| match name {
        "CONTENT_MCP_LOG_LEVEL" => Some("debug".to_string()),
        "MCP_PORT" => Some("4100".to_string()),
        _ => None,
    })?;

    assert!(config.enabled);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.port, 4100);
    Ok(())
}

// ============================================================================
// stdio
// ============================================================================

#[tokio::test]
async fn test_stdio_session_over_bootstrapped_gateway() -> Result<()> {
    let file = write_catalog(&catalog().to_string())?;
    let registry = StaticSchemaRegistry::from_path(file.path())?;
    let config = GatewayConfig::default();
    let service = McpServerService::bootstrap(&config, collaborators(registry), McpLogger::default())
        .expect("enabled");

    let input = [
        initialize_request(1).to_string(),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }).to_string(),
        tool_call(2, "create", json!({ "uid": ARTICLE, "data": { "title": "Via stdio" } }))
            .to_string(),
        tool_call(3, "find_many", json!({ "uid": ARTICLE })).to_string(),
    ]
    .join("\n");

    let mut output = Vec::new();
    serve_lines(service.sessions(), input.as_bytes(), &mut output).await?;

    let responses: Vec<Value> = String::from_utf8(output)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    let ids: Vec<&Value> = responses.iter().map(|response| &response["id"]).collect();
    assert_eq!(ids, [&json!(1), &json!(2), &json!(3)]);

    let text = responses[2]["result"]["content"][0]["text"].as_str().unwrap();
    let listing: Value = serde_json::from_str(text)?;
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["data"][0]["title"], "Via stdio");

    assert!(service.sessions().is_empty().await);
    Ok(())
}
