//! Development MCP Server
//!
//! Standalone content gateway over in-memory collaborators, for trying the
//! tools from an MCP client without a CMS host.
//!
//! Architecture:
//!   AI Agent → HTTP (port 3100) /mcp → McpServerService → MemoryDocumentStore
//!   AI Agent → stdio               → McpServerService → MemoryDocumentStore
//!
//! # Usage
//!
//! ```bash
//! # HTTP on MCP_PORT (default 3100) with the built-in demo catalog
//! cargo run --bin dev-mcp
//!
//! # stdio, with a custom catalog
//! MCP_TRANSPORT=stdio CONTENT_MCP_CATALOG=./catalog.json cargo run --bin dev-mcp
//! ```
//!
//! # Environment
//!
//! - `CONTENT_MCP_ENABLED`, `CONTENT_MCP_LOG_LEVEL`, `MCP_PORT` - gateway config
//! - `CONTENT_MCP_CATALOG` - catalog JSON (`contentTypes`, `components`, and
//!   optional seed `documents` keyed by uid)
//! - `MCP_TRANSPORT` - `http` (default) or `stdio`
//!
//! Status lines go to stderr so the stdio transport keeps stdout to itself.

use anyhow::Context;
use content_mcp_core::db::{MemoryDocumentStore, MemoryUploadProvider, StaticSchemaRegistry};
use content_mcp_core::logging::init_tracing;
use content_mcp_core::services::{GatewayCollaborators, McpServerService, McpTransport};
use content_mcp_core::{GatewayConfig, McpLogger};
use serde_json::Value;
use std::sync::Arc;

const DEMO_CATALOG: &str = include_str!("../../catalog/demo.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env()?;
    init_tracing(config.log_level);
    let logger = McpLogger::new(config.log_level);

    eprintln!("🔧 Initializing dev-mcp (content gateway over an in-memory store)...");

    let catalog: Value = match std::env::var("CONTENT_MCP_CATALOG") {
        Ok(path) => {
            eprintln!("📂 Loading catalog from {}", path);
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read catalog {}", path))?;
            serde_json::from_str(&json).with_context(|| format!("Invalid catalog {}", path))?
        }
        Err(_) => {
            eprintln!("📂 Using built-in demo catalog");
            serde_json::from_str(DEMO_CATALOG)?
        }
    };

    let registry = StaticSchemaRegistry::from_json_value(catalog.clone())?;
    let store = MemoryDocumentStore::new();
    let seeded = seed_documents(&store, &catalog).await?;
    eprintln!("✅ Catalog loaded, {} documents seeded", seeded);

    let collaborators = GatewayCollaborators::new(
        Arc::new(registry),
        Arc::new(store),
        Arc::new(MemoryUploadProvider::new()),
    );

    let Some(gateway) = McpServerService::bootstrap(&config, collaborators, logger) else {
        eprintln!("⏸️  Gateway disabled (CONTENT_MCP_ENABLED=false), exiting");
        return Ok(());
    };

    let transport = match std::env::var("MCP_TRANSPORT").as_deref() {
        Ok("stdio") => McpTransport::Stdio,
        _ => McpTransport::Http {
            port: gateway.port(),
        },
    };

    eprintln!("\n🚀 Starting MCP server...");
    match transport {
        McpTransport::Http { port } => {
            eprintln!("   Transport: HTTP");
            eprintln!("\n   AI agents can now connect to: http://127.0.0.1:{}/mcp\n", port);
        }
        McpTransport::Stdio => eprintln!("   Transport: stdio\n"),
    }

    let result = gateway.start(transport).await;
    gateway.destroy().await;
    result
}

/// Seed `documents: { uid: [document, ...] }` into the store
async fn seed_documents(store: &MemoryDocumentStore, catalog: &Value) -> anyhow::Result<usize> {
    let Some(documents) = catalog.get("documents").and_then(Value::as_object) else {
        return Ok(0);
    };

    let mut seeded = 0;
    for (uid, entries) in documents {
        for entry in entries.as_array().into_iter().flatten() {
            store.seed(uid, entry.clone()).await?;
            seeded += 1;
        }
    }

    tracing::debug!("Seeded {} documents", seeded);
    Ok(seeded)
}
