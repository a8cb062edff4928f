//! Shared fixtures for the integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use content_mcp_core::db::{
    DocumentStore, MemoryDocumentStore, MemoryUploadProvider, StaticSchemaRegistry, StoreQuery,
};
use content_mcp_core::logging::McpLogger;
use content_mcp_core::mcp::handlers::{Dispatcher, ToolServices};
use content_mcp_core::models::{DeleteResult, FindOneParams, WriteOptions};
use content_mcp_core::services::{GatewayCollaborators, McpServerService};
use content_mcp_core::GatewayConfig;
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

pub const ARTICLE: &str = "api::article.article";
pub const AUTHOR: &str = "api::author.author";

pub fn catalog() -> Value {
    json!({
        "contentTypes": {
            "api::article.article": {
                "kind": "collectionType",
                "info": { "singularName": "article", "pluralName": "articles", "displayName": "Article" },
                "attributes": {
                    "title": { "type": "string" },
                    "summary": { "type": "text" },
                    "views": { "type": "integer" },
                    "content": { "type": "richtext" },
                    "body": { "type": "blocks" },
                    "internalNotes": { "type": "text", "private": true },
                    "author": { "type": "relation", "relation": "manyToOne", "target": "api::author.author" },
                    "seo": { "type": "component", "component": "shared.seo" },
                    "sections": { "type": "dynamiczone", "components": ["blocks.hero"] }
                }
            },
            "api::author.author": {
                "kind": "collectionType",
                "info": { "singularName": "author", "pluralName": "authors", "displayName": "Author" },
                "attributes": {
                    "name": { "type": "string" },
                    "email": { "type": "email", "private": true },
                    "password": { "type": "password" }
                }
            },
            "api::homepage.homepage": {
                "kind": "singleType",
                "info": { "singularName": "homepage", "pluralName": "homepages", "displayName": "Homepage" },
                "attributes": { "headline": { "type": "string" } }
            },
            "plugin::users-permissions.user": {
                "kind": "collectionType",
                "info": { "singularName": "user", "pluralName": "users", "displayName": "User" },
                "attributes": { "username": { "type": "string" } }
            }
        },
        "components": {
            "shared.seo": {
                "category": "shared",
                "info": { "displayName": "Seo" },
                "attributes": {
                    "metaTitle": { "type": "string" },
                    "markdown": { "type": "text" }
                }
            },
            "blocks.hero": {
                "category": "blocks",
                "info": { "displayName": "Hero" },
                "attributes": {
                    "heading": { "type": "string" },
                    "html": { "type": "text" }
                }
            },
            "blocks.quote": {
                "category": "blocks",
                "info": { "displayName": "Quote" },
                "attributes": { "text": { "type": "text" } }
            }
        }
    })
}

pub fn registry() -> Arc<StaticSchemaRegistry> {
    Arc::new(StaticSchemaRegistry::from_json_value(catalog()).unwrap())
}

/// Document store that records every call and can corrupt reads
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryDocumentStore,
    calls: Mutex<Vec<&'static str>>,
    corrupt_reads: bool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return scalar records from `find_many`, which no sanitizer can accept
    pub fn corrupting() -> Self {
        Self {
            corrupt_reads: true,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &MemoryDocumentStore {
        &self.inner
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(**call, "create" | "update" | "delete"))
            .count()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn find_many(&self, uid: &str, query: StoreQuery) -> Result<Vec<Value>> {
        self.record("find_many");
        if self.corrupt_reads {
            return Ok(vec![json!("not-a-record")]);
        }
        self.inner.find_many(uid, query).await
    }

    async fn find_one(
        &self,
        uid: &str,
        document_id: &str,
        params: FindOneParams,
    ) -> Result<Option<Value>> {
        self.record("find_one");
        self.inner.find_one(uid, document_id, params).await
    }

    async fn create(&self, uid: &str, data: Map<String, Value>, options: WriteOptions) -> Result<Value> {
        self.record("create");
        self.inner.create(uid, data, options).await
    }

    async fn update(
        &self,
        uid: &str,
        document_id: &str,
        data: Map<String, Value>,
        options: WriteOptions,
    ) -> Result<Value> {
        self.record("update");
        self.inner.update(uid, document_id, data, options).await
    }

    async fn delete(
        &self,
        uid: &str,
        document_id: &str,
        locale: Option<String>,
    ) -> Result<DeleteResult> {
        self.record("delete");
        self.inner.delete(uid, document_id, locale).await
    }

    async fn count(&self, uid: &str, filters: Option<Map<String, Value>>) -> Result<u64> {
        self.record("count");
        self.inner.count(uid, filters).await
    }
}

/// Gateway services over the fixture catalog
pub struct TestGateway {
    pub store: Arc<CountingStore>,
    pub uploads: Arc<MemoryUploadProvider>,
    pub dispatcher: Dispatcher,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::with_store(CountingStore::new())
    }

    pub fn with_store(store: CountingStore) -> Self {
        let store = Arc::new(store);
        let uploads = Arc::new(MemoryUploadProvider::new());
        let logger = McpLogger::default();
        let services = ToolServices::new(registry(), store.clone(), uploads.clone(), logger);

        Self {
            store,
            uploads,
            dispatcher: Dispatcher::new(services, logger),
        }
    }

    /// Call a tool and decode the envelope text
    pub async fn call(&self, tool: &str, arguments: Value) -> (Value, bool) {
        let outcome = self.dispatcher.call(tool, arguments).await;
        (envelope_body(&outcome.envelope), outcome.is_error())
    }

    pub async fn seed_article(&self, document: Value) -> Value {
        self.store.inner().seed(ARTICLE, document).await.unwrap()
    }
}

pub fn envelope_body(envelope: &Value) -> Value {
    let text = envelope["content"][0]["text"]
        .as_str()
        .expect("envelope carries text content");
    serde_json::from_str(text).expect("envelope text is JSON")
}

/// Whether any object at any depth has one of `keys`
pub fn contains_any_key(value: &Value, keys: &[&str]) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| keys.contains(&key.as_str()) || contains_any_key(value, keys)),
        Value::Array(items) => items.iter().any(|item| contains_any_key(item, keys)),
        _ => false,
    }
}

/// Bootstrapped gateway over the fixture catalog and `store`
pub fn gateway_service(store: Arc<CountingStore>) -> McpServerService {
    let collaborators = GatewayCollaborators::new(
        registry(),
        store,
        Arc::new(MemoryUploadProvider::new()),
    );

    McpServerService::bootstrap(&GatewayConfig::default(), collaborators, McpLogger::default())
        .expect("gateway enabled by default")
}

pub fn initialize_request(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0.0" }
        }
    })
}

pub fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
}
