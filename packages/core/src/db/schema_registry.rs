//! SchemaRegistry Trait - Read-Only Schema Catalog
//!
//! The host platform owns content type and component definitions. The gateway
//! only reads them; nothing here mutates the catalog after construction.
//!
//! `StaticSchemaRegistry` loads a catalog document of the form:
//!
//! ```json
//! {
//!   "contentTypes": { "api::article.article": { "kind": "collectionType", "attributes": {} } },
//!   "components": { "shared.seo": { "category": "shared", "attributes": {} } }
//! }
//! ```

use crate::db::CatalogError;
use crate::models::{ComponentSchema, ContentTypeSchema};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only catalog of schemas
pub trait SchemaRegistry: Send + Sync {
    /// Look up any content type, regardless of namespace
    fn content_type(&self, uid: &str) -> Option<&ContentTypeSchema>;

    /// All content types in catalog order
    fn content_types(&self) -> Vec<&ContentTypeSchema>;

    /// Look up a component
    fn component(&self, uid: &str) -> Option<&ComponentSchema>;

    /// All components in catalog order
    fn components(&self) -> Vec<&ComponentSchema>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CatalogDocument {
    content_types: BTreeMap<String, ContentTypeSchema>,
    components: BTreeMap<String, ComponentSchema>,
}

/// Schema registry backed by an immutable in-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaRegistry {
    content_types: BTreeMap<String, ContentTypeSchema>,
    components: BTreeMap<String, ComponentSchema>,
}

impl StaticSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, schema: ContentTypeSchema) -> Self {
        self.content_types.insert(schema.uid.clone(), schema);
        self
    }

    pub fn with_component(mut self, schema: ComponentSchema) -> Self {
        self.components.insert(schema.uid.clone(), schema);
        self
    }

    /// Build from a catalog JSON value; entry keys supply missing uids
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_value(value)?;
        let mut registry = Self::new();

        for (key, mut schema) in document.content_types {
            if schema.uid.is_empty() {
                schema.uid = key.clone();
            } else if schema.uid != key {
                return Err(CatalogError::UidMismatch { key, uid: schema.uid });
            }
            registry = registry.with_content_type(schema);
        }

        for (key, mut schema) in document.components {
            if schema.uid.is_empty() {
                schema.uid = key.clone();
            } else if schema.uid != key {
                return Err(CatalogError::UidMismatch { key, uid: schema.uid });
            }
            registry = registry.with_component(schema);
        }

        Ok(registry)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

impl SchemaRegistry for StaticSchemaRegistry {
    fn content_type(&self, uid: &str) -> Option<&ContentTypeSchema> {
        self.content_types.get(uid)
    }

    fn content_types(&self) -> Vec<&ContentTypeSchema> {
        self.content_types.values().collect()
    }

    fn component(&self, uid: &str) -> Option<&ComponentSchema> {
        self.components.get(uid)
    }

    fn components(&self) -> Vec<&ComponentSchema> {
        self.components.values().collect()
    }
}
