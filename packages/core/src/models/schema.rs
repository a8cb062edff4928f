//! Content Schema Types
//!
//! Read-only views over the host platform's schema catalog. Content types
//! describe documents addressable through the gateway; components are
//! reusable field groups embedded inside content types.
//!
//! ## Example Catalog Entry
//!
//! ```json
//! {
//!   "kind": "collectionType",
//!   "info": {
//!     "singularName": "article",
//!     "pluralName": "articles",
//!     "displayName": "Article"
//!   },
//!   "attributes": {
//!     "title": { "type": "string", "required": true },
//!     "internalNotes": { "type": "text", "private": true },
//!     "author": {
//!       "type": "relation",
//!       "relation": "manyToOne",
//!       "target": "api::author.author"
//!     },
//!     "seo": { "type": "component", "component": "shared.seo", "repeatable": false }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Namespace prefix reserved for user-defined content types
pub const USER_NAMESPACE_PREFIX: &str = "api::";

/// Attribute map keyed by field name
pub type Attributes = BTreeMap<String, AttributeDefinition>;

/// Whether a content type holds many documents or exactly one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
    #[default]
    CollectionType,
    SingleType,
}

/// Definition of a single attribute in a content type or component
///
/// Only the keys the gateway acts on are typed; everything else (`required`,
/// `relation`, `repeatable`, `maxLength`, ...) is preserved in `options` so the
/// definition round-trips unchanged through `list_content_types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute type (e.g., "string", "richtext", "relation", "component", "dynamiczone")
    #[serde(rename = "type")]
    pub attribute_type: String,

    /// Private attributes are never returned to callers
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub private: bool,

    /// Target content type uid for relations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Component uid for component attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Allowed component uids for dynamic zones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    /// Remaining attribute options, kept verbatim
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl AttributeDefinition {
    /// Create a plain attribute of the given type
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            private: false,
            target: None,
            component: None,
            components: Vec::new(),
            options: Map::new(),
        }
    }

    pub fn is_password(&self) -> bool {
        self.attribute_type == "password"
    }

    pub fn is_relation(&self) -> bool {
        self.attribute_type == "relation"
    }

    pub fn is_component(&self) -> bool {
        self.attribute_type == "component"
    }

    pub fn is_dynamic_zone(&self) -> bool {
        self.attribute_type == "dynamiczone"
    }

    pub fn is_media(&self) -> bool {
        self.attribute_type == "media"
    }

    /// Attributes whose values live in another record and must be populated
    pub fn is_populatable(&self) -> bool {
        self.is_relation() || self.is_component() || self.is_dynamic_zone() || self.is_media()
    }

    /// Attributes that may never be exposed regardless of permissions
    pub fn is_hidden(&self) -> bool {
        self.private || self.is_password()
    }
}

/// Human-facing naming block of a schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaInfo {
    pub singular_name: String,
    pub plural_name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Raw content type definition as held by the schema registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentTypeSchema {
    pub uid: String,
    pub kind: ContentKind,
    pub info: SchemaInfo,
    pub attributes: Attributes,
    pub global_id: String,
    pub model_name: String,
}

impl ContentTypeSchema {
    /// Whether the uid lies in the user-defined namespace
    pub fn is_user_defined(&self) -> bool {
        self.uid.starts_with(USER_NAMESPACE_PREFIX)
    }
}

/// Raw component definition as held by the schema registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentSchema {
    pub uid: String,
    pub category: String,
    pub info: SchemaInfo,
    pub attributes: Attributes,
}

/// Content type as presented to tool callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeRef {
    pub uid: String,
    #[serde(rename = "apiID")]
    pub api_id: String,
    pub schema: ContentTypeSummary,
    pub global_id: String,
    pub model_name: String,
}

/// Schema block of a [`ContentTypeRef`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeSummary {
    pub singular_name: String,
    pub plural_name: String,
    pub display_name: String,
    pub kind: ContentKind,
    pub attributes: Attributes,
}

impl ContentTypeRef {
    pub fn display_name(&self) -> &str {
        &self.schema.display_name
    }

    pub fn kind(&self) -> ContentKind {
        self.schema.kind
    }
}

impl From<&ContentTypeSchema> for ContentTypeRef {
    fn from(schema: &ContentTypeSchema) -> Self {
        Self {
            uid: schema.uid.clone(),
            api_id: schema.info.singular_name.clone(),
            schema: ContentTypeSummary {
                singular_name: schema.info.singular_name.clone(),
                plural_name: schema.info.plural_name.clone(),
                display_name: schema.info.display_name.clone(),
                kind: schema.kind,
                attributes: schema.attributes.clone(),
            },
            global_id: schema.global_id.clone(),
            model_name: schema.model_name.clone(),
        }
    }
}

/// Component (reusable field group) as presented to tool callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRef {
    pub uid: String,
    pub category: String,
    pub display_name: String,
    pub attributes: Attributes,
}

impl From<&ComponentSchema> for ComponentRef {
    fn from(schema: &ComponentSchema) -> Self {
        Self {
            uid: schema.uid.clone(),
            category: schema.category.clone(),
            display_name: schema.info.display_name.clone(),
            attributes: schema.attributes.clone(),
        }
    }
}
