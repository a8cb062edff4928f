//! Content projection for multi-record results
//!
//! Rich text and block fields dominate the size of most documents. Listings
//! omit them by default; callers opt back in with `includeContent` or by
//! naming the fields they want.

use serde_json::{Map, Value};

/// Field names treated as large payloads, matched at any depth
pub const LARGE_CONTENT_FIELDS: &[&str] = &[
    "content",
    "body",
    "blocks",
    "richText",
    "rich_text",
    "html",
    "markdown",
];

/// Attached to listings whenever large fields were omitted
pub const CONTENT_OMITTED_NOTE: &str = "Large content fields (content, body, blocks, richText, html, markdown) are omitted from listings. Set includeContent: true or pass explicit fields to retrieve them.";

/// When to strip large fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPolicy {
    pub include_content: bool,
    pub explicit_fields: bool,
}

impl ProjectionPolicy {
    pub fn new(include_content: bool, explicit_fields: bool) -> Self {
        Self {
            include_content,
            explicit_fields,
        }
    }

    /// Explicit field selection already bounds the output
    pub fn strips(&self) -> bool {
        !self.include_content && !self.explicit_fields
    }
}

/// Apply `policy` to a record or a sequence of records
pub fn project(value: Value, policy: ProjectionPolicy) -> Value {
    if policy.strips() {
        strip_large_fields(value)
    } else {
        value
    }
}

/// Remove every [`LARGE_CONTENT_FIELDS`] key from every nested object
pub fn strip_large_fields(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| !is_large_field(key))
                .map(|(key, value)| (key, strip_large_fields(value)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_large_fields).collect()),
        other => other,
    }
}

pub fn is_large_field(key: &str) -> bool {
    LARGE_CONTENT_FIELDS.contains(&key)
}
