//! Document Operation Parameters
//!
//! Typed parameters for reads and writes against the document store. The
//! store's query engine interprets filters, population and sorting; the
//! gateway only shapes and sanitizes them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Publication-state variant of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Published,
}

impl DocumentStatus {
    pub const VALUES: &'static [&'static str] = &["draft", "published"];
}

/// Relation population request
///
/// Accepts `"*"` or a single field name, a list of field names, or a mapping
/// of field name to nested population options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Populate {
    Single(String),
    List(Vec<String>),
    Nested(Map<String, Value>),
}

/// Sort order, either `"field:dir"` or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortSpec {
    Single(String),
    List(Vec<String>),
}

impl SortSpec {
    /// Individual sort entries in priority order
    pub fn entries(&self) -> Vec<&str> {
        match self {
            SortSpec::Single(entry) => vec![entry.as_str()],
            SortSpec::List(entries) => entries.iter().map(String::as_str).collect(),
        }
    }
}

/// Pagination arguments as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PaginationArgs {
    /// Resolve the exclusive pagination mode
    ///
    /// Page mode requires both `page` and `pageSize` and wins over offset
    /// mode. Offset mode applies when either `start` or `limit` is present.
    pub fn resolve(&self) -> QueryPagination {
        match (self.page, self.page_size) {
            (Some(page), Some(page_size)) => QueryPagination::Page { page, page_size },
            _ if self.start.is_some() || self.limit.is_some() => QueryPagination::Offset {
                start: self.start,
                limit: self.limit,
            },
            _ => QueryPagination::Unbounded,
        }
    }
}

/// Pagination constraint handed to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryPagination {
    #[default]
    Unbounded,
    Page {
        page: u32,
        page_size: u32,
    },
    Offset {
        start: Option<u32>,
        limit: Option<u32>,
    },
}

/// Query-shaping parameters constrained by sanitize-query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub filters: Option<Map<String, Value>>,
    pub populate: Option<Populate>,
    pub fields: Option<Vec<String>>,
    pub sort: Option<SortSpec>,
}

impl QueryParams {
    pub fn is_empty(&self) -> bool {
        self.filters.is_none()
            && self.populate.is_none()
            && self.fields.is_none()
            && self.sort.is_none()
    }
}

/// Parameters for multi-document reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindParams {
    pub query: QueryParams,
    pub pagination: Option<PaginationArgs>,
    pub status: Option<DocumentStatus>,
    pub locale: Option<String>,
}

/// Parameters for single-document reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOneParams {
    pub populate: Option<Populate>,
    pub fields: Option<Vec<String>>,
    pub status: Option<DocumentStatus>,
    pub locale: Option<String>,
}

/// Locale and status variant targeted by a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub locale: Option<String>,
    pub status: Option<DocumentStatus>,
}

/// Outcome of a document deletion
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub document_id: String,
    pub entries: Vec<Value>,
}
