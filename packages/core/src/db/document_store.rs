//! DocumentStore Trait - Document Persistence Abstraction
//!
//! The gateway treats the document store as an opaque CRUD capability.
//! Filtering, sorting, relation population and draft/publish semantics are
//! the store's concern; the gateway only hands over already-sanitized
//! parameters and receives opaque document records back.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every method is async so network-backed stores fit
//! 2. **Opaque Records**: documents are `serde_json::Value`
//! 3. **Error Handling**: `anyhow::Result`; the facade maps failures to upstream errors

use crate::models::{
    DeleteResult, DocumentStatus, FindOneParams, Populate, QueryPagination, SortSpec, WriteOptions,
};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Fully resolved multi-document query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    pub filters: Option<Map<String, Value>>,
    pub populate: Option<Populate>,
    pub fields: Option<Vec<String>>,
    pub sort: Option<SortSpec>,
    pub pagination: QueryPagination,
    pub status: Option<DocumentStatus>,
    pub locale: Option<String>,
}

/// Document persistence operations
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; calls from different sessions run
/// concurrently.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Query documents of a content type
    async fn find_many(&self, uid: &str, query: StoreQuery) -> Result<Vec<Value>>;

    /// Fetch one document, `None` when absent
    async fn find_one(
        &self,
        uid: &str,
        document_id: &str,
        params: FindOneParams,
    ) -> Result<Option<Value>>;

    /// Create a document and return it
    async fn create(&self, uid: &str, data: Map<String, Value>, options: WriteOptions)
        -> Result<Value>;

    /// Update an existing document and return it
    async fn update(
        &self,
        uid: &str,
        document_id: &str,
        data: Map<String, Value>,
        options: WriteOptions,
    ) -> Result<Value>;

    /// Delete a document (or one locale of it)
    async fn delete(&self, uid: &str, document_id: &str, locale: Option<String>)
        -> Result<DeleteResult>;

    /// Count documents matching `filters`
    async fn count(&self, uid: &str, filters: Option<Map<String, Value>>) -> Result<u64>;
}
