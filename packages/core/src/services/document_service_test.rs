//! Tests for the document operations facade

use super::*;
use crate::db::MemoryDocumentStore;
use crate::models::{DocumentStatus, QueryPagination};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;

const ARTICLE: &str = "api::article.article";

/// Store wrapper that records every call before delegating
#[derive(Default)]
struct RecordingStore {
    inner: MemoryDocumentStore,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<StoreQuery>>,
}

impl RecordingStore {
    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn find_many(&self, uid: &str, query: StoreQuery) -> Result<Vec<Value>> {
        self.record("find_many");
        self.queries.lock().unwrap().push(query.clone());
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

    async fn delete(&self, uid: &str, document_id: &str, locale: Option<String>) -> Result<DeleteResult> {
        self.record("delete");
        self.inner.delete(uid, document_id, locale).await
    }

    async fn count(&self, uid: &str, filters: Option<Map<String, Value>>) -> Result<u64> {
        self.record("count");
        self.inner.count(uid, filters).await
    }
}

fn setup() -> (Arc<RecordingStore>, DocumentService) {
    let store = Arc::new(RecordingStore::default());
    let service = DocumentService::new(store.clone());
    (store, service)
}

fn pagination_of(store: &RecordingStore) -> QueryPagination {
    store.queries.lock().unwrap().last().unwrap().pagination
}

#[tokio::test]
async fn test_page_mode_wins_over_offset_mode() {
    let (store, service) = setup();

    let params = FindParams {
        pagination: Some(PaginationArgs {
            page: Some(2),
            page_size: Some(10),
            start: Some(5),
            limit: Some(10),
        }),
        ..Default::default()
    };
    service.find_many(ARTICLE, params).await.unwrap();

    assert_eq!(
        pagination_of(&store),
        QueryPagination::Page { page: 2, page_size: 10 }
    );
}

#[tokio::test]
async fn test_offset_mode_when_page_is_incomplete() {
    let (store, service) = setup();

    let params = FindParams {
        pagination: Some(PaginationArgs {
            page: Some(2),
            limit: Some(10),
            ..Default::default()
        }),
        ..Default::default()
    };
    service.find_many(ARTICLE, params).await.unwrap();

    assert_eq!(
        pagination_of(&store),
        QueryPagination::Offset { start: None, limit: Some(10) }
    );
}

#[tokio::test]
async fn test_no_pagination_constraint_by_default() {
    let (store, service) = setup();

    service.find_many(ARTICLE, FindParams::default()).await.unwrap();
    assert_eq!(pagination_of(&store), QueryPagination::Unbounded);

    let params = FindParams {
        pagination: Some(PaginationArgs {
            page: Some(3),
            ..Default::default()
        }),
        status: Some(DocumentStatus::Published),
        locale: Some("de".to_string()),
        ..Default::default()
    };
    service.find_many(ARTICLE, params).await.unwrap();

    let query = store.queries.lock().unwrap().last().unwrap().clone();
    assert_eq!(query.pagination, QueryPagination::Unbounded);
    assert_eq!(query.status, Some(DocumentStatus::Published));
    assert_eq!(query.locale.as_deref(), Some("de"));
}

#[tokio::test]
async fn test_mutations_require_existing_document() {
    let (store, service) = setup();

    let err = service
        .update(ARTICLE, "missing", Map::new(), WriteOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Document with id \"missing\" not found in \"api::article.article\"."
    );

    let err = service.delete(ARTICLE, "missing", None).await.unwrap_err();
    assert!(matches!(err, GatewayError::DocumentNotFound { .. }));

    assert_eq!(store.calls(), vec!["find_one", "find_one"]);
}

#[tokio::test]
async fn test_existing_document_is_mutated() {
    let (store, service) = setup();

    let mut data = Map::new();
    data.insert("title".to_string(), json!("Draft"));
    let created = service
        .create(ARTICLE, data, WriteOptions::default())
        .await
        .unwrap();
    let document_id = created["documentId"].as_str().unwrap();

    let mut patch = Map::new();
    patch.insert("title".to_string(), json!("Final"));
    let updated = service
        .update(ARTICLE, document_id, patch, WriteOptions::default())
        .await
        .unwrap();
    assert_eq!(updated["title"], "Final");

    let deleted = service.delete(ARTICLE, document_id, None).await.unwrap();
    assert_eq!(deleted.entries.len(), 1);
    assert_eq!(service.count(ARTICLE, None).await.unwrap(), 0);

    assert_eq!(
        store.calls(),
        vec!["create", "find_one", "update", "find_one", "delete", "count"]
    );
}
