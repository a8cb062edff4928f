//! In-Memory Collaborators
//!
//! `MemoryDocumentStore` and `MemoryUploadProvider` implement the store and
//! media traits over process memory. They back the dev server and the test
//! suite and implement just enough query semantics to be useful there:
//! equality and `$eq`/`$ne`/`$contains`/`$containsi`/`$in`/`$lt`/`$lte`/`$gt`/`$gte`/`$null`/`$notNull`
//! filters combined with `$and`/`$or`/`$not`, multi-key sorting, page or
//! offset pagination, field selection, draft/published and locale variants.
//! Relation population is not modelled; populated values are whatever was
//! written.

use crate::db::{DocumentStore, FileInfo, StoreQuery, UploadFile, UploadProvider};
use crate::models::{DeleteResult, DocumentStatus, FindOneParams, QueryPagination, WriteOptions};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keys managed by the store itself
const SYSTEM_KEYS: &[&str] = &[
    "id",
    "documentId",
    "locale",
    "createdAt",
    "updatedAt",
    "publishedAt",
];

/// Document store over process memory
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Map<String, Value>>>>,
    next_id: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw document, assigning `id`/`documentId` and timestamps when missing
    pub async fn seed(&self, uid: &str, document: Value) -> Result<Value> {
        let Value::Object(mut entry) = document else {
            bail!("Seed document for {} must be an object", uid);
        };

        let now = Utc::now().to_rfc3339();
        if !entry.contains_key("id") {
            entry.insert("id".to_string(), json!(self.allocate_id()));
        }
        if !entry.contains_key("documentId") {
            entry.insert("documentId".to_string(), json!(new_document_id()));
        }
        entry.entry("createdAt").or_insert_with(|| json!(now));
        entry.entry("updatedAt").or_insert_with(|| json!(now));
        entry.entry("publishedAt").or_insert(Value::Null);
        entry.entry("locale").or_insert(Value::Null);

        let mut collections = self.collections.write().await;
        collections
            .entry(uid.to_string())
            .or_default()
            .push(entry.clone());

        Ok(Value::Object(entry))
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }
}

fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_many(&self, uid: &str, query: StoreQuery) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        let mut documents: Vec<&Map<String, Value>> = collections
            .get(uid)
            .map(|docs| docs.iter().collect())
            .unwrap_or_default();

        documents.retain(|doc| {
            matches_variant(doc, query.status, query.locale.as_deref())
                && query
                    .filters
                    .as_ref()
                    .map_or(true, |filters| matches_filters(doc, filters))
        });

        if let Some(sort) = &query.sort {
            let keys: Vec<(String, bool)> = sort.entries().into_iter().map(parse_sort).collect();
            documents.sort_by(|a, b| compare_documents(a, b, &keys));
        }

        let (offset, limit) = match query.pagination {
            QueryPagination::Unbounded => (0, usize::MAX),
            QueryPagination::Page { page, page_size } => (
                (page.max(1) as usize - 1).saturating_mul(page_size as usize),
                page_size as usize,
            ),
            QueryPagination::Offset { start, limit } => (
                start.unwrap_or(0) as usize,
                limit.map_or(usize::MAX, |limit| limit as usize),
            ),
        };

        Ok(documents
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|doc| select_fields(doc, query.fields.as_deref()))
            .collect())
    }

    async fn find_one(
        &self,
        uid: &str,
        document_id: &str,
        params: FindOneParams,
    ) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(uid).and_then(|docs| {
            docs.iter()
                .find(|doc| {
                    doc.get("documentId").and_then(Value::as_str) == Some(document_id)
                        && matches_variant(doc, params.status, params.locale.as_deref())
                })
                .map(|doc| select_fields(doc, params.fields.as_deref()))
        }))
    }

    async fn create(
        &self,
        uid: &str,
        data: Map<String, Value>,
        options: WriteOptions,
    ) -> Result<Value> {
        let mut entry: Map<String, Value> = data
            .into_iter()
            .filter(|(key, _)| !SYSTEM_KEYS.contains(&key.as_str()))
            .collect();

        let now = Utc::now().to_rfc3339();
        entry.insert("id".to_string(), json!(self.allocate_id()));
        entry.insert("documentId".to_string(), json!(new_document_id()));
        entry.insert("locale".to_string(), json!(options.locale));
        entry.insert("createdAt".to_string(), json!(now));
        entry.insert("updatedAt".to_string(), json!(now));
        entry.insert(
            "publishedAt".to_string(),
            match options.status {
                Some(DocumentStatus::Published) => json!(now),
                _ => Value::Null,
            },
        );

        let mut collections = self.collections.write().await;
        collections
            .entry(uid.to_string())
            .or_default()
            .push(entry.clone());

        Ok(Value::Object(entry))
    }

    async fn update(
        &self,
        uid: &str,
        document_id: &str,
        data: Map<String, Value>,
        options: WriteOptions,
    ) -> Result<Value> {
        let mut collections = self.collections.write().await;
        let entry = collections
            .get_mut(uid)
            .and_then(|docs| {
                docs.iter_mut().find(|doc| {
                    doc.get("documentId").and_then(Value::as_str) == Some(document_id)
                        && matches_variant(doc, None, options.locale.as_deref())
                })
            })
            .ok_or_else(|| anyhow!("Document {} does not exist in {}", document_id, uid))?;

        for (key, value) in data {
            if !SYSTEM_KEYS.contains(&key.as_str()) {
                entry.insert(key, value);
            }
        }

        let now = Utc::now().to_rfc3339();
        entry.insert("updatedAt".to_string(), json!(now));
        match options.status {
            Some(DocumentStatus::Published) => {
                entry.insert("publishedAt".to_string(), json!(now));
            }
            Some(DocumentStatus::Draft) => {
                entry.insert("publishedAt".to_string(), Value::Null);
            }
            None => {}
        }

        Ok(Value::Object(entry.clone()))
    }

    async fn delete(
        &self,
        uid: &str,
        document_id: &str,
        locale: Option<String>,
    ) -> Result<DeleteResult> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(uid.to_string()).or_default();

        let (removed, kept): (Vec<_>, Vec<_>) = docs.drain(..).partition(|doc| {
            doc.get("documentId").and_then(Value::as_str) == Some(document_id)
                && matches_variant(doc, None, locale.as_deref())
        });
        *docs = kept;

        Ok(DeleteResult {
            document_id: document_id.to_string(),
            entries: removed.into_iter().map(Value::Object).collect(),
        })
    }

    async fn count(&self, uid: &str, filters: Option<Map<String, Value>>) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(uid).map_or(0, |docs| {
            docs.iter()
                .filter(|doc| filters.as_ref().map_or(true, |f| matches_filters(doc, f)))
                .count() as u64
        }))
    }
}

fn matches_variant(
    doc: &Map<String, Value>,
    status: Option<DocumentStatus>,
    locale: Option<&str>,
) -> bool {
    let status_ok = match status {
        Some(DocumentStatus::Published) => !doc.get("publishedAt").map_or(true, Value::is_null),
        _ => true,
    };
    let locale_ok = locale.map_or(true, |locale| {
        doc.get("locale").and_then(Value::as_str) == Some(locale)
    });
    status_ok && locale_ok
}

fn matches_filters(doc: &Map<String, Value>, filters: &Map<String, Value>) -> bool {
    filters.iter().all(|(key, condition)| match key.as_str() {
        "$and" => condition.as_array().map_or(false, |clauses| {
            clauses
                .iter()
                .all(|clause| clause.as_object().map_or(false, |c| matches_filters(doc, c)))
        }),
        "$or" => condition.as_array().map_or(false, |clauses| {
            clauses
                .iter()
                .any(|clause| clause.as_object().map_or(false, |c| matches_filters(doc, c)))
        }),
        "$not" => condition
            .as_object()
            .map_or(false, |clause| !matches_filters(doc, clause)),
        field => matches_condition(doc.get(field).unwrap_or(&Value::Null), condition),
    })
}

fn matches_condition(value: &Value, condition: &Value) -> bool {
    match condition {
        Value::Object(operators) if operators.keys().all(|key| key.starts_with('$')) => operators
            .iter()
            .all(|(operator, operand)| apply_operator(value, operator, operand)),
        Value::Object(nested) => value
            .as_object()
            .map_or(false, |inner| matches_filters(inner, nested)),
        expected => value == expected,
    }
}

fn apply_operator(value: &Value, operator: &str, operand: &Value) -> bool {
    match operator {
        "$eq" => value == operand,
        "$ne" => value != operand,
        "$in" => operand
            .as_array()
            .map_or(false, |candidates| candidates.contains(value)),
        "$notIn" => operand
            .as_array()
            .map_or(true, |candidates| !candidates.contains(value)),
        "$contains" => match (value.as_str(), operand.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        "$containsi" => match (value.as_str(), operand.as_str()) {
            (Some(haystack), Some(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => false,
        },
        "$null" => value.is_null() == operand.as_bool().unwrap_or(true),
        "$notNull" => !value.is_null() == operand.as_bool().unwrap_or(true),
        "$lt" => compare_values(value, operand) == Ordering::Less,
        "$lte" => compare_values(value, operand) != Ordering::Greater,
        "$gt" => compare_values(value, operand) == Ordering::Greater,
        "$gte" => compare_values(value, operand) != Ordering::Less,
        _ => false,
    }
}

fn parse_sort(entry: &str) -> (String, bool) {
    match entry.split_once(':') {
        Some((field, direction)) => (
            field.to_string(),
            direction.eq_ignore_ascii_case("desc"),
        ),
        None => (entry.to_string(), false),
    }
}

fn compare_documents(
    a: &Map<String, Value>,
    b: &Map<String, Value>,
    keys: &[(String, bool)],
) -> Ordering {
    for (field, descending) in keys {
        let left = a.get(field).unwrap_or(&Value::Null);
        let right = b.get(field).unwrap_or(&Value::Null);
        let ordering = compare_values(left, right);
        let ordering = if *descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn select_fields(doc: &Map<String, Value>, fields: Option<&[String]>) -> Value {
    match fields {
        None => Value::Object(doc.clone()),
        Some(fields) => Value::Object(
            doc.iter()
                .filter(|(key, _)| {
                    key.as_str() == "id"
                        || key.as_str() == "documentId"
                        || fields.iter().any(|field| field == *key)
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
    }
}

#[derive(Debug, Clone)]
struct StoredFile {
    record: Value,
    buffer: Vec<u8>,
}

/// Media library over process memory
#[derive(Debug, Default)]
pub struct MemoryUploadProvider {
    files: RwLock<BTreeMap<u64, StoredFile>>,
    next_id: AtomicU64,
}

impl MemoryUploadProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes of a stored file
    pub async fn contents(&self, id: u64) -> Option<Vec<u8>> {
        self.files.read().await.get(&id).map(|file| file.buffer.clone())
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl UploadProvider for MemoryUploadProvider {
    async fn upload(&self, file: UploadFile, info: FileInfo) -> Result<Vec<Value>> {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        let (stem, ext) = match file.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
            _ => (file.name.clone(), String::new()),
        };
        let hash = format!("{}_{}", stem, &Uuid::new_v4().simple().to_string()[..10]);
        let now = Utc::now().to_rfc3339();

        let record = json!({
            "id": id,
            "documentId": new_document_id(),
            "name": info.name,
            "alternativeText": info.alternative_text,
            "caption": info.caption,
            "width": null,
            "height": null,
            "formats": null,
            "hash": hash,
            "ext": ext,
            "mime": file.mime,
            "size": (file.size as f64 / 10.0).round() / 100.0,
            "url": format!("/uploads/{}{}", hash, ext),
            "previewUrl": null,
            "provider": "memory",
            "createdAt": now,
            "updatedAt": now,
        });

        self.files.write().await.insert(
            id,
            StoredFile {
                record: record.clone(),
                buffer: file.buffer,
            },
        );

        Ok(vec![record])
    }

    async fn find_file(&self, id: u64) -> Result<Option<Value>> {
        Ok(self.files.read().await.get(&id).map(|file| file.record.clone()))
    }

    async fn remove(&self, file: Value) -> Result<Value> {
        let id = file
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| anyhow!("File record has no numeric id"))?;

        self.files
            .write()
            .await
            .remove(&id)
            .map(|stored| stored.record)
            .ok_or_else(|| anyhow!("File {} does not exist", id))
    }
}

#[cfg(test)]
#[path = "memory_store_test.rs"]
mod memory_store_test;
