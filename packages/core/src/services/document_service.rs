//! Document Operations Facade
//!
//! Translates gateway-level parameters into store calls. Pagination mode is
//! resolved here (page mode wins over offset mode) and mutations verify that
//! the target document exists before touching the store.

use crate::db::{DocumentStore, StoreQuery};
use crate::models::{DeleteResult, FindOneParams, FindParams, PaginationArgs, WriteOptions};
use crate::services::error::GatewayError;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Query documents; an empty result is not an error
    pub async fn find_many(&self, uid: &str, params: FindParams) -> Result<Vec<Value>, GatewayError> {
        let pagination = params
            .pagination
            .as_ref()
            .map(PaginationArgs::resolve)
            .unwrap_or_default();

        debug!("find_many {} ({:?})", uid, pagination);

        let query = StoreQuery {
            filters: params.query.filters,
            populate: params.query.populate,
            fields: params.query.fields,
            sort: params.query.sort,
            pagination,
            status: params.status,
            locale: params.locale,
        };

        self.store
            .find_many(uid, query)
            .await
            .map_err(GatewayError::upstream)
    }

    /// Fetch one document; absence is `Ok(None)`
    pub async fn find_one(
        &self,
        uid: &str,
        document_id: &str,
        params: FindOneParams,
    ) -> Result<Option<Value>, GatewayError> {
        self.store
            .find_one(uid, document_id, params)
            .await
            .map_err(GatewayError::upstream)
    }

    pub async fn create(
        &self,
        uid: &str,
        data: Map<String, Value>,
        options: WriteOptions,
    ) -> Result<Value, GatewayError> {
        self.store
            .create(uid, data, options)
            .await
            .map_err(GatewayError::upstream)
    }

    /// Update an existing document, failing with not-found when absent
    pub async fn update(
        &self,
        uid: &str,
        document_id: &str,
        data: Map<String, Value>,
        options: WriteOptions,
    ) -> Result<Value, GatewayError> {
        self.ensure_exists(uid, document_id).await?;

        self.store
            .update(uid, document_id, data, options)
            .await
            .map_err(GatewayError::upstream)
    }

    /// Delete an existing document, failing with not-found when absent
    pub async fn delete(
        &self,
        uid: &str,
        document_id: &str,
        locale: Option<String>,
    ) -> Result<DeleteResult, GatewayError> {
        self.ensure_exists(uid, document_id).await?;

        self.store
            .delete(uid, document_id, locale)
            .await
            .map_err(GatewayError::upstream)
    }

    pub async fn count(
        &self,
        uid: &str,
        filters: Option<Map<String, Value>>,
    ) -> Result<u64, GatewayError> {
        self.store
            .count(uid, filters)
            .await
            .map_err(GatewayError::upstream)
    }

    async fn ensure_exists(&self, uid: &str, document_id: &str) -> Result<(), GatewayError> {
        match self.find_one(uid, document_id, FindOneParams::default()).await? {
            Some(_) => Ok(()),
            None => Err(GatewayError::document_not_found(uid, document_id)),
        }
    }
}

#[cfg(test)]
#[path = "document_service_test.rs"]
mod document_service_test;
