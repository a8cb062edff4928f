//! Content Type Catalog
//!
//! Read-only view over user-defined content types. Only uids in the `api::`
//! namespace are listed or accepted as tool targets.

use crate::db::SchemaRegistry;
use crate::models::{ContentTypeRef, USER_NAMESPACE_PREFIX};
use crate::services::error::GatewayError;
use std::sync::Arc;

#[derive(Clone)]
pub struct ContentTypeService {
    registry: Arc<dyn SchemaRegistry>,
}

impl ContentTypeService {
    pub fn new(registry: Arc<dyn SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// All user-defined content types in catalog order
    pub fn list(&self) -> Vec<ContentTypeRef> {
        self.registry
            .content_types()
            .into_iter()
            .filter(|schema| schema.is_user_defined())
            .map(ContentTypeRef::from)
            .collect()
    }

    /// Describe any registered content type
    pub fn get(&self, uid: &str) -> Option<ContentTypeRef> {
        self.registry.content_type(uid).map(ContentTypeRef::from)
    }

    /// Registered and inside the user-defined namespace
    pub fn is_valid(&self, uid: &str) -> bool {
        uid.starts_with(USER_NAMESPACE_PREFIX) && self.registry.content_type(uid).is_some()
    }

    /// Fail with a not-found error unless `uid` is a valid tool target
    pub fn ensure_valid(&self, uid: &str) -> Result<(), GatewayError> {
        if self.is_valid(uid) {
            Ok(())
        } else {
            Err(GatewayError::content_type_not_found(uid))
        }
    }
}
