//! Data Models
//!
//! This module contains the data structures shared by every gateway component:
//!
//! - `schema` - Content type and component views over the host catalog
//! - `document` - Query, pagination and write parameters for document operations
//! - `pagination` - Paginated result envelope used by catalog listings
//! - `auth` - Field-level permission context consumed by the sanitization boundary
//!
//! Documents themselves stay opaque `serde_json::Value` records; the gateway
//! never interprets them beyond schema-directed sanitization.

mod auth;
mod document;
mod pagination;
mod schema;

pub use auth::AuthContext;
pub use document::{
    DeleteResult, DocumentStatus, FindOneParams, FindParams, PaginationArgs, Populate,
    QueryPagination, QueryParams, SortSpec, WriteOptions,
};
pub use pagination::{Paginated, PaginationMeta};
pub use schema::{
    AttributeDefinition, Attributes, ComponentRef, ComponentSchema, ContentKind,
    ContentTypeRef, ContentTypeSchema, ContentTypeSummary, SchemaInfo, USER_NAMESPACE_PREFIX,
};
