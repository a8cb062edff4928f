//! Collaborator Layer
//!
//! The gateway consumes three external capabilities, each behind a trait:
//!
//! - [`SchemaRegistry`] - read-only catalog of content type and component schemas
//! - [`DocumentStore`] - opaque CRUD over documents (the query engine lives here)
//! - [`UploadProvider`] - media library storage
//!
//! In-memory implementations back the dev server and the test suite. A host
//! platform supplies its own implementations for production use.

mod document_store;
mod error;
mod memory_store;
mod schema_registry;
mod upload_provider;

pub use document_store::{DocumentStore, StoreQuery};
pub use error::CatalogError;
pub use memory_store::{MemoryDocumentStore, MemoryUploadProvider};
pub use schema_registry::{SchemaRegistry, StaticSchemaRegistry};
pub use upload_provider::{FileInfo, UploadFile, UploadProvider};
