//! Gateway Services
//!
//! This module contains the services tool handlers are built from:
//!
//! - `ContentTypeService` / `ComponentService` - schema catalog adapter
//! - `DocumentService` - document operations facade over the store
//! - `MediaService` - media upload capability
//! - `Sanitizer` - fail-closed sanitization boundary
//! - `McpServerService` - gateway bootstrap, transports and teardown
//!
//! Services hold `Arc` handles to the collaborators in [`crate::db`] and are
//! cheap to clone.

pub mod component_service;
pub mod content_type_service;
pub mod document_service;
pub mod error;
pub mod mcp_server_service;
pub mod media_service;
pub mod sanitizer;

pub use component_service::ComponentService;
pub use content_type_service::ContentTypeService;
pub use document_service::DocumentService;
pub use error::{FieldIssue, GatewayError, SanitizeError, SanitizeStage};
pub use mcp_server_service::{GatewayCollaborators, McpServerService, McpTransport};
pub use media_service::{MediaMetadata, MediaService};
pub use sanitizer::Sanitizer;
