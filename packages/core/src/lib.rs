//! Content MCP Core
//!
//! Exposes a CMS's content operations to AI agents as MCP tools: schema
//! discovery, document CRUD and media upload, behind input validation and a
//! fail-closed sanitization boundary.
//!
//! # Architecture
//!
//! - **Closed tool set**: tools are a Rust enum; arguments are validated into
//!   one typed record per tool before any handler runs
//! - **Fail-closed sanitization**: every read is filtered to readable fields
//!   and every write to writable fields, or the call is aborted
//! - **Pluggable collaborators**: schema catalog, document store and upload
//!   capability are traits, with in-memory implementations included
//!
//! # Modules
//!
//! - [`config`] - Gateway configuration (`enabled`, `logLevel`, `port`)
//! - [`logging`] - Level-filtered, redacting logging context
//! - [`models`] - Schema, document and pagination types
//! - [`db`] - Collaborator traits and in-memory implementations
//! - [`services`] - Catalog, document, media and sanitization services
//! - [`utils`] - Content projection
//! - [`mcp`] - JSON-RPC protocol, sessions, HTTP and stdio transports

pub mod config;
pub mod db;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigError, GatewayConfig, LogLevel};
pub use logging::McpLogger;
pub use models::*;
pub use services::*;
