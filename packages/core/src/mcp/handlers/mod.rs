//! MCP Request Handlers
//!
//! - `initialize` - handshake and capability discovery
//! - `tools` - tool registry, `tools/list`, `tools/call` and the dispatcher
//! - `catalog`, `documents`, `media` - one function per tool

pub mod catalog;
pub mod documents;
pub mod initialize;
pub mod media;
pub mod tools;

pub use tools::{Dispatcher, ToolCallOutcome, ToolServices};
