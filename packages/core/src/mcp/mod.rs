//! Model Context Protocol (MCP) Integration
//!
//! JSON-RPC 2.0 protocol layer exposing the content tools to AI agents.
//!
//! # Architecture
//!
//! - **schemas**: closed tool enum, declarative argument tables, validation
//! - **handlers**: `initialize`, `tools/list`, `tools/call` and one function
//!   per tool, routed by the [`Dispatcher`]
//! - **server**: per-session protocol server and the stdio transport
//! - **session**: owned session registry with explicit lifecycle
//! - **http**: streamable HTTP transport (axum)
//!
//! # Usage
//!
//! Agents call tools through `tools/call`:
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": 1,
//!   "method": "tools/call",
//!   "params": {
//!     "name": "find_many",
//!     "arguments": { "uid": "api::article.article", "pagination": { "page": 1, "pageSize": 10 } }
//!   }
//! }
//! ```

pub mod handlers;
pub mod http;
pub mod schemas;
pub mod server;
pub mod session;
pub mod types;

pub use handlers::{Dispatcher, ToolCallOutcome, ToolServices};
pub use schemas::{validate_tool_input, ToolName, ValidatedArguments};
pub use server::{run_stdio_server, serve_lines, McpServer};
pub use session::{ServerFactory, Session, SessionError, SessionManager, SessionTransport};
pub use types::{MCPError, MCPMessage, MCPNotification, MCPRequest, MCPResponse};
