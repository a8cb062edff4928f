//! Session Manager
//!
//! Owns one (protocol server, transport) pair per client connection. The
//! registry is an explicit `RwLock<HashMap>` owned by [`SessionManager`];
//! there is no process-wide state.
//!
//! Lock discipline:
//! - `open` holds the factory read lock while registering, so a session
//!   can never be registered after `teardown_all` has started.
//! - `close` removes the entry under the write lock before closing the
//!   handles, so no caller can look up a session whose handles are closing.
//! - `teardown_all` clears the factory first, then drains the registry.

use crate::logging::McpLogger;
use crate::mcp::server::{McpServer, ServerReply};
use crate::mcp::types::{MCPMessage, MCPResponse};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;
use uuid::Uuid;

/// Buffered server-to-client messages per session
pub const OUTBOUND_BUFFER: usize = 64;

/// Builds the protocol server for a new session
pub type ServerFactory = Arc<dyn Fn() -> McpServer + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("MCP gateway is shutting down")]
    ShuttingDown,

    #[error("Session {handle} already closed")]
    AlreadyClosed { handle: &'static str },

    #[error("Session transport is closed")]
    TransportClosed,

    #[error("Session outbound buffer is full")]
    BufferFull,
}

/// Server-to-client message channel of one session
pub struct SessionTransport {
    sender: Mutex<Option<mpsc::Sender<Value>>>,
    receiver: Mutex<Option<mpsc::Receiver<Value>>>,
    closed: AtomicBool,
}

impl SessionTransport {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Queue a message without waiting for the reader
    pub async fn send(&self, message: Value) -> Result<(), SessionError> {
        let sender = self.sender.lock().await;
        let sender = sender.as_ref().ok_or(SessionError::TransportClosed)?;

        sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SessionError::BufferFull,
            mpsc::error::TrySendError::Closed(_) => SessionError::TransportClosed,
        })
    }

    /// Hand out the outbound stream; only the first caller gets it
    pub async fn take_stream(&self) -> Option<ReceiverStream<Value>> {
        self.receiver.lock().await.take().map(ReceiverStream::new)
    }

    /// Drop the sender, ending the outbound stream
    pub async fn close(&self) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyClosed { handle: "transport" });
        }
        self.sender.lock().await.take();
        Ok(())
    }
}

/// State bound to one client connection
pub struct Session {
    id: String,
    server: McpServer,
    transport: SessionTransport,
    created_at: DateTime<Utc>,
}

impl Session {
    fn new(server: McpServer) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            server,
            transport: SessionTransport::new(OUTBOUND_BUFFER),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn server(&self) -> &McpServer {
        &self.server
    }

    pub fn transport(&self) -> &SessionTransport {
        &self.transport
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Run one inbound message; `None` for notifications
    ///
    /// Notifications produced by the server are pushed on the outbound
    /// stream. A full or closed stream drops them.
    pub async fn handle(&self, message: MCPMessage) -> Option<MCPResponse> {
        let ServerReply {
            response,
            notifications,
        } = self.server.handle(message).await;

        for notification in notifications {
            let message = match serde_json::to_value(&notification) {
                Ok(message) => message,
                Err(e) => {
                    debug!("Dropping unserializable notification: {}", e);
                    continue;
                }
            };
            if let Err(e) = self.transport.send(message).await {
                debug!("Dropping notification for session {}: {}", self.id, e);
            }
        }

        response
    }
}

/// Owned registry of live sessions
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    factory: RwLock<Option<ServerFactory>>,
    logger: McpLogger,
}

impl SessionManager {
    pub fn new(factory: ServerFactory, logger: McpLogger) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            factory: RwLock::new(Some(factory)),
            logger,
        }
    }

    /// Create and register a session for a new connection
    pub async fn open(&self) -> Result<Arc<Session>, SessionError> {
        let factory = self.factory.read().await;
        let factory = factory.as_ref().ok_or(SessionError::ShuttingDown)?;

        let session = Arc::new(Session::new(factory()));
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());

        self.logger.debug(
            "MCP session opened",
            Some(json!({ "sessionId": session.id })),
        );
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Close and forget a session
    ///
    /// Unknown ids are a no-op. Returns whether a session was removed.
    pub async fn close(&self, id: &str) -> bool {
        let Some(session) = self.sessions.write().await.remove(id) else {
            return false;
        };

        self.close_handles(&session).await;
        self.logger
            .debug("MCP session closed", Some(json!({ "sessionId": id })));
        true
    }

    /// Close every session and refuse new ones
    ///
    /// Returns the number of sessions closed.
    pub async fn teardown_all(&self) -> usize {
        self.factory.write().await.take();

        let drained: Vec<Arc<Session>> = self
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, session)| session)
            .collect();

        for session in &drained {
            self.close_handles(session).await;
        }

        self.logger.info(
            "MCP sessions torn down",
            Some(json!({ "closed": drained.len() })),
        );
        drained.len()
    }

    pub async fn is_shutting_down(&self) -> bool {
        self.factory.read().await.is_none()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn session_ids(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    /// Close both handles; one failing does not prevent the other
    async fn close_handles(&self, session: &Session) {
        if let Err(e) = session.server.close() {
            self.logger.warn(
                "Failed to close MCP server",
                Some(json!({ "sessionId": session.id, "error": e.to_string() })),
            );
        }

        if let Err(e) = session.transport.close().await {
            self.logger.warn(
                "Failed to close MCP transport",
                Some(json!({ "sessionId": session.id, "error": e.to_string() })),
            );
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
