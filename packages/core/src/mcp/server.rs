//! MCP Protocol Server
//!
//! One [`McpServer`] exists per session. It answers JSON-RPC requests,
//! swallows notifications, and reports failed tool calls as
//! `notifications/message` log notifications for the session's
//! server-to-client stream.
//!
//! The stdio transport at the bottom of this file serves newline-delimited
//! JSON-RPC through a single session that is closed at EOF.

use crate::logging::McpLogger;
use crate::mcp::handlers::initialize::{handle_initialize, SERVER_NAME};
use crate::mcp::handlers::tools::{handle_tools_call, handle_tools_list};
use crate::mcp::handlers::Dispatcher;
use crate::mcp::session::{Session, SessionError, SessionManager};
use crate::mcp::types::{MCPError, MCPMessage, MCPNotification, MCPRequest, MCPResponse};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, instrument, warn};

/// What the server produced for one inbound message
#[derive(Debug, Default)]
pub struct ServerReply {
    /// `None` for notifications
    pub response: Option<MCPResponse>,
    /// Server-to-client messages to push on the session stream
    pub notifications: Vec<MCPNotification>,
}

/// Per-session protocol server handle
pub struct McpServer {
    dispatcher: Dispatcher,
    logger: McpLogger,
    closed: AtomicBool,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, logger: McpLogger) -> Self {
        Self {
            dispatcher,
            logger,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop accepting requests; closing twice is reported
    pub fn close(&self) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            Err(SessionError::AlreadyClosed { handle: "server" })
        } else {
            Ok(())
        }
    }

    pub async fn handle(&self, message: MCPMessage) -> ServerReply {
        match message {
            MCPMessage::Request(request) => self.handle_request(request).await,
            MCPMessage::Notification(notification) => {
                match notification.method.as_str() {
                    "notifications/initialized" => debug!("Client initialized"),
                    other => debug!("Ignoring notification: {}", other),
                }
                ServerReply::default()
            }
        }
    }

    #[instrument(skip(self, request), fields(method = %request.method, id = %request.id))]
    async fn handle_request(&self, request: MCPRequest) -> ServerReply {
        if self.is_closed() {
            return ServerReply {
                response: Some(MCPResponse::error(
                    request.id,
                    MCPError::invalid_request("Session is closed"),
                )),
                notifications: Vec::new(),
            };
        }

        let mut notifications = Vec::new();

        let result = match request.method.as_str() {
            "initialize" => handle_initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => {
                self.logger.debug("Listing tools", None);
                handle_tools_list(request.params)
            }
            "tools/call" => match handle_tools_call(&self.dispatcher, request.params).await {
                Ok(outcome) => {
                    if let Some(error) = &outcome.error {
                        notifications
                            .push(tool_failure_notification(&outcome.tool, &error.to_string()));
                    }
                    Ok(outcome.envelope)
                }
                Err(e) => Err(e),
            },
            _ => {
                warn!("Unknown MCP method: {}", request.method);
                Err(MCPError::method_not_found(&request.method))
            }
        };

        let response = match result {
            Ok(result) => MCPResponse::success(request.id, result),
            Err(error) => {
                error!(
                    "MCP request {} failed: {} (code: {})",
                    request.id, error.message, error.code
                );
                MCPResponse::error(request.id, error)
            }
        };

        ServerReply {
            response: Some(response),
            notifications,
        }
    }
}

/// `notifications/message` payload for a failed tool call
pub fn tool_failure_notification(tool: &str, message: &str) -> MCPNotification {
    MCPNotification::new(
        "notifications/message",
        json!({
            "level": "error",
            "logger": SERVER_NAME,
            "data": {
                "tool": tool,
                "message": message,
            }
        }),
    )
}

/// Parse one raw JSON value and run it through `session`
///
/// Malformed messages are answered with an INVALID_REQUEST error carrying
/// whatever `id` could be recovered.
pub async fn handle_value(session: &Session, value: Value) -> Option<MCPResponse> {
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    match MCPMessage::from_value(value) {
        Ok(message) => session.handle(message).await,
        Err(error) => Some(MCPResponse::error(id, error)),
    }
}

/// Serve JSON-RPC over the process's stdin/stdout
pub async fn run_stdio_server(sessions: &SessionManager) -> anyhow::Result<()> {
    serve_lines(sessions, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serve newline-delimited JSON-RPC from `reader` to `writer`
///
/// Runs one session until `reader` reaches EOF, then closes it.
pub async fn serve_lines<R, W>(sessions: &SessionManager, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let session = sessions.open().await?;
    info!("MCP stdio session {} started", session.id());

    let result = pump(&session, reader, writer).await;

    sessions.close(session.id()).await;
    info!("MCP stdio session {} stopped", session.id());
    result
}

async fn pump<R, W>(session: &Session, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut writer = BufWriter::new(writer);
    let mut outbound = session.transport().take_stream().await;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                debug!("MCP request: {}", line);

                let response = match serde_json::from_str::<Value>(&line) {
                    Ok(value) => handle_value(session, value).await,
                    Err(e) => {
                        warn!("Failed to parse JSON-RPC message: {}", e);
                        Some(MCPResponse::error(
                            Value::Null,
                            MCPError::parse_error(format!("Invalid JSON: {}", e)),
                        ))
                    }
                };

                if let Some(response) = response {
                    write_line(&mut writer, &serde_json::to_value(&response)?).await?;
                }
            }
            Some(message) = next_outbound(&mut outbound) => {
                write_line(&mut writer, &message).await?;
            }
        }
    }

    Ok(())
}

async fn next_outbound(stream: &mut Option<ReceiverStream<Value>>) -> Option<Value> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn write_line<W>(writer: &mut BufWriter<W>, message: &Value) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(message)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "server_test.rs"]
mod server_test;
