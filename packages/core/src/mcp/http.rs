//! Streamable HTTP Transport
//!
//! A single endpoint carries the whole session lifecycle:
//!
//! - `POST /mcp` sends one JSON-RPC message. Without an `Mcp-Session-Id`
//!   header a new session is opened and its id returned in the header.
//! - `GET /mcp` opens the session's server-to-client SSE stream.
//! - `DELETE /mcp` closes the session.
//!
//! Authentication is left to the host, which can wrap [`router`] in its own
//! middleware.

use crate::mcp::server::handle_value;
use crate::mcp::session::{SessionError, SessionManager};
use crate::mcp::types::{MCPError, MCPResponse};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive};
use axum::response::{IntoResponse, Response, Sse};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Endpoint path
pub const MCP_PATH: &str = "/mcp";

/// Session id header (lowercase, as normalized by `http`)
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Build the MCP router over `sessions`
pub fn router(sessions: Arc<SessionManager>) -> Router {
    Router::new()
        .route(
            MCP_PATH,
            post(handle_post).get(handle_get).delete(handle_delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(sessions)
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn error_response(status: StatusCode, error: MCPError) -> Response {
    (status, Json(MCPResponse::error(Value::Null, error))).into_response()
}

fn missing_session_header() -> Response {
    error_response(
        StatusCode::BAD_REQUEST,
        MCPError::invalid_request("Missing Mcp-Session-Id header"),
    )
}

fn unknown_session(id: &str) -> Response {
    error_response(StatusCode::NOT_FOUND, MCPError::session_not_found(id))
}

/// Handles one inbound JSON-RPC message
async fn handle_post(
    State(sessions): State<Arc<SessionManager>>,
    headers: HeaderMap,
    bytes: Bytes,
) -> Response {
    let value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            warn!("Rejecting malformed JSON-RPC body: {}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                MCPError::parse_error(format!("Invalid JSON: {}", e)),
            );
        }
    };

    let session = match session_id(&headers) {
        Some(id) => match sessions.get(&id).await {
            Some(session) => session,
            None => return unknown_session(&id),
        },
        None => match sessions.open().await {
            Ok(session) => {
                debug!("Opened MCP session {}", session.id());
                session
            }
            Err(SessionError::ShuttingDown) => {
                return error_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    MCPError::server_unavailable("MCP gateway is shutting down"),
                )
            }
            Err(e) => {
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MCPError::internal_error(e.to_string()),
                )
            }
        },
    };

    let header = [(SESSION_HEADER, session.id().to_string())];
    match handle_value(&session, value).await {
        Some(response) => (StatusCode::OK, header, Json(response)).into_response(),
        None => (StatusCode::ACCEPTED, header).into_response(),
    }
}

/// Opens the server-to-client event stream of a session
async fn handle_get(
    State(sessions): State<Arc<SessionManager>>,
    headers: HeaderMap,
) -> Response {
    let Some(id) = session_id(&headers) else {
        return missing_session_header();
    };
    let Some(session) = sessions.get(&id).await else {
        return unknown_session(&id);
    };
    let Some(stream) = session.transport().take_stream().await else {
        return error_response(
            StatusCode::CONFLICT,
            MCPError::invalid_request("Event stream already open for this session"),
        );
    };

    let events = stream.map(|message| {
        Ok::<_, Infallible>(Event::default().event("message").data(message.to_string()))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Terminates a session; unknown ids are accepted
async fn handle_delete(
    State(sessions): State<Arc<SessionManager>>,
    headers: HeaderMap,
) -> Response {
    let Some(id) = session_id(&headers) else {
        return missing_session_header();
    };

    if sessions.close(&id).await {
        debug!("Closed MCP session {}", id);
    }
    StatusCode::NO_CONTENT.into_response()
}
