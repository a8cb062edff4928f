//! MCP Server Service
//!
//! Gateway lifecycle: builds the tool services from the host's
//! collaborators, owns the session registry, serves it over HTTP or stdio,
//! and tears every session down on `destroy`.
//!
//! # Example
//!
//! ```ignore
//! let logger = McpLogger::new(config.log_level);
//! let collaborators = GatewayCollaborators::new(registry, store, uploads);
//!
//! if let Some(gateway) = McpServerService::bootstrap(&config, collaborators, logger) {
//!     gateway.start(McpTransport::Http { port: gateway.port() }).await?;
//!     gateway.destroy().await;
//! }
//! ```

use crate::config::GatewayConfig;
use crate::db::{DocumentStore, SchemaRegistry, UploadProvider};
use crate::logging::McpLogger;
use crate::mcp::handlers::{Dispatcher, ToolServices};
use crate::mcp::http;
use crate::mcp::schemas::ToolName;
use crate::mcp::server::{run_stdio_server, McpServer};
use crate::mcp::session::{ServerFactory, SessionManager};
use crate::models::AuthContext;
use crate::services::MediaService;
use axum::Router;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// External capabilities the gateway is built on
#[derive(Clone)]
pub struct GatewayCollaborators {
    pub registry: Arc<dyn SchemaRegistry>,
    pub store: Arc<dyn DocumentStore>,
    pub uploads: Arc<dyn UploadProvider>,
    /// Client for media fetches; a default client when `None`
    pub http_client: Option<reqwest::Client>,
    /// Host permission policy applied to every call
    pub auth: Option<AuthContext>,
}

impl GatewayCollaborators {
    pub fn new(
        registry: Arc<dyn SchemaRegistry>,
        store: Arc<dyn DocumentStore>,
        uploads: Arc<dyn UploadProvider>,
    ) -> Self {
        Self {
            registry,
            store,
            uploads,
            http_client: None,
            auth: None,
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Transport to serve the gateway over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpTransport {
    Http { port: u16 },
    Stdio,
}

/// Running gateway instance
///
/// `Clone` shares the session registry, so a clone can call `destroy`
/// while another serves.
#[derive(Clone)]
pub struct McpServerService {
    sessions: Arc<SessionManager>,
    port: u16,
    logger: McpLogger,
}

impl McpServerService {
    /// Build the gateway, or `None` when disabled by configuration
    pub fn bootstrap(
        config: &GatewayConfig,
        collaborators: GatewayCollaborators,
        logger: McpLogger,
    ) -> Option<Self> {
        if !config.enabled {
            logger.info("MCP gateway disabled by configuration", None);
            return None;
        }

        let GatewayCollaborators {
            registry,
            store,
            uploads,
            http_client,
            auth,
        } = collaborators;

        let mut services = ToolServices::new(registry, store, uploads.clone(), logger);
        if let Some(client) = http_client {
            services = services.with_media(MediaService::with_client(uploads, client));
        }

        let dispatcher = Dispatcher::new(services, logger).with_auth(auth);
        let factory: ServerFactory = Arc::new(move || McpServer::new(dispatcher.clone(), logger));

        let tools: Vec<&str> = ToolName::ALL.iter().map(ToolName::as_str).collect();
        logger.info(
            "MCP gateway initialized",
            Some(json!({ "tools": tools, "port": config.port })),
        );

        Some(Self {
            sessions: Arc::new(SessionManager::new(factory, logger)),
            port: config.port,
            logger,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// HTTP router for embedding into a host application
    pub fn router(&self) -> Router {
        http::router(self.sessions.clone())
    }

    /// Serve until the transport ends (stdin EOF or ctrl-c for HTTP)
    pub async fn start(&self, transport: McpTransport) -> anyhow::Result<()> {
        match transport {
            McpTransport::Http { port } => {
                let addr = SocketAddr::from(([127, 0, 0, 1], port));
                let listener = TcpListener::bind(addr).await?;
                self.serve_http(listener, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await
            }
            McpTransport::Stdio => self.serve_stdio().await,
        }
    }

    /// Serve HTTP on `listener` until `shutdown` resolves
    ///
    /// Sessions are torn down as soon as `shutdown` fires so that open event
    /// streams end and graceful shutdown can complete.
    pub async fn serve_http<F>(&self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("MCP HTTP server listening on {}", listener.local_addr()?);

        let sessions = self.sessions.clone();
        let signal = async move {
            shutdown.await;
            sessions.teardown_all().await;
        };

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await?;

        info!("MCP HTTP server stopped");
        Ok(())
    }

    pub async fn serve_stdio(&self) -> anyhow::Result<()> {
        run_stdio_server(&self.sessions).await
    }

    /// Close every session and refuse new ones
    pub async fn destroy(&self) {
        let closed = self.sessions.teardown_all().await;
        self.logger.info(
            "MCP gateway destroyed",
            Some(json!({ "sessionsClosed": closed })),
        );
    }
}
