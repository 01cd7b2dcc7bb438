//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared application state
//! - Assemble the request pipeline around the route table
//! - Bind server to listener
//! - Serve until a shutdown signal, draining in-flight requests

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{AppConfig, ConfigError};
use crate::http::pipeline;
use crate::http::static_files::StaticAssets;
use crate::routing::route_table;
use crate::security::limits::describe_limit;

/// Application state injected into handlers.
///
/// Immutable after startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub assets: Arc<StaticAssets>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let assets = StaticAssets::new(&config.static_files.root, &config.static_files.index);
        Self {
            config: Arc::new(config),
            assets: Arc::new(assets),
            started_at: Instant::now(),
        }
    }
}

/// HTTP server for the application.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        Self::with_routes(config, route_table())
    }

    /// Create a server around a custom route table.
    pub fn with_routes(
        config: AppConfig,
        routes: Router<AppState>,
    ) -> Result<Self, ConfigError> {
        let state = AppState::new(config);
        let router = pipeline::assemble(state.clone(), routes)?;
        Ok(Self { router, state })
    }

    /// The assembled pipeline, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns once `shutdown` resolves and in-flight requests have completed.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let config = &self.state.config;
        tracing::info!(
            address = %addr,
            environment = %config.environment,
            public_root = %self.state.assets.root().display(),
            body_limit = %describe_limit(config.limits.max_body_bytes),
            "HTTP server starting"
        );
        tracing::info!("Health check: http://localhost:{}/health", addr.port());

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }
}
