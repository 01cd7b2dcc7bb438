//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use iphone_app_server::config::AppConfig;
use iphone_app_server::http::AppState;
use iphone_app_server::routing::route_table;
use iphone_app_server::{shutdown_channel, HttpServer, ShutdownTrigger};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// The public root shipped with the crate.
pub fn public_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public")
}

/// Config bound to loopback, an ephemeral port and the bundled public root.
pub fn test_config(environment: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = environment.to_string();
    config.listener.host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.static_files.root = public_root().to_string_lossy().into_owned();
    config
}

pub fn router(config: AppConfig) -> Router {
    router_with(config, route_table())
}

pub fn router_with(config: AppConfig, routes: Router<AppState>) -> Router {
    HttpServer::with_routes(config, routes)
        .expect("pipeline assembles")
        .router()
}

/// A response fully read into memory.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body is JSON")
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .unwrap_or_else(|| panic!("missing header {name}"))
            .to_str()
            .unwrap()
    }

    /// Content type without parameters.
    pub fn mime(&self) -> &str {
        self.header("content-type").split(';').next().unwrap().trim()
    }
}

/// Drive one request through the pipeline without a socket.
pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    TestResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

/// A server running on a real socket.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: ShutdownTrigger,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_server(config: AppConfig) -> RunningServer {
    spawn_server_with(config, route_table()).await
}

pub async fn spawn_server_with(config: AppConfig, routes: Router<AppState>) -> RunningServer {
    let listener = TcpListener::bind(config.listener.bind_address())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_routes(config, routes).unwrap();
    let (shutdown, signal) = shutdown_channel();
    let handle = tokio::spawn(async move { server.run(listener, signal).await });

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
