//! Route handlers and the not-found fallback.
//!
//! Bodies are serialized straight from config and server state; nothing
//! here touches the request beyond its path.

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::error::AppError;
use crate::http::server::AppState;

pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found on this server.";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: f64,
    pub environment: String,
}

#[derive(Debug, Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub features: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NotFoundBody {
    pub error: &'static str,
    pub message: &'static str,
    pub status: u16,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.clone(),
    })
}

pub async fn info(State(state): State<AppState>) -> Json<AppInfo> {
    let app = &state.config.app;
    Json(AppInfo {
        name: app.name.clone(),
        version: app.version.clone(),
        description: app.description.clone(),
        features: app.features.clone(),
    })
}

/// Serves the root index document.
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    state.assets.serve(&state.assets.index_path(), false).await
}

pub async fn not_found() -> (StatusCode, Json<NotFoundBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Not Found",
            message: NOT_FOUND_MESSAGE,
            status: StatusCode::NOT_FOUND.as_u16(),
        }),
    )
}
