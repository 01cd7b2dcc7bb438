//! Route table.
//!
//! # Design Decisions
//! - Exact paths only; the table is fixed at startup
//! - A known path with an unknown method is treated as unmatched (404)
//! - Static assets are resolved before this table is consulted

use axum::{routing::get, Router};

use crate::http::server::AppState;
use crate::routing::handlers::{health, index, info, not_found};

/// The application's route table, without the pipeline stages.
pub fn route_table() -> Router<AppState> {
    Router::new()
        .route("/health", get(health).fallback(not_found))
        .route("/api/info", get(info).fallback(not_found))
        .route("/", get(index).fallback(not_found))
}
