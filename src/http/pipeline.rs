//! Request pipeline assembly.
//!
//! Stages in request order (outermost first):
//!
//! ```text
//!  1. security headers     security::headers
//!  2. compression          tower_http::compression
//!  3. cross-origin policy  security::cors
//!  4. request id + access  http::request, observability::access_log
//!  5. error stage          http::error (catch-all for 6..9)
//!  6. body parsing         http::body
//!  7. static assets        http::static_files
//!  8. route dispatch       routing::router
//!  9. not found            routing::handlers::not_found
//! ```
//!
//! `Router::layer` wraps everything added before it, so layers are applied
//! innermost first below.

use axum::{middleware, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;

use crate::config::ConfigError;
use crate::http::body::parse_body;
use crate::http::error::{panic_to_failure, render_failures};
use crate::http::request::request_id_layers;
use crate::http::server::AppState;
use crate::http::static_files::serve_static;
use crate::observability::{access_log, LogFormat};
use crate::routing::not_found;
use crate::security::{cors_layer, security_headers, OriginPolicy, SecurityHeaders};

/// Wrap a route table in the full request pipeline.
pub fn assemble(state: AppState, routes: Router<AppState>) -> Result<Router, ConfigError> {
    let config = state.config.clone();
    let mode = config.mode();

    let origin = OriginPolicy::for_mode(&config.cors, mode)?;

    let mut router = routes
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), serve_static))
        .layer(middleware::from_fn_with_state(state.clone(), parse_body))
        .layer(CatchPanicLayer::custom(panic_to_failure))
        .layer(middleware::from_fn_with_state(mode, render_failures))
        .layer(middleware::from_fn_with_state(
            LogFormat::for_mode(mode),
            access_log,
        ))
        .layer(request_id_layers())
        .layer(cors_layer(origin));

    if config.compression.enabled {
        router = router.layer(CompressionLayer::new());
    }

    if config.security.enable_headers {
        router = router.layer(middleware::from_fn_with_state(
            SecurityHeaders::new(),
            security_headers,
        ));
    }

    Ok(router.with_state(state))
}
