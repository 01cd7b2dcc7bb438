//! Cross-origin policy.
//!
//! Production allows exactly one configured origin; every other mode
//! mirrors the caller's `Origin`. Credentials are allowed in both.

use axum::http::{header::InvalidHeaderValue, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::schema::{CorsConfig, RuntimeMode};

/// Methods advertised to preflight requests.
pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];

/// The origin policy in effect for a runtime mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Reflect whatever origin the request carries.
    Any,
    /// Allow exactly this origin.
    Exact(HeaderValue),
}

impl OriginPolicy {
    pub fn for_mode(config: &CorsConfig, mode: RuntimeMode) -> Result<Self, InvalidHeaderValue> {
        if mode.is_production() {
            Ok(OriginPolicy::Exact(HeaderValue::from_str(
                config.production_origin(),
            )?))
        } else {
            Ok(OriginPolicy::Any)
        }
    }
}

/// Build the CORS layer for a policy.
pub fn cors_layer(policy: OriginPolicy) -> CorsLayer {
    let origin = match policy {
        OriginPolicy::Any => AllowOrigin::mirror_request(),
        OriginPolicy::Exact(origin) => AllowOrigin::exact(origin),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(ALLOWED_METHODS.to_vec())
        .allow_headers(AllowHeaders::mirror_request())
}
