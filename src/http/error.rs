//! Failure taxonomy and the terminal error stage.
//!
//! # Data Flow
//! ```text
//! stage returns Err(AppError) / handler panics
//!     → IntoResponse attaches a Failure to an empty response
//!     → render_failures (error stage) turns it into the JSON error body
//! ```
//!
//! # Design Decisions
//! - Rendering removes the Failure, so a response is rendered at most once
//! - Production hides the internal message and trace
//! - Status comes from the failure; anything else is a 500
//! - Headers set alongside the failure survive rendering, except the body framing

use std::any::Any;
use std::error::Error as StdError;
use std::path::PathBuf;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::RuntimeMode;
use crate::observability::metrics;

/// Message returned in place of internal detail in production.
pub const GENERIC_MESSAGE: &str = "Something went wrong!";

/// Errors raised by pipeline stages and route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("request entity too large")]
    PayloadTooLarge { limit: usize },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("unsupported request body: {0}")]
    UnsupportedBody(String),

    #[error("asset not found: {0}")]
    AssetNotFound(String),

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Internal(String),

    #[error("handler panicked: {0}")]
    Panic(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MalformedBody(_) | AppError::UnsupportedBody(_) => StatusCode::BAD_REQUEST,
            AppError::AssetNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Io { .. } | AppError::Internal(_) | AppError::Panic(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::MalformedBody(_) => "MalformedBody",
            AppError::UnsupportedBody(_) => "UnsupportedBody",
            AppError::AssetNotFound(_) => "AssetNotFound",
            AppError::Io { .. } => "Io",
            AppError::Internal(_) => "Internal",
            AppError::Panic(_) => "Panic",
        }
    }
}

/// A failure waiting to be rendered by the error stage.
#[derive(Debug, Clone)]
pub struct Failure {
    pub status: StatusCode,
    pub message: String,
    /// The error followed by its source chain, one entry per line.
    pub trace: Vec<String>,
}

impl From<&AppError> for Failure {
    fn from(err: &AppError) -> Self {
        let mut trace = vec![format!("{}: {}", err.kind(), err)];
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push(format!("    caused by: {cause}"));
            source = cause.source();
        }

        Self {
            status: err.status(),
            message: err.to_string(),
            trace,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(Failure::from(&self));
        response
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl Failure {
    /// Client-visible body for this failure in the given mode.
    pub fn body(&self, mode: RuntimeMode) -> ErrorBody {
        let error = self
            .status
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_string();

        if mode.is_production() {
            ErrorBody {
                error,
                message: GENERIC_MESSAGE.to_string(),
                status: self.status.as_u16(),
                stack: None,
            }
        } else {
            ErrorBody {
                error,
                message: self.message.clone(),
                status: self.status.as_u16(),
                stack: Some(self.trace.join("\n")),
            }
        }
    }
}

/// Error stage: renders any failure produced further down the pipeline.
pub async fn render_failures(
    State(mode): State<RuntimeMode>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    let Some(failure) = response.extensions_mut().remove::<Failure>() else {
        return response;
    };
    let (parts, _) = response.into_parts();

    tracing::error!(
        path = %path,
        status = failure.status.as_u16(),
        error = %failure.message,
        trace = %failure.trace.join(" | "),
        "Request failed"
    );
    metrics::record_failure(failure.status.as_u16());

    let mut rendered = (failure.status, Json(failure.body(mode))).into_response();
    for (name, value) in &parts.headers {
        if *name != header::CONTENT_TYPE && *name != header::CONTENT_LENGTH {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }
    rendered
}

/// Converts a caught panic into a failure for the error stage.
pub fn panic_to_failure(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };

    let mut response = AppError::Panic(detail).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::PayloadTooLarge { limit: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::MalformedBody("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AssetNotFound("/index.html".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_trace_includes_source_chain() {
        let err = AppError::Io {
            path: PathBuf::from("public/index.html"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let failure = Failure::from(&err);

        assert_eq!(failure.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failure.message, "failed to read public/index.html");
        assert_eq!(failure.trace.len(), 2);
        assert!(failure.trace[0].starts_with("Io: "));
        assert!(failure.trace[1].contains("permission denied"));
    }

    #[test]
    fn test_body_development() {
        let failure = Failure::from(&AppError::Internal("database exploded".into()));
        let body = failure.body(RuntimeMode::Development);

        assert_eq!(body.error, "Internal Server Error");
        assert_eq!(body.message, "database exploded");
        assert_eq!(body.status, 500);
        assert!(body.stack.unwrap().contains("database exploded"));
    }

    #[test]
    fn test_body_production_hides_detail() {
        let failure = Failure::from(&AppError::Internal("database exploded".into()));
        let body = failure.body(RuntimeMode::Production);

        assert_eq!(body.message, GENERIC_MESSAGE);
        assert!(body.stack.is_none());

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("stack").is_none());
        assert!(!json.to_string().contains("database"));
    }

    #[test]
    fn test_error_label_follows_status() {
        let failure = Failure::from(&AppError::PayloadTooLarge { limit: 1 });
        assert_eq!(
            failure.body(RuntimeMode::Production).error,
            "Payload Too Large"
        );
    }

    #[test]
    fn test_into_response_carries_failure() {
        let response = AppError::MalformedBody("unexpected end".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.message, "malformed request body: unexpected end");
    }

    #[test]
    fn test_panic_payloads() {
        let response = panic_to_failure(Box::new("static str panic"));
        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.message, "handler panicked: static str panic");

        let response = panic_to_failure(Box::new(String::from("owned panic")));
        let failure = response.extensions().get::<Failure>().unwrap();
        assert_eq!(failure.message, "handler panicked: owned panic");
    }
}
