//! Static asset stage.
//!
//! # Responsibilities
//! - Resolve request paths to files under the public root
//! - Refuse traversal (`..`), NUL bytes and dot-files
//! - Serve file bytes with an inferred content type
//!
//! # Design Decisions
//! - Only GET and HEAD are served; other methods fall through to routing
//! - A miss is not an error: the request continues down the pipeline
//! - Directories resolve to the configured index document

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;

use crate::http::error::AppError;
use crate::http::server::AppState;

/// Files served verbatim from a public root.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
    index: String,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the root index document.
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index)
    }

    /// Map a request path to a path under the root, without touching the filesystem.
    ///
    /// Returns `None` for paths that must never be served.
    pub fn candidate(&self, request_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
        if decoded.contains('\0') || decoded.contains('\\') {
            return None;
        }

        let mut path = self.root.clone();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                s if s.starts_with('.') => return None,
                s => path.push(s),
            }
        }

        Some(path)
    }

    /// Resolve a request path to an existing file.
    pub async fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let path = self.candidate(request_path)?;
        let metadata = tokio::fs::metadata(&path).await.ok()?;

        if metadata.is_file() {
            return Some(path);
        }

        if metadata.is_dir() {
            let index = path.join(&self.index);
            let is_file = tokio::fs::metadata(&index)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if is_file {
                return Some(index);
            }
        }

        None
    }

    /// Build a response for a resolved file.
    pub async fn serve(&self, path: &Path, head_only: bool) -> Result<Response, AppError> {
        let contents = tokio::fs::read(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AppError::AssetNotFound(path.display().to_string())
            } else {
                AppError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let modified = tokio::fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .ok();

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type_for(path))
            .header(header::CACHE_CONTROL, "public, max-age=0")
            .header(header::CONTENT_LENGTH, contents.len());

        if let Some(value) = modified.and_then(http_date) {
            builder = builder.header(header::LAST_MODIFIED, value);
        }

        let body = if head_only {
            Body::empty()
        } else {
            Body::from(contents)
        };

        builder
            .body(body)
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

fn http_date(time: SystemTime) -> Option<HeaderValue> {
    let datetime: DateTime<Utc> = time.into();
    HeaderValue::from_str(&datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()).ok()
}

/// Content type inferred from a file extension.
pub fn content_type_for(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "html" | "htm" => "text/html",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "css" => "text/css",
        "webmanifest" => "application/manifest+json",
        _ => {
            return mime_guess::from_path(path)
                .first_raw()
                .map(with_charset)
                .unwrap_or_else(|| "application/octet-stream".to_string())
        }
    };

    with_charset(mime)
}

fn with_charset(mime: &str) -> String {
    let textual = mime.starts_with("text/")
        || matches!(
            mime,
            "application/javascript" | "application/json" | "application/manifest+json"
        );

    if textual {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}

/// Static asset middleware: serves a hit, passes a miss through.
pub async fn serve_static(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let method = request.method();
    if method != Method::GET && method != Method::HEAD {
        return Ok(next.run(request).await);
    }

    match state.assets.resolve(request.uri().path()).await {
        Some(file) => {
            tracing::debug!(path = %request.uri().path(), file = %file.display(), "Serving static asset");
            state
                .assets
                .serve(&file, request.method() == Method::HEAD)
                .await
        }
        None => Ok(next.run(request).await),
    }
}
