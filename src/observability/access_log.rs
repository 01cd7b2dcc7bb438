//! Access logging stage.
//!
//! One record per request, emitted on the `access` target after the
//! response is produced. Development logs a terse line, production the
//! Apache combined format. The response is never modified.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, Method, StatusCode, Version},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use crate::config::RuntimeMode;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

/// Access log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `GET /health 200 0.412 ms - 95`
    Dev,
    /// Apache combined log format.
    Combined,
}

impl LogFormat {
    pub fn for_mode(mode: RuntimeMode) -> Self {
        if mode.is_production() {
            LogFormat::Combined
        } else {
            LogFormat::Dev
        }
    }
}

/// Everything an access line needs about one request.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub remote_addr: Option<SocketAddr>,
    pub method: Method,
    pub uri: String,
    pub version: Version,
    pub status: StatusCode,
    pub latency: Duration,
    pub content_length: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub time: DateTime<Utc>,
}

impl AccessRecord {
    pub fn render(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Dev => self.render_dev(),
            LogFormat::Combined => self.render_combined(),
        }
    }

    fn length(&self) -> String {
        self.content_length
            .map(|len| len.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    fn render_dev(&self) -> String {
        format!(
            "{} {} {} {:.3} ms - {}",
            self.method,
            self.uri,
            self.status.as_u16(),
            self.latency.as_secs_f64() * 1000.0,
            self.length()
        )
    }

    fn render_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} {:?}\" {} {} \"{}\" \"{}\"",
            self.remote_addr
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.version,
            self.status.as_u16(),
            self.length(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Access logging middleware.
pub async fn access_log(
    State(format): State<LogFormat>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let time = Utc::now();

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let method = request.method().clone();
    let uri = request.uri().to_string();
    let path = request.uri().path().to_string();
    let version = request.version();
    let referer = header_string(request.headers(), header::REFERER);
    let user_agent = header_string(request.headers(), header::USER_AGENT);
    let request_id = header_string(request.headers(), X_REQUEST_ID)
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    let record = AccessRecord {
        remote_addr,
        method,
        uri,
        version,
        status: response.status(),
        latency: start.elapsed(),
        content_length: header_string(response.headers(), header::CONTENT_LENGTH)
            .and_then(|len| len.parse().ok()),
        referer,
        user_agent,
        time,
    };

    tracing::info!(
        target: "access",
        request_id = %request_id,
        method = %record.method,
        path = %path,
        status = record.status.as_u16(),
        latency_ms = record.latency.as_secs_f64() * 1000.0,
        "{}",
        record.render(format)
    );
    metrics::record_request(record.method.as_str(), record.status.as_u16(), start);

    response
}
