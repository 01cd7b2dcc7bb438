//! Security response headers.
//!
//! # Responsibilities
//! - Attach a fixed set of hardening headers to every response
//! - Declare a self-only Content-Security-Policy
//!
//! # Design Decisions
//! - Headers are overwritten, never merged with what a handler set
//! - Runs outermost so 404s and error responses carry them too

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Content-Security-Policy directives, in emission order.
pub const CSP_DIRECTIVES: &[(&str, &[&str])] = &[
    ("default-src", &["'self'"]),
    ("style-src", &["'self'", "'unsafe-inline'"]),
    ("script-src", &["'self'"]),
    ("img-src", &["'self'", "data:", "https:"]),
    ("connect-src", &["'self'"]),
    ("font-src", &["'self'"]),
    ("object-src", &["'none'"]),
    ("media-src", &["'self'"]),
    ("frame-src", &["'none'"]),
    ("base-uri", &["'self'"]),
    ("form-action", &["'self'"]),
    ("frame-ancestors", &["'none'"]),
    ("script-src-attr", &["'none'"]),
    ("upgrade-insecure-requests", &[]),
];

/// Render the CSP header value.
pub fn content_security_policy() -> String {
    CSP_DIRECTIVES
        .iter()
        .map(|(name, sources)| {
            if sources.is_empty() {
                (*name).to_string()
            } else {
                format!("{} {}", name, sources.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Precomputed header set applied to every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: HeaderMap,
}

impl SecurityHeaders {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        let mut set = |name: &'static str, value: HeaderValue| {
            headers.insert(HeaderName::from_static(name), value);
        };

        // The CSP is built from static ASCII parts.
        if let Ok(csp) = HeaderValue::from_str(&content_security_policy()) {
            set("content-security-policy", csp);
        }
        set("x-content-type-options", HeaderValue::from_static("nosniff"));
        set("x-frame-options", HeaderValue::from_static("DENY"));
        // "0" turns off the legacy XSS auditor, which could itself be abused.
        set("x-xss-protection", HeaderValue::from_static("0"));
        set("referrer-policy", HeaderValue::from_static("no-referrer"));
        set(
            "strict-transport-security",
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        );
        set("cross-origin-opener-policy", HeaderValue::from_static("same-origin"));
        set("cross-origin-resource-policy", HeaderValue::from_static("same-origin"));
        set("origin-agent-cluster", HeaderValue::from_static("?1"));
        set("x-dns-prefetch-control", HeaderValue::from_static("off"));
        set("x-download-options", HeaderValue::from_static("noopen"));
        set("x-permitted-cross-domain-policies", HeaderValue::from_static("none"));

        Self { headers }
    }

    /// Overwrite the security headers on a response header map.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware attaching [`SecurityHeaders`] to every response.
pub async fn security_headers(
    State(headers): State<SecurityHeaders>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    headers.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_value() {
        let csp = content_security_policy();
        assert!(csp.starts_with("default-src 'self'; style-src 'self' 'unsafe-inline';"));
        assert!(csp.contains("img-src 'self' data: https:"));
        assert!(csp.contains("object-src 'none'"));
        assert!(csp.contains("frame-src 'none'"));
        assert!(csp.contains("frame-ancestors 'none'"));
        assert!(csp.ends_with("; upgrade-insecure-requests"));
    }

    #[test]
    fn test_header_set() {
        let headers = SecurityHeaders::new();
        assert_eq!(headers.len(), 12);

        let mut target = HeaderMap::new();
        target.insert("x-frame-options", HeaderValue::from_static("SAMEORIGIN"));
        headers.apply(&mut target);

        assert_eq!(target["x-frame-options"], "DENY");
        assert_eq!(target["x-content-type-options"], "nosniff");
        assert_eq!(target["x-xss-protection"], "0");
        assert!(target.contains_key("content-security-policy"));
    }
}
