//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Environment string that switches the server into production behavior.
pub const PRODUCTION: &str = "production";

/// Allowed origin used in production when none is configured.
pub const DEFAULT_PRODUCTION_ORIGIN: &str = "your-domain.com";

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Runtime environment name (e.g. "development", "production").
    pub environment: String,

    /// Static asset settings.
    pub static_files: StaticFilesConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Response compression.
    pub compression: CompressionConfig,

    /// Security response headers.
    pub security: SecurityConfig,

    /// Descriptor served by `/api/info`.
    pub app: AppInfoConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            environment: "development".to_string(),
            static_files: StaticFilesConfig::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
            compression: CompressionConfig::default(),
            security: SecurityConfig::default(),
            app: AppInfoConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Runtime mode derived from the environment string.
    pub fn mode(&self) -> RuntimeMode {
        RuntimeMode::from_environment(&self.environment)
    }
}

/// Production is restrictive and terse, everything else is development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    pub fn from_environment(environment: &str) -> Self {
        if environment == PRODUCTION {
            RuntimeMode::Production
        } else {
            RuntimeMode::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == RuntimeMode::Production
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g. "0.0.0.0").
    pub host: String,

    /// TCP port. Zero asks the OS for an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    /// Address suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory served as the public root.
    pub root: String,

    /// Document served for directory requests and for `/`.
    pub index: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: "public".to_string(),
            index: "index.html".to_string(),
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum parsed body size in bytes (JSON and form bodies).
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Cross-origin policy configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origin in production. Ignored in development.
    pub origin: Option<String>,
}

impl CorsConfig {
    /// The single origin allowed in production.
    pub fn production_origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_PRODUCTION_ORIGIN)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompressionConfig {
    pub enabled: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
        }
    }
}

/// Application descriptor served by `/api/info`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppInfoConfig {
    pub name: String,
    pub version: String,
    pub description: String,
    pub features: Vec<String>,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            name: "iPhone App".to_string(),
            version: "1.0.0".to_string(),
            description: "A modern, responsive web application optimized for iPhone devices"
                .to_string(),
            features: vec![
                "Mobile-first responsive design".to_string(),
                "Progressive Web App capabilities".to_string(),
                "Production-ready security".to_string(),
                "Performance optimized".to_string(),
            ],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.listener.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.environment, "development");
        assert_eq!(config.mode(), RuntimeMode::Development);
        assert_eq!(config.limits.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.app.name, "iPhone App");
        assert_eq!(config.app.features.len(), 4);
    }

    #[test]
    fn test_runtime_mode() {
        assert!(RuntimeMode::from_environment("production").is_production());
        assert!(!RuntimeMode::from_environment("development").is_production());
        assert!(!RuntimeMode::from_environment("test").is_production());
        // Exact match only, as the environment string is echoed verbatim.
        assert!(!RuntimeMode::from_environment("Production").is_production());
    }

    #[test]
    fn test_production_origin_fallback() {
        let mut cors = CorsConfig::default();
        assert_eq!(cors.production_origin(), DEFAULT_PRODUCTION_ORIGIN);

        cors.origin = Some("https://app.example.com".to_string());
        assert_eq!(cors.production_origin(), "https://app.example.com");
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            environment = "production"

            [listener]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert!(config.mode().is_production());
        assert_eq!(config.static_files.root, "public");
    }
}
