//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (body cap > 0)
//! - Check header-bound values are representable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("static_files.root must not be empty")]
    EmptyStaticRoot,

    #[error("static_files.index must be a plain file name, got {0:?}")]
    InvalidIndex(String),

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("cors.origin {0:?} is not a valid header value")]
    InvalidOrigin(String),

    #[error("app.{0} must not be empty")]
    EmptyAppField(&'static str),

    #[error("observability.log_level {0:?} is not a valid filter")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.static_files.root.trim().is_empty() {
        errors.push(ValidationError::EmptyStaticRoot);
    }

    let index = &config.static_files.index;
    if index.is_empty() || index.contains('/') || index.contains('\\') || index.starts_with('.') {
        errors.push(ValidationError::InvalidIndex(index.clone()));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if let Some(origin) = &config.cors.origin {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if config.app.name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppField("name"));
    }
    if config.app.version.trim().is_empty() {
        errors.push(ValidationError::EmptyAppField("version"));
    }
    if config.app.description.trim().is_empty() {
        errors.push(ValidationError::EmptyAppField("description"));
    }
    if config.app.features.is_empty() {
        errors.push(ValidationError::EmptyAppField("features"));
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.static_files.root = "  ".to_string();
        config.limits.max_body_bytes = 0;
        config.cors.origin = Some("bad\norigin".to_string());
        config.app.features.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyStaticRoot));
        assert!(errors.contains(&ValidationError::ZeroBodyLimit));
        assert!(errors.contains(&ValidationError::EmptyAppField("features")));
        assert!(matches!(errors[2], ValidationError::InvalidOrigin(_)));
    }

    #[test]
    fn test_app_info_fields_required() {
        let mut config = AppConfig::default();
        config.app.description = " ".to_string();
        config.app.version.clear();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyAppField("version"),
                ValidationError::EmptyAppField("description"),
            ]
        );
    }

    #[test]
    fn test_index_must_be_a_file_name() {
        let mut config = AppConfig::default();
        config.static_files.index = "../secret.html".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidIndex("../secret.html".to_string())]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidMetricsAddress(_)
        ));
    }
}
