//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize optional subsystems (metrics)
//! - Bind the listener last, once everything else is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// Start the metrics exporter when enabled.
pub fn init_observability(config: &AppConfig) -> Result<(), StartupError> {
    let observability = &config.observability;
    if !observability.metrics_enabled {
        return Ok(());
    }

    let addr: SocketAddr = observability
        .metrics_address
        .parse()
        .map_err(|_| StartupError::MetricsAddress(observability.metrics_address.clone()))?;
    metrics::init_metrics(addr)?;
    Ok(())
}

/// Bind the HTTP listener.
pub async fn bind_listener(config: &AppConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "Listening for connections");
    }
    Ok(listener)
}
