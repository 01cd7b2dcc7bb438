//! iPhone App server.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                   REQUEST PIPELINE                    │
//!   Client ───────▶│ security headers → compression → cors → access log   │
//!                  │        → error stage ┐                                │
//!                  │                      ├ body parsing                   │
//!                  │                      ├ static assets (public/)        │
//!                  │                      ├ routes (/health, /api/info, /) │
//!                  │                      └ not found                      │
//!   Client ◀───────│                  one response                        │
//!                  └──────────────────────────────────────────────────────┘
//!                     config · observability · security · lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use iphone_app_server::config::load_config;
use iphone_app_server::lifecycle::startup::{bind_listener, init_observability};
use iphone_app_server::observability::logging::init_tracing;
use iphone_app_server::lifecycle::signals::termination;
use iphone_app_server::HttpServer;

#[derive(Parser)]
#[command(name = "iphone-app-server")]
#[command(about = "Serves the iPhone App web shell, health check and info API", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.observability, config.mode())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        port = config.listener.port,
        "iphone-app-server starting"
    );

    init_observability(&config)?;

    let server = HttpServer::new(config.clone())?;
    let listener = bind_listener(&config).await?;

    server.run(listener, termination()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
