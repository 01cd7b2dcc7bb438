//! iPhone App server library.
//!
//! Serves the progressive web app shell from a public root, a health check
//! and an info endpoint, all behind one fixed request pipeline.

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{shutdown_channel, ShutdownTrigger};
