//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown (signals.rs, shutdown.rs):
//!     SIGTERM/SIGINT or ShutdownTrigger → Stop accepting → Drain in-flight → Exit 0
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then subsystems, then listener
//! - Ordered shutdown: stop accept, drain, close

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{shutdown_channel, ShutdownTrigger};
