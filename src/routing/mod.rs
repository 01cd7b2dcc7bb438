//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request (after static asset lookup missed)
//!     → router.rs (match method + path)
//!     → handlers.rs (health, info, index)
//!     → no match: handlers::not_found
//! ```

pub mod handlers;
pub mod router;

pub use handlers::not_found;
pub use router::route_table;
