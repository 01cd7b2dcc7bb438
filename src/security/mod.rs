//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     ← headers.rs (hardening headers on every response)
//!     ← cors.rs (origin policy, preflight handling)
//! Incoming request:
//!     → limits.rs (body size cap, enforced by the body stage)
//! ```
//!
//! # Design Decisions
//! - Defense in depth: multiple layers of protection
//! - Production is strict about origins; development is permissive
//! - No trust in client input

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::{cors_layer, OriginPolicy};
pub use headers::{security_headers, SecurityHeaders};
