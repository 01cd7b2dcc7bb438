//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, listener, graceful shutdown)
//!     → pipeline.rs (ordered stages around the route table)
//!     → request.rs (request ID)
//!     → error.rs (catch-all failure rendering)
//!     → body.rs (JSON / form parsing under the size cap)
//!     → static_files.rs (public root)
//!     → routing (route table, not found)
//!     → Send to client
//! ```

pub mod body;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod server;
pub mod static_files;

pub use body::ParsedBody;
pub use error::AppError;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
