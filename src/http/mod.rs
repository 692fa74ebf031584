//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful serve)
//!     → request.rs (request ID, request-head rendering)
//!     → handlers.rs (root echo, probes, sleep, ip, request dump)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
