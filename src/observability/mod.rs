//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Per-request spans come from tower-http's TraceLayer in the HTTP server,
//! tagged with the request ID.
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
