//! Readiness and liveness probing.
//!
//! # Data Flow
//! ```text
//! GET /readyz or /livez
//!     → sentinel.rs (stat the marker file)
//!     → present: 500, absent or unreadable: 200
//! ```
//!
//! # Design Decisions
//! - No caching; each probe call re-checks the filesystem
//! - "Cannot stat" and "does not exist" are deliberately the same answer

pub mod sentinel;

pub use sentinel::{ProbeStatus, SentinelProbe};
