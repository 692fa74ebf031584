//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address
//!     → listener.rs (normalize, bind, fail fast)
//!     → Hand off to HTTP layer
//!
//! Every dispatched request
//!     → in_flight.rs (guard held until the handler returns)
//!     → lifecycle controller waits for zero before exiting
//! ```

pub mod in_flight;
pub mod listener;

pub use in_flight::{InFlightGuard, InFlightTracker};
pub use listener::{bind, ListenerError};
