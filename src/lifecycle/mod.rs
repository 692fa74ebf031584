//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs, controller.rs):
//!     Resolve hostname → Bind listener (fatal on error) → Spawn serve task
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → termination future resolves (first signal only)
//!
//! Shutdown (controller.rs, shutdown.rs):
//!     Optional delay → Stop accepting → Drain in-flight → Join serve task
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bind error is fatal and never retried
//! - Ordered shutdown: delay, stop accept, drain, join
//! - Drain has no deadline

pub mod controller;
pub mod shutdown;
pub mod signals;
pub mod startup;

use std::sync::Arc;

pub use controller::{Controller, LifecycleError, LifecycleState, Running};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::{TerminationKind, TerminationSignals};

use crate::config::ServerConfig;

/// Serve until the first termination signal, then shut down gracefully.
pub async fn run(config: Arc<ServerConfig>, signals: TerminationSignals) -> Result<(), LifecycleError> {
    let running = Controller::new(config).start().await?;
    running
        .run_until(async move {
            signals.recv().await;
        })
        .await
}
