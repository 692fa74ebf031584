//! OS signal handling.
//!
//! SIGTERM and SIGINT are registered up front, before the listener binds, so
//! a registration failure is a startup error rather than a lost signal. The
//! first signal of either kind starts shutdown; later ones are not observed.

use std::fmt;

/// Termination signal that was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    Interrupt,
    Terminate,
}

impl fmt::Display for TerminationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationKind::Interrupt => write!(f, "SIGINT"),
            TerminationKind::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Registered termination signal handlers.
#[cfg(unix)]
pub struct TerminationSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    pub fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the first SIGTERM or SIGINT.
    pub async fn recv(mut self) -> TerminationKind {
        let kind = tokio::select! {
            _ = self.sigterm.recv() => TerminationKind::Terminate,
            _ = self.sigint.recv() => TerminationKind::Interrupt,
        };
        tracing::info!(signal = %kind, "Received termination signal");
        kind
    }
}

/// Registered termination signal handlers (Ctrl+C only).
#[cfg(not(unix))]
pub struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    pub fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(self) -> TerminationKind {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to wait for Ctrl+C");
            std::future::pending::<()>().await;
        }
        tracing::info!(signal = "CTRL_C", "Received termination signal");
        TerminationKind::Interrupt
    }
}
