//! Lifecycle controller: start serving, then sequence an orderly stop.
//!
//! ```text
//! Starting ──bind ok──▶ Serving ──signal (+ delay)──▶ Draining ──joined──▶ Stopped
//!     │
//!     └──bind error──▶ Failed
//! ```
//!
//! Transitions only move forward. Draining has no deadline: a handler that
//! never returns keeps the process alive.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::ServerConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::net::{self, InFlightTracker, ListenerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Serving,
    Draining,
    Stopped,
    Failed,
}

impl LifecycleState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: LifecycleState) -> bool {
        use LifecycleState::{Draining, Failed, Serving, Starting, Stopped};
        matches!(
            (self, next),
            (Starting, Serving) | (Starting, Failed) | (Serving, Draining) | (Draining, Stopped)
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Serving => "serving",
            LifecycleState::Draining => "draining",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Bind(#[from] ListenerError),
    #[error("serve task aborted: {0}")]
    ServeTask(#[from] tokio::task::JoinError),
}

/// Publishes lifecycle state and refuses backward transitions.
#[derive(Debug, Clone)]
struct StateCell {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl StateCell {
    fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx: Arc::new(tx) }
    }

    fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    fn advance(&self, next: LifecycleState) -> bool {
        let advanced = self.tx.send_if_modified(|state| {
            if state.can_advance_to(next) {
                *state = next;
                true
            } else {
                false
            }
        });
        if advanced {
            tracing::debug!(state = %next, "Lifecycle state changed");
        } else {
            tracing::warn!(from = %self.current(), to = %next, "Ignored illegal lifecycle transition");
        }
        advanced
    }
}

/// Entry point of the lifecycle: owns the configuration and the state.
pub struct Controller {
    config: Arc<ServerConfig>,
    state: StateCell,
}

impl Controller {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            state: StateCell::new(),
        }
    }

    /// Observe state transitions.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr), ListenerError> {
        let listener = net::bind(&self.config.address).await?;
        let local_addr = listener.local_addr().map_err(|source| ListenerError::Bind {
            address: self.config.address.clone(),
            source,
        })?;
        Ok((listener, local_addr))
    }

    /// Bind the listener and spawn the serve loop.
    ///
    /// A bind failure moves the controller to `Failed` and is not retried.
    pub async fn start(self) -> Result<Running, LifecycleError> {
        let (listener, local_addr) = match self.bind().await {
            Ok(bound) => bound,
            Err(e) => {
                tracing::error!(error = %e, "Startup failed");
                self.state.advance(LifecycleState::Failed);
                return Err(e.into());
            }
        };

        let server = HttpServer::new(Arc::clone(&self.config));
        let in_flight = server.in_flight();
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();

        let serve_task = tokio::spawn(server.run(listener, signal.clone()));
        self.state.advance(LifecycleState::Serving);

        Ok(Running {
            config: self.config,
            state: self.state,
            local_addr,
            shutdown,
            signal,
            in_flight,
            serve_task,
        })
    }
}

/// A serving instance waiting for its termination trigger.
pub struct Running {
    config: Arc<ServerConfig>,
    state: StateCell,
    local_addr: SocketAddr,
    shutdown: Shutdown,
    signal: ShutdownSignal,
    in_flight: InFlightTracker,
    serve_task: JoinHandle<Result<(), ServerError>>,
}

impl Running {
    /// Address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    /// Wait for `termination`, then delay, drain and join.
    ///
    /// `termination` is awaited exactly once.
    pub async fn run_until<F>(self, termination: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()>,
    {
        termination.await;

        let delay = self.config.effective_shutdown_delay();
        if !delay.is_zero() {
            tracing::info!(delay = ?delay, "Delaying shutdown...");
            tokio::time::sleep(delay).await;
        }

        self.state.advance(LifecycleState::Draining);
        tracing::info!(in_flight = self.in_flight.active_count(), "Shutting down...");
        self.shutdown.trigger();

        match self.serve_task.await? {
            Ok(()) => {}
            Err(e) if self.signal.is_shutdown() => {
                tracing::debug!(error = %e, "Suppressed serve error after shutdown request");
            }
            Err(e) => {
                tracing::error!(error = %e, "HTTP server exited unexpectedly");
            }
        }

        self.in_flight.drained().await;
        self.state.advance(LifecycleState::Stopped);
        Ok(())
    }
}
