//! probe-server
//!
//! A small diagnostic HTTP server for poking at networking and orchestration
//! behaviour: it echoes requests, answers readiness/liveness from sentinel
//! files, sleeps on demand, reports the caller's address, and shuts down
//! gracefully on SIGTERM/SIGINT.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ net::listener ──▶ http::server (router + middleware) ──▶ http::handlers
//!                                       │                                   │
//!                                       └── net::in_flight ◀────────────────┘
//!
//!   lifecycle::controller: bind → serve task → signal → delay → drain → join
//! ```

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use probe_server::config::{load_config, Cli};
use probe_server::lifecycle::{self, startup, TerminationSignals};
use probe_server::observability::{init_logging, metrics};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let hostname = startup::resolve_hostname();

    let config = match load_config(&cli, hostname) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %config.address,
        profile = %config.profile,
        shutdown_delay = ?config.effective_shutdown_delay(),
        hostname = %config.hostname,
        "probe-server starting"
    );

    let signals = match TerminationSignals::register() {
        Ok(signals) => signals,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register signal handlers");
            return ExitCode::FAILURE;
        }
    };

    if let Some(metrics_address) = &config.metrics_address {
        match metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(metrics_address = %metrics_address, "Failed to parse metrics address");
            }
        }
    }

    match lifecycle::run(config, signals).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
