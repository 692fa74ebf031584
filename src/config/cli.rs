//! Command-line flags. Every flag falls back to an environment variable of
//! the same name in upper snake case.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::Profile;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "probe-server")]
#[command(about = "Diagnostic HTTP server for probing networking and orchestration behaviour", long_about = None)]
pub struct Cli {
    /// Address to listen on [default: :8080]
    #[arg(long, env = "ADDRESS")]
    pub address: Option<String>,

    /// Delay shutdown process by this duration, Go syntax [default: 1s]
    #[arg(long, env = "SHUTDOWN_DELAY")]
    pub shutdown_delay: Option<String>,

    /// Router and lifecycle profile [default: full]
    #[arg(long, env = "PROFILE", value_enum)]
    pub profile: Option<Profile>,

    /// Sentinel file whose presence fails /readyz [default: /tmp/not-ready]
    #[arg(long, env = "NOT_READY_FILE")]
    pub not_ready_file: Option<PathBuf>,

    /// Sentinel file whose presence fails /livez [default: /tmp/not-alive]
    #[arg(long, env = "NOT_ALIVE_FILE")]
    pub not_alive_file: Option<PathBuf>,

    /// Expose Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// Optional TOML file; explicit flags and environment take precedence
    #[arg(long, env = "PROBE_CONFIG")]
    pub config: Option<PathBuf>,
}
