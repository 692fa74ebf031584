//! Configuration schema definitions.
//!
//! `ServerConfig` is the resolved, immutable configuration handed to every
//! subsystem. `FileConfig` is the optional on-disk TOML form; every field is
//! optional so a file only needs to carry what it overrides.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ADDRESS: &str = ":8080";
pub const DEFAULT_SHUTDOWN_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_NOT_READY_FILE: &str = "/tmp/not-ready";
pub const DEFAULT_NOT_ALIVE_FILE: &str = "/tmp/not-alive";

/// Which flavour of the router and lifecycle to run.
///
/// `Full` serves `/request`, stamps the instance header on `/`, sends unknown
/// paths to the root echo handler and honours the shutdown delay. `Minimal`
/// drops all of that: unknown paths are 404 and shutdown starts immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Full,
    Minimal,
}

impl Profile {
    pub fn serves_request_dump(self) -> bool {
        matches!(self, Profile::Full)
    }

    pub fn sends_instance_header(self) -> bool {
        matches!(self, Profile::Full)
    }

    /// Unmatched paths fall through to the root echo handler.
    pub fn root_is_catch_all(self) -> bool {
        matches!(self, Profile::Full)
    }

    pub fn honours_shutdown_delay(self) -> bool {
        matches!(self, Profile::Full)
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Full => write!(f, "full"),
            Profile::Minimal => write!(f, "minimal"),
        }
    }
}

/// Resolved server configuration. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Listen address, `host:port` or Go-style `:port`.
    pub address: String,

    /// Pause between the termination signal and listener closure.
    pub shutdown_delay: Duration,

    pub profile: Profile,

    /// Presence flips `/readyz` to 500.
    pub not_ready_file: PathBuf,

    /// Presence flips `/livez` to 500.
    pub not_alive_file: PathBuf,

    /// Prometheus exporter bind address. Exporter is off when unset.
    pub metrics_address: Option<String>,

    /// Host identifier reported by `/` and `/sleep`.
    pub hostname: String,
}

impl ServerConfig {
    /// The delay the lifecycle controller actually applies.
    pub fn effective_shutdown_delay(&self) -> Duration {
        if self.profile.honours_shutdown_delay() {
            self.shutdown_delay
        } else {
            Duration::ZERO
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            shutdown_delay: DEFAULT_SHUTDOWN_DELAY,
            profile: Profile::default(),
            not_ready_file: PathBuf::from(DEFAULT_NOT_READY_FILE),
            not_alive_file: PathBuf::from(DEFAULT_NOT_ALIVE_FILE),
            metrics_address: None,
            hostname: String::from("localhost"),
        }
    }
}

/// On-disk configuration (TOML).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub address: Option<String>,

    /// Go duration syntax, e.g. `"1s"` or `"250ms"`.
    pub shutdown_delay: Option<String>,

    pub profile: Option<Profile>,
    pub not_ready_file: Option<PathBuf>,
    pub not_alive_file: Option<PathBuf>,
    pub metrics_address: Option<String>,
}
