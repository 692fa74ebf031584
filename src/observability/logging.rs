//! Structured logging.
//!
//! Uses `tracing` with an `EnvFilter`; `RUST_LOG` overrides the default
//! directives.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_DIRECTIVES: &str = "probe_server=info,tower_http=info";

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_DIRECTIVES.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
