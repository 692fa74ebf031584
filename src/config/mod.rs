//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flags / environment (cli.rs)
//!     + optional TOML file (loader.rs)
//!     → defaults filled in (schema.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with the router and lifecycle controller
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; there is no reload path
//! - Explicit flags and environment variables beat file values
//! - Durations use Go syntax (`1s`, `250ms`) for drop-in compatibility

pub mod cli;
pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::{Profile, ServerConfig};
