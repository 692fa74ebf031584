//! Diagnostic HTTP server library.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::{Controller, Shutdown};
