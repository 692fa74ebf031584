//! TCP listener binding.
//!
//! # Responsibilities
//! - Expand Go-style listen addresses (`:8080`) to every interface, IPv6
//!   and IPv4 alike
//! - Bind the configured address, failing fast on any error
//!
//! Binding is never retried: a bind failure is fatal to startup.

use std::io::ErrorKind;
use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Addresses to try, in order, for a configured listen address.
///
/// An empty host (`:8080`) means every interface: the dual-stack wildcard
/// `[::]` first, then `0.0.0.0` for hosts without IPv6. Anything else is
/// passed through untouched.
pub fn bind_candidates(address: &str) -> Vec<String> {
    let address = address.trim();
    match address.strip_prefix(':') {
        Some(port) => vec![format!("[::]:{port}"), format!("0.0.0.0:{port}")],
        None => vec![address.to_string()],
    }
}

/// Whether a failed wildcard bind should fall through to the next candidate.
/// A port that is taken or forbidden stays taken on IPv4 too.
fn try_next_candidate(err: &std::io::Error) -> bool {
    !matches!(
        err.kind(),
        ErrorKind::AddrInUse | ErrorKind::PermissionDenied
    )
}

/// Bind a TCP listener on the configured address.
///
/// Host names are resolved through the system resolver.
pub async fn bind(address: &str) -> Result<TcpListener, ListenerError> {
    let bind_error = |source| ListenerError::Bind {
        address: address.to_string(),
        source,
    };

    let mut candidates = bind_candidates(address).into_iter().peekable();
    let listener = loop {
        let Some(candidate) = candidates.next() else {
            return Err(bind_error(std::io::Error::new(
                ErrorKind::InvalidInput,
                "no address to bind",
            )));
        };
        match TcpListener::bind(candidate.as_str()).await {
            Ok(listener) => break listener,
            Err(source) if candidates.peek().is_some() && try_next_candidate(&source) => {
                tracing::debug!(candidate = %candidate, error = %source, "Bind failed, trying next address");
            }
            Err(source) => return Err(bind_error(source)),
        }
    };

    let local_addr: SocketAddr = listener.local_addr().map_err(bind_error)?;

    tracing::info!(
        address = %local_addr,
        requested = %address,
        "Listener bound"
    );

    Ok(listener)
}
