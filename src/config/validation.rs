//! Configuration validation.
//!
//! Only semantic checks live here; whether the listen address can actually
//! be bound is decided at startup by the listener, where a failure is fatal.
//! All problems are collected instead of stopping at the first one.

use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listen address must not be empty")]
    EmptyAddress,
    #[error("listen address {0:?} has no port")]
    MissingPort(String),
    #[error("metrics address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
    #[error("sentinel path for {probe} must not be empty")]
    EmptySentinelPath { probe: &'static str },
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let address = config.address.trim();
    if address.is_empty() {
        errors.push(ValidationError::EmptyAddress);
    } else if !address.contains(':') {
        errors.push(ValidationError::MissingPort(config.address.clone()));
    }

    if let Some(metrics_address) = &config.metrics_address {
        if metrics_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(metrics_address.clone()));
        }
    }

    if config.not_ready_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptySentinelPath { probe: "readyz" });
    }
    if config.not_alive_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptySentinelPath { probe: "livez" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let config = ServerConfig {
            address: "  ".to_string(),
            metrics_address: Some("not-an-address".to_string()),
            not_alive_file: PathBuf::new(),
            ..ServerConfig::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyAddress,
                ValidationError::InvalidMetricsAddress("not-an-address".to_string()),
                ValidationError::EmptySentinelPath { probe: "livez" },
            ]
        );
    }

    #[test]
    fn address_without_port_is_rejected() {
        let config = ServerConfig {
            address: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MissingPort("localhost".to_string())]
        );
    }
}
