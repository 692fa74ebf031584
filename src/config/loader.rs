//! Configuration resolution: defaults, then the optional TOML file, then
//! explicit flags and environment variables.

use std::fs;
use std::path::Path;

use crate::config::cli::Cli;
use crate::config::duration::{parse_go_duration, DurationError};
use crate::config::schema::{FileConfig, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid shutdown delay: {0}")]
    ShutdownDelay(#[from] DurationError),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML configuration file.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Build the final configuration from parsed flags.
pub fn load_config(cli: &Cli, hostname: String) -> Result<ServerConfig, ConfigError> {
    let file = match &cli.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };
    resolve(cli, file, hostname)
}

/// Merge flags over file values over defaults, then validate.
pub fn resolve(cli: &Cli, file: FileConfig, hostname: String) -> Result<ServerConfig, ConfigError> {
    let defaults = ServerConfig::default();

    let shutdown_delay = match cli.shutdown_delay.as_deref().or(file.shutdown_delay.as_deref()) {
        Some(raw) => parse_go_duration(raw)?,
        None => defaults.shutdown_delay,
    };

    let config = ServerConfig {
        address: cli.address.clone().or(file.address).unwrap_or(defaults.address),
        shutdown_delay,
        profile: cli.profile.or(file.profile).unwrap_or(defaults.profile),
        not_ready_file: cli
            .not_ready_file
            .clone()
            .or(file.not_ready_file)
            .unwrap_or(defaults.not_ready_file),
        not_alive_file: cli
            .not_alive_file
            .clone()
            .or(file.not_alive_file)
            .unwrap_or(defaults.not_alive_file),
        metrics_address: cli.metrics_address.clone().or(file.metrics_address),
        hostname,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Profile;
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn empty_inputs_yield_defaults() {
        let config = resolve(&Cli::default(), FileConfig::default(), "pod-a".into()).unwrap();
        assert_eq!(
            config,
            ServerConfig {
                hostname: "pod-a".into(),
                ..ServerConfig::default()
            }
        );
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli {
            address: Some("127.0.0.1:7000".into()),
            shutdown_delay: Some("0".into()),
            ..Cli::default()
        };
        let file = FileConfig {
            address: Some("0.0.0.0:9000".into()),
            shutdown_delay: Some("10s".into()),
            profile: Some(Profile::Minimal),
            not_alive_file: Some(PathBuf::from("/var/run/dead")),
            ..FileConfig::default()
        };

        let config = resolve(&cli, file, "pod-b".into()).unwrap();
        assert_eq!(config.address, "127.0.0.1:7000");
        assert_eq!(config.shutdown_delay, Duration::ZERO);
        assert_eq!(config.profile, Profile::Minimal);
        assert_eq!(config.not_alive_file, PathBuf::from("/var/run/dead"));
        assert_eq!(config.not_ready_file, PathBuf::from("/tmp/not-ready"));
    }

    #[test]
    fn bad_shutdown_delay_is_an_error() {
        let cli = Cli {
            shutdown_delay: Some("soon".into()),
            ..Cli::default()
        };
        let err = resolve(&cli, FileConfig::default(), "pod".into()).unwrap_err();
        assert!(matches!(err, ConfigError::ShutdownDelay(_)));
    }

    #[test]
    fn validation_errors_are_surfaced() {
        let cli = Cli {
            metrics_address: Some("nope".into()),
            ..Cli::default()
        };
        let err = resolve(&cli, FileConfig::default(), "pod".into()).unwrap_err();
        assert!(err.to_string().contains("metrics address"));
    }

    #[test]
    fn loads_config_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "address = \"127.0.0.1:8181\"\nshutdown-delay = \"1m30s\"").unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..Cli::default()
        };
        let config = load_config(&cli, "pod".into()).unwrap();
        assert_eq!(config.address, "127.0.0.1:8181");
        assert_eq!(config.shutdown_delay, Duration::from_secs(90));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Cli::default()
        };
        assert!(matches!(
            load_config(&cli, "pod".into()),
            Err(ConfigError::Io { .. })
        ));
    }
}
