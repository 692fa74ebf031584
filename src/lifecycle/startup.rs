//! Startup helpers.
//!
//! The host identifier is resolved once, before configuration is frozen.

use std::fs;

const HOSTNAME_SOURCES: &[&str] = &["/proc/sys/kernel/hostname", "/etc/hostname"];

/// Resolve the host identifier reported by the root and sleep handlers.
///
/// Tries the kernel hostname, then `/etc/hostname`, then `$HOSTNAME`. Falls
/// back to `"localhost"` so the value is never empty.
pub fn resolve_hostname() -> String {
    HOSTNAME_SOURCES
        .iter()
        .find_map(|path| fs::read_to_string(path).ok())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .and_then(|raw| first_nonempty_line(&raw))
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine hostname, using localhost");
            String::from("localhost")
        })
}

fn first_nonempty_line(raw: &str) -> Option<String> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_never_empty() {
        assert!(!resolve_hostname().is_empty());
    }

    #[test]
    fn trims_file_contents() {
        assert_eq!(first_nonempty_line("pod-abc\n"), Some("pod-abc".to_string()));
        assert_eq!(first_nonempty_line("\n  web-1  \n"), Some("web-1".to_string()));
        assert_eq!(first_nonempty_line("  \n"), None);
    }
}
