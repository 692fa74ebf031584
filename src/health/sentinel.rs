//! Sentinel-file probes.
//!
//! An external operator creates or removes a marker file to flip a probe.
//! Only existence matters, never content. Every check hits the filesystem so
//! the answer is as fresh as the request.

use std::path::PathBuf;

use axum::http::StatusCode;

/// Probe state derived from a sentinel file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Passing,
    Failing,
}

impl ProbeStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            ProbeStatus::Passing => StatusCode::OK,
            ProbeStatus::Failing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A probe that fails while its marker file exists.
#[derive(Debug, Clone)]
pub struct SentinelProbe {
    name: &'static str,
    path: PathBuf,
}

impl SentinelProbe {
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            path: path.into(),
        }
    }

    /// Check the sentinel now.
    ///
    /// A metadata error of any kind (missing file, permission denied, broken
    /// parent directory) reads as "absent", so the probe passes.
    pub async fn check(&self) -> ProbeStatus {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => {
                tracing::debug!(probe = self.name, path = %self.path.display(), "Sentinel present");
                ProbeStatus::Failing
            }
            Err(_) => ProbeStatus::Passing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flips_with_file_presence() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("not-ready");
        let probe = SentinelProbe::new("readyz", &marker);

        assert_eq!(probe.check().await, ProbeStatus::Passing);

        std::fs::write(&marker, b"").unwrap();
        assert_eq!(probe.check().await, ProbeStatus::Failing);

        std::fs::remove_file(&marker).unwrap();
        assert_eq!(probe.check().await, ProbeStatus::Passing);
    }

    #[tokio::test]
    async fn directories_count_as_present() {
        let dir = tempfile::tempdir().unwrap();
        let probe = SentinelProbe::new("livez", dir.path());
        assert_eq!(probe.check().await, ProbeStatus::Failing);
    }

    #[tokio::test]
    async fn unreachable_path_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"x").unwrap();

        // A path "under" a regular file cannot be stat'ed.
        let probe = SentinelProbe::new("livez", file.join("not-alive"));
        assert_eq!(probe.check().await, ProbeStatus::Passing);
    }

    #[test]
    fn status_codes() {
        assert_eq!(ProbeStatus::Passing.status_code(), StatusCode::OK);
        assert_eq!(
            ProbeStatus::Failing.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
