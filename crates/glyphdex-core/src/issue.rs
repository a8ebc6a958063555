//! Error and per-entry issue types for scanning and extraction.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Hard failures: an inability to even begin an operation. Partial
/// failures during a run never surface here; they collect as
/// [`ScanIssue`]s inside the result instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Classification of a recoverable per-entry issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum IssueCode {
    /// Failed to enumerate a directory.
    ReadDir,
    /// Failed to read a file.
    ReadFile,
    /// Failed to read entry metadata.
    Metadata,
    /// An I/O operation exceeded the per-item timeout.
    Timeout,
    /// A generated artifact could not be parsed.
    Extract,
}

/// Non-fatal issue encountered during a scan or extraction. Processing
/// continues past every one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanIssue {
    /// Path where the issue occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Issue classification.
    pub code: IssueCode,
}

impl ScanIssue {
    /// Create a new issue.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, code: IssueCode) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code,
        }
    }

    /// Directory enumeration failure.
    pub fn read_dir(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Cannot list directory: {error}"), IssueCode::ReadDir)
    }

    /// File read failure.
    pub fn read_file(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Cannot read file: {error}"), IssueCode::ReadFile)
    }

    /// Per-item timeout expiry.
    pub fn timeout(path: impl Into<PathBuf>, limit_ms: u64) -> Self {
        Self::new(
            path,
            format!("Operation exceeded {limit_ms}ms timeout"),
            IssueCode::Timeout,
        )
    }

    /// Unparseable generated artifact.
    pub fn extract(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(path, message, IssueCode::Extract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_io_classification() {
        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ScanError::PermissionDenied { .. }));

        let err = ScanError::io(
            "/test/path",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_issue_constructors() {
        let issue = ScanIssue::timeout("/slow/dir", 5000);
        assert_eq!(issue.code, IssueCode::Timeout);
        assert!(issue.message.contains("5000ms"));
        assert_eq!(IssueCode::ReadDir.to_string(), "read-dir");
    }
}
