//! # Error Module
//!
//! Error types for the library scanner.
//!
//! ## Two tiers
//! - **Fatal** - the library root itself cannot be read. The scan stops and
//!   no partial result is returned.
//! - **Recoverable** - a single file or directory could not be read. The
//!   entry is skipped and the scan carries on.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error code attached to an inaccessible library root
pub const ERR_DIRECTORY_NOT_ACCESSIBLE: &str = "ERR_1016";

/// Top-level application error
#[derive(Error, Debug)]
pub enum LibraryScannerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Errors that occur while scanning a library
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Folder is not accessible: {path} ({code})")]
    DirectoryNotAccessible { path: PathBuf, code: &'static str },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// The fatal error raised when a library root can't be scanned
    pub fn not_accessible(path: impl Into<PathBuf>) -> Self {
        ScanError::DirectoryNotAccessible {
            path: path.into(),
            code: ERR_DIRECTORY_NOT_ACCESSIBLE,
        }
    }

    /// The entry the error is about
    pub fn path(&self) -> &Path {
        match self {
            ScanError::DirectoryNotAccessible { path, .. }
            | ScanError::PermissionDenied { path }
            | ScanError::ReadEntry { path, .. } => path,
        }
    }

    /// Whether this error aborts the whole scan
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::DirectoryNotAccessible { .. })
    }
}

/// Errors that occur while loading scanner configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid sidecar pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, LibraryScannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_accessible_includes_path_and_code() {
        let error = ScanError::not_accessible("/comics/missing");
        let message = error.to_string();
        assert!(message.contains("/comics/missing"));
        assert!(message.contains("ERR_1016"));
        assert!(error.is_fatal());
        assert_eq!(error.path(), Path::new("/comics/missing"));
    }

    #[test]
    fn entry_errors_are_recoverable() {
        let error = ScanError::PermissionDenied {
            path: PathBuf::from("/comics/locked"),
        };
        assert!(!error.is_fatal());

        let error = ScanError::ReadEntry {
            path: PathBuf::from("/comics/gone.cbz"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(!error.is_fatal());
        assert!(error.to_string().contains("gone.cbz"));
    }

    #[test]
    fn json_error_converts_to_output_error() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: LibraryScannerError = source.into();
        assert!(matches!(error, LibraryScannerError::Output(_)));
    }

    #[test]
    fn scan_error_converts_to_top_level() {
        let error: LibraryScannerError = ScanError::not_accessible("/x").into();
        assert!(error.to_string().starts_with("Scanning error"));
    }
}
