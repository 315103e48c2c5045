//! # Scanner Module
//!
//! Turns a library folder into series, books and sidecars using nothing but
//! the filesystem layout.
//!
//! ## Layout rules
//! - Every directory holding at least one supported book is a series.
//! - A book belongs to the directory it sits in; nesting depth is irrelevant.
//! - Directories starting with `.`, or whose path contains a configured
//!   exclusion, are skipped along with everything below them.
//!
//! ## Supported Formats
//! cbz, zip, cbr, rar, pdf, epub (case-insensitive)
//!
//! ## Example
//! ```rust,ignore
//! use library_scanner::core::scanner::{FileSystemScanner, LibraryScanner, ScanConfig};
//! use library_scanner::core::sidecar::SidecarRegistry;
//!
//! let scanner = FileSystemScanner::builder()
//!     .config(ScanConfig::default())
//!     .registry(SidecarRegistry::with_defaults()?)
//!     .build();
//! let result = scanner.scan_root("/srv/comics".as_ref())?;
//! ```

mod aggregator;
mod config;
mod filter;
mod fs_scanner;
mod result;
mod timestamp;
mod walker;

pub use aggregator::Aggregator;
pub use config::{ScanConfig, DEFAULT_EXCLUSIONS};
pub use filter::{FileClass, PathClassifier, SUPPORTED_EXTENSIONS};
pub use fs_scanner::{FileSystemScanner, FileSystemScannerBuilder};
pub use result::{CompletedDirectory, ScanResult, ScanResultBuilder};
pub use timestamp::{finalize_series_timestamp, updated_time};
pub use walker::{DirectoryVisitor, TreeWalker};

use crate::error::ScanError;
use crate::events::EventSender;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A directory holding at least one book
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Series {
    /// Directory name, or the full path when the directory has no name
    pub name: String,
    /// Path of the directory
    #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
    pub location: PathBuf,
    /// Last update time, see [`updated_time`]
    pub last_modified: DateTime<Utc>,
}

impl Series {
    pub fn from_directory(dir: &Path, last_modified: DateTime<Utc>) -> Self {
        Self {
            name: dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.to_string_lossy().into_owned()),
            location: dir.to_path_buf(),
            last_modified,
        }
    }
}

/// A supported media file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    /// File name without extension
    pub name: String,
    /// Path of the file
    #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
    pub location: PathBuf,
    pub last_modified: DateTime<Utc>,
    /// File size in bytes
    pub file_size: u64,
}

impl Book {
    pub fn from_file(path: &Path, metadata: &std::fs::Metadata) -> Self {
        Self {
            name: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            location: path.to_path_buf(),
            last_modified: updated_time(metadata),
            file_size: metadata.len(),
        }
    }
}

/// Trait for library scanners
pub trait LibraryScanner: Send + Sync {
    /// Walk `root` and describe every series, book and sidecar below it
    fn scan_root(&self, root: &Path) -> Result<ScanResult, ScanError>;

    /// Same as [`scan_root`](Self::scan_root), reporting progress via events
    fn scan_root_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;

    /// Describe a single book file without walking its directory.
    ///
    /// Returns `Ok(None)` when the file no longer exists.
    fn scan_file(&self, path: &Path) -> Result<Option<Book>, ScanError>;
}
