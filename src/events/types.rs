//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the library scanner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
}

/// Events during a library scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning of a library root has started
    Started {
        #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
        root: PathBuf,
    },
    /// Progress update, sent when a directory is entered
    Progress(ScanProgress),
    /// A directory finished and produced a series
    SeriesFound {
        #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
        path: PathBuf,
        book_count: usize,
    },
    /// An entry could not be read but scanning continues
    Error {
        #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
        path: PathBuf,
        message: String,
    },
    /// Scanning of a library root completed
    Completed(ScanSummary),
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories entered so far
    pub directories_scanned: usize,
    /// Number of books found so far
    pub books_found: usize,
    /// Current directory being scanned
    #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
    pub current_path: PathBuf,
}

/// Summary of a finished scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
    pub root: PathBuf,
    pub series: usize,
    pub books: usize,
    pub sidecars: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
