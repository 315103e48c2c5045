//! Library scanner backed by the local filesystem.

use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::{
    Aggregator, Book, LibraryScanner, ScanConfig, ScanResult, TreeWalker, SUPPORTED_EXTENSIONS,
};
use crate::core::sidecar::SidecarRegistry;
use crate::error::ScanError;
use crate::events::{null_sender, EventSender, ScanEvent, ScanSummary};

/// Builder for [`FileSystemScanner`]
#[derive(Debug, Default)]
pub struct FileSystemScannerBuilder {
    config: ScanConfig,
    registry: Option<Arc<SidecarRegistry>>,
}

impl FileSystemScannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory exclusion substrings
    pub fn exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.config.exclusions = exclusions;
        self
    }

    pub fn force_directory_modified_time(mut self, force: bool) -> Self {
        self.config.force_directory_modified_time = force;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.follow_symlinks = follow;
        self
    }

    /// Sidecar strategies; without one no sidecars are detected
    pub fn registry(mut self, registry: SidecarRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Share one registry between several scanners
    pub fn shared_registry(mut self, registry: Arc<SidecarRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> FileSystemScanner {
        FileSystemScanner {
            config: self.config,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(SidecarRegistry::new())),
        }
    }
}

/// Scans library folders on the local filesystem
#[derive(Debug, Clone)]
pub struct FileSystemScanner {
    config: ScanConfig,
    registry: Arc<SidecarRegistry>,
}

impl FileSystemScanner {
    pub fn new(config: ScanConfig, registry: Arc<SidecarRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn builder() -> FileSystemScannerBuilder {
        FileSystemScannerBuilder::new()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn registry(&self) -> &SidecarRegistry {
        &self.registry
    }

    /// Scan independent library roots in parallel.
    ///
    /// Results come back in the order of `roots`; one root failing doesn't
    /// affect the others.
    pub fn scan_roots(
        &self,
        roots: &[PathBuf],
        events: &EventSender,
    ) -> Vec<(PathBuf, Result<ScanResult, ScanError>)> {
        roots
            .par_iter()
            .map(|root| (root.clone(), self.scan_root_with_events(root, events)))
            .collect()
    }
}

impl LibraryScanner for FileSystemScanner {
    fn scan_root(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_root_with_events(root, &null_sender())
    }

    fn scan_root_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        info!("Scanning folder: {}", root.display());
        info!("Supported extensions: {:?}", SUPPORTED_EXTENSIONS);
        info!("Excluded patterns: {:?}", self.config.exclusions);
        info!(
            "Force directory modified time: {}",
            self.config.force_directory_modified_time
        );

        events.scan(ScanEvent::Started {
            root: root.to_path_buf(),
        });

        let start = Instant::now();
        let mut aggregator = Aggregator::new(
            &self.registry,
            self.config.force_directory_modified_time,
            events,
        );
        if let Err(error) = TreeWalker::new(&self.config).walk(root, &mut aggregator) {
            events.scan(ScanEvent::Error {
                path: error.path().to_path_buf(),
                message: error.to_string(),
            });
            return Err(error);
        }

        let failures = aggregator.failures();
        let result = aggregator.finish();
        let elapsed = start.elapsed();

        info!(
            "Scanned {} series, {} books, and {} sidecars in {:?}",
            result.series_count(),
            result.book_count(),
            result.sidecar_count(),
            elapsed
        );
        if failures > 0 {
            info!("{} entries could not be accessed", failures);
        }

        events.scan(ScanEvent::Completed(ScanSummary {
            root: root.to_path_buf(),
            series: result.series_count(),
            books: result.book_count(),
            sidecars: result.sidecar_count(),
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }));

        Ok(result)
    }

    fn scan_file(&self, path: &Path) -> Result<Option<Book>, ScanError> {
        match fs::metadata(path) {
            Ok(metadata) => Ok(Some(Book::from_file(path, &metadata))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("File no longer exists: {}", path.display());
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(ScanError::PermissionDenied {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(ScanError::ReadEntry {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
