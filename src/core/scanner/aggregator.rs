//! Builds series, books and sidecars from walker events.
//!
//! Each entered directory gets a [`DirectoryState`] that lives exactly as
//! long as the directory is open. Because the walk is depth-first, the
//! directory owning a file is always the innermost open one, so the open
//! states form a stack.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::walker::DirectoryVisitor;
use super::{
    updated_time, Book, CompletedDirectory, PathClassifier, ScanResult, ScanResultBuilder, Series,
};
use crate::core::sidecar::{Sidecar, SidecarRegistry, SidecarSource};
use crate::error::ScanError;
use crate::events::{EventSender, ScanEvent, ScanProgress};

/// A file that passed a book sidecar prefilter but isn't bound to a book yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingSidecar {
    pub name: String,
    pub location: PathBuf,
    pub last_modified: DateTime<Utc>,
}

/// Accumulated state of one open directory
#[derive(Debug)]
struct DirectoryState {
    series: Series,
    books: Vec<Book>,
    series_sidecars: Vec<Sidecar>,
    pending: Vec<PendingSidecar>,
}

impl DirectoryState {
    fn new(series: Series) -> Self {
        Self {
            series,
            books: Vec::new(),
            series_sidecars: Vec::new(),
            pending: Vec::new(),
        }
    }
}

/// Bind pending sidecars to books.
///
/// Books are processed in the order they were found. A candidate goes to
/// the first book any strategy matches it with and is not offered to later
/// books. Candidates left over at the end are dropped.
pub(crate) fn resolve_book_sidecars(
    books: &[Book],
    mut pending: Vec<PendingSidecar>,
    registry: &SidecarRegistry,
) -> Vec<Sidecar> {
    let mut resolved = Vec::new();

    for book in books {
        if pending.is_empty() {
            break;
        }
        pending.retain(|candidate| match registry.match_book_sidecar(&book.name, &candidate.name) {
            Some(sidecar_type) => {
                resolved.push(Sidecar {
                    sidecar_location: candidate.location.clone(),
                    target_location: book.location.clone(),
                    last_modified: candidate.last_modified,
                    sidecar_type,
                    source: SidecarSource::Book,
                });
                false
            }
            None => true,
        });
    }

    if !pending.is_empty() {
        trace!("Discarding {} unmatched sidecar candidates", pending.len());
    }
    resolved
}

/// [`DirectoryVisitor`] turning a walk into a [`ScanResult`]
pub struct Aggregator<'a> {
    registry: &'a SidecarRegistry,
    classifier: PathClassifier<'a>,
    events: &'a EventSender,
    open: Vec<DirectoryState>,
    builder: ScanResultBuilder,
    directories_scanned: usize,
    books_found: usize,
    failures: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        registry: &'a SidecarRegistry,
        force_directory_modified_time: bool,
        events: &'a EventSender,
    ) -> Self {
        Self {
            registry,
            classifier: PathClassifier::new(registry),
            events,
            open: Vec::new(),
            builder: ScanResultBuilder::new(force_directory_modified_time),
            directories_scanned: 0,
            books_found: 0,
            failures: 0,
        }
    }

    /// Entries skipped because they couldn't be read
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn finish(self) -> ScanResult {
        if !self.open.is_empty() {
            warn!("{} directories were never left", self.open.len());
        }
        self.builder.build()
    }
}

impl DirectoryVisitor for Aggregator<'_> {
    fn enter_directory(&mut self, dir: &Path, metadata: &Metadata) {
        self.directories_scanned += 1;
        self.events.scan(ScanEvent::Progress(ScanProgress {
            directories_scanned: self.directories_scanned,
            books_found: self.books_found,
            current_path: dir.to_path_buf(),
        }));

        self.open
            .push(DirectoryState::new(Series::from_directory(dir, updated_time(metadata))));
    }

    fn visit_file(&mut self, file: &Path, metadata: &Metadata) {
        let Some(file_name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return;
        };

        let class = self.classifier.classify(&file_name);
        if class.is_ignored() {
            return;
        }

        let Some(parent) = file.parent() else {
            return;
        };
        let Some(state) = self
            .open
            .last_mut()
            .filter(|state| state.series.location == parent)
        else {
            debug!("No open directory for {}", file.display());
            return;
        };

        let last_modified = updated_time(metadata);

        if class.is_book {
            let book = Book::from_file(file, metadata);
            if !state.books.contains(&book) {
                state.books.push(book);
                self.books_found += 1;
            }
        }

        if let Some(sidecar_type) = class.series_sidecar {
            let sidecar = Sidecar {
                sidecar_location: file.to_path_buf(),
                target_location: parent.to_path_buf(),
                last_modified,
                sidecar_type,
                source: SidecarSource::Series,
            };
            if !state.series_sidecars.contains(&sidecar) {
                state.series_sidecars.push(sidecar);
            }
        }

        if class.is_book_sidecar_candidate {
            state.pending.push(PendingSidecar {
                name: file_name,
                location: file.to_path_buf(),
                last_modified,
            });
        }
    }

    fn leave_directory(&mut self, dir: &Path) {
        let Some(state) = self.open.pop() else {
            return;
        };
        if state.series.location != dir {
            warn!(
                "Left {} while {} was open",
                dir.display(),
                state.series.location.display()
            );
            self.open.push(state);
            return;
        }

        if state.books.is_empty() {
            return;
        }

        let DirectoryState {
            series,
            books,
            series_sidecars: mut sidecars,
            pending,
        } = state;

        sidecars.extend(resolve_book_sidecars(&books, pending, self.registry));

        self.events.scan(ScanEvent::SeriesFound {
            path: series.location.clone(),
            book_count: books.len(),
        });
        self.builder.add(CompletedDirectory {
            series,
            books,
            sidecars,
        });
    }

    fn visit_failed(&mut self, error: &ScanError) {
        self.failures += 1;
        self.events.scan(ScanEvent::Error {
            path: error.path().to_path_buf(),
            message: error.to_string(),
        });
    }
}
