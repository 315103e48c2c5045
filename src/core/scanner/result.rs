//! Scan result and the builder that assembles it directory by directory.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

use super::{finalize_series_timestamp, Book, Series};
use crate::core::sidecar::{Sidecar, SidecarSource};

/// Everything a finished directory contributes to the result
#[derive(Debug, Clone)]
pub struct CompletedDirectory {
    /// Series with the directory's own timestamp, not yet finalized
    pub series: Series,
    pub books: Vec<Book>,
    /// Series sidecars followed by resolved book sidecars
    pub sidecars: Vec<Sidecar>,
}

/// What a scan found on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Each series with its books. Book order carries no meaning.
    #[serde(serialize_with = "serialize_series")]
    pub series: HashMap<Series, Vec<Book>>,
    /// Resolved sidecars of every series and book above
    pub sidecars: Vec<Sidecar>,
}

impl ScanResult {
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn book_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn sidecar_count(&self) -> usize {
        self.sidecars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Series whose directory is `location`
    pub fn find_series(&self, location: &Path) -> Option<&Series> {
        self.series.keys().find(|series| series.location == location)
    }

    /// Books of the series whose directory is `location`
    pub fn books_of(&self, location: &Path) -> Option<&[Book]> {
        self.series
            .iter()
            .find(|(series, _)| series.location == location)
            .map(|(_, books)| books.as_slice())
    }

    /// Sidecars attached to a series directory or book file
    pub fn sidecars_of<'a>(&'a self, target: &'a Path) -> impl Iterator<Item = &'a Sidecar> + 'a {
        self.sidecars
            .iter()
            .filter(move |sidecar| sidecar.target_location == target)
    }

    /// Series sorted by location, for stable display
    pub fn sorted_series(&self) -> Vec<(&Series, &Vec<Book>)> {
        let mut entries: Vec<_> = self.series.iter().collect();
        entries.sort_by(|a, b| a.0.location.cmp(&b.0.location));
        entries
    }

    /// Counts of sidecars by source: `(series, book)`
    pub fn sidecar_counts(&self) -> (usize, usize) {
        let series = self
            .sidecars
            .iter()
            .filter(|s| s.source == SidecarSource::Series)
            .count();
        (series, self.sidecars.len() - series)
    }
}

fn serialize_series<S>(map: &HashMap<Series, Vec<Book>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct Entry<'a> {
        #[serde(flatten)]
        series: &'a Series,
        books: &'a [Book],
    }

    let mut entries: Vec<Entry<'_>> = map
        .iter()
        .map(|(series, books)| Entry { series, books })
        .collect();
    entries.sort_by(|a, b| a.series.location.cmp(&b.series.location));
    serializer.collect_seq(entries)
}

/// Collects finished directories and applies the series timestamp policy
#[derive(Debug, Default)]
pub struct ScanResultBuilder {
    force_directory_modified_time: bool,
    result: ScanResult,
}

impl ScanResultBuilder {
    pub fn new(force_directory_modified_time: bool) -> Self {
        Self {
            force_directory_modified_time,
            result: ScanResult::default(),
        }
    }

    /// Add a directory with at least one book. Empty directories are dropped.
    pub fn add(&mut self, directory: CompletedDirectory) {
        let CompletedDirectory {
            series,
            books,
            sidecars,
        } = directory;

        if books.is_empty() {
            return;
        }

        let series = finalize_series_timestamp(series, &books, self.force_directory_modified_time);
        self.result.series.insert(series, books);
        self.result.sidecars.extend(sidecars);
    }

    pub fn series_count(&self) -> usize {
        self.result.series.len()
    }

    pub fn build(self) -> ScanResult {
        self.result
    }
}
