//! Ordered lists of sidecar strategies supplied by the caller.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::builtin::{LocalArtworkStrategy, SeriesJsonStrategy};
use super::{BookSidecarStrategy, SeriesSidecarStrategy, SidecarType};
use crate::error::ConfigError;

struct SeriesEntry {
    strategy: Arc<dyn SeriesSidecarStrategy>,
    /// Lower-cased copy of the strategy's file names
    filenames: HashSet<String>,
}

/// Holds the book and series sidecar strategies in registration order.
///
/// Built once up front and shared read-only by every scan.
#[derive(Default)]
pub struct SidecarRegistry {
    book: Vec<Arc<dyn BookSidecarStrategy>>,
    series: Vec<SeriesEntry>,
}

impl SidecarRegistry {
    /// An empty registry: no file is ever treated as a sidecar
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in artwork and `series.json` strategies
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let artwork = Arc::new(LocalArtworkStrategy::new()?);
        Ok(Self::new()
            .with_book_strategy(artwork.clone())
            .with_series_strategy(artwork)
            .with_series_strategy(Arc::new(SeriesJsonStrategy)))
    }

    /// Append a book strategy; earlier strategies take precedence
    pub fn with_book_strategy(mut self, strategy: Arc<dyn BookSidecarStrategy>) -> Self {
        self.book.push(strategy);
        self
    }

    /// Append a series strategy; earlier strategies take precedence
    pub fn with_series_strategy(mut self, strategy: Arc<dyn SeriesSidecarStrategy>) -> Self {
        let filenames = strategy
            .series_filenames()
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        self.series.push(SeriesEntry {
            strategy,
            filenames,
        });
        self
    }

    /// Type of the first series strategy claiming `file_name`
    pub fn match_series_sidecar(&self, file_name: &str) -> Option<SidecarType> {
        if self.series.is_empty() {
            return None;
        }
        let lowered = file_name.to_lowercase();
        self.series
            .iter()
            .find(|entry| entry.filenames.contains(&lowered))
            .map(|entry| entry.strategy.series_sidecar_type())
    }

    /// Whether any book strategy's prefilter accepts `file_name`
    pub fn is_book_sidecar_candidate(&self, file_name: &str) -> bool {
        self.book
            .iter()
            .flat_map(|strategy| strategy.book_prefilter())
            .any(|prefilter| prefilter.matches(file_name))
    }

    /// Type of the first book strategy that both prefilters `sidecar_name`
    /// and matches it against `book_name`
    pub fn match_book_sidecar(&self, book_name: &str, sidecar_name: &str) -> Option<SidecarType> {
        self.book
            .iter()
            .find(|strategy| {
                strategy
                    .book_prefilter()
                    .iter()
                    .any(|prefilter| prefilter.matches(sidecar_name))
                    && strategy.is_book_match(book_name, sidecar_name)
            })
            .map(|strategy| strategy.book_sidecar_type())
    }

    pub fn book_strategy_count(&self) -> usize {
        self.book.len()
    }

    pub fn series_strategy_count(&self) -> usize {
        self.series.len()
    }
}

impl fmt::Debug for SidecarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SidecarRegistry")
            .field("book_strategies", &self.book.len())
            .field("series_strategies", &self.series.len())
            .finish()
    }
}
