//! # Sidecar Module
//!
//! Sidecars are auxiliary files that describe a series (its folder) or a
//! single book, e.g. `cover.jpg` next to the books or `issue-1.png` next to
//! `issue.cbz`. The scanner knows nothing about concrete sidecar formats:
//! callers register strategies in a [`SidecarRegistry`] and the scanner only
//! asks the registry questions.
//!
//! ## Matching
//! - Series sidecars are matched by exact file name (case-insensitive) while
//!   the directory is walked.
//! - Book sidecars are shortlisted by cheap prefilter patterns during the
//!   walk, then matched against each book once the directory's whole book
//!   list is known.
//!
//! In both lists the first registered strategy that matches wins.

pub mod builtin;
mod registry;

pub use builtin::{LocalArtworkStrategy, SeriesJsonStrategy};
pub use registry::SidecarRegistry;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Opaque tag a strategy assigns to the sidecars it recognizes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SidecarType(Cow<'static, str>);

impl SidecarType {
    /// Cover or thumbnail images
    pub const ARTWORK: SidecarType = SidecarType(Cow::Borrowed("ARTWORK"));
    /// Structured metadata files
    pub const METADATA: SidecarType = SidecarType(Cow::Borrowed("METADATA"));

    pub fn new(tag: impl Into<String>) -> Self {
        SidecarType(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SidecarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a sidecar describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SidecarSource {
    Series,
    Book,
}

/// A sidecar file bound to the series folder or book file it describes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sidecar {
    /// Path of the sidecar file itself
    #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
    pub sidecar_location: PathBuf,
    /// Series directory or book file this sidecar belongs to
    #[serde(serialize_with = "crate::core::path_serde::serialize_lossy")]
    pub target_location: PathBuf,
    pub last_modified: DateTime<Utc>,
    pub sidecar_type: SidecarType,
    pub source: SidecarSource,
}

/// A filename-only pattern used to shortlist book sidecar candidates.
///
/// The pattern must match the whole file name.
#[derive(Debug, Clone)]
pub struct SidecarPrefilter {
    pattern: String,
    anchored: Regex,
}

impl SidecarPrefilter {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            anchored,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.anchored.is_match(file_name)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Recognizes sidecars describing a whole series by their exact file name.
pub trait SeriesSidecarStrategy: Send + Sync {
    /// File names this strategy claims, compared case-insensitively
    fn series_filenames(&self) -> Vec<String>;

    /// Type assigned to matched sidecars
    fn series_sidecar_type(&self) -> SidecarType;
}

/// Recognizes sidecars describing a single book.
///
/// Matching happens in two steps: [`book_prefilter`](Self::book_prefilter)
/// while the directory is walked, then [`is_book_match`](Self::is_book_match)
/// once every book of the directory is known.
pub trait BookSidecarStrategy: Send + Sync {
    fn book_prefilter(&self) -> &[SidecarPrefilter];

    /// Whether `sidecar_name` describes the book whose name (file name
    /// without extension) is `book_name`
    fn is_book_match(&self, book_name: &str, sidecar_name: &str) -> bool;

    fn book_sidecar_type(&self) -> SidecarType;
}
