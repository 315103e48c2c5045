//! Sidecar strategies shipped with the crate.
//!
//! Nothing in the scanner depends on these; they are registered through
//! [`SidecarRegistry::with_defaults`](super::SidecarRegistry::with_defaults)
//! or by hand.

use super::{BookSidecarStrategy, SeriesSidecarStrategy, SidecarPrefilter, SidecarType};
use crate::error::ConfigError;

/// Image extensions accepted as local artwork
pub const ARTWORK_EXTENSIONS: [&str; 5] = ["png", "jpeg", "jpg", "tbn", "webp"];

/// Base names of series-level artwork
pub const SERIES_ARTWORK_NAMES: [&str; 5] = ["cover", "default", "folder", "poster", "series"];

/// Cover images stored next to the books.
///
/// - Series artwork: `cover.jpg`, `folder.png`, `poster.webp`, ...
/// - Book artwork: `<book>.jpg` or `<book>-<n>.jpg` for extra pages,
///   e.g. `Saga 001-1.png` for `Saga 001.cbz`.
#[derive(Debug, Clone)]
pub struct LocalArtworkStrategy {
    prefilter: Vec<SidecarPrefilter>,
}

impl LocalArtworkStrategy {
    pub fn new() -> Result<Self, ConfigError> {
        let prefilter = ARTWORK_EXTENSIONS
            .iter()
            .map(|ext| SidecarPrefilter::new(&format!(r"(?i).*\.{ext}")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { prefilter })
    }

    fn is_artwork_extension(ext: &str) -> bool {
        ARTWORK_EXTENSIONS
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }
}

impl SeriesSidecarStrategy for LocalArtworkStrategy {
    fn series_filenames(&self) -> Vec<String> {
        SERIES_ARTWORK_NAMES
            .iter()
            .flat_map(|name| ARTWORK_EXTENSIONS.iter().map(move |ext| format!("{name}.{ext}")))
            .collect()
    }

    fn series_sidecar_type(&self) -> SidecarType {
        SidecarType::ARTWORK
    }
}

impl BookSidecarStrategy for LocalArtworkStrategy {
    fn book_prefilter(&self) -> &[SidecarPrefilter] {
        &self.prefilter
    }

    fn is_book_match(&self, book_name: &str, sidecar_name: &str) -> bool {
        // <book>[-<digits>].<ext>, compared case-insensitively
        let book_name = book_name.to_lowercase();
        let sidecar_name = sidecar_name.to_lowercase();

        let Some(rest) = sidecar_name.strip_prefix(&book_name) else {
            return false;
        };
        let Some((suffix, ext)) = rest.rsplit_once('.') else {
            return false;
        };
        if !Self::is_artwork_extension(ext) {
            return false;
        }

        match suffix.strip_prefix('-') {
            None => suffix.is_empty(),
            Some(digits) => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
        }
    }

    fn book_sidecar_type(&self) -> SidecarType {
        SidecarType::ARTWORK
    }
}

/// `series.json` metadata files as written by Mylar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesJsonStrategy;

impl SeriesSidecarStrategy for SeriesJsonStrategy {
    fn series_filenames(&self) -> Vec<String> {
        vec!["series.json".to_string()]
    }

    fn series_sidecar_type(&self) -> SidecarType {
        SidecarType::METADATA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artwork() -> LocalArtworkStrategy {
        LocalArtworkStrategy::new().unwrap()
    }

    #[test]
    fn series_filenames_cover_every_name_and_extension() {
        let names = artwork().series_filenames();
        assert_eq!(names.len(), 25);
        assert!(names.contains(&"cover.jpg".to_string()));
        assert!(names.contains(&"poster.webp".to_string()));
    }

    #[test]
    fn prefilter_accepts_images_only() {
        let strategy = artwork();
        let accepts = |name: &str| strategy.book_prefilter().iter().any(|p| p.matches(name));
        assert!(accepts("Saga 001.jpg"));
        assert!(accepts("Saga 001-2.WEBP"));
        assert!(!accepts("Saga 001.cbz"));
        assert!(!accepts("notes.txt"));
    }

    #[test]
    fn book_match_accepts_plain_and_numbered_artwork() {
        let strategy = artwork();
        assert!(strategy.is_book_match("Saga 001", "Saga 001.jpg"));
        assert!(strategy.is_book_match("Saga 001", "saga 001-12.PNG"));
    }

    #[test]
    fn book_match_rejects_other_books_and_suffixes() {
        let strategy = artwork();
        assert!(!strategy.is_book_match("Saga 001", "Saga 002.jpg"));
        assert!(!strategy.is_book_match("Saga 001", "Saga 001-cover.jpg"));
        assert!(!strategy.is_book_match("Saga 001", "Saga 001-.jpg"));
        assert!(!strategy.is_book_match("Saga 001", "Saga 001.txt"));
        assert!(!strategy.is_book_match("Saga 001", "Saga 0012.jpg"));
    }

    #[test]
    fn series_json_is_metadata() {
        assert_eq!(SeriesJsonStrategy.series_filenames(), vec!["series.json"]);
        assert_eq!(SeriesJsonStrategy.series_sidecar_type(), SidecarType::METADATA);
    }
}
