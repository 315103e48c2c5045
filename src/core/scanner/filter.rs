//! File classification for the scanner.

use std::path::Path;

use crate::core::sidecar::{SidecarRegistry, SidecarType};

/// Book extensions, compared case-insensitively
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["cbz", "zip", "cbr", "rar", "pdf", "epub"];

/// What a file name means to the scanner.
///
/// The three checks are independent; one file can be a book and a
/// sidecar candidate at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileClass {
    pub is_book: bool,
    /// Type assigned by the first series strategy claiming the name
    pub series_sidecar: Option<SidecarType>,
    /// Passed a book strategy prefilter; resolved once the directory is done
    pub is_book_sidecar_candidate: bool,
}

impl FileClass {
    pub fn is_ignored(&self) -> bool {
        !self.is_book && self.series_sidecar.is_none() && !self.is_book_sidecar_candidate
    }
}

/// Classifies file names against the supported extensions and the
/// registered sidecar strategies
#[derive(Debug, Clone, Copy)]
pub struct PathClassifier<'a> {
    registry: &'a SidecarRegistry,
}

impl<'a> PathClassifier<'a> {
    pub fn new(registry: &'a SidecarRegistry) -> Self {
        Self { registry }
    }

    /// Supported extension and not a dotfile
    pub fn is_book(file_name: &str) -> bool {
        if file_name.starts_with('.') {
            return false;
        }

        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| supported.eq_ignore_ascii_case(ext))
            })
    }

    pub fn classify(&self, file_name: &str) -> FileClass {
        FileClass {
            is_book: Self::is_book(file_name),
            series_sidecar: self.registry.match_series_sidecar(file_name),
            is_book_sidecar_candidate: self.registry.is_book_sidecar_candidate(file_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn books_match_supported_extensions() {
        for name in ["a.cbz", "a.zip", "a.cbr", "a.rar", "a.pdf", "a.epub"] {
            assert!(PathClassifier::is_book(name), "{name}");
        }
    }

    #[test]
    fn book_extension_ignores_case() {
        assert!(PathClassifier::is_book("Saga 001.CBZ"));
        assert!(PathClassifier::is_book("Dune.EpUb"));
    }

    #[test]
    fn dotfiles_are_never_books() {
        assert!(!PathClassifier::is_book("._Saga 001.cbz"));
    }

    #[test]
    fn other_files_are_not_books() {
        assert!(!PathClassifier::is_book("cover.jpg"));
        assert!(!PathClassifier::is_book("cbz"));
        assert!(!PathClassifier::is_book("archive.cbz.part"));
    }

    #[test]
    fn classification_checks_are_independent() {
        let registry = SidecarRegistry::with_defaults().unwrap();
        let classifier = PathClassifier::new(&registry);

        let cover = classifier.classify("cover.jpg");
        assert!(!cover.is_book);
        assert_eq!(cover.series_sidecar, Some(SidecarType::ARTWORK));
        assert!(cover.is_book_sidecar_candidate);

        let book = classifier.classify("Saga 001.cbz");
        assert!(book.is_book);
        assert!(book.series_sidecar.is_none());
        assert!(!book.is_book_sidecar_candidate);

        assert!(classifier.classify("notes.txt").is_ignored());
    }
}
