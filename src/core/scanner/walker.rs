//! Directory walking implementation using walkdir.
//!
//! walkdir only yields entries in pre-order. The walker keeps the stack of
//! directories it has entered and closes them as soon as an entry at the
//! same or a shallower depth shows up, which gives every visitor a
//! post-order `leave_directory` for free.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};
use walkdir::WalkDir;

use super::ScanConfig;
use crate::error::ScanError;

/// Receives the walk as a stream of enter / file / leave callbacks.
///
/// For any directory, `leave_directory` comes after the `visit_file` of
/// each of its files and after the `leave_directory` of each of its
/// subdirectories. Order between siblings is whatever the filesystem
/// returns.
pub trait DirectoryVisitor {
    fn enter_directory(&mut self, dir: &Path, metadata: &Metadata);

    fn visit_file(&mut self, file: &Path, metadata: &Metadata);

    fn leave_directory(&mut self, dir: &Path);

    /// An entry could not be read and was skipped
    fn visit_failed(&mut self, _error: &ScanError) {}
}

/// Depth-first walker applying the directory exclusion rules
#[derive(Debug, Clone)]
pub struct TreeWalker {
    /// Lower-cased exclusion substrings
    exclusions: Vec<String>,
    follow_symlinks: bool,
}

impl TreeWalker {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            exclusions: config
                .exclusions
                .iter()
                .filter(|e| !e.is_empty())
                .map(|e| e.to_lowercase())
                .collect(),
            follow_symlinks: config.follow_symlinks,
        }
    }

    /// Hidden directories and paths containing an exclusion are skipped
    pub fn is_excluded(&self, dir: &Path) -> bool {
        let hidden = dir
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with('.'));
        if hidden {
            return true;
        }

        let path = dir.to_string_lossy().to_lowercase();
        self.exclusions.iter().any(|exclusion| path.contains(exclusion.as_str()))
    }

    /// The root must be a readable directory
    pub fn ensure_accessible(root: &Path) -> Result<(), ScanError> {
        let is_dir = fs::metadata(root).map(|m| m.is_dir()).unwrap_or(false);
        if is_dir && fs::read_dir(root).is_ok() {
            Ok(())
        } else {
            Err(ScanError::not_accessible(root))
        }
    }

    /// Walk `root`, feeding every event to `visitor`.
    ///
    /// Exclusion rules apply to the root like to any other directory, so an
    /// excluded root produces no events at all. Only an inaccessible root is
    /// an error. Anything failing further down is logged, reported through
    /// [`DirectoryVisitor::visit_failed`] and skipped.
    pub fn walk<V>(&self, root: &Path, visitor: &mut V) -> Result<(), ScanError>
    where
        V: DirectoryVisitor + ?Sized,
    {
        Self::ensure_accessible(root)?;

        let mut open: Vec<PathBuf> = Vec::new();
        let mut entries = WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .into_iter()
            .filter_entry(|entry| !(entry.file_type().is_dir() && self.is_excluded(entry.path())));

        while let Some(next) = entries.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(e) => {
                    let error = walk_error(e);
                    if error.is_fatal() {
                        return Err(error);
                    }
                    warn!("Could not access: {}", error);
                    visitor.visit_failed(&error);
                    continue;
                }
            };

            close_until(&mut open, entry.depth(), visitor);

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    let error = walk_error(e);
                    if error.is_fatal() {
                        return Err(error);
                    }
                    if entry.file_type().is_dir() {
                        entries.skip_current_dir();
                    }
                    warn!("Could not access: {}", error);
                    visitor.visit_failed(&error);
                    continue;
                }
            };

            if metadata.is_dir() {
                trace!("preVisit: {}", entry.path().display());
                visitor.enter_directory(entry.path(), &metadata);
                open.push(entry.into_path());
            } else if metadata.is_file() {
                trace!("visitFile: {}", entry.path().display());
                visitor.visit_file(entry.path(), &metadata);
            }
        }

        close_until(&mut open, 0, visitor);
        Ok(())
    }
}

/// Leave open directories until only `depth` of them remain
fn close_until<V>(open: &mut Vec<PathBuf>, depth: usize, visitor: &mut V)
where
    V: DirectoryVisitor + ?Sized,
{
    while open.len() > depth {
        if let Some(dir) = open.pop() {
            trace!("postVisit: {}", dir.display());
            visitor.leave_directory(&dir);
        }
    }
}

/// Failures on the root itself are fatal, anything deeper is recoverable
fn walk_error(e: walkdir::Error) -> ScanError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();

    if e.depth() == 0 {
        ScanError::not_accessible(path)
    } else if e.io_error().map(|e| e.kind()) == Some(io::ErrorKind::PermissionDenied) {
        ScanError::PermissionDenied { path }
    } else {
        ScanError::ReadEntry {
            path,
            source: io::Error::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::{Builder, TempDir};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        failures: usize,
    }

    impl Recorder {
        fn position(&self, event: &str) -> usize {
            self.events
                .iter()
                .position(|e| e == event)
                .unwrap_or_else(|| panic!("missing event {event}: {:?}", self.events))
        }
    }

    impl DirectoryVisitor for Recorder {
        fn enter_directory(&mut self, dir: &Path, _: &Metadata) {
            self.events.push(format!("enter {}", name(dir)));
        }

        fn visit_file(&mut self, file: &Path, _: &Metadata) {
            self.events.push(format!("file {}", name(file)));
        }

        fn leave_directory(&mut self, dir: &Path) {
            self.events.push(format!("leave {}", name(dir)));
        }

        fn visit_failed(&mut self, _: &ScanError) {
            self.failures += 1;
        }
    }

    /// Temp dirs default to a `.tmp` prefix, which the walker would skip
    fn library_dir() -> TempDir {
        Builder::new().prefix("lib").tempdir().unwrap()
    }

    fn name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    fn walk(root: &Path, config: &ScanConfig) -> Recorder {
        let mut recorder = Recorder::default();
        TreeWalker::new(config).walk(root, &mut recorder).unwrap();
        recorder
    }

    #[test]
    fn leave_follows_files_and_subdirectories() {
        let temp_dir = library_dir();
        let series = temp_dir.path().join("series");
        let nested = series.join("nested");
        fs::create_dir_all(&nested).unwrap();
        File::create(series.join("a.cbz")).unwrap();
        File::create(nested.join("b.cbz")).unwrap();

        let recorder = walk(temp_dir.path(), &ScanConfig::default());

        let root_name = name(temp_dir.path());
        assert_eq!(recorder.events.first(), Some(&format!("enter {root_name}")));
        assert_eq!(recorder.events.last(), Some(&format!("leave {root_name}")));

        let enter_series = recorder.position("enter series");
        let leave_series = recorder.position("leave series");
        assert!(enter_series < recorder.position("file a.cbz"));
        assert!(recorder.position("file a.cbz") < leave_series);
        assert!(recorder.position("leave nested") < leave_series);
        assert!(recorder.position("file b.cbz") < recorder.position("leave nested"));
    }

    #[test]
    fn every_entered_directory_is_left_once() {
        let temp_dir = library_dir();
        fs::create_dir_all(temp_dir.path().join("a/b/c")).unwrap();
        fs::create_dir_all(temp_dir.path().join("d")).unwrap();

        let recorder = walk(temp_dir.path(), &ScanConfig::default());

        let enters = recorder.events.iter().filter(|e| e.starts_with("enter")).count();
        let leaves = recorder.events.iter().filter(|e| e.starts_with("leave")).count();
        assert_eq!(enters, 5);
        assert_eq!(leaves, 5);
    }

    #[test]
    fn hidden_directories_are_skipped_with_subtree() {
        let temp_dir = library_dir();
        let hidden = temp_dir.path().join(".hidden").join("deeper");
        fs::create_dir_all(&hidden).unwrap();
        File::create(hidden.join("junk.cbz")).unwrap();

        let recorder = walk(temp_dir.path(), &ScanConfig::default());

        assert!(recorder.events.iter().all(|e| !e.contains("hidden")));
        assert!(recorder.events.iter().all(|e| !e.contains("junk")));
    }

    #[test]
    fn exclusions_match_path_case_insensitively() {
        let temp_dir = library_dir();
        let excluded = temp_dir.path().join("Series").join("@EADIR").join("thumbs");
        fs::create_dir_all(&excluded).unwrap();
        File::create(excluded.join("x.cbz")).unwrap();

        let walker = TreeWalker::new(&ScanConfig::default());
        assert!(walker.is_excluded(&temp_dir.path().join("Series").join("@EADIR")));

        let recorder = walk(temp_dir.path(), &ScanConfig::default());
        assert!(recorder.events.contains(&"enter Series".to_string()));
        assert!(recorder.events.iter().all(|e| !e.contains("thumbs")));
        assert!(recorder.events.iter().all(|e| !e.contains("x.cbz")));
    }

    #[test]
    fn custom_exclusions_replace_defaults() {
        let config = ScanConfig {
            exclusions: vec!["Scans".to_string()],
            ..Default::default()
        };
        let walker = TreeWalker::new(&config);

        assert!(walker.is_excluded(Path::new("/lib/old scans/x")));
        assert!(!walker.is_excluded(Path::new("/lib/@eaDir")));
    }

    #[test]
    fn hidden_root_produces_no_events() {
        let temp_dir = library_dir();
        let root = temp_dir.path().join(".library");
        fs::create_dir_all(root.join("S")).unwrap();
        File::create(root.join("S").join("a.cbz")).unwrap();

        let recorder = walk(&root, &ScanConfig::default());
        assert!(recorder.events.is_empty());
        assert_eq!(recorder.failures, 0);
    }

    #[test]
    fn excluded_root_produces_no_events() {
        let temp_dir = library_dir();
        let root = temp_dir.path().join("@eaDir");
        fs::create_dir_all(&root).unwrap();
        File::create(root.join("a.cbz")).unwrap();

        let recorder = walk(&root, &ScanConfig::default());
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn files_are_not_excluded_by_dot_prefix_at_walk_level() {
        let temp_dir = library_dir();
        File::create(temp_dir.path().join(".DS_Store")).unwrap();

        let recorder = walk(temp_dir.path(), &ScanConfig::default());
        assert!(recorder.events.contains(&"file .DS_Store".to_string()));
    }

    #[test]
    fn missing_root_is_not_accessible() {
        let mut recorder = Recorder::default();
        let result = TreeWalker::new(&ScanConfig::default())
            .walk(Path::new("/nonexistent/library/12345"), &mut recorder);

        assert!(matches!(result, Err(ScanError::DirectoryNotAccessible { .. })));
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn file_root_is_not_accessible() {
        let temp_dir = library_dir();
        let file = temp_dir.path().join("book.cbz");
        File::create(&file).unwrap();

        let result = TreeWalker::ensure_accessible(&file);
        assert!(matches!(result, Err(ScanError::DirectoryNotAccessible { .. })));
    }

    #[test]
    fn failure_on_the_root_itself_is_fatal() {
        let temp_dir = library_dir();
        let missing = temp_dir.path().join("gone");
        let error = WalkDir::new(&missing).into_iter().next().unwrap().unwrap_err();

        let error = walk_error(error);
        assert!(error.is_fatal());
        assert_eq!(error.path(), missing.as_path());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_followed_by_default() {
        let temp_dir = library_dir();
        let root = temp_dir.path().join("root");
        let real = temp_dir.path().join("outside").join("Real");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&real).unwrap();
        File::create(real.join("1.cbz")).unwrap();
        std::os::unix::fs::symlink(&real, root.join("Link")).unwrap();

        let followed = walk(&root, &ScanConfig::default());
        assert!(followed.events.contains(&"enter Link".to_string()));
        assert!(followed.events.contains(&"file 1.cbz".to_string()));

        let config = ScanConfig {
            follow_symlinks: false,
            ..Default::default()
        };
        let not_followed = walk(&root, &config);
        assert!(!not_followed.events.contains(&"enter Link".to_string()));
        assert!(!not_followed.events.contains(&"file 1.cbz".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_reported_and_skipped() {
        let temp_dir = library_dir();
        let series = temp_dir.path().join("S");
        fs::create_dir_all(&series).unwrap();
        File::create(series.join("a.cbz")).unwrap();
        std::os::unix::fs::symlink(&series, series.join("loop")).unwrap();

        let recorder = walk(temp_dir.path(), &ScanConfig::default());

        assert_eq!(recorder.failures, 1);
        assert!(recorder.events.contains(&"file a.cbz".to_string()));
        assert!(!recorder.events.contains(&"enter loop".to_string()));
        assert!(recorder.position("file a.cbz") < recorder.position("leave S"));
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_is_reported_and_skipped() {
        let temp_dir = library_dir();
        std::os::unix::fs::symlink(
            temp_dir.path().join("missing.cbz"),
            temp_dir.path().join("link.cbz"),
        )
        .unwrap();
        File::create(temp_dir.path().join("real.cbz")).unwrap();

        let recorder = walk(temp_dir.path(), &ScanConfig::default());

        assert_eq!(recorder.failures, 1);
        assert!(recorder.events.contains(&"file real.cbz".to_string()));
        assert!(!recorder.events.contains(&"file link.cbz".to_string()));
    }
}
