//! Scanner configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Directory exclusions applied when none are configured
pub const DEFAULT_EXCLUSIONS: [&str; 3] = ["#recycle", "@eaDir", "@Recycle"];

/// Configuration for a library scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directories whose full path contains one of these (case-insensitive)
    /// are skipped with their whole subtree
    pub exclusions: Vec<String>,
    /// Bump each series' timestamp to its newest book
    pub force_directory_modified_time: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            force_directory_modified_time: false,
            follow_symlinks: true,
        }
    }
}

impl ScanConfig {
    /// Load a JSON config file; missing keys fall back to defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
