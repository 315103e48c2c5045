//! # Core Module
//!
//! The UI-agnostic scanning engine.
//!
//! ## Modules
//! - `scanner` - Walks a library folder and builds series and books
//! - `sidecar` - Pluggable strategies recognizing sidecar files

pub(crate) mod path_serde;
pub mod scanner;
pub mod sidecar;

// Re-export commonly used types
pub use scanner::{Book, FileSystemScanner, LibraryScanner, ScanConfig, ScanResult, Series};
pub use sidecar::{Sidecar, SidecarRegistry, SidecarSource, SidecarType};
