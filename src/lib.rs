//! # Library Scanner
//!
//! Reconstructs a comic and e-book library from its folder layout.
//!
//! ## Core Philosophy
//! - **Read-only** - a scan never touches the files it looks at
//! - **Folders are series** - every directory holding books is a series,
//!   every supported file in it is a book
//! - **Pluggable sidecars** - cover images and metadata files are recognized
//!   by caller-supplied strategies, not by hard-coded formats
//!
//! ## Architecture
//! - `core` - The scanning engine
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{LibraryScannerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Verbosity comes from `RUST_LOG`, falling back to `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber installed by the host application wins
    let _ = tracing::subscriber::set_global_default(subscriber);
}
