//! # library-scan CLI
//!
//! Command-line interface for the library scanner.
//!
//! ## Usage
//! ```bash
//! library-scan scan ~/Comics --exclude "#recycle"
//! library-scan scan ~/Comics ~/Books --output json
//! library-scan file ~/Comics/Saga/Saga\ 001.cbz
//! ```

mod cli;

use library_scanner::Result;

fn main() -> Result<()> {
    cli::run()
}
