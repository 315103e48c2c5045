//! # CLI Module
//!
//! Command-line interface for the library scanner.
//!
//! ## Usage
//! ```bash
//! # Scan a library
//! library-scan scan ~/Comics
//!
//! # Several libraries at once, skipping a trash folder
//! library-scan scan ~/Comics ~/Books --exclude ".Trash"
//!
//! # List every book and sidecar
//! library-scan scan ~/Comics --verbose
//!
//! # JSON output
//! library-scan scan ~/Comics --output json
//!
//! # Re-read a single book
//! library-scan file ~/Comics/Saga/Saga\ 001.cbz
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use library_scanner::core::scanner::{
    Book, FileSystemScanner, LibraryScanner, ScanConfig, ScanResult,
};
use library_scanner::core::sidecar::{SidecarRegistry, SidecarSource};
use library_scanner::error::{LibraryScannerError, Result, ScanError};
use library_scanner::events::{Event, EventChannel, ScanEvent};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Library Scanner - Map a comic library from its folders
#[derive(Parser, Debug)]
#[command(name = "library-scan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan library folders for series, books and sidecars
    Scan {
        /// Library roots to scan
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Skip directories whose path contains this text (repeatable,
        /// replaces the configured exclusions)
        #[arg(short = 'x', long = "exclude")]
        exclusions: Vec<String>,

        /// Bump each series' timestamp to its newest book
        #[arg(long)]
        force_directory_modified_time: bool,

        /// Don't follow symbolic links
        #[arg(long)]
        no_follow_symlinks: bool,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Describe a single book file
    File {
        /// Path of the book
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (book paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            roots,
            exclusions,
            force_directory_modified_time,
            no_follow_symlinks,
            config,
            output,
            verbose,
        } => {
            library_scanner::init_tracing(if verbose { "info" } else { "warn" });

            let mut scan_config = match config {
                Some(path) => ScanConfig::from_json_file(&path)?,
                None => ScanConfig::default(),
            };
            if !exclusions.is_empty() {
                scan_config.exclusions = exclusions;
            }
            scan_config.force_directory_modified_time |= force_directory_modified_time;
            if no_follow_symlinks {
                scan_config.follow_symlinks = false;
            }

            run_scan(roots, scan_config, output, verbose)
        }
        Commands::File { path, output } => {
            library_scanner::init_tracing("warn");
            run_file(&path, output)
        }
    }
}

fn build_scanner(config: ScanConfig) -> Result<FileSystemScanner> {
    Ok(FileSystemScanner::builder()
        .config(config)
        .registry(SidecarRegistry::with_defaults()?)
        .build())
}

fn run_scan(
    roots: Vec<PathBuf>,
    config: ScanConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Library Scanner").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let scanner = build_scanner(config)?;

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::with_template("{spinner:.green} {pos} books {msg}") {
            pb.set_style(spinner);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        let mut errors = Vec::new();
        for event in receiver.iter() {
            match event {
                Event::Scan(ScanEvent::Progress(p)) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_position(p.books_found as u64);
                        pb.set_message(display_path(&p.current_path));
                    }
                }
                Event::Scan(ScanEvent::Error { path, message }) => {
                    errors.push((path, message));
                }
                _ => {}
            }
        }
        errors
    });

    let results = scanner.scan_roots(&roots, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    let skipped = event_thread.join().unwrap_or_default();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &results, &skipped, verbose),
        OutputFormat::Json => print_json_results(&results)?,
        OutputFormat::Minimal => print_minimal_results(&results),
    }

    // Exit with the first inaccessible root, after everything was reported
    match results.into_iter().find_map(|(_, result)| result.err()) {
        Some(error) => Err(LibraryScannerError::Scan(error)),
        None => Ok(()),
    }
}

fn run_file(path: &Path, output: OutputFormat) -> Result<()> {
    let scanner = build_scanner(ScanConfig::default())?;
    let book = scanner.scan_file(path)?;

    match (output, book) {
        (OutputFormat::Json, book) => {
            println!("{}", serde_json::to_string_pretty(&book)?);
        }
        (OutputFormat::Minimal, Some(book)) => println!("{}", book.location.display()),
        (OutputFormat::Pretty, Some(book)) => print_book(&Term::stdout(), &book),
        (_, None) => {
            Term::stderr()
                .write_line(&format!(
                    "{} {} no longer exists",
                    style("✗").red(),
                    display_path(path)
                ))
                .ok();
        }
    }

    Ok(())
}

fn print_book(term: &Term, book: &Book) {
    term.write_line(&format!("{}", style(&book.name).bold())).ok();
    term.write_line(&format!("  {}", display_path(&book.location)))
        .ok();
    term.write_line(&format!(
        "  {} · modified {}",
        format_bytes(book.file_size),
        book.last_modified.format("%Y-%m-%d %H:%M:%S")
    ))
    .ok();
}

fn print_pretty_results(
    term: &Term,
    results: &[(PathBuf, std::result::Result<ScanResult, ScanError>)],
    skipped: &[(PathBuf, String)],
    verbose: bool,
) {
    for (root, result) in results {
        let result = match result {
            Ok(result) => result,
            Err(error) => {
                term.write_line(&format!("{} {}", style("✗").red().bold(), error))
                    .ok();
                term.write_line("").ok();
                continue;
            }
        };

        term.write_line(&format!(
            "{} {}",
            style("✓").green().bold(),
            style(display_path(root)).bold()
        ))
        .ok();

        let (series_sidecars, book_sidecars) = result.sidecar_counts();
        let total_size: u64 = result.series.values().flatten().map(|b| b.file_size).sum();
        term.write_line(&format!(
            "  {} series, {} books ({})",
            style(result.series_count()).cyan(),
            style(result.book_count()).cyan(),
            style(format_bytes(total_size)).yellow()
        ))
        .ok();
        term.write_line(&format!(
            "  {} series sidecars, {} book sidecars",
            style(series_sidecars).cyan(),
            style(book_sidecars).cyan()
        ))
        .ok();

        if verbose {
            term.write_line("").ok();
            for (series, books) in result.sorted_series() {
                term.write_line(&format!(
                    "  {} ({} books)",
                    style(&series.name).bold(),
                    books.len()
                ))
                .ok();
                for sidecar in result.sidecars_of(&series.location) {
                    term.write_line(&format!(
                        "    {} {} [{}]",
                        style("◆").magenta(),
                        file_name(&sidecar.sidecar_location),
                        sidecar.sidecar_type
                    ))
                    .ok();
                }

                let mut books: Vec<&Book> = books.iter().collect();
                books.sort_by(|a, b| a.name.cmp(&b.name));
                for book in books {
                    term.write_line(&format!(
                        "    {} {} {}",
                        style("○").dim(),
                        book.name,
                        style(format_bytes(book.file_size)).dim()
                    ))
                    .ok();
                    for sidecar in result
                        .sidecars_of(&book.location)
                        .filter(|s| s.source == SidecarSource::Book)
                    {
                        term.write_line(&format!(
                            "      {} {} [{}]",
                            style("◇").magenta(),
                            file_name(&sidecar.sidecar_location),
                            sidecar.sidecar_type
                        ))
                        .ok();
                    }
                }
            }
        }

        term.write_line("").ok();
    }

    if !skipped.is_empty() {
        term.write_line(&format!(
            "{} {} entries could not be read",
            style("!").yellow().bold(),
            skipped.len()
        ))
        .ok();
        if verbose {
            for (path, message) in skipped {
                term.write_line(&format!("    {} {}", display_path(path), style(message).dim()))
                    .ok();
            }
        }
    }
}

/// JSON entry for one library root; a result that can't be serialized
/// is reported like a failed scan
fn library_json(root: &Path, result: &std::result::Result<ScanResult, ScanError>) -> Value {
    let root = root.to_string_lossy();
    let error = match result {
        Ok(result) => match serde_json::to_value(result) {
            Ok(value) => {
                return json!({
                    "root": root,
                    "series_count": result.series_count(),
                    "book_count": result.book_count(),
                    "sidecar_count": result.sidecar_count(),
                    "result": value,
                })
            }
            Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
    };

    json!({ "root": root, "error": error })
}

fn print_json_results(
    results: &[(PathBuf, std::result::Result<ScanResult, ScanError>)],
) -> Result<()> {
    let libraries: Vec<Value> = results
        .iter()
        .map(|(root, result)| library_json(root, result))
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "libraries": libraries }))?
    );
    Ok(())
}

fn print_minimal_results(results: &[(PathBuf, std::result::Result<ScanResult, ScanError>)]) {
    for (_, result) in results {
        if let Ok(result) = result {
            for (_, books) in result.sorted_series() {
                for book in books {
                    println!("{}", book.location.display());
                }
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    let relative = dirs::home_dir().and_then(|home| {
        path.strip_prefix(&home)
            .ok()
            .map(|rest| format!("~/{}", rest.display()))
    });
    relative.unwrap_or_else(|| path.display().to_string())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_root_becomes_error_entry() {
        let root = Path::new("/nonexistent/comics");
        let value = library_json(root, &Err(ScanError::not_accessible(root)));

        assert_eq!(value["root"], "/nonexistent/comics");
        assert!(value["error"].as_str().unwrap().contains("ERR_1016"));
        assert!(value.get("result").is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_book_names_are_written_lossily() {
        use std::ffi::OsStr;
        use std::fs;
        use std::os::unix::ffi::OsStrExt;
        use tempfile::Builder;

        let temp_dir = Builder::new().prefix("lib").tempdir().unwrap();
        fs::write(temp_dir.path().join(OsStr::from_bytes(b"bad\xff.cbz")), b"x").unwrap();

        let scanner = FileSystemScanner::builder().build();
        let result = scanner.scan_root(temp_dir.path());
        let value = library_json(temp_dir.path(), &result);

        assert_eq!(value["book_count"], 1);
        let location = value["result"]["series"][0]["books"][0]["location"]
            .as_str()
            .unwrap();
        assert!(location.ends_with("bad\u{FFFD}.cbz"));
    }
}
