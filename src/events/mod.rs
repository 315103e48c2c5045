//! # Events Module
//!
//! Progress reporting for UI layers.
//!
//! ## Design
//! The scanner emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. Events are
//! informational only; the scan result never depends on them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Scan(ScanEvent::Progress(p)) = event {
//!             println!("{} books so far", p.books_found);
//!         }
//!     }
//! });
//!
//! scanner.scan_root_with_events(root, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
