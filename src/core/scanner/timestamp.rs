//! Timestamp policy for books and series.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::time::UNIX_EPOCH;

use super::{Book, Series};

/// The later of an entry's creation and modification times.
///
/// Some filesystems report a stale value for one of the two. Platforms
/// without creation times fall back to the modification time.
pub fn updated_time(metadata: &Metadata) -> DateTime<Utc> {
    let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
    let created = metadata.created().unwrap_or(modified);
    DateTime::<Utc>::from(created.max(modified))
}

/// Final timestamp of a series once all its books are known.
///
/// With `force_directory_modified_time` the series is at least as recent as
/// its newest book, for filesystems that don't bump a directory's mtime
/// when a file inside it changes.
pub fn finalize_series_timestamp(
    series: Series,
    books: &[Book],
    force_directory_modified_time: bool,
) -> Series {
    if !force_directory_modified_time {
        return series;
    }

    let newest_book = books.iter().map(|book| book.last_modified).max();
    match newest_book {
        Some(newest) if newest > series.last_modified => Series {
            last_modified: newest,
            ..series
        },
        _ => series,
    }
}
