//! Serde helpers for paths.
//!
//! serde refuses to serialize a path that isn't valid UTF-8, and such file
//! names are legal on Unix. Locations are written lossily instead, with
//! invalid bytes replaced by U+FFFD.

use serde::Serializer;
use std::path::Path;

pub(crate) fn serialize_lossy<P, S>(path: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: AsRef<Path>,
    S: Serializer,
{
    serializer.serialize_str(&path.as_ref().to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::path::PathBuf;

    #[derive(Serialize)]
    struct Located {
        #[serde(serialize_with = "serialize_lossy")]
        location: PathBuf,
    }

    #[test]
    fn valid_paths_serialize_unchanged() {
        let json = serde_json::to_string(&Located {
            location: PathBuf::from("/comics/Saga/Saga 001.cbz"),
        })
        .unwrap();
        assert_eq!(json, r#"{"location":"/comics/Saga/Saga 001.cbz"}"#);
    }

    #[cfg(unix)]
    #[test]
    fn invalid_utf8_is_replaced() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let location = PathBuf::from(OsStr::from_bytes(b"/comics/bad\xff.cbz"));
        let value = serde_json::to_value(Located { location }).unwrap();
        assert_eq!(value["location"], "/comics/bad\u{FFFD}.cbz");
    }
}
