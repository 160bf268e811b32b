//! JSON rendering and file output.

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// Pretty-print `value` with two-space indentation.
///
/// Non-ASCII text is written as-is, not `\u` escaped.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `contents` to `path` as UTF-8, replacing any existing file.
pub fn write_json(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
