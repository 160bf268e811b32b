//! Metadata for downloaded files, kept in a JSON map next to them.
//!
//! Each entry stores the validators (`Last-Modified`, `ETag`) a server sent
//! with the file, so the next download can be a conditional request.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::output::{to_json, write_json};

/// Default file name of the metadata map.
pub const CACHE_METADATA_FILE: &str = "cache-metadata.json";

/// What is known about one cached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// RFC 3339 timestamp of the download.
    pub downloaded_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Cache entries keyed by file name.
pub type CacheMetadata = BTreeMap<String, CacheEntry>;

/// Key a cached file is stored under: its file name.
pub fn cache_key(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

/// Read the metadata map. A missing or unreadable file gives an empty map.
pub fn load_metadata(path: &Path) -> CacheMetadata {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return CacheMetadata::new(),
        Err(err) => {
            warn!("Failed to load cache metadata {}: {err}", path.display());
            return CacheMetadata::new();
        }
    };

    serde_json::from_str(&text).unwrap_or_else(|err| {
        warn!("Failed to load cache metadata {}: {err}", path.display());
        CacheMetadata::new()
    })
}

/// Write the metadata map as pretty JSON.
pub fn save_metadata(path: &Path, metadata: &CacheMetadata) -> Result<()> {
    write_json(path, &to_json(metadata)?)
}

/// The entry for `file`, if both the file and its entry exist.
pub fn cache_entry(metadata_path: &Path, file: &Path) -> Option<CacheEntry> {
    if !file.is_file() {
        return None;
    }
    load_metadata(metadata_path).remove(&cache_key(file))
}

/// Insert or replace the entry for `file`.
pub fn update_cache_entry(metadata_path: &Path, file: &Path, entry: CacheEntry) -> Result<()> {
    let mut metadata = load_metadata(metadata_path);
    metadata.insert(cache_key(file), entry);
    save_metadata(metadata_path, &metadata)
}
