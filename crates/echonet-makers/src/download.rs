//! Fetching the code list PDF, with conditional requests against a local cache.
//!
//! A file that is already on disk with a [`CacheEntry`] is revalidated with
//! `If-Modified-Since` / `If-None-Match`; a `304` keeps the local copy. Other
//! failures are retried with a linear backoff, except `404`, which fails at
//! once. If the server cannot be reached at all, a cached copy is used and the
//! outcome carries a warning.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use tracing::{debug, warn};

use crate::cache::{CACHE_METADATA_FILE, CacheEntry, cache_entry, update_cache_entry};
use crate::error::{Error, Result};
use crate::transform::sha256_hex;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

const USER_AGENT: &str = concat!("echonet-makers/", env!("CARGO_PKG_VERSION"));

/// Where to fetch from, where to store it, and how hard to try.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub url: String,
    /// Local path of the downloaded file.
    pub dest: PathBuf,
    /// Metadata map holding the file's cache entry.
    pub metadata_path: PathBuf,
    /// Attempts before giving up. Zero is treated as one.
    pub max_retries: u32,
    /// Skip the cache and download unconditionally.
    pub force: bool,
    /// Base delay; attempt `n` waits `n * retry_delay` before the next one.
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl DownloadOptions {
    /// Defaults: metadata in `cache-metadata.json` beside `dest`, three
    /// attempts, one second of backoff per attempt.
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        let dest = dest.into();
        let metadata_path = dest
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CACHE_METADATA_FILE);

        Self {
            url: url.into(),
            dest,
            metadata_path,
            max_retries: DEFAULT_MAX_RETRIES,
            force: false,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

/// How the local file was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    CacheHit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub status: DownloadStatus,
    pub path: PathBuf,
    /// Size in bytes of the local file.
    pub size: u64,
    /// Set when a cached copy stands in for a failed download.
    pub warning: Option<String>,
}

/// Result of one request that reached the server.
enum Reply {
    /// `304` to a conditional request.
    NotModified,
    Body {
        bytes: Vec<u8>,
        last_modified: Option<String>,
        etag: Option<String>,
    },
    Status(StatusCode),
}

/// Make sure `options.dest` holds a current copy of `options.url`.
pub fn download(options: &DownloadOptions) -> Result<DownloadOutcome> {
    let client = Client::builder()
        .timeout(options.timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| download_error(options, err.to_string()))?;

    let cached = if options.force {
        None
    } else {
        cache_entry(&options.metadata_path, &options.dest)
    };
    let attempts = options.max_retries.max(1);

    let mut attempt = 0;
    loop {
        attempt += 1;
        let last = attempt == attempts;
        debug!("GET {} (attempt {attempt}/{attempts})", options.url);

        match request(&client, &options.url, cached.as_ref()) {
            Ok(Reply::NotModified) => {
                return Ok(cache_hit(options, cached.as_ref(), None));
            }
            Ok(Reply::Body {
                bytes,
                last_modified,
                etag,
            }) => return save(options, &bytes, last_modified, etag),
            Ok(Reply::Status(StatusCode::NOT_FOUND)) => {
                return Err(download_error(options, "file not found (404)".to_string()));
            }
            Ok(Reply::Status(status)) => {
                if last {
                    return Err(download_error(
                        options,
                        format!("HTTP {} after {attempts} attempts", status.as_u16()),
                    ));
                }
                warn!("HTTP {} from {}, retrying", status.as_u16(), options.url);
            }
            Err(err) => {
                if last && cached.is_some() {
                    return Ok(cache_hit(
                        options,
                        cached.as_ref(),
                        Some(format!("network error, using cache: {err}")),
                    ));
                }
                if last {
                    return Err(download_error(
                        options,
                        format!("network error after {attempts} attempts: {err}"),
                    ));
                }
                warn!("Network error fetching {}: {err}, retrying", options.url);
            }
        }

        thread::sleep(options.retry_delay * attempt);
    }
}

fn request(
    client: &Client,
    url: &str,
    cached: Option<&CacheEntry>,
) -> std::result::Result<Reply, reqwest::Error> {
    let mut request = client.get(url);
    if let Some(entry) = cached {
        if let Some(last_modified) = &entry.last_modified {
            request = request.header(IF_MODIFIED_SINCE, last_modified);
        }
        if let Some(etag) = &entry.etag {
            request = request.header(IF_NONE_MATCH, etag);
        }
    }

    let response = request.send()?;
    let status = response.status();
    if status == StatusCode::NOT_MODIFIED && cached.is_some() {
        return Ok(Reply::NotModified);
    }
    if !status.is_success() {
        return Ok(Reply::Status(status));
    }

    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let last_modified = header(LAST_MODIFIED);
    let etag = header(ETAG);
    let bytes = response.bytes()?.to_vec();

    Ok(Reply::Body {
        bytes,
        last_modified,
        etag,
    })
}

/// Write the body to `dest` and record its cache entry.
fn save(
    options: &DownloadOptions,
    bytes: &[u8],
    last_modified: Option<String>,
    etag: Option<String>,
) -> Result<DownloadOutcome> {
    if let Some(parent) = options.dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&options.dest, bytes).map_err(|source| Error::Write {
        path: options.dest.clone(),
        source,
    })?;

    let size = bytes.len() as u64;
    let entry = CacheEntry {
        url: options.url.clone(),
        last_modified,
        etag,
        size,
        downloaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        sha256: Some(sha256_hex(bytes)),
    };
    update_cache_entry(&options.metadata_path, &options.dest, entry)?;
    debug!("Saved {} bytes to {}", size, options.dest.display());

    Ok(DownloadOutcome {
        status: DownloadStatus::Downloaded,
        path: options.dest.clone(),
        size,
        warning: None,
    })
}

fn cache_hit(
    options: &DownloadOptions,
    cached: Option<&CacheEntry>,
    warning: Option<String>,
) -> DownloadOutcome {
    DownloadOutcome {
        status: DownloadStatus::CacheHit,
        path: options.dest.clone(),
        size: cached.map_or(0, |entry| entry.size),
        warning,
    }
}

fn download_error(options: &DownloadOptions, message: String) -> Error {
    Error::Download {
        url: options.url.clone(),
        message,
    }
}
