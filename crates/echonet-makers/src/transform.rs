//! Post-extraction stage: canonical codes, validation, and the published
//! document shapes.
//!
//! Extraction keeps whatever the table says. This stage normalizes codes to
//! six uppercase hex digits, rejects invalid or repeated codes, and wraps the
//! list in either the raw archive shape (with provenance metadata) or the
//! compact application shape.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::record::ManufacturerRecord;

/// Width of a manufacturer code in hex digits.
const CODE_WIDTH: usize = 6;

static PDF_FILE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[^/]*\.pdf$").expect("static pattern"));

/// Provenance for a raw document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    pub source: String,
    /// RFC 3339 timestamp with millisecond precision, UTC.
    pub extracted_at: String,
    /// Lowercase hex SHA-256 of the source PDF.
    pub source_file_hash: String,
    pub record_count: usize,
}

/// Validated, sorted records plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawManufacturerData {
    pub metadata: RawMetadata,
    pub manufacturers: Vec<ManufacturerRecord>,
}

/// A manufacturer in the application document. `nameEn` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppManufacturer {
    pub code: String,
    pub name_ja: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
}

/// The document the search front end loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppManufacturerData {
    /// `YYYY-MM-DD`.
    pub last_updated: String,
    /// Directory URL the PDF was published under.
    pub source: String,
    pub total: usize,
    pub manufacturers: Vec<AppManufacturer>,
}

/// Canonical form of a code: surrounding whitespace trimmed, no `0x` prefix,
/// zero-padded to six digits, uppercase.
///
/// Codes already longer than six digits are left at their length.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    let digits = code
        .strip_prefix("0x")
        .or_else(|| code.strip_prefix("0X"))
        .unwrap_or(code);

    format!("{:0>width$}", digits.to_uppercase(), width = CODE_WIDTH)
}

/// `true` for exactly six uppercase hex digits.
pub fn validate_code(code: &str) -> bool {
    code.len() == CODE_WIDTH && code.bytes().all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'))
}

pub fn normalize_company_name(name: &str) -> String {
    name.trim().to_string()
}

/// Lowercase hex SHA-256 of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(sha256_hex(&bytes))
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Normalize, sort, and validate extracted records into the raw document.
///
/// # Errors
///
/// [`Error::InvalidCodes`] if any normalized code is not six hex digits,
/// [`Error::DuplicateCodes`] if a normalized code occurs more than once.
pub fn to_raw_data(
    records: &[ManufacturerRecord],
    source: &str,
    source_file_hash: &str,
    extracted_at: DateTime<Utc>,
) -> Result<RawManufacturerData> {
    let mut manufacturers: Vec<ManufacturerRecord> = records
        .iter()
        .map(|r| ManufacturerRecord {
            code: normalize_code(&r.code),
            name_ja: normalize_company_name(&r.name_ja),
            name_en: r
                .name_en
                .as_deref()
                .map(normalize_company_name)
                .filter(|n| !n.is_empty()),
        })
        .collect();
    manufacturers.sort_by(|a, b| a.code.cmp(&b.code));

    let invalid: Vec<String> = manufacturers
        .iter()
        .filter(|m| !validate_code(&m.code))
        .map(|m| m.code.clone())
        .collect();
    if !invalid.is_empty() {
        return Err(Error::InvalidCodes { codes: invalid });
    }

    let mut seen = HashSet::new();
    let duplicates: Vec<String> = manufacturers
        .iter()
        .filter(|m| !seen.insert(m.code.as_str()))
        .map(|m| m.code.clone())
        .collect();
    if !duplicates.is_empty() {
        return Err(Error::DuplicateCodes { codes: duplicates });
    }

    Ok(RawManufacturerData {
        metadata: RawMetadata {
            source: source.to_string(),
            extracted_at: extracted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source_file_hash: source_file_hash.to_string(),
            record_count: manufacturers.len(),
        },
        manufacturers,
    })
}

/// Convert the raw document into the application document.
pub fn to_app_data(raw: &RawManufacturerData, last_updated: NaiveDate) -> AppManufacturerData {
    let manufacturers: Vec<AppManufacturer> = raw
        .manufacturers
        .iter()
        .map(|m| AppManufacturer {
            code: m.code.clone(),
            name_ja: m.name_ja.clone(),
            name_en: m.name_en.clone().filter(|n| !n.is_empty()),
        })
        .collect();

    AppManufacturerData {
        last_updated: last_updated.format("%Y-%m-%d").to_string(),
        source: source_directory(&raw.metadata.source),
        total: manufacturers.len(),
        manufacturers,
    }
}

/// Strip a trailing `/<name>.pdf`, keeping the slash.
fn source_directory(source: &str) -> String {
    PDF_FILE_SUFFIX.replace(source, "/").into_owned()
}
