//! Lookup over extracted records by code, name, or ECHONET Lite identifier.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::record::ManufacturerRecord;

/// `fe` + 16 bytes of hex, optionally followed by `_` + 3 bytes.
static ECHONET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fe[0-9a-f]{32}(?:_[0-9a-f]{6})?$").expect("static pattern"));

static HEX_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0[xX])?[0-9a-fA-F]+$").expect("static pattern"));

/// What a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Code,
    Name,
    EchonetId,
}

/// Lowercase, trimmed, without a leading `0x`.
fn normalize_query(query: &str) -> String {
    let lower = query.trim().to_lowercase();
    match lower.strip_prefix("0x") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Case-insensitive substring search of one kind.
///
/// An empty query matches every record. Name searches look at both the
/// Japanese and English names. [`SearchType::EchonetId`] is matched like a
/// name here; [`search_auto`] resolves identifiers to their code instead.
pub fn search<'a>(
    records: &'a [ManufacturerRecord],
    query: &str,
    kind: SearchType,
) -> Vec<&'a ManufacturerRecord> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|r| match kind {
            SearchType::Code => r.code.to_lowercase().contains(&needle),
            SearchType::Name | SearchType::EchonetId => {
                r.name_ja.to_lowercase().contains(&needle)
                    || r
                        .name_en
                        .as_deref()
                        .is_some_and(|en| en.to_lowercase().contains(&needle))
            }
        })
        .collect()
}

/// Whether `query` is an ECHONET Lite identifier, with or without the
/// trailing `_` + 3-byte suffix.
pub fn is_echonet_identifier(query: &str) -> bool {
    ECHONET_ID.is_match(&normalize_query(query))
}

/// The manufacturer code embedded in an identifier (bytes 1..4), lowercase.
pub fn extract_manufacturer_code(echonet_id: &str) -> Option<String> {
    let id = normalize_query(echonet_id);
    if !ECHONET_ID.is_match(&id) {
        return None;
    }
    Some(id[2..8].to_string())
}

/// Guess what kind of query this is.
pub fn detect_search_type(query: &str) -> SearchType {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        SearchType::Name
    } else if is_echonet_identifier(trimmed) {
        SearchType::EchonetId
    } else if HEX_CODE.is_match(trimmed) {
        SearchType::Code
    } else {
        SearchType::Name
    }
}

/// Search with the kind picked by [`detect_search_type`].
///
/// Identifiers are resolved to their embedded code first.
pub fn search_auto<'a>(records: &'a [ManufacturerRecord], query: &str) -> Vec<&'a ManufacturerRecord> {
    match detect_search_type(query) {
        SearchType::EchonetId => match extract_manufacturer_code(query) {
            Some(code) => search(records, &code, SearchType::Code),
            None => Vec::new(),
        },
        kind => search(records, query, kind),
    }
}

/// OR search over keywords separated by commas or whitespace.
///
/// Each keyword goes through [`search_auto`]. Results keep keyword order and
/// each code appears once.
pub fn search_any<'a>(records: &'a [ManufacturerRecord], query: &str) -> Vec<&'a ManufacturerRecord> {
    let keywords: Vec<&str> = query
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|k| !k.is_empty())
        .collect();

    match keywords.as_slice() {
        [] => records.iter().collect(),
        [single] => search_auto(records, single),
        many => {
            let mut seen = HashSet::new();
            let mut results = Vec::new();
            for keyword in many {
                for record in search_auto(records, keyword) {
                    if seen.insert(record.code.as_str()) {
                        results.push(record);
                    }
                }
            }
            results
        }
    }
}

/// Display form of a code, e.g. `0x00007C`.
pub fn format_code(code: &str) -> String {
    format!("0x{}", code.to_uppercase())
}
