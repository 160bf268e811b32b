//! The manufacturer record and the row-to-record mapping.

use serde::{Deserialize, Serialize};

/// One cell of a detected table, as reported by the table finder.
pub type Cell = Option<String>;

/// A detected table: rows of optional cell text.
pub type TableGrid = Vec<Vec<Cell>>;

/// Placeholder the code list uses for "no English name".
const NO_NAME_PLACEHOLDER: &str = "-";

/// A manufacturer entry from the code list.
///
/// `code` and `name_ja` are always non-empty. `name_en` is `None` when the
/// source cell was empty or held the `-` placeholder, and serializes as
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerRecord {
    pub code: String,
    pub name_ja: String,
    pub name_en: Option<String>,
}

impl ManufacturerRecord {
    /// Build a record from a table row, or `None` if the row does not hold one.
    ///
    /// Cell 0 is the code, cell 1 the Japanese name and cell 2 (optional) the
    /// English name. Missing cells and `None` cells read as empty.
    pub fn from_row(row: &[Cell]) -> Option<Self> {
        let code = cell_text(row, 0);
        let name_ja = cell_text(row, 1);
        if code.is_empty() || name_ja.is_empty() {
            return None;
        }

        Some(Self {
            code: code.to_string(),
            name_ja: name_ja.to_string(),
            name_en: normalize_name_en(cell_text(row, 2)),
        })
    }
}

/// Trimmed text of the cell at `index`, or `""` if absent.
pub fn cell_text(row: &[Cell], index: usize) -> &str {
    row.get(index)
        .and_then(|cell| cell.as_deref())
        .map(str::trim)
        .unwrap_or("")
}

/// Map an English name cell to an optional value.
///
/// Empty, whitespace-only, and `-` all become `None`.
pub fn normalize_name_en(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_NAME_PLACEHOLDER {
        None
    } else {
        Some(trimmed.to_string())
    }
}
