//! The extraction pipeline: pages → tables → rows → records.

use std::path::Path;

use tracing::{debug, info};

use crate::config::ExtractConfig;
use crate::error::Result;
use crate::record::{Cell, ManufacturerRecord};
use crate::source::{PdfTableSource, TableSource};

/// Tables need a header plus at least one data row.
const MIN_TABLE_ROWS: usize = 2;

/// Extract manufacturer records from the PDF at `path` with default settings.
///
/// Records come back in document order: page, then table, then row.
///
/// # Errors
///
/// [`Error::NotFound`](crate::Error::NotFound) if `path` is not a file,
/// [`Error::Extraction`](crate::Error::Extraction) if the PDF cannot be read.
pub fn extract(path: &Path) -> Result<Vec<ManufacturerRecord>> {
    extract_with(path, &ExtractConfig::default())
}

/// Like [`extract`], with explicit table detection settings.
pub fn extract_with(path: &Path, config: &ExtractConfig) -> Result<Vec<ManufacturerRecord>> {
    info!("Extracting data from {}...", path.display());
    let source = PdfTableSource::open(path, config)?;
    collect_records(&source)
}

/// Run every page of `source` through the row filter.
///
/// Any page failure aborts the whole run.
pub fn collect_records<S: TableSource + ?Sized>(source: &S) -> Result<Vec<ManufacturerRecord>> {
    let mut records = Vec::new();

    for index in 0..source.page_count() {
        let tables = source.page_tables(index)?;
        debug!(page = index + 1, tables = tables.len(), "scanning page");

        for table in &tables {
            records.extend(records_from_table(table));
        }
    }

    Ok(records)
}

/// Records from one table grid, skipping the header row.
///
/// Tables with fewer than two rows yield nothing.
pub fn records_from_table(table: &[Vec<Cell>]) -> impl Iterator<Item = ManufacturerRecord> + '_ {
    let data_rows: &[Vec<Cell>] = if table.len() < MIN_TABLE_ROWS {
        &[][..]
    } else {
        &table[1..]
    };

    data_rows
        .iter()
        .filter_map(|row| ManufacturerRecord::from_row(row))
}
