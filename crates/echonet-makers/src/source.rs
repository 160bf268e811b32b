//! Where table grids come from.
//!
//! [`TableSource`] is the only view the pipeline has of a document: a page
//! count and, per page, the grids the table finder detected. [`PdfTableSource`]
//! backs it with `pdfplumber`; a slice of pre-built pages backs it in memory.

use std::path::Path;

use pdfplumber::{Pdf, TableSettings};
use tracing::debug;

use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::record::TableGrid;

/// A document that can report its detected tables page by page.
pub trait TableSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Tables detected on the page at `index` (0-based), in page order.
    fn page_tables(&self, index: usize) -> Result<Vec<TableGrid>>;
}

/// Pages held in memory, each a list of table grids.
impl TableSource for [Vec<TableGrid>] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_tables(&self, index: usize) -> Result<Vec<TableGrid>> {
        Ok(self.get(index).cloned().unwrap_or_default())
    }
}

/// A PDF opened with `pdfplumber`.
///
/// The parsed document is owned by this value and released when it drops.
pub struct PdfTableSource {
    pdf: Pdf,
    settings: TableSettings,
}

impl PdfTableSource {
    /// Open the PDF at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `path` is not an existing file, and
    /// [`Error::Extraction`] if the file is not a readable PDF.
    pub fn open(path: &Path, config: &ExtractConfig) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }

        let pdf = Pdf::open_file(path, None)?;
        debug!(path = %path.display(), pages = pdf.page_count(), "opened PDF");

        Ok(Self {
            pdf,
            settings: config.table_settings(),
        })
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(bytes: &[u8], config: &ExtractConfig) -> Result<Self> {
        let pdf = Pdf::open(bytes, None)?;
        Ok(Self {
            pdf,
            settings: config.table_settings(),
        })
    }
}

impl TableSource for PdfTableSource {
    fn page_count(&self) -> usize {
        self.pdf.page_count()
    }

    fn page_tables(&self, index: usize) -> Result<Vec<TableGrid>> {
        let page = self.pdf.page(index)?;
        Ok(page.extract_tables(&self.settings))
    }
}
