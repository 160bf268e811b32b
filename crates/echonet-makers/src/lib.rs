//! echonet-makers: read the ECHONET Lite manufacturer code list out of the
//! consortium's PDF.
//!
//! Table detection is done by `pdfplumber`. This crate walks the detected
//! tables in document order, drops each table's header row, and keeps rows
//! whose first two cells (code and Japanese name) are non-empty.
//!
//! # Modules
//!
//! - [`extract`]: the page → table → row pipeline
//! - [`source`]: the [`TableSource`] seam and its `pdfplumber` implementation
//! - [`record`]: [`ManufacturerRecord`] and row mapping
//! - [`transform`]: code normalization and the published document shapes
//! - [`search`]: lookup by code, name, or ECHONET Lite identifier
//! - [`download`](mod@download) / [`cache`]: fetching the PDF with conditional requests
//!
//! ```ignore
//! let records = echonet_makers::extract(Path::new("list_code.pdf"))?;
//! println!("{}", echonet_makers::to_json(&records)?);
//! ```

pub mod cache;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod output;
pub mod record;
pub mod search;
pub mod source;
pub mod transform;

pub use config::{ExtractConfig, TableStrategy};
pub use download::{DownloadOptions, DownloadOutcome, DownloadStatus, download};
pub use error::{Error, Result};
pub use extract::{collect_records, extract, extract_with, records_from_table};
pub use output::{to_json, write_json};
pub use record::{Cell, ManufacturerRecord, TableGrid};
pub use source::{PdfTableSource, TableSource};
