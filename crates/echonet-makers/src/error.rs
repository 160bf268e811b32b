//! Error types for download, extraction, transformation, and output.
//!
//! Uses [`thiserror`] for error derivation. Every variant is fatal: the
//! pipeline never recovers locally, so callers either get the complete
//! result or one of these.

use std::path::PathBuf;

use pdfplumber::PdfError;
use thiserror::Error;

/// Errors produced while turning a manufacturer code PDF into JSON.
#[derive(Debug, Error)]
pub enum Error {
    /// The input path does not exist or is not a regular file.
    #[error("PDF file not found: {}", path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// The PDF could not be opened, parsed, or a page failed to extract.
    #[error("failed to extract tables: {source}")]
    Extraction {
        #[from]
        source: PdfError,
    },

    /// Reading the PDF bytes (for fingerprinting) failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Converting records to JSON failed.
    #[error("failed to serialize records: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Writing the JSON document to its destination failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fetching the code list failed and no usable cached copy exists.
    #[error("failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// One or more codes are not six hex digits after normalization.
    #[error("invalid manufacturer codes found: {}", codes.join(", "))]
    InvalidCodes { codes: Vec<String> },

    /// The same code appears more than once after normalization.
    #[error("duplicate manufacturer codes found: {}", codes.join(", "))]
    DuplicateCodes { codes: Vec<String> },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
