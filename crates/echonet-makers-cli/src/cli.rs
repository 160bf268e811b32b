use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use echonet_makers::download::DEFAULT_MAX_RETRIES;

/// Source the consortium publishes the code list under.
pub const DEFAULT_SOURCE: &str = "https://echonet.jp/spec_g/list_code.pdf";

/// Extract ECHONET Lite manufacturer codes from PDF
#[derive(Debug, Parser)]
#[command(name = "echonet-makers", about, version)]
pub struct Cli {
    /// Path to the PDF file
    #[arg(value_name = "PDF_FILE")]
    pub pdf_file: PathBuf,

    /// Output JSON file path (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Shape of the JSON document
    #[arg(long, value_enum, default_value_t = OutputFormat::Records)]
    pub format: OutputFormat,

    /// Source URL recorded in raw and app output, and fetched by --download
    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Download PDF_FILE from --source first, reusing a cached copy when unchanged
    #[arg(short, long)]
    pub download: bool,

    /// With --download, ignore the cache and fetch unconditionally
    #[arg(short, long, requires = "download")]
    pub force: bool,

    /// With --download, attempts before giving up (default: 3)
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES, value_name = "N")]
    pub retries: u32,

    /// Also write the raw document (sorted, validated, with metadata) to this path
    #[arg(long, value_name = "PATH")]
    pub raw_output: Option<PathBuf>,

    /// Also write the app document to this path
    #[arg(long, value_name = "PATH")]
    pub app_output: Option<PathBuf>,

    /// Keep only records matching these keywords (comma or space separated)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Table detection strategy
    #[arg(long, value_enum, default_value_t = TableStrategyArg::Lattice)]
    pub strategy: TableStrategyArg,

    /// Snap tolerance for aligning nearby edges (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    pub snap_tolerance: f64,

    /// Join tolerance for merging collinear edges (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    pub join_tolerance: f64,

    /// Text tolerance for assigning text to cells (default: 3.0)
    #[arg(long, default_value_t = 3.0)]
    pub text_tolerance: f64,
}

/// JSON document shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Array of records in document order
    Records,
    /// Sorted, validated records with source metadata
    Raw,
    /// Sorted records for the search front end
    App,
}

/// Table detection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableStrategyArg {
    /// Detect tables from ruling lines
    Lattice,
    /// Detect tables from text alignment
    Stream,
}
