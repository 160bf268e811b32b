use std::path::Path;

use chrono::Utc;
use echonet_makers::search::{format_code, search_any};
use echonet_makers::transform::{RawManufacturerData, sha256_file, to_app_data, to_raw_data};
use echonet_makers::{
    DownloadOptions, DownloadStatus, ExtractConfig, ManufacturerRecord, TableStrategy, download,
    extract_with, to_json, write_json,
};
use tracing::{info, warn};

use crate::cli::{Cli, OutputFormat, TableStrategyArg};

pub fn run(cli: &Cli) -> Result<(), i32> {
    if cli.download {
        fetch(cli)?;
    }

    let config = build_config(cli);

    let records = extract_with(&cli.pdf_file, &config).map_err(report)?;
    info!("Extracted {} manufacturers", records.len());

    write_documents(cli, &records)?;

    let records = match cli.query.as_deref() {
        Some(query) => {
            let matched: Vec<ManufacturerRecord> =
                search_any(&records, query).into_iter().cloned().collect();
            info!("{} manufacturers match {query:?}", matched.len());
            for record in &matched {
                info!("  {} {}", format_code(&record.code), record.name_ja);
            }
            matched
        }
        None => records,
    };

    let json = render(cli, &records)?;

    match &cli.output {
        Some(path) => {
            write_json(path, &json).map_err(report)?;
            info!("Saved to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Refresh `pdf_file` from `--source`.
fn fetch(cli: &Cli) -> Result<(), i32> {
    let mut options = DownloadOptions::new(&cli.source, &cli.pdf_file);
    options.force = cli.force;
    options.max_retries = cli.retries;

    info!("Downloading {}...", cli.source);
    let outcome = download(&options).map_err(report)?;
    match outcome.status {
        DownloadStatus::CacheHit => info!("Cache hit: {}", outcome.path.display()),
        DownloadStatus::Downloaded => info!(
            "Downloaded {} ({} bytes)",
            outcome.path.display(),
            outcome.size
        ),
    }
    if let Some(warning) = &outcome.warning {
        warn!("{warning}");
    }
    Ok(())
}

/// Write `--raw-output` and `--app-output` from the full record set.
fn write_documents(cli: &Cli, records: &[ManufacturerRecord]) -> Result<(), i32> {
    if cli.raw_output.is_none() && cli.app_output.is_none() {
        return Ok(());
    }

    let raw = raw_data(&cli.pdf_file, &cli.source, records)?;
    if let Some(path) = &cli.raw_output {
        write_json(path, &to_json(&raw).map_err(report)?).map_err(report)?;
        info!("Saved raw data to {}", path.display());
    }
    if let Some(path) = &cli.app_output {
        let app = to_app_data(&raw, Utc::now().date_naive());
        write_json(path, &to_json(&app).map_err(report)?).map_err(report)?;
        info!("Saved app data to {}", path.display());
    }
    Ok(())
}

fn build_config(cli: &Cli) -> ExtractConfig {
    let strategy = match cli.strategy {
        TableStrategyArg::Lattice => TableStrategy::Lattice,
        TableStrategyArg::Stream => TableStrategy::Stream,
    };

    ExtractConfig {
        strategy,
        snap_tolerance: cli.snap_tolerance,
        join_tolerance: cli.join_tolerance,
        text_tolerance: cli.text_tolerance,
    }
}

fn render(cli: &Cli, records: &[ManufacturerRecord]) -> Result<String, i32> {
    match cli.format {
        OutputFormat::Records => to_json(records).map_err(report),
        OutputFormat::Raw => {
            let raw = raw_data(&cli.pdf_file, &cli.source, records)?;
            to_json(&raw).map_err(report)
        }
        OutputFormat::App => {
            let raw = raw_data(&cli.pdf_file, &cli.source, records)?;
            let app = to_app_data(&raw, Utc::now().date_naive());
            to_json(&app).map_err(report)
        }
    }
}

fn raw_data(
    pdf_file: &Path,
    source: &str,
    records: &[ManufacturerRecord],
) -> Result<RawManufacturerData, i32> {
    let hash = sha256_file(pdf_file).map_err(report)?;
    to_raw_data(records, source, &hash, Utc::now()).map_err(report)
}

/// Print an error to stderr and map it to exit code 1.
fn report(err: echonet_makers::Error) -> i32 {
    eprintln!("Error: {err}");
    1
}
