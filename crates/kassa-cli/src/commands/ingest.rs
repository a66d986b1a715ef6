//! Ingest command - extract and upload many receipts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use kassa_core::store::{
    JsonDirStore, ReceiptStore, UploadOutcome, receipt_id_from_path, upload_receipt,
};
use kassa_core::{KassaError, TicketParser};

use super::process::source_name;

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files";

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// What happened to one file.
enum FileStatus {
    Uploaded(usize),
    AlreadyStored,
    Failed(String),
}

pub async fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to ingest",
        style("ℹ").blue(),
        files.len()
    );

    let mut store = JsonDirStore::from_config(&config.store)?;
    let parser = TicketParser::from_config(&config.extraction);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let status = match ingest_file(&path, &parser, &mut store) {
            Ok(status) => status,
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    pb.abandon();
                    error!("Failed to ingest {}: {}", path.display(), error_msg);
                    anyhow::bail!("Ingestion failed: {}", error_msg);
                }
                warn!("Failed to ingest {}: {}", path.display(), error_msg);
                FileStatus::Failed(error_msg)
            }
        };

        results.push((path, status));
        pb.inc(1);
    }

    pb.finish_and_clear();

    println!();
    for (path, status) in &results {
        match status {
            FileStatus::Uploaded(items) => println!(
                "  {} {} ({} items)",
                style("✓").green(),
                path.display(),
                items
            ),
            FileStatus::AlreadyStored => println!(
                "  {} {} (already stored)",
                style("-").dim(),
                path.display()
            ),
            FileStatus::Failed(error) => println!(
                "  {} {}: {}",
                style("✗").red(),
                path.display(),
                error
            ),
        }
    }

    let uploaded = results.iter().filter(|(_, s)| matches!(s, FileStatus::Uploaded(_))).count();
    let skipped = results.iter().filter(|(_, s)| matches!(s, FileStatus::AlreadyStored)).count();
    let failed = results.iter().filter(|(_, s)| matches!(s, FileStatus::Failed(_))).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} uploaded, {} skipped, {} failed",
        style(uploaded).green(),
        style(skipped).dim(),
        style(failed).red()
    );

    Ok(())
}

fn ingest_file(
    path: &Path,
    parser: &TicketParser,
    store: &mut JsonDirStore,
) -> kassa_core::Result<FileStatus> {
    let receipt_id = receipt_id_from_path(path).ok_or_else(|| {
        KassaError::UnsupportedInput(format!("no receipt id in {}", path.display()))
    })?;

    // Skip before extracting; ids come from file names, not content
    if store.contains(&receipt_id)? {
        return Ok(FileStatus::AlreadyStored);
    }

    let result = parser.parse_file(path)?;

    match upload_receipt(store, &result.receipt, &source_name(path))? {
        UploadOutcome::Uploaded { items } => Ok(FileStatus::Uploaded(items)),
        UploadOutcome::Skipped => Ok(FileStatus::AlreadyStored),
    }
}
