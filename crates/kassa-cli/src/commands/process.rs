//! Process command - extract the line items of a single receipt.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use kassa_core::models::Receipt;
use kassa_core::models::config::KassaConfig;
use kassa_core::store::{JsonDirStore, UploadOutcome, upload_receipt};
use kassa_core::{ExtractionResult, TicketParser};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or text with form feeds between pages)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also upload the receipt to the store
    #[arg(long)]
    upload: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(2);
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );

    pb.set_message("Extracting line items...");
    let result = TicketParser::from_config(&config.extraction).parse_file(&args.input)?;
    pb.inc(1);

    let upload = if args.upload {
        pb.set_message("Uploading...");
        let mut store = JsonDirStore::from_config(&config.store)?;
        Some(upload_receipt(&mut store, &result.receipt, &source_name(&args.input))?)
    } else {
        None
    };
    pb.inc(1);
    pb.finish_and_clear();

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_result(&result, args.format, &config)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    match upload {
        Some(UploadOutcome::Uploaded { items }) => eprintln!(
            "{} Uploaded {} items as '{}'",
            style("✓").green(),
            items,
            result.receipt.id
        ),
        Some(UploadOutcome::Skipped) => eprintln!(
            "{} Receipt '{}' already stored, not uploaded again",
            style("ℹ").blue(),
            result.receipt.id
        ),
        None => {}
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// File name recorded as the receipt's source.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

fn format_result(
    result: &ExtractionResult,
    format: OutputFormat,
    config: &KassaConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.receipt)?),
        OutputFormat::Csv => format_csv(&result.receipt),
        OutputFormat::Text => Ok(format_text(&result.receipt, &config.report.currency_symbol)),
    }
}

fn format_csv(receipt: &Receipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "kind",
        "article_code",
        "name",
        "quantity",
        "priced_by_weight",
        "unit_price",
        "line_total",
        "discount",
    ])?;

    for item in &receipt.items {
        wtr.write_record([
            &item.receipt_date.map(|d| d.to_string()).unwrap_or_default(),
            item.kind.marker(),
            &item.article_code,
            &item.name,
            &item.quantity.to_string(),
            &item.priced_by_weight.to_string(),
            &item.unit_price.to_string(),
            &item.line_total.to_string(),
            &item.discount.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &Receipt, currency: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt: {}\n", receipt.id));
    output.push_str(&format!(
        "Date: {}\n\n",
        receipt
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    ));

    for item in &receipt.items {
        let quantity = if item.priced_by_weight {
            format!("{} kg", item.quantity)
        } else {
            format!("{} x", item.quantity)
        };
        output.push_str(&format!(
            "  {} {:<8} {:<32} {:>10} {:>8.2} {:>9.2}\n",
            item.kind.marker(),
            item.article_code,
            item.name,
            quantity,
            item.unit_price,
            item.line_total
        ));
    }

    output.push_str(&format!(
        "\nTotal: {} {:.2} ({} items)\n",
        currency,
        receipt.total(),
        receipt.len()
    ));

    output
}
