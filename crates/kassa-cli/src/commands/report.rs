//! Report command - spending summaries over stored receipts.

use clap::{Args, Subcommand};
use console::style;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use kassa_core::models::config::ReportConfig;
use kassa_core::models::{ArticleKey, ArticlePriceSeries, LineItem, MonthlyReport};
use kassa_core::store::{JsonDirStore, load_items};
use kassa_core::{aggregate_article_price, aggregate_monthly, article_names, items_newest_first};

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    command: ReportCommand,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: ReportFormat,
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Spend per month: gross, discount and net
    Monthly,

    /// Average unit price of one article per month
    Article {
        /// Article name, or article number with --code
        article: String,

        /// Match on article number instead of name
        #[arg(long)]
        code: bool,
    },

    /// List known article names
    Articles,

    /// List stored items, newest first
    Items {
        /// Maximum number of items to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReportFormat {
    /// Terminal table
    Text,
    /// CSV output
    Csv,
    /// JSON output
    Json,
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let store = JsonDirStore::from_config(&config.store)?;
    let loaded = load_items(&store, config.store.discount_convention)?;
    debug!(
        "Loaded {} items from {} receipts in {}",
        loaded.items.len(),
        loaded.receipts,
        store.path().display()
    );

    if loaded.skipped > 0 {
        eprintln!(
            "{} Skipped {} unreadable records",
            style("⚠").yellow(),
            loaded.skipped
        );
    }

    let output = match args.command {
        ReportCommand::Monthly => {
            let report = aggregate_monthly(&loaded.items);
            match args.format {
                ReportFormat::Text => monthly_text(&report, &config.report),
                ReportFormat::Csv => monthly_csv(&report)?,
                ReportFormat::Json => serde_json::to_string_pretty(&report)?,
            }
        }
        ReportCommand::Article { article, code } => {
            let key = if code {
                ArticleKey::Code(article)
            } else {
                ArticleKey::Name(article)
            };
            let series = aggregate_article_price(&loaded.items, &key);
            match args.format {
                ReportFormat::Text => article_text(&series, &config.report),
                ReportFormat::Csv => article_csv(&series)?,
                ReportFormat::Json => serde_json::to_string_pretty(&series)?,
            }
        }
        ReportCommand::Articles => {
            let names = article_names(&loaded.items);
            match args.format {
                ReportFormat::Json => serde_json::to_string_pretty(&names)?,
                ReportFormat::Text | ReportFormat::Csv => names.join("\n"),
            }
        }
        ReportCommand::Items { limit } => {
            let items: Vec<&LineItem> = items_newest_first(&loaded.items)
                .into_iter()
                .take(limit)
                .collect();
            match args.format {
                ReportFormat::Text => items_text(&items, &config.report),
                ReportFormat::Csv => items_csv(&items)?,
                ReportFormat::Json => serde_json::to_string_pretty(&items)?,
            }
        }
    };

    println!("{}", output);
    Ok(())
}

fn money(currency: &str, amount: Decimal) -> String {
    format!("{} {:.2}", currency, amount)
}

/// Bar of `width` cells scaled so that `max` fills it. Non-positive values draw nothing.
fn bar(value: Decimal, max: Decimal, width: usize) -> String {
    if value <= Decimal::ZERO || max <= Decimal::ZERO {
        return String::new();
    }
    let cells = (value / max * Decimal::from(width))
        .round()
        .to_usize()
        .unwrap_or(0);
    "█".repeat(cells.min(width))
}

fn monthly_text(report: &MonthlyReport, config: &ReportConfig) -> String {
    if report.is_empty() {
        let mut output = String::from("No dated items in store.");
        if report.undated_items > 0 {
            output.push_str(&format!(" ({} undated items excluded)", report.undated_items));
        }
        return output;
    }

    let currency = &config.currency_symbol;
    let max_net = report.months.iter().map(|m| m.net).max().unwrap_or_default();
    let mut output = String::new();

    output.push_str(&format!(
        "{}\n",
        style(format!(
            "{:<10} {:>6} {:>12} {:>12} {:>12}",
            "Month", "Items", "Gross", "Discount", "Net"
        ))
        .bold()
    ));

    for month in &report.months {
        output.push_str(&format!(
            "{:<10} {:>6} {:>12} {:>12} {:>12}  {}\n",
            month.period.label(),
            month.item_count,
            money(currency, month.gross),
            money(currency, month.discount),
            money(currency, month.net),
            style(bar(month.net, max_net, config.bar_width)).cyan()
        ));
    }

    output.push_str(&format!(
        "\n{:<10} {:>6} {:>12} {:>12} {:>12}",
        "Total",
        report.months.iter().map(|m| m.item_count).sum::<usize>(),
        money(currency, report.gross()),
        money(currency, report.net() - report.gross()),
        money(currency, report.net())
    ));

    if report.undated_items > 0 {
        output.push_str(&format!(
            "\n\n{} {} undated items excluded",
            style("ℹ").blue(),
            report.undated_items
        ));
    }

    output
}

fn monthly_csv(report: &MonthlyReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["month", "items", "gross", "discount", "net"])?;
    for month in &report.months {
        wtr.write_record([
            &month.period.to_string(),
            &month.item_count.to_string(),
            &month.gross.to_string(),
            &month.discount.to_string(),
            &month.net.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn article_text(series: &ArticlePriceSeries, config: &ReportConfig) -> String {
    if series.points.is_empty() {
        return format!("No dated items for article {}.", series.article);
    }

    let max_price = series
        .points
        .iter()
        .map(|p| p.average_price)
        .max()
        .unwrap_or_default();
    let mut output = format!("Average unit price of {}\n\n", style(&series.article).bold());

    for point in &series.points {
        output.push_str(&format!(
            "{:<10} {:>12} {:>4}x  {}\n",
            point.period.label(),
            money(&config.currency_symbol, point.average_price),
            point.samples,
            style(bar(point.average_price, max_price, config.bar_width)).cyan()
        ));
    }

    if series.undated_items > 0 {
        output.push_str(&format!(
            "\n{} {} undated items excluded",
            style("ℹ").blue(),
            series.undated_items
        ));
    }

    output
}

fn article_csv(series: &ArticlePriceSeries) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["month", "average_price", "samples"])?;
    for point in &series.points {
        wtr.write_record([
            &point.period.to_string(),
            &point.average_price.round_dp(4).to_string(),
            &point.samples.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn items_text(items: &[&LineItem], config: &ReportConfig) -> String {
    if items.is_empty() {
        return "No items in store.".to_string();
    }

    let mut output = String::new();
    for item in items {
        output.push_str(&format!(
            "{:<10} {:<8} {:<32} {:>10} {:>12}\n",
            item.receipt_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            item.article_code,
            item.name,
            item.quantity,
            money(&config.currency_symbol, item.net_total())
        ));
    }
    output
}

fn items_csv(items: &[&LineItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "article_code",
        "name",
        "quantity",
        "priced_by_weight",
        "unit_price",
        "line_total",
        "discount",
    ])?;

    for item in items {
        wtr.write_record([
            &item.receipt_date.map(|d| d.to_string()).unwrap_or_default(),
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
