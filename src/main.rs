//! CLI entry point for the Sales Insights tool.
//!
//! Provides subcommands for running the full analysis (report plus charts),
//! printing the report alone, and rendering the charts alone.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sales_insights::charts;
use sales_insights::loader::load_records;
use sales_insights::record::{self, SalesRecord};
use sales_insights::report::{self, Summary};
use sales_insights::stats::{self, MissingValues};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// How many products the top-products table keeps.
const TOP_PRODUCTS: usize = 5;

#[derive(Parser)]
#[command(name = "sales_insights")]
#[command(about = "A tool to analyze sales CSV exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis: report tables plus chart PNGs
    Analyze {
        /// Path to the sales CSV file
        #[arg(short, long, default_value = "sales_data.csv")]
        input: String,

        /// Directory to write chart PNGs to
        #[arg(short, long, default_value = "charts")]
        charts_dir: String,
    },
    /// Print the report tables without rendering charts
    Report {
        /// Path to the sales CSV file
        #[arg(short, long, default_value = "sales_data.csv")]
        input: String,

        /// Emit the aggregates as one pretty-printed JSON document
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Render the chart PNGs without printing the report
    Charts {
        /// Path to the sales CSV file
        #[arg(short, long, default_value = "sales_data.csv")]
        input: String,

        /// Directory to write chart PNGs to
        #[arg(short, long, default_value = "charts")]
        charts_dir: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/sales_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("sales_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, charts_dir } => {
            let dataset = load_dataset(Path::new(&input))?;
            print_report(&dataset);
            render_charts(&dataset, Path::new(&charts_dir))?;
        }
        Commands::Report { input, json } => {
            let dataset = load_dataset(Path::new(&input))?;
            if json {
                println!("{}", report::summary_json(&make_summary(&dataset))?);
            } else {
                print_report(&dataset);
            }
        }
        Commands::Charts { input, charts_dir } => {
            let dataset = load_dataset(Path::new(&input))?;
            render_charts(&dataset, Path::new(&charts_dir))?;
        }
    }

    Ok(())
}

/// One loaded CSV: missing-cell counts from the raw rows plus the typed
/// records every aggregate runs over.
struct Dataset {
    missing: MissingValues,
    records: Vec<SalesRecord>,
}

/// Reads the CSV and derives the typed records. Missing cells are counted
/// on the raw rows before any parsing.
#[tracing::instrument(fields(input = %path.display()))]
fn load_dataset(path: &Path) -> Result<Dataset> {
    let rows = load_records(path)?;
    info!(rows = rows.len(), "CSV loaded");

    let missing = stats::missing_values(&rows);
    let records = record::transform(rows)?;

    Ok(Dataset { missing, records })
}

fn make_summary(dataset: &Dataset) -> Summary {
    Summary {
        missing_values: dataset.missing.clone(),
        top_products: stats::top_products_by_revenue(&dataset.records, TOP_PRODUCTS),
        monthly_revenue: stats::monthly_revenue(&dataset.records),
        avg_profit_by_country: stats::avg_profit_by_country(&dataset.records),
    }
}

fn print_report(dataset: &Dataset) {
    report::print_missing_values(&dataset.missing);
    report::print_margin_preview(&dataset.records);
    report::print_top_products(&stats::top_products_by_revenue(
        &dataset.records,
        TOP_PRODUCTS,
    ));
    report::print_country_profit(&stats::avg_profit_by_country(&dataset.records));
}

/// Renders all four charts into `dir`, creating it first.
#[tracing::instrument(skip(dataset), fields(dir = %dir.display()))]
fn render_charts(dataset: &Dataset, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating chart directory {}", dir.display()))?;

    let monthly = stats::monthly_revenue(&dataset.records);
    charts::monthly_revenue_trend(&monthly, &dir.join(charts::MONTHLY_TREND_FILE))?;
    info!(chart = charts::MONTHLY_TREND_FILE, "Chart saved");

    let countries = stats::avg_profit_by_country(&dataset.records);
    charts::avg_profit_by_country(&countries, &dir.join(charts::COUNTRY_PROFIT_FILE))?;
    info!(chart = charts::COUNTRY_PROFIT_FILE, "Chart saved");

    let revenues: Vec<f64> = dataset.records.iter().filter_map(|r| r.revenue).collect();
    charts::revenue_distribution(&revenues, &dir.join(charts::REVENUE_DIST_FILE))?;
    info!(chart = charts::REVENUE_DIST_FILE, "Chart saved");

    charts::revenue_vs_profit(&dataset.records, &dir.join(charts::REVENUE_PROFIT_FILE))?;
    info!(chart = charts::REVENUE_PROFIT_FILE, "Chart saved");

    Ok(())
}
