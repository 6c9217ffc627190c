//! Report output for the analysis run.
//!
//! Tables go to stdout as plain text; the JSON mode serializes the same
//! aggregates as one document.

use anyhow::Result;
use serde::Serialize;

use crate::record::SalesRecord;
use crate::stats::{CountryProfit, MissingValues, MonthlyRevenue, ProductRevenue};

/// How many records the margin preview shows.
pub const PREVIEW_ROWS: usize = 5;

/// All aggregates of one run, in the shape the JSON report mode emits.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub missing_values: MissingValues,
    pub top_products: Vec<ProductRevenue>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    pub avg_profit_by_country: Vec<CountryProfit>,
}

/// Serializes a [`Summary`] as pretty-printed JSON.
pub fn summary_json(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}

/// Prints the count of empty cells per input column.
pub fn print_missing_values(missing: &MissingValues) {
    println!("Missing values per column:");
    for (name, count) in missing.columns() {
        println!("  {name:<8} {count:>5}");
    }
    println!();
}

/// Prints profit, revenue, and the derived margin for the first few records.
/// Missing values render as `NaN`.
pub fn print_margin_preview(records: &[SalesRecord]) {
    let shown = records.len().min(PREVIEW_ROWS);
    println!("Profit margin preview (first {shown} of {} records):", records.len());
    println!("  {:>3}  {:>12} {:>12} {:>14}", "#", "Profit", "Revenue", "Profit_margin");
    for (i, record) in records.iter().take(PREVIEW_ROWS).enumerate() {
        println!(
            "  {:>3}  {:>12} {:>12} {:>14}",
            i,
            fmt_opt(record.profit),
            fmt_opt(record.revenue),
            fmt_opt(record.profit_margin),
        );
    }
    println!();
}

/// Prints the ranked top-products-by-revenue table.
pub fn print_top_products(top: &[ProductRevenue]) {
    println!("Top {} products by revenue:", top.len());
    for (rank, entry) in top.iter().enumerate() {
        println!("  {:>2}. {:<24} {:>14.2}", rank + 1, entry.product, entry.revenue);
    }
    println!();
}

/// Prints the average-profit-by-country table.
pub fn print_country_profit(rows: &[CountryProfit]) {
    println!("Average profit by country:");
    for entry in rows {
        println!("  {:<24} {:>14.2}", entry.country, entry.avg_profit);
    }
    println!();
}
