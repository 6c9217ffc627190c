//! Chart rendering.
//!
//! Renders the four analysis charts as PNG files in a dark style: monthly
//! revenue line, average-profit-by-country bars, revenue histogram, and the
//! revenue-vs-profit scatter. Each chart is an independent rendering call
//! over previously computed data.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use plotters::prelude::*;
use plotters::style::{FontTransform, TextStyle};
use tracing::debug;

use crate::record::{Month, SalesRecord};
use crate::stats::{CountryProfit, MonthlyRevenue};

pub const MONTHLY_TREND_FILE: &str = "monthly_revenue_trend.png";
pub const COUNTRY_PROFIT_FILE: &str = "avg_profit_by_country.png";
pub const REVENUE_DIST_FILE: &str = "revenue_distribution.png";
pub const REVENUE_PROFIT_FILE: &str = "revenue_vs_profit.png";

/// Bin count for the revenue histogram.
pub const REVENUE_BINS: usize = 50;

// 10x5 and 12x6 inch figures at 300 dpi
const WIDE: (u32, u32) = (3000, 1500);
const EXTRA_WIDE: (u32, u32) = (3600, 1800);

const TITLE_SIZE: u32 = 72;
const DESC_SIZE: u32 = 56;
const TICK_SIZE: u32 = 40;

const TEAL: RGBColor = RGBColor(0, 128, 128);
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const PURPLE: RGBColor = RGBColor(128, 0, 128);

/// Qualitative palette for per-country scatter series, cycled when there
/// are more countries than colors.
const PALETTE: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

fn white_text(size: u32) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", size).into_font()).color(&WHITE)
}

fn rotated_white_text(size: u32) -> TextStyle<'static> {
    TextStyle::from(("sans-serif", size).into_font().transform(FontTransform::Rotate90))
        .color(&WHITE)
}

fn month_tick_label(x: &f64) -> String {
    let idx = x.round() as i64;
    if (x - idx as f64).abs() > 1e-6 || !(1..=12).contains(&idx) {
        return String::new();
    }
    Month::ALL[(idx - 1) as usize].name().to_string()
}

/// Axis bounds with 5% headroom. The lower bound stays at zero unless the
/// data goes negative.
fn value_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = 0.0f64;
    let mut hi = 0.0f64;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let pad = (hi - lo).abs().max(1.0) * 0.05;
    let lower = if lo < 0.0 { lo - pad } else { 0.0 };
    (lower, hi + pad)
}

/// Histogram bins: equal widths over `[start, start + width * counts.len())`.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueBins {
    pub start: f64,
    pub width: f64,
    pub counts: Vec<u32>,
}

impl RevenueBins {
    pub fn end(&self) -> f64 {
        self.start + self.width * self.counts.len() as f64
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Buckets `values` into `bins` equal-width bins spanning the data range.
/// The maximum value lands in the last bin. A degenerate range (all values
/// equal) falls back to a width of 1.0 with everything in the first bin.
/// Returns `None` when there is nothing to bin.
pub fn bin_values(values: &[f64], bins: usize) -> Option<RevenueBins> {
    if values.is_empty() || bins == 0 {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    let span = max - min;
    let width = if span > 0.0 { span / bins as f64 } else { 1.0 };

    let mut counts = vec![0u32; bins];
    for &v in values {
        let mut idx = ((v - min) / width) as usize;
        if idx >= bins {
            idx = bins - 1;
        }
        counts[idx] += 1;
    }

    Some(RevenueBins {
        start: min,
        width,
        counts,
    })
}

/// Line chart of summed revenue over the ordered months.
pub fn monthly_revenue_trend(monthly: &[MonthlyRevenue], path: &Path) -> Result<()> {
    let max = monthly.iter().map(|m| m.revenue).fold(0.0f64, f64::max);
    let y_top = if max > 0.0 { max * 1.05 } else { 1.0 };

    let root = BitMapBackend::new(path, WIDE).into_drawing_area();
    root.fill(&BLACK)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Revenue Trend", white_text(TITLE_SIZE))
        .margin(40)
        .x_label_area_size(150)
        .y_label_area_size(220)
        .build_cartesian_2d(0.5f64..12.5f64, 0.0f64..y_top)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&month_tick_label)
        .label_style(white_text(TICK_SIZE))
        .axis_desc_style(white_text(DESC_SIZE))
        .axis_style(WHITE.mix(0.8))
        .bold_line_style(WHITE.mix(0.2))
        .light_line_style(WHITE.mix(0.08))
        .x_desc("Month")
        .y_desc("Revenue")
        .draw()?;

    let points: Vec<(f64, f64)> = monthly
        .iter()
        .map(|m| ((m.month.index() + 1) as f64, m.revenue))
        .collect();

    chart.draw_series(LineSeries::new(points.iter().copied(), TEAL.stroke_width(6)))?;
    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Cross::new((x, y), 18, TEAL.stroke_width(6))),
    )?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "monthly trend rendered");
    Ok(())
}

/// Bar chart of average profit per country, labels rotated to fit.
pub fn avg_profit_by_country(rows: &[CountryProfit], path: &Path) -> Result<()> {
    if rows.is_empty() {
        bail!("no country averages to plot");
    }

    let names: Vec<&str> = rows.iter().map(|c| c.country.as_str()).collect();
    let (y_lo, y_hi) = value_bounds(rows.iter().map(|c| c.avg_profit));

    let root = BitMapBackend::new(path, EXTRA_WIDE).into_drawing_area();
    root.fill(&BLACK)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Profit by Country", white_text(TITLE_SIZE))
        .margin(40)
        .x_label_area_size(420)
        .y_label_area_size(220)
        .build_cartesian_2d(
            (0u32..(rows.len() - 1) as u32).into_segmented(),
            y_lo..y_hi,
        )?;

    let label_fmt = |seg: &SegmentValue<u32>| match seg {
        SegmentValue::CenterOf(i) => names
            .get(*i as usize)
            .map(|name| name.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&label_fmt)
        .label_style(white_text(TICK_SIZE))
        .x_label_style(rotated_white_text(TICK_SIZE))
        .axis_desc_style(white_text(DESC_SIZE))
        .axis_style(WHITE.mix(0.8))
        .x_desc("Country")
        .y_desc("Average Profit")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(SKY_BLUE.filled())
            .margin(20)
            .data(rows.iter().enumerate().map(|(i, c)| (i as u32, c.avg_profit))),
    )?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "country profit bars rendered");
    Ok(())
}

/// Histogram of per-record revenue over 50 equal-width bins.
pub fn revenue_distribution(revenues: &[f64], path: &Path) -> Result<()> {
    let bins =
        bin_values(revenues, REVENUE_BINS).ok_or_else(|| anyhow!("no revenue values to plot"))?;
    let y_top = bins.max_count() + (bins.max_count() / 20).max(1);

    let root = BitMapBackend::new(path, WIDE).into_drawing_area();
    root.fill(&BLACK)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Revenue", white_text(TITLE_SIZE))
        .margin(40)
        .x_label_area_size(150)
        .y_label_area_size(220)
        .build_cartesian_2d(bins.start..bins.end(), 0u32..y_top)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .label_style(white_text(TICK_SIZE))
        .axis_desc_style(white_text(DESC_SIZE))
        .axis_style(WHITE.mix(0.8))
        .x_desc("Revenue")
        .y_desc("Frequency")
        .draw()?;

    chart.draw_series(bins.counts.iter().enumerate().map(|(i, &count)| {
        let x0 = bins.start + bins.width * i as f64;
        let x1 = x0 + bins.width;
        Rectangle::new([(x0, 0), (x1, count)], PURPLE.filled())
    }))?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "revenue histogram rendered");
    Ok(())
}

/// Scatter of revenue against profit, one color and legend entry per
/// country.
pub fn revenue_vs_profit(records: &[SalesRecord], path: &Path) -> Result<()> {
    let mut groups: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for record in records {
        if let (Some(country), Some(revenue), Some(profit)) =
            (record.country.as_deref(), record.revenue, record.profit)
        {
            groups.entry(country).or_default().push((revenue, profit));
        }
    }
    if groups.is_empty() {
        bail!("no rows with country, revenue, and profit to plot");
    }

    let (x_lo, x_hi) = value_bounds(groups.values().flatten().map(|&(x, _)| x));
    let (y_lo, y_hi) = value_bounds(groups.values().flatten().map(|&(_, y)| y));

    let root = BitMapBackend::new(path, EXTRA_WIDE).into_drawing_area();
    root.fill(&BLACK)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Sales vs Profit by Country", white_text(TITLE_SIZE))
        .margin(40)
        .x_label_area_size(150)
        .y_label_area_size(220)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .label_style(white_text(TICK_SIZE))
        .axis_desc_style(white_text(DESC_SIZE))
        .axis_style(WHITE.mix(0.8))
        .x_desc("Revenue (Sales)")
        .y_desc("Profit")
        .draw()?;

    for (idx, (country, points)) in groups.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        chart
            .draw_series(
                points
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 12, color.filled())),
            )?
            .label(*country)
            .legend(move |(x, y)| Circle::new((x, y), 12, color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(BLACK.mix(0.7))
        .border_style(WHITE.mix(0.5))
        .label_font(white_text(TICK_SIZE))
        .draw()?;

    root.present()
        .with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "revenue vs profit scatter rendered");
    Ok(())
}
