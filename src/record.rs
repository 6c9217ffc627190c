//! Row types for the sales dataset and the raw-to-typed transform.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar months as an ordered categorical domain.
///
/// Ordering is calendar order (January first), so sorting or grouping by
/// month is chronological rather than alphabetical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Maps a month name onto the domain. Unknown names are `None`, which
    /// downstream code treats as a missing value, never as a category.
    pub fn from_name(name: &str) -> Option<Month> {
        match name.trim() {
            "January" => Some(Month::January),
            "February" => Some(Month::February),
            "March" => Some(Month::March),
            "April" => Some(Month::April),
            "May" => Some(Month::May),
            "June" => Some(Month::June),
            "July" => Some(Month::July),
            "August" => Some(Month::August),
            "September" => Some(Month::September),
            "October" => Some(Month::October),
            "November" => Some(Month::November),
            "December" => Some(Month::December),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Zero-based position in calendar order.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One row of the input CSV, exactly as read.
///
/// Every field is optional so that empty cells survive loading and can be
/// counted as missing values.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Product")]
    pub product: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Revenue")]
    pub revenue: Option<f64>,
    #[serde(rename = "Profit")]
    pub profit: Option<f64>,
}

/// A typed sales record after the transform step.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: Option<NaiveDate>,
    pub product: Option<String>,
    pub country: Option<String>,
    pub month: Option<Month>,
    pub revenue: Option<f64>,
    pub profit: Option<f64>,
    /// Derived: `round(profit / revenue * 100, 2)`. Missing when either
    /// operand is missing or revenue is zero; never an independent input.
    pub profit_margin: Option<f64>,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

fn parse_date(value: &str) -> Result<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(date);
        }
    }
    bail!("unrecognized date value {value:?}")
}

/// Rounds to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl SalesRecord {
    /// Builds a typed record from a raw row: parses the date, maps the month
    /// name onto the ordered domain, and derives the profit margin.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is present but matches none of the
    /// accepted formats. An empty date stays missing; an unmapped month
    /// becomes missing rather than an error.
    pub fn from_raw(raw: RawRecord) -> Result<SalesRecord> {
        let date = match raw.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_date(value)?),
        };

        let month = raw.month.as_deref().and_then(Month::from_name);

        let profit_margin = match (raw.profit, raw.revenue) {
            (Some(profit), Some(revenue)) if revenue != 0.0 => {
                Some(round2(profit / revenue * 100.0))
            }
            _ => None,
        };

        Ok(SalesRecord {
            date,
            product: raw.product,
            country: raw.country,
            month,
            revenue: raw.revenue,
            profit: raw.profit,
            profit_margin,
        })
    }
}

/// Transforms all raw rows, preserving row order.
pub fn transform(rows: Vec<RawRecord>) -> Result<Vec<SalesRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, raw)| {
            // line 1 is the header row
            SalesRecord::from_raw(raw).with_context(|| format!("csv line {}", i + 2))
        })
        .collect()
}
