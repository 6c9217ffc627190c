use std::collections::HashMap;

use serde::Serialize;

use crate::record::{Month, RawRecord, SalesRecord, round2};

/// Count of empty cells per input column, in column order.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MissingValues {
    pub date: usize,
    pub product: usize,
    pub country: usize,
    pub month: usize,
    pub revenue: usize,
    pub profit: usize,
}

impl MissingValues {
    /// Column name / count pairs in the order the columns appear in the file.
    pub fn columns(&self) -> [(&'static str, usize); 6] {
        [
            ("Date", self.date),
            ("Product", self.product),
            ("Country", self.country),
            ("Month", self.month),
            ("Revenue", self.revenue),
            ("Profit", self.profit),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    pub product: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: Month,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryProfit {
    pub country: String,
    pub avg_profit: f64,
}

pub fn missing_values(rows: &[RawRecord]) -> MissingValues {
    let mut m = MissingValues::default();

    for row in rows {
        if row.date.is_none() {
            m.date += 1;
        }
        if row.product.is_none() {
            m.product += 1;
        }
        if row.country.is_none() {
            m.country += 1;
        }
        if row.month.is_none() {
            m.month += 1;
        }
        if row.revenue.is_none() {
            m.revenue += 1;
        }
        if row.profit.is_none() {
            m.profit += 1;
        }
    }

    m
}

/// Sums revenue per product and returns the top `n` groups by total,
/// descending. Ties keep the order in which the products were first
/// encountered in the input. Rows without a product are skipped; a missing
/// revenue contributes nothing to its group.
pub fn top_products_by_revenue(records: &[SalesRecord], n: usize) -> Vec<ProductRevenue> {
    let mut groups: Vec<ProductRevenue> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(product) = record.product.as_deref() else {
            continue;
        };
        let slot = *index.entry(product).or_insert_with(|| {
            groups.push(ProductRevenue {
                product: product.to_string(),
                revenue: 0.0,
            });
            groups.len() - 1
        });
        if let Some(revenue) = record.revenue {
            groups[slot].revenue += revenue;
        }
    }

    // sort_by is stable, so equal totals keep encounter order
    groups.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    groups.truncate(n);
    groups
}

/// Sums revenue per calendar month. The output always covers the full
/// ordered domain, January through December, with 0.0 for months that have
/// no data. Rows whose month is missing or unmapped are skipped.
pub fn monthly_revenue(records: &[SalesRecord]) -> Vec<MonthlyRevenue> {
    let mut totals = [0.0f64; 12];

    for record in records {
        if let (Some(month), Some(revenue)) = (record.month, record.revenue) {
            totals[month.index()] += revenue;
        }
    }

    Month::ALL
        .iter()
        .map(|&month| MonthlyRevenue {
            month,
            revenue: totals[month.index()],
        })
        .collect()
}

/// Arithmetic mean of profit per country, rounded to 2 decimals, countries
/// sorted alphabetically. Rows without a country are skipped; countries
/// whose every profit value is missing are omitted.
pub fn avg_profit_by_country(records: &[SalesRecord]) -> Vec<CountryProfit> {
    let mut sums: Vec<(String, f64, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(country) = record.country.as_deref() else {
            continue;
        };
        let slot = *index.entry(country).or_insert_with(|| {
            sums.push((country.to_string(), 0.0, 0));
            sums.len() - 1
        });
        if let Some(profit) = record.profit {
            sums[slot].1 += profit;
            sums[slot].2 += 1;
        }
    }

    sums.sort_by(|a, b| a.0.cmp(&b.0));
    sums.into_iter()
        .filter(|&(_, _, count)| count > 0)
        .map(|(country, sum, count)| CountryProfit {
            country,
            avg_profit: round2(sum / count as f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(
        product: Option<&str>,
        country: Option<&str>,
        month: Option<Month>,
        revenue: Option<f64>,
        profit: Option<f64>,
    ) -> SalesRecord {
        SalesRecord {
            date: None,
            product: product.map(str::to_string),
            country: country.map(str::to_string),
            month,
            revenue,
            profit,
            profit_margin: None,
        }
    }

    fn sale(product: &str, revenue: f64) -> SalesRecord {
        rec(Some(product), None, None, Some(revenue), None)
    }

    #[test]
    fn test_top_products_sums_per_group() {
        // two rows for product A sum to 150
        let records = vec![sale("A", 100.0), sale("A", 50.0)];
        let top = top_products_by_revenue(&records, 5);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].product, "A");
        assert_eq!(top[0].revenue, 150.0);
    }

    #[test]
    fn test_top_products_sorted_descending_and_truncated() {
        let records = vec![
            sale("A", 10.0),
            sale("B", 30.0),
            sale("C", 20.0),
            sale("D", 40.0),
            sale("E", 25.0),
            sale("F", 15.0),
        ];
        let top = top_products_by_revenue(&records, 5);

        assert_eq!(top.len(), 5);
        let names: Vec<&str> = top.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, ["D", "B", "E", "C", "F"]);
    }

    #[test]
    fn test_top_products_length_is_distinct_count_when_small() {
        let records = vec![sale("A", 10.0), sale("B", 5.0)];
        assert_eq!(top_products_by_revenue(&records, 5).len(), 2);
    }

    #[test]
    fn test_top_products_ties_keep_encounter_order() {
        let records = vec![
            sale("Late", 50.0),
            sale("Early", 30.0),
            sale("Early", 15.0),
            sale("Other", 50.0),
        ];
        let top = top_products_by_revenue(&records, 5);

        // Late and Other tie at 50; Late was seen first
        let names: Vec<&str> = top.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, ["Late", "Other", "Early"]);
    }

    #[test]
    fn test_top_products_skips_missing_product_and_revenue() {
        let records = vec![
            rec(None, None, None, Some(999.0), None),
            rec(Some("A"), None, None, None, None),
            sale("A", 25.0),
        ];
        let top = top_products_by_revenue(&records, 5);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].revenue, 25.0);
    }

    #[test]
    fn test_monthly_revenue_preserves_calendar_order() {
        // input deliberately out of order
        let records = vec![
            rec(None, None, Some(Month::December), Some(30.0), None),
            rec(None, None, Some(Month::January), Some(10.0), None),
            rec(None, None, Some(Month::June), Some(20.0), None),
            rec(None, None, Some(Month::January), Some(5.0), None),
        ];
        let monthly = monthly_revenue(&records);

        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[0].month, Month::January);
        assert_eq!(monthly[0].revenue, 15.0);
        assert_eq!(monthly[5].month, Month::June);
        assert_eq!(monthly[5].revenue, 20.0);
        assert_eq!(monthly[11].month, Month::December);
        assert_eq!(monthly[11].revenue, 30.0);
        // untouched months are zero-filled
        assert_eq!(monthly[1].revenue, 0.0);
    }

    #[test]
    fn test_monthly_revenue_skips_missing_months() {
        let records = vec![rec(None, None, None, Some(100.0), None)];
        let monthly = monthly_revenue(&records);
        assert!(monthly.iter().all(|m| m.revenue == 0.0));
    }

    #[test]
    fn test_avg_profit_means_and_rounds() {
        let records = vec![
            rec(None, Some("Canada"), None, None, Some(10.0)),
            rec(None, Some("Canada"), None, None, Some(11.0)),
            rec(None, Some("Canada"), None, None, Some(11.0)),
        ];
        let avgs = avg_profit_by_country(&records);

        assert_eq!(avgs.len(), 1);
        // 32 / 3 = 10.666... -> 10.67
        assert_eq!(avgs[0].avg_profit, 10.67);
    }

    #[test]
    fn test_avg_profit_sorted_alphabetically() {
        let records = vec![
            rec(None, Some("Norway"), None, None, Some(1.0)),
            rec(None, Some("Brazil"), None, None, Some(2.0)),
            rec(None, Some("Japan"), None, None, Some(3.0)),
        ];
        let avgs = avg_profit_by_country(&records);

        let names: Vec<&str> = avgs.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(names, ["Brazil", "Japan", "Norway"]);
    }

    #[test]
    fn test_avg_profit_omits_countries_with_no_profit_values() {
        let records = vec![
            rec(None, Some("Canada"), None, Some(100.0), None),
            rec(None, Some("Japan"), None, None, Some(-5.0)),
        ];
        let avgs = avg_profit_by_country(&records);

        assert_eq!(avgs.len(), 1);
        assert_eq!(avgs[0].country, "Japan");
        assert_eq!(avgs[0].avg_profit, -5.0);
    }

    #[test]
    fn test_missing_values_counts_per_column() {
        let rows = vec![
            RawRecord {
                date: None,
                product: Some("A".to_string()),
                country: Some("Canada".to_string()),
                month: Some("January".to_string()),
                revenue: Some(1.0),
                profit: None,
            },
            RawRecord {
                date: Some("2024-01-01".to_string()),
                product: Some("B".to_string()),
                country: None,
                month: Some("January".to_string()),
                revenue: None,
                profit: None,
            },
        ];
        let m = missing_values(&rows);

        assert_eq!(m.date, 1);
        assert_eq!(m.product, 0);
        assert_eq!(m.country, 1);
        assert_eq!(m.month, 0);
        assert_eq!(m.revenue, 1);
        assert_eq!(m.profit, 2);
    }

    #[test]
    fn test_missing_values_empty_input() {
        let m = missing_values(&[]);
        assert_eq!(m.columns().iter().map(|(_, n)| n).sum::<usize>(), 0);
    }
}
