//! CSV loading for the sales dataset.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::record::RawRecord;

/// Reads all rows from the CSV file at `path`.
///
/// The file must carry the header row `Date, Product, Country, Month,
/// Revenue, Profit`. Empty cells deserialize as missing values.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a row has the wrong
/// number of fields, or a numeric cell fails to parse.
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: RawRecord = result.with_context(|| format!("reading {}", path.display()))?;
        rows.push(row);
    }

    debug!(path = %path.display(), rows = rows.len(), "csv loaded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp(
            "sales_insights_test_valid.csv",
            "Date,Product,Country,Month,Revenue,Profit\n\
             2024-01-15,Widget,Canada,January,100.0,20.0\n",
        );

        let rows = load_records(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product.as_deref(), Some("Widget"));
        assert_eq!(rows[0].revenue, Some(100.0));
        assert_eq!(rows[0].profit, Some(20.0));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_cells_become_missing() {
        let path = write_temp(
            "sales_insights_test_missing.csv",
            "Date,Product,Country,Month,Revenue,Profit\n\
             ,Widget,,January,,20.0\n",
        );

        let rows = load_records(&path).unwrap();
        assert_eq!(rows[0].date, None);
        assert_eq!(rows[0].country, None);
        assert_eq!(rows[0].revenue, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_records(Path::new("/nonexistent/sales_data.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/sales_data.csv"));
    }

    #[test]
    fn test_non_numeric_revenue_is_an_error() {
        let path = write_temp(
            "sales_insights_test_bad_number.csv",
            "Date,Product,Country,Month,Revenue,Profit\n\
             2024-01-15,Widget,Canada,January,lots,20.0\n",
        );

        assert!(load_records(&path).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_wrong_field_count_is_an_error() {
        let path = write_temp(
            "sales_insights_test_ragged.csv",
            "Date,Product,Country,Month,Revenue,Profit\n\
             2024-01-15,Widget,Canada\n",
        );

        assert!(load_records(&path).is_err());

        fs::remove_file(&path).unwrap();
    }
}
