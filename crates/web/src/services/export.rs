//! CSV export of a query result.

use std::string::FromUtf8Error;

use chrono::{DateTime, Utc};
use thiserror::Error;

use sql_whisperer_core::{CellValue, RowSet};

/// Errors that can occur while rendering a CSV document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Render a result as CSV: one header line, then one line per row.
///
/// NULL becomes an empty field. Reals are written in full rather than in
/// the two-decimal form used on screen.
///
/// # Errors
///
/// Returns an error if the CSV writer fails.
pub fn to_csv(rows: &RowSet) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(rows.columns())?;
    for row in rows.rows() {
        writer.write_record(row.cells().iter().map(field))?;
    }
    let bytes = writer.into_inner().map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}

fn field(cell: &CellValue) -> String {
    match cell {
        CellValue::Real(value) => value.to_string(),
        other => other.to_string(),
    }
}

/// Download name for an export taken at `when`.
#[must_use]
pub fn filename(when: DateTime<Utc>) -> String {
    format!("query_results_{}.csv", when.timestamp())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_header_and_rows() {
        let mut rows = RowSet::new(vec!["product_name".into(), "total_revenue".into()]);
        rows.push_row(vec![CellValue::Text("Laptop".into()), CellValue::Real(2199.98)]).unwrap();
        rows.push_row(vec![CellValue::Text("Tablet".into()), CellValue::Real(399.99)]).unwrap();

        assert_eq!(
            to_csv(&rows).unwrap(),
            "product_name,total_revenue\nLaptop,2199.98\nTablet,399.99\n"
        );
    }

    #[test]
    fn test_quoting_and_nulls() {
        let mut rows = RowSet::new(vec!["name".into(), "city".into()]);
        rows.push_row(vec![CellValue::Text("Smith, Bob".into()), CellValue::Null]).unwrap();

        assert_eq!(to_csv(&rows).unwrap(), "name,city\n\"Smith, Bob\",\n");
    }

    #[test]
    fn test_reals_keep_full_precision() {
        let mut rows = RowSet::new(vec!["third".into(), "tiny".into(), "whole".into()]);
        rows.push_row(vec![
            CellValue::Real(1.0 / 3.0),
            CellValue::Real(0.000_001),
            CellValue::Real(2.0),
        ])
        .unwrap();

        assert_eq!(
            to_csv(&rows).unwrap(),
            "third,tiny,whole\n0.3333333333333333,0.000001,2\n"
        );
        // The on-screen form still rounds.
        assert_eq!(CellValue::Real(1.0 / 3.0).to_string(), "0.33");
    }

    #[test]
    fn test_empty_result_has_header_only() {
        let rows = RowSet::new(vec!["id".into()]);
        assert_eq!(to_csv(&rows).unwrap(), "id\n");
    }

    #[test]
    fn test_filename() {
        let when = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(filename(when), "query_results_1704067200.csv");
    }
}
