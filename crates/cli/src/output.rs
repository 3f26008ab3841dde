//! Rendering of query results for the terminal.

use std::error::Error;

use clap::ValueEnum;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use sql_whisperer_core::{CellValue, ResultSummary, RowSet};
use sql_whisperer_web::services::export;

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table with a summary line
    #[default]
    Table,
    /// CSV with a header row
    Csv,
    /// `{"columns": [...], "rows": [...]}`
    Json,
}

/// Render a result in the requested format.
///
/// # Errors
///
/// Returns an error if CSV or JSON encoding fails.
pub fn render(rows: &RowSet, format: OutputFormat) -> Result<String, Box<dyn Error>> {
    Ok(match format {
        OutputFormat::Table => render_table(rows),
        OutputFormat::Csv => export::to_csv(rows)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(rows)?;
            json.push('\n');
            json
        }
    })
}

/// Printed instead of a table when a statement returns no columns.
const NO_COLUMNS: &str = "Statement executed, no columns returned.";

/// Render a result as a table followed by a one-line summary.
#[must_use]
pub fn render_table(rows: &RowSet) -> String {
    if rows.columns().is_empty() {
        return format!("{NO_COLUMNS}\n");
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            rows.columns()
                .iter()
                .map(|name| Cell::new(name).add_attribute(Attribute::Bold)),
        );

    for row in rows.rows() {
        table.add_row(row.cells().iter().map(|cell| {
            let aligned = Cell::new(cell.to_string());
            if matches!(cell, CellValue::Integer(_) | CellValue::Real(_)) {
                aligned.set_alignment(CellAlignment::Right)
            } else {
                aligned
            }
        }));
    }

    let summary = ResultSummary::of(rows);
    format!(
        "{table}\n{} row(s), {} column(s), {} numeric, {} KB\n",
        summary.rows,
        summary.columns,
        summary.numeric_columns,
        summary.size_kb()
    )
}
