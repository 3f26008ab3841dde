//! Tabular query results.
//!
//! A [`RowSet`] keeps column names in projection order and each row as a
//! vector of cells aligned with those names. Rows serialize as JSON objects
//! whose keys follow the same order.

use core::fmt;

use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Charts are only suggested for results with at most this many rows.
pub const MAX_CHART_ROWS: usize = 20;

/// Number of leading rows plotted in a suggested chart.
pub const CHART_POINTS: usize = 10;

/// Approximate fixed overhead of a result's row index, in bytes.
const INDEX_BYTES: usize = 132;

/// Approximate overhead of one boxed string cell, in bytes.
const STRING_CELL_BYTES: usize = 49;

/// A row whose cell count differs from the result's column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("row has {found} cells but the result has {expected} columns")]
pub struct RowWidthError {
    pub expected: usize,
    pub found: usize,
}

/// A single scalar value from a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Text that holds exactly a `YYYY-MM-DD` calendar date.
    Date(NaiveDate),
}

impl CellValue {
    /// Whether the cell holds an integer or a real.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Real(_))
    }

    /// Whether the cell holds text or a date.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Date(_))
    }

    /// The numeric value of the cell, if it has one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Classify a text value, promoting exact ISO dates to [`CellValue::Date`].
    #[must_use]
    pub fn from_text(text: String) -> Self {
        if text.len() == 10
            && let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        {
            return Self::Date(date);
        }
        Self::Text(text)
    }

    fn approx_bytes(&self) -> usize {
        match self {
            Self::Null | Self::Integer(_) | Self::Real(_) => 8,
            Self::Text(s) => STRING_CELL_BYTES + s.len(),
            Self::Date(_) => STRING_CELL_BYTES + 10,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(r) => {
                let fixed = format!("{r:.2}");
                let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
                f.write_str(if trimmed.is_empty() || trimmed == "-" { "0" } else { trimmed })
            }
            Self::Text(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Ordered rows produced by running a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl RowSet {
    /// An empty result with the given column names.
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Cells must line up with the columns.
    ///
    /// # Errors
    ///
    /// Returns [`RowWidthError`] and leaves the result unchanged when the
    /// cell count differs from the column count.
    pub fn push_row(&mut self, cells: Vec<CellValue>) -> Result<(), RowWidthError> {
        if cells.len() != self.columns.len() {
            return Err(RowWidthError {
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    /// Column names in projection order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows as name-addressable views.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Row at `index`, if present.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Indexes of columns whose non-null cells are all numeric.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.columns_where(CellValue::is_numeric)
    }

    /// Indexes of columns whose non-null cells are all text or dates.
    #[must_use]
    pub fn text_columns(&self) -> Vec<usize> {
        self.columns_where(CellValue::is_textual)
    }

    fn columns_where(&self, kind: fn(&CellValue) -> bool) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&i| {
                let mut cells = self.column(i).filter(|c| **c != CellValue::Null).peekable();
                cells.peek().is_some() && cells.all(kind)
            })
            .collect()
    }

    /// Rough in-memory footprint of the result, in bytes.
    #[must_use]
    pub fn approx_bytes(&self) -> usize {
        INDEX_BYTES
            + self
                .rows
                .iter()
                .flatten()
                .map(CellValue::approx_bytes)
                .sum::<usize>()
    }
}

impl Serialize for RowSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Row<'_>> = self.rows().collect();
        let mut state = serializer.serialize_struct("RowSet", 2)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// A borrowed view of one result row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> Row<'a> {
    /// Value of the named column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
    }

    /// Cells in projection order.
    #[must_use]
    pub const fn cells(&self) -> &'a [CellValue] {
        self.cells
    }

    /// `(column, value)` pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Headline numbers shown above a result table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultSummary {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: usize,
    pub size_bytes: usize,
}

impl ResultSummary {
    /// Summarize a result.
    #[must_use]
    pub fn of(rows: &RowSet) -> Self {
        Self {
            rows: rows.len(),
            columns: rows.columns().len(),
            numeric_columns: rows.numeric_columns().len(),
            size_bytes: rows.approx_bytes(),
        }
    }

    /// Size in kilobytes, formatted with one decimal.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> String {
        format!("{:.1}", self.size_bytes as f64 / 1024.0)
    }
}

/// One bar of a suggested chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A bar chart of the first numeric column against the first text column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSuggestion {
    pub x: String,
    pub y: String,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSuggestion {
    /// Suggest a chart for small results with both a text and a numeric column.
    #[must_use]
    pub fn for_rowset(rows: &RowSet) -> Option<Self> {
        if rows.columns().len() < 2 || rows.is_empty() || rows.len() > MAX_CHART_ROWS {
            return None;
        }
        let x_index = *rows.text_columns().first()?;
        let y_index = *rows.numeric_columns().first()?;
        let x = rows.columns().get(x_index)?.clone();
        let y = rows.columns().get(y_index)?.clone();

        let points = rows
            .rows()
            .take(CHART_POINTS)
            .map(|row| ChartPoint {
                label: row.cells().get(x_index).map(ToString::to_string).unwrap_or_default(),
                value: row
                    .cells()
                    .get(y_index)
                    .and_then(CellValue::as_f64)
                    .unwrap_or_default(),
            })
            .collect();

        Some(Self {
            title: format!("{y} by {x}"),
            x,
            y,
            points,
        })
    }

    /// Largest plotted value, or zero when every value is non-positive.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }

    /// Bar length of a value as a whole percentage of the largest bar.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn bar_percent(&self, value: f64) -> u32 {
        let max = self.max_value();
        if max <= 0.0 || value <= 0.0 {
            return 0;
        }
        ((value / max) * 100.0).round().clamp(0.0, 100.0) as u32
    }
}
