//! Runs SQL against a [`SampleStore`] and collects the result as a [`RowSet`].
//!
//! Any SQL is accepted, including text typed by hand. Failures are never
//! fatal: the database's own diagnostic comes back as an [`ExecutionError`]
//! and the store stays usable for the next query.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use thiserror::Error;
use tracing::{debug, instrument};

use sql_whisperer_core::{CellValue, ResolvedQuery, RowSet, RowWidthError};

use crate::db::SampleStore;

/// A query the database refused to prepare or run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ExecutionError {
    /// The database's diagnostic, unchanged.
    pub message: String,
}

impl From<sqlx::Error> for ExecutionError {
    fn from(err: sqlx::Error) -> Self {
        let message = match &err {
            sqlx::Error::Database(db) => db.message().to_owned(),
            other => other.to_string(),
        };
        Self { message }
    }
}

impl From<RowWidthError> for ExecutionError {
    fn from(err: RowWidthError) -> Self {
        Self {
            message: format!("statements return differently shaped rows: {err}"),
        }
    }
}

/// Run a resolved query, binding its parameters.
///
/// # Errors
///
/// Returns the database's diagnostic if the statement fails.
pub async fn run(store: &SampleStore, query: &ResolvedQuery) -> Result<RowSet, ExecutionError> {
    execute_with(store, query.sql, &query.params).await
}

/// Run raw SQL with no parameters.
///
/// # Errors
///
/// Returns the database's diagnostic if the statement fails.
pub async fn execute(store: &SampleStore, sql: &str) -> Result<RowSet, ExecutionError> {
    execute_with(store, sql, &[]).await
}

/// Run SQL with positional text parameters.
///
/// Column names come from the prepared statement, so a query that matches
/// nothing still reports its projection. Text holding several statements
/// runs all of them; their rows must all match the first projection.
///
/// # Errors
///
/// Returns the database's diagnostic if the statement fails to prepare or run,
/// or an error if a returned row does not fit the projection.
#[instrument(skip(store, params), fields(params = params.len()))]
pub async fn execute_with(
    store: &SampleStore,
    sql: &str,
    params: &[String],
) -> Result<RowSet, ExecutionError> {
    let statement = store.pool().prepare(sql).await?;
    let columns = statement
        .columns()
        .iter()
        .map(|column| column.name().to_owned())
        .collect();

    let mut query = statement.query();
    for param in params {
        query = query.bind(param.as_str());
    }
    let rows = query.fetch_all(store.pool()).await?;

    let mut result = RowSet::new(columns);
    for row in &rows {
        result.push_row(decode_row(row)?)?;
    }

    debug!(rows = result.len(), "Query executed");
    Ok(result)
}

fn decode_row(row: &SqliteRow) -> Result<Vec<CellValue>, sqlx::Error> {
    (0..row.len()).map(|index| decode_cell(row, index)).collect()
}

/// Decode one cell by the storage class of the value actually stored.
fn decode_cell(row: &SqliteRow, index: usize) -> Result<CellValue, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(CellValue::Null);
    }

    let type_info = raw.type_info();
    let cell = match type_info.name() {
        "INTEGER" | "BIGINT" | "INT8" | "BOOLEAN" => CellValue::Integer(row.try_get(index)?),
        "REAL" | "NUMERIC" | "FLOAT" | "DOUBLE" => CellValue::Real(row.try_get(index)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            CellValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => match row.try_get::<String, _>(index) {
            Ok(text) => CellValue::from_text(text),
            Err(_) => row
                .try_get::<i64, _>(index)
                .map(CellValue::Integer)
                .or_else(|_| row.try_get::<f64, _>(index).map(CellValue::Real))?,
        },
    };
    Ok(cell)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use sql_whisperer_core::resolve;

    use super::*;

    async fn store() -> SampleStore {
        SampleStore::open().await.unwrap()
    }

    #[tokio::test]
    async fn test_revenue_ranking() {
        let store = store().await;
        let result = run(&store, &resolve("Show top sales by revenue"))
            .await
            .unwrap();

        assert_eq!(result.columns(), ["product_name", "total_revenue"]);
        assert!(result.len() <= 10);

        let first = result.row(0).unwrap();
        assert_eq!(first.get("product_name"), Some(&CellValue::Text("Laptop".into())));
        let top = first.get("total_revenue").unwrap().as_f64().unwrap();
        assert!((top - 2199.98).abs() < 1e-6);

        let revenues: Vec<f64> = result.column(1).filter_map(CellValue::as_f64).collect();
        assert!(revenues.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn test_products_by_price_laptop_first() {
        let store = store().await;
        let query = resolve("Show top 10 products by revenue");
        let result = run(&store, &query).await.unwrap();

        assert_eq!(
            result.columns(),
            ["id", "name", "category", "price", "stock"]
        );
        assert_eq!(result.len(), 7);
        let first = result.row(0).unwrap();
        assert_eq!(first.get("name"), Some(&CellValue::Text("Laptop".into())));
        assert_eq!(first.get("price"), Some(&CellValue::Real(999.99)));
        assert_eq!(first.get("stock"), Some(&CellValue::Integer(50)));
    }

    #[tokio::test]
    async fn test_dates_decode_as_dates() {
        let store = store().await;
        let result = run(&store, &resolve("recent orders")).await.unwrap();

        assert_eq!(
            result.columns(),
            ["name", "product_name", "price", "order_date"]
        );
        let first = result.row(0).unwrap();
        assert_eq!(first.get("name"), Some(&CellValue::Text("Carol Davis".into())));
        assert_eq!(
            first.get("order_date"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2023, 6, 10).unwrap()))
        );
    }

    #[tokio::test]
    async fn test_error_then_recovery() {
        let store = store().await;

        let err = execute(&store, "SELEKT * FROM orders").await.unwrap_err();
        assert!(err.message.contains("syntax error"), "{}", err.message);

        let err = execute(&store, "SELECT * FROM nowhere").await.unwrap_err();
        assert!(err.message.contains("no such table"), "{}", err.message);

        let result = execute(&store, "SELECT COUNT(*) AS n FROM orders").await.unwrap();
        assert_eq!(result.row(0).unwrap().get("n"), Some(&CellValue::Integer(8)));
    }

    #[tokio::test]
    async fn test_search_term_with_quote_is_harmless() {
        let store = store().await;
        let result = run(&store, &resolve("O'Brien")).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns().len(), 6);

        // Still seeded.
        assert_eq!(store.counts().await.unwrap().orders, 8);
    }

    #[tokio::test]
    async fn test_search_wildcards_match_literally() {
        let store = store().await;
        assert!(run(&store, &resolve("%")).await.unwrap().is_empty());
        assert!(run(&store, &resolve("_")).await.unwrap().is_empty());

        let laptops = run(&store, &resolve("laptop")).await.unwrap();
        assert_eq!(laptops.len(), 2);
    }

    #[tokio::test]
    async fn test_column_order_follows_projection() {
        let store = store().await;
        let result = execute(&store, "SELECT price, id, product_name FROM orders ORDER BY id")
            .await
            .unwrap();
        assert_eq!(result.columns(), ["price", "id", "product_name"]);
        assert_eq!(
            result.row(0).unwrap().cells(),
            [
                CellValue::Real(999.99),
                CellValue::Integer(1),
                CellValue::Text("Laptop".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_result_keeps_columns() {
        let store = store().await;
        let result = execute(&store, "SELECT id, name FROM customers WHERE id < 0")
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(result.columns(), ["id", "name"]);
    }

    #[tokio::test]
    async fn test_mismatched_statements_are_an_error() {
        let store = store().await;
        let err = execute(&store, "SELECT 1 AS a; SELECT 2 AS b, 3 AS c")
            .await
            .unwrap_err();
        assert!(err.message.contains("1 columns"), "{}", err.message);

        let result = execute(&store, "SELECT 1 AS a").await.unwrap();
        assert_eq!(result.row(0).unwrap().cells(), [CellValue::Integer(1)]);
    }

    #[tokio::test]
    async fn test_null_cells() {
        let store = store().await;
        let result = execute(&store, "SELECT NULL AS nothing, 1.5 AS half")
            .await
            .unwrap();
        assert_eq!(
            result.row(0).unwrap().cells(),
            [CellValue::Null, CellValue::Real(1.5)]
        );
    }
}
