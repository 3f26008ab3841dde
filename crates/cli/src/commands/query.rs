//! One-shot commands: each runs against its own freshly seeded store.

use std::error::Error;
use std::io::Write;

use tracing::info;

use sql_whisperer_core::resolve;
use sql_whisperer_web::db::SampleStore;
use sql_whisperer_web::services::executor;

use crate::output::{OutputFormat, render};

/// Print the SQL a prompt resolves to, with parameters inlined.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn resolve_prompt(prompt: &str, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let query = resolve(prompt);
    info!(intent = ?query.intent, "Resolved prompt");
    writeln!(out, "-- {}", query.intent.label())?;
    writeln!(out, "{}", query.display_sql())?;
    Ok(())
}

/// Resolve a prompt, run it and print the result.
///
/// # Errors
///
/// Returns an error if the store cannot be created, the query fails, or
/// writing fails.
pub async fn ask(
    prompt: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let store = SampleStore::open().await?;
    let query = resolve(prompt);
    if format == OutputFormat::Table {
        writeln!(out, "{}\n", query.display_sql())?;
    }
    let rows = executor::run(&store, &query).await?;
    out.write_all(render(&rows, format)?.as_bytes())?;
    Ok(())
}

/// Run raw SQL and print the result.
///
/// # Errors
///
/// Returns an error if the store cannot be created, the query fails, or
/// writing fails.
pub async fn exec(
    sql: &str,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let store = SampleStore::open().await?;
    let rows = executor::execute(&store, sql).await?;
    out.write_all(render(&rows, format)?.as_bytes())?;
    Ok(())
}

/// Print the seeded row count of each table.
///
/// # Errors
///
/// Returns an error if the store cannot be created or writing fails.
pub async fn stats(out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let store = SampleStore::open().await?;
    let counts = store.counts().await?;
    writeln!(out, "customers  {}", counts.customers)?;
    writeln!(out, "orders     {}", counts.orders)?;
    writeln!(out, "products   {}", counts.products)?;
    Ok(())
}
