//! Interactive console over a single workspace.
//!
//! Each input line is a prompt that is resolved and executed immediately.
//! Lines starting with `:` are commands:
//!
//! - `:sql <query>` - run hand-written SQL (not recorded)
//! - `:history` - executed prompts, newest first
//! - `:stats` - table row counts
//! - `:quit` - leave

use std::error::Error;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use sql_whisperer_web::services::workspace::Workspace;

use crate::output::{OutputFormat, render};

const PROMPT: &str = "whisper> ";

/// Run the loop on stdin and stdout until `:quit` or end of input.
///
/// # Errors
///
/// Returns an error if the store cannot be created or I/O fails.
pub async fn run() -> Result<(), Box<dyn Error>> {
    let workspace = Workspace::open().await?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    session(workspace, input, &mut std::io::stdout()).await
}

/// Drive one interactive session. Query failures are printed and the loop
/// carries on.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn session<R, W>(
    mut workspace: Workspace,
    input: R,
    out: &mut W,
) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("", _) => {}
            (":quit" | ":q", _) => break,
            (":history", _) => {
                if workspace.history().is_empty() {
                    writeln!(out, "No queries executed yet.")?;
                }
                for record in workspace.history().recent(usize::MAX) {
                    writeln!(out, "[{}] {}\n    {}", record.timestamp, record.prompt, record.sql)?;
                }
            }
            (":stats", _) => match workspace.store().counts().await {
                Ok(counts) => writeln!(
                    out,
                    "customers {}, orders {}, products {}",
                    counts.customers, counts.orders, counts.products
                )?,
                Err(err) => writeln!(out, "Stats unavailable: {err}")?,
            },
            (":sql", sql) => match workspace.execute_sql(sql).await {
                Ok(rows) => out.write_all(render(&rows, OutputFormat::Table)?.as_bytes())?,
                Err(err) => writeln!(out, "Query Error: {err}")?,
            },
            (command, _) if command.starts_with(':') => {
                writeln!(out, "Unknown command {command}. Try :sql, :history, :stats or :quit.")?;
            }
            _ => {
                debug!(prompt = line, "Asking");
                match workspace.ask(line).await {
                    Ok((query, rows)) => {
                        writeln!(out, "{}\n", query.display_sql())?;
                        out.write_all(render(rows, OutputFormat::Table)?.as_bytes())?;
                    }
                    Err(err) => writeln!(out, "Query Error: {err}")?,
                }
            }
        }
    }

    Ok(())
}
