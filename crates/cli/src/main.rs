//! SQL Whisperer CLI - resolve prompts and run them from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL for a prompt
//! whisper resolve Show top 10 products by revenue
//!
//! # Resolve and run against a fresh sample store
//! whisper ask customers by city --format csv
//!
//! # Run raw SQL
//! whisper exec "SELECT name, price FROM products WHERE price > 100"
//!
//! # Interactive session with history
//! whisper repl
//! ```
//!
//! # Commands
//!
//! - `resolve` - Print resolved SQL
//! - `ask` - Resolve and execute a prompt
//! - `exec` - Execute raw SQL
//! - `stats` - Table row counts of the sample store
//! - `repl` - Interactive loop over one store

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "whisper")]
#[command(author, version, about = "SQL Whisperer command-line console")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL a prompt resolves to
    Resolve {
        /// The question, in plain English
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Resolve a prompt and run it against a fresh sample store
    Ask {
        /// The question, in plain English
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Run raw SQL against a fresh sample store
    Exec {
        /// SQL text
        sql: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print the row count of each sample table
    Stats,
    /// Start an interactive session
    Repl,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so results on stdout stay pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout();

    match cli.command {
        Commands::Resolve { prompt } => {
            commands::query::resolve_prompt(&prompt.join(" "), &mut out)?;
        }
        Commands::Ask { prompt, format } => {
            commands::query::ask(&prompt.join(" "), format, &mut out).await?;
        }
        Commands::Exec { sql, format } => commands::query::exec(&sql, format, &mut out).await?,
        Commands::Stats => commands::query::stats(&mut out).await?,
        Commands::Repl => commands::repl::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_prompt_words_and_format() {
        let cli = Cli::try_parse_from(["whisper", "ask", "customers", "by", "city", "-f", "json"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Ask { prompt, format } => {
                assert_eq!(prompt.join(" "), "customers by city");
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected ask"),
        }
    }
}
