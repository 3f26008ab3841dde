//! SQL Whisperer Core - Shared types library.
//!
//! This crate provides the pieces of SQL Whisperer that need no I/O:
//! - `web` - Browser console and JSON API (one in-memory store per session)
//! - `cli` - Command-line resolver and one-shot query runner
//!
//! # Architecture
//!
//! The core crate contains only types, fixed data and pure functions - no
//! database access, no HTTP. Turning a prompt into SQL happens here; running
//! that SQL happens in the `web` crate's store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails
//! - [`models`] - Customer, order and product rows of the sample dataset
//! - [`seed`] - The fixed sample rows every store is seeded with
//! - [`resolver`] - Keyword rules mapping a prompt to a query template
//! - [`rowset`] - Tabular query results, summaries and chart suggestions
//! - [`history`] - Session-scoped record of executed queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod history;
pub mod models;
pub mod resolver;
pub mod rowset;
pub mod seed;
pub mod types;

pub use history::{QueryHistory, QueryRecord};
pub use models::{Customer, Order, Product};
pub use resolver::{Intent, ResolvedQuery, resolve};
pub use rowset::{CellValue, ChartSuggestion, ResultSummary, RowSet, RowWidthError};
pub use types::*;
