//! Session-scoped history of executed queries.
//!
//! Records are appended after a successful execution only. Nothing is ever
//! edited or removed; the whole history goes away with its session.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of entries shown in the console's history panel.
pub const DISPLAY_LIMIT: usize = 5;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One executed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRecord {
    pub prompt: String,
    pub sql: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS` (UTC).
    pub timestamp: String,
}

impl QueryRecord {
    /// Record a query executed now.
    #[must_use]
    pub fn new(prompt: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::at(prompt, sql, Utc::now())
    }

    /// Record a query executed at a given instant.
    #[must_use]
    pub fn at(prompt: impl Into<String>, sql: impl Into<String>, when: DateTime<Utc>) -> Self {
        Self {
            prompt: prompt.into(),
            sql: sql.into(),
            timestamp: when.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Append-only list of [`QueryRecord`]s, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryHistory {
    entries: Vec<QueryRecord>,
}

impl QueryHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, record: QueryRecord) {
        self.entries.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[QueryRecord] {
        &self.entries
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &QueryRecord> {
        self.entries.iter().rev().take(limit)
    }

    /// The entries shown in the console, newest first.
    pub fn for_display(&self) -> impl Iterator<Item = &QueryRecord> {
        self.recent(DISPLAY_LIMIT)
    }
}
