//! Counters describing what a parse did with its input.
//!
//! A [`ParseStats`] is shared between a [`ParseStream`](crate::ParseStream) and its workers;
//! take a [`ParseSummary`] snapshot at any time, print it, or save it as JSON.
//!
//! ```no_run
//! # use csvbeam::*;
//! # #[derive(Default)] struct Person { name: String }
//! # fn main() -> anyhow::Result<()> {
//! # let mapping = CsvMapping::<Person>::builder().map(0, |p: &mut Person, v: String| p.name = v)?.build();
//! let parser = CsvParser::new(CsvConfig::default(), mapping)?;
//! let mut stream = parser.parse(Row::enumerate(["name", "Ada", "# note", ""]));
//! let people: Vec<_> = stream.by_ref().collect();
//! let summary = stream.summary();
//! println!("{summary}");
//! summary.save_to_file("parse_summary.json")?;
//! # Ok(())
//! # }
//! ```

use crate::error::ErrorReason;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe parse counters.
#[derive(Debug, Default)]
pub struct ParseStats {
    rows_read: AtomicU64,
    header_skipped: AtomicU64,
    blank_skipped: AtomicU64,
    comment_skipped: AtomicU64,
    empty_dropped: AtomicU64,
    succeeded: AtomicU64,
    tokenization_failures: AtomicU64,
    column_index_failures: AtomicU64,
    conversion_failures: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn row_read(&self) {
        bump(&self.rows_read);
    }

    pub(crate) fn header_skipped(&self) {
        bump(&self.header_skipped);
    }

    pub(crate) fn blank_skipped(&self) {
        bump(&self.blank_skipped);
    }

    pub(crate) fn comment_skipped(&self) {
        bump(&self.comment_skipped);
    }

    pub(crate) fn empty_dropped(&self) {
        bump(&self.empty_dropped);
    }

    pub(crate) fn succeeded(&self) {
        bump(&self.succeeded);
    }

    pub(crate) fn failed(&self, reason: ErrorReason) {
        match reason {
            ErrorReason::Tokenization => bump(&self.tokenization_failures),
            ErrorReason::ColumnIndex => bump(&self.column_index_failures),
            ErrorReason::Conversion => bump(&self.conversion_failures),
        }
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> ParseSummary {
        let get = |c: &AtomicU64| c.load(Ordering::Relaxed);
        ParseSummary {
            rows_read: get(&self.rows_read),
            header_skipped: get(&self.header_skipped),
            blank_skipped: get(&self.blank_skipped),
            comment_skipped: get(&self.comment_skipped),
            empty_dropped: get(&self.empty_dropped),
            succeeded: get(&self.succeeded),
            tokenization_failures: get(&self.tokenization_failures),
            column_index_failures: get(&self.column_index_failures),
            conversion_failures: get(&self.conversion_failures),
        }
    }
}

/// Snapshot of [`ParseStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseSummary {
    pub rows_read: u64,
    pub header_skipped: u64,
    pub blank_skipped: u64,
    pub comment_skipped: u64,
    pub empty_dropped: u64,
    pub succeeded: u64,
    pub tokenization_failures: u64,
    pub column_index_failures: u64,
    pub conversion_failures: u64,
}

impl ParseSummary {
    pub fn failed(&self) -> u64 {
        self.tokenization_failures + self.column_index_failures + self.conversion_failures
    }

    /// Rows removed before tokenization (header, blank and comment lines).
    pub fn filtered(&self) -> u64 {
        self.header_skipped + self.blank_skipped + self.comment_skipped
    }

    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the summary as pretty-printed JSON.
    ///
    /// # Errors
    /// Fails if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json().context("serialize parse summary")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
    }
}

impl fmt::Display for ParseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows read, {} filtered, {} succeeded, {} failed",
            self.rows_read,
            self.filtered(),
            self.succeeded,
            self.failed()
        )
    }
}
