//! Collecting and reporting per-row failures.
//!
//! A parse never aborts on a bad row; failures arrive in the result stream next to successes.
//! [`ErrorCollector`] is the usual place to put them while the successes move on.
//!
//! # Example
//!
//! ```no_run
//! use csvbeam::*;
//! use csvbeam::validation::ErrorCollector;
//!
//! #[derive(Default)]
//! struct Reading { station: String, value: f64 }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mapping = CsvMapping::<Reading>::builder()
//!     .map(0, |r: &mut Reading, v: String| r.station = v)?
//!     .map(1, |r: &mut Reading, v: f64| r.value = v)?
//!     .build();
//! let parser = CsvParser::new(CsvConfig::default(), mapping)?;
//!
//! let mut errors = ErrorCollector::new();
//! let readings: Vec<Reading> = parser
//!     .parse(Row::enumerate(["station,value", "A,1.5", "B,n/a"]))
//!     .filter_map(|r| errors.take(r))
//!     .collect();
//!
//! println!("{} readings, {}", readings.len(), errors);
//! errors.write_to_file("errors.json")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{CsvMappingError, ErrorReason};
use crate::mapping::CsvMappingResult;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A failed row.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub row_index: usize,
    pub error: CsvMappingError,
}

/// Accumulates failed rows for batch reporting.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    failures: Vec<RowFailure>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row_index: usize, error: CsvMappingError) {
        self.failures.push(RowFailure { row_index, error });
    }

    /// Keep the entity of a successful result; record a failed one and return `None`.
    pub fn take<E>(&mut self, result: CsvMappingResult<E>) -> Option<E> {
        match result {
            CsvMappingResult::Success { entity, .. } => Some(entity),
            CsvMappingResult::Failure { row_index, error } => {
                self.add(row_index, error);
                None
            }
        }
    }

    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }

    /// Failures ordered by row index.
    pub fn sorted(&self) -> Vec<&RowFailure> {
        let mut v: Vec<&RowFailure> = self.failures.iter().collect();
        v.sort_by_key(|f| f.row_index);
        v
    }

    /// Failure counts per reason.
    pub fn count_by_reason(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for f in &self.failures {
            *counts.entry(f.error.reason.to_string()).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_of(&self, reason: ErrorReason) -> usize {
        self.failures
            .iter()
            .filter(|f| f.error.reason == reason)
            .count()
    }

    pub fn clear(&mut self) {
        self.failures.clear();
    }

    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.failures)
    }

    /// Write all failures as a JSON array.
    ///
    /// # Errors
    /// Fails if serialization or the write fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json().context("serialize row failures")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
    }
}

impl fmt::Display for ErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCollector({} errors)", self.error_count())
    }
}

impl Extend<RowFailure> for ErrorCollector {
    fn extend<T: IntoIterator<Item = RowFailure>>(&mut self, iter: T) {
        self.failures.extend(iter);
    }
}
