//! Line sources feeding the parser.
//!
//! The pipeline consumes [`Row`]s; these helpers produce them from strings, readers and files.
//! A line is whatever sits between two line terminators, so a quoted field containing a newline
//! spans two rows and is reported as malformed by the tokenizer.

use crate::row::Row;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// How text is split into lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvReaderOptions {
    /// Line terminators. Longer markers take precedence where they overlap.
    pub new_line: Vec<String>,
}

impl Default for CsvReaderOptions {
    fn default() -> Self {
        Self {
            new_line: vec!["\r\n".to_string(), "\n".to_string()],
        }
    }
}

impl CsvReaderOptions {
    pub fn new<I, S>(new_line: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            new_line: new_line.into_iter().map(Into::into).collect(),
        }
    }
}

/// Split `data` on any of `markers`. The segment after the last terminator is always kept,
/// even when empty.
pub fn split_lines(data: &str, markers: &[String]) -> Vec<String> {
    let mut markers: Vec<&str> = markers
        .iter()
        .map(String::as_str)
        .filter(|m| !m.is_empty())
        .collect();
    markers.sort_by_key(|m| std::cmp::Reverse(m.len()));
    if markers.is_empty() {
        return vec![data.to_string()];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < data.len() {
        let rest = &data[pos..];
        if let Some(marker) = markers.iter().find(|m| rest.starts_with(**m)) {
            lines.push(data[start..pos].to_string());
            pos += marker.len();
            start = pos;
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    lines.push(data[start..].to_string());
    lines
}

/// Numbered rows of `data`.
pub fn rows_from_str(
    data: &str,
    options: &CsvReaderOptions,
) -> impl Iterator<Item = Row> + use<> {
    Row::enumerate(split_lines(data, &options.new_line))
}

/// Numbered rows read lazily from `reader`, split on `\n` or `\r\n`.
pub fn rows_from_reader<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<Row>> {
    reader
        .lines()
        .enumerate()
        .map(|(index, line)| line.map(|text| Row::new(index, text)))
}

/// All rows of a UTF-8 file.
///
/// # Errors
/// Fails if the file cannot be opened or a line cannot be read.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Row>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    rows_from_reader(BufReader::new(f))
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("read line {} in {}", i + 1, path.display())))
        .collect()
}
