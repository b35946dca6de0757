//! Error types for tokenization, conversion, mapping and configuration.
//!
//! Two families live here:
//! - **Per-row errors** ([`TokenizationError`], [`ConvertError`], [`CsvMappingError`]) are
//!   captured as [`CsvMappingResult::Failure`](crate::CsvMappingResult::Failure) and never abort
//!   a parse.
//! - **Configuration errors** ([`ConfigError`]) are fatal and surface before any row is read.

use serde::{Serialize, Serializer};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while splitting one line into fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizationError {
    /// A closing quote was followed by something other than a delimiter or line end.
    #[error("'{delimiter}' expected after '{quote}' at position {position}")]
    DelimiterExpectedAfterQuote {
        delimiter: char,
        quote: char,
        position: usize,
    },

    /// The line contains a NUL character.
    #[error("line contains a NULL byte at position {position}")]
    NullByte { position: usize },

    /// Text continued after a line terminator outside of quotes.
    #[error("new-line character seen in unquoted field at position {position}")]
    NewlineInUnquotedField { position: usize },

    /// The line ended inside a quoted field while running in strict mode.
    #[error("unexpected end of data inside quoted field at position {position}")]
    UnexpectedEndOfData { position: usize },

    /// The grammar tokenizer could not match the input.
    #[error("{expected} expected at position {position}")]
    Grammar {
        position: usize,
        expected: &'static str,
    },
}

/// Failure reported by a [`TypeConverter`](crate::converter::TypeConverter).
#[derive(Debug, Error)]
#[error("cannot convert '{value}' to {target}")]
pub struct ConvertError {
    /// Name of the target type.
    pub target: &'static str,
    /// Raw cell text.
    pub value: String,
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ConvertError {
    pub fn new(target: &'static str, value: impl Into<String>) -> Self {
        Self {
            target,
            value: value.into(),
            source: None,
        }
    }

    /// Attach the underlying parse error.
    #[must_use]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }
}

/// Configuration-time errors. These prevent a parser or mapping from being built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate mapping for column index {index}")]
    DuplicateColumnIndex { index: usize },

    #[error("duplicate mapping for column name '{name}'")]
    DuplicateColumnName { name: String },

    #[error("column '{name}' is mapped but does not appear in the header")]
    UnknownColumn { name: String },

    #[error("a header is required for name-based mapping")]
    MissingHeader,

    #[error("mapped column '{name}' appears more than once in the header")]
    DuplicateHeaderColumn { name: String },

    #[error("no converter registered for type {type_name}")]
    NoConverter { type_name: &'static str },

    #[error("invalid dialect: {reason}")]
    InvalidDialect { reason: String },

    #[error("invalid parser options: {reason}")]
    InvalidOptions { reason: String },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorReason {
    Tokenization,
    ColumnIndex,
    Conversion,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorReason::Tokenization => "tokenization",
            ErrorReason::ColumnIndex => "column index",
            ErrorReason::Conversion => "conversion",
        };
        f.write_str(s)
    }
}

/// Structured per-row failure.
#[derive(Debug, Clone, Serialize)]
pub struct CsvMappingError {
    /// Column that failed, or `None` when the whole line could not be tokenized.
    pub column_index: Option<usize>,
    pub reason: ErrorReason,
    /// Offending raw text: the cell value, the out-of-range index, or the whole line.
    pub value: String,
    pub message: String,
    #[serde(serialize_with = "serialize_cause")]
    pub cause: Option<Arc<dyn StdError + Send + Sync>>,
}

impl CsvMappingError {
    pub(crate) fn tokenization(line: &str, err: TokenizationError) -> Self {
        Self {
            column_index: None,
            reason: ErrorReason::Tokenization,
            value: line.to_string(),
            message: err.to_string(),
            cause: Some(Arc::new(err)),
        }
    }

    pub(crate) fn column_index(index: usize) -> Self {
        Self {
            column_index: Some(index),
            reason: ErrorReason::ColumnIndex,
            value: index.to_string(),
            message: format!("Column {index} is Out Of Range"),
            cause: None,
        }
    }

    pub(crate) fn conversion(index: usize, value: &str, err: ConvertError) -> Self {
        Self {
            column_index: Some(index),
            reason: ErrorReason::Conversion,
            value: value.to_string(),
            message: format!("Column {index} with Value '{value}' cannot be converted"),
            cause: Some(Arc::new(err)),
        }
    }
}

impl fmt::Display for CsvMappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column_index {
            Some(i) => write!(f, "[{} error, column {}] {}", self.reason, i, self.message),
            None => write!(f, "[{} error] {}", self.reason, self.message),
        }
    }
}

impl StdError for CsvMappingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

fn serialize_cause<S: Serializer>(
    cause: &Option<Arc<dyn StdError + Send + Sync>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match cause {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}
