//! Parser options and JSON-loadable configuration.
//!
//! # Example
//! ```
//! use csvbeam::{CsvConfig, Dialect, ParserOptions};
//!
//! let config = CsvConfig::from_json_str(r#"{
//!     "dialect": { "delimiter": ";" },
//!     "options": { "skip_header": false, "degree_of_parallelism": 2, "keep_order": true }
//! }"#).unwrap();
//! assert_eq!(config.dialect.delimiter, ';');
//! assert!(config.options.keep_order);
//! ```

use crate::dialect::Dialect;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Row-level pipeline options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Drop the row with index 0.
    pub skip_header: bool,
    /// Rows starting with this marker are dropped. Empty disables comment handling.
    pub comment_character: String,
    /// Maximum number of rows processed concurrently.
    pub degree_of_parallelism: usize,
    /// Yield results in source row order.
    pub keep_order: bool,
    /// Trim surrounding whitespace from every field after tokenization.
    pub trim_fields: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            skip_header: true,
            comment_character: String::new(),
            degree_of_parallelism: num_cpus::get().max(1),
            keep_order: false,
            trim_fields: false,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub fn with_skip_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    #[must_use]
    pub fn with_comment_character(mut self, marker: impl Into<String>) -> Self {
        self.comment_character = marker.into();
        self
    }

    #[must_use]
    pub fn with_degree_of_parallelism(mut self, degree: usize) -> Self {
        self.degree_of_parallelism = degree;
        self
    }

    #[must_use]
    pub fn with_keep_order(mut self, keep_order: bool) -> Self {
        self.keep_order = keep_order;
        self
    }

    #[must_use]
    pub fn with_trim_fields(mut self, trim_fields: bool) -> Self {
        self.trim_fields = trim_fields;
        self
    }

    /// # Errors
    /// Returns [`ConfigError::InvalidOptions`] for a zero degree of parallelism or a comment
    /// marker containing a line break.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.degree_of_parallelism == 0 {
            return Err(ConfigError::InvalidOptions {
                reason: "degree_of_parallelism must be at least 1".into(),
            });
        }
        if self.comment_character.contains(['\r', '\n']) {
            return Err(ConfigError::InvalidOptions {
                reason: "comment_character must not contain a line break".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParserOptions(skip_header={}, comment_character={:?}, degree_of_parallelism={}, keep_order={}, trim_fields={})",
            self.skip_header,
            self.comment_character,
            self.degree_of_parallelism,
            self.keep_order,
            self.trim_fields
        )
    }
}

/// A dialect plus parser options, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub dialect: Dialect,
    pub options: ParserOptions,
}

impl CsvConfig {
    pub fn new(dialect: Dialect, options: ParserOptions) -> Self {
        Self { dialect, options }
    }

    /// Parse and validate a JSON document. Missing keys take their defaults.
    ///
    /// # Errors
    /// Fails on malformed JSON or on a configuration rejected by [`CsvConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CsvConfig = serde_json::from_str(json).context("parse CSV configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or its contents are rejected by
    /// [`CsvConfig::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("load {}", path.display()))
    }

    /// # Errors
    /// Returns the first [`ConfigError`] found in the dialect or the options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dialect.validate()?;
        self.options.validate()
    }
}
