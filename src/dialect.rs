//! Dialect: the characters and flags that define how a delimited-text format is quoted,
//! escaped and delimited.
//!
//! A [`Dialect`] is immutable once built and is shared by reference across every tokenizer
//! call, on every worker.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quoting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuoteStyle {
    /// The quote character opens and closes quoted fields.
    #[default]
    QuoteAll,
    /// The quote character has no special meaning.
    QuoteNone,
}

/// Delimited-text dialect.
///
/// When `escape_char` equals `quote_char` there is no separate escape character; embedded
/// quotes are expressed by doubling (see `double_quote`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    pub delimiter: char,
    pub quote_char: char,
    pub escape_char: char,
    pub double_quote: bool,
    pub skip_initial_space: bool,
    pub quoting: QuoteStyle,
    pub strict: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            escape_char: '"',
            double_quote: true,
            skip_initial_space: false,
            quoting: QuoteStyle::QuoteAll,
            strict: true,
        }
    }
}

impl Dialect {
    /// Default dialect with a different delimiter.
    pub fn delimited(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    #[must_use]
    pub fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = escape_char;
        self
    }

    #[must_use]
    pub fn with_double_quote(mut self, double_quote: bool) -> Self {
        self.double_quote = double_quote;
        self
    }

    #[must_use]
    pub fn with_skip_initial_space(mut self, skip: bool) -> Self {
        self.skip_initial_space = skip;
        self
    }

    #[must_use]
    pub fn with_quoting(mut self, quoting: QuoteStyle) -> Self {
        self.quoting = quoting;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether the quote character is active.
    pub fn quoting_enabled(&self) -> bool {
        self.quoting != QuoteStyle::QuoteNone
    }

    /// The escape character, if it is distinct from the quote character.
    pub fn escape(&self) -> Option<char> {
        (self.escape_char != self.quote_char).then_some(self.escape_char)
    }

    /// Eagerly reject dialects no tokenizer can honour.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidDialect`] when the delimiter collides with the quote or
    /// escape character, or when any special character is a line terminator or NUL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::InvalidDialect { reason });
        for (name, c) in [
            ("delimiter", self.delimiter),
            ("quote character", self.quote_char),
            ("escape character", self.escape_char),
        ] {
            if matches!(c, '\r' | '\n' | '\0') {
                return invalid(format!("{name} must not be a line terminator or NUL"));
            }
        }
        if self.delimiter == self.quote_char {
            return invalid(format!(
                "delimiter and quote character are both '{}'",
                self.delimiter
            ));
        }
        if self.delimiter == self.escape_char {
            return invalid(format!(
                "delimiter and escape character are both '{}'",
                self.delimiter
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dialect(delimiter={:?}, quote={:?}, escape={:?}, double_quote={}, skip_initial_space={}, quoting={:?}, strict={})",
            self.delimiter,
            self.quote_char,
            self.escape_char,
            self.double_quote,
            self.skip_initial_space,
            self.quoting,
            self.strict
        )
    }
}
