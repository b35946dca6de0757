//! Regex-backed tokenizer for simple quoted input.
//!
//! Each field is matched as either a quoted run (doubled quotes allowed inside) or an unquoted
//! run containing neither delimiter nor quote. Text that matches neither is skipped, so this
//! tokenizer never fails; use [`FsmTokenizer`](crate::tokenizer::FsmTokenizer) when malformed
//! input must be reported.

use crate::error::TokenizationError;
use crate::tokenizer::Tokenizer;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct QuotedStringTokenizer {
    quote: char,
    pattern: Regex,
}

impl QuotedStringTokenizer {
    /// Tokenizer using `"` as the quote character.
    ///
    /// # Errors
    /// Fails if the generated pattern cannot be compiled.
    pub fn new(delimiter: char) -> Result<Self, regex::Error> {
        Self::with_quote(delimiter, '"')
    }

    /// # Errors
    /// Fails if the generated pattern cannot be compiled.
    pub fn with_quote(delimiter: char, quote: char) -> Result<Self, regex::Error> {
        let d = regex::escape(&delimiter.to_string());
        let q = regex::escape(&quote.to_string());
        let pattern = Regex::new(&format!(
            r"(?:^|{d})(?:{q}((?:[^{q}]|{q}{q})*){q}|([^{d}{q}]*))"
        ))?;
        Ok(Self { quote, pattern })
    }
}

impl Tokenizer for QuotedStringTokenizer {
    fn tokenize(&self, line: &str) -> Result<Vec<String>, TokenizationError> {
        if line.is_empty() {
            return Ok(Vec::new());
        }
        let doubled = format!("{0}{0}", self.quote);
        let single = self.quote.to_string();
        Ok(self
            .pattern
            .captures_iter(line)
            .map(|caps| match (caps.get(1), caps.get(2)) {
                (Some(quoted), _) => quoted.as_str().replace(&doubled, &single),
                (None, Some(plain)) => plain.as_str().to_string(),
                (None, None) => String::new(),
            })
            .collect())
    }
}
