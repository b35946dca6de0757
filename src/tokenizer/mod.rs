//! Tokenizers: split one line of delimited text into fields.
//!
//! Every tokenizer is stateless per call, so a single instance can be shared behind an `Arc`
//! by all workers of a [`CsvParser`](crate::CsvParser).
//!
//! - [`FsmTokenizer`] - character-at-a-time state machine driven by a [`Dialect`](crate::Dialect)
//! - [`GrammarTokenizer`] - composable parsing rules, used to cross-check the state machine
//! - [`StringSplitTokenizer`] - plain split on the delimiter, no quoting
//! - [`QuotedStringTokenizer`] - regex based, lenient (feature `regex`)

pub mod fsm;
pub mod grammar;
#[cfg(feature = "regex")]
pub mod quoted;
pub mod split;

use crate::error::TokenizationError;

pub use fsm::{FsmTokenizer, tokenize};
pub use grammar::GrammarTokenizer;
#[cfg(feature = "regex")]
pub use quoted::QuotedStringTokenizer;
pub use split::StringSplitTokenizer;

/// Splits a single line into an ordered list of fields.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `line`. An empty line yields an empty list.
    ///
    /// # Errors
    /// Returns a [`TokenizationError`] when the line is malformed for this tokenizer.
    fn tokenize(&self, line: &str) -> Result<Vec<String>, TokenizationError>;
}
