//! # csvbeam
//!
//! A **parallel, typed CSV parser** for Rust. Lines of delimited text are tokenized on a worker
//! pool, mapped column-by-column onto your own entity type, and streamed back as one
//! [`CsvMappingResult`] per row, so a malformed row never aborts the parse.
//!
//! ## Key Features
//!
//! - **Dialect-driven tokenizer** - delimiter, quote, escape, doubled quotes, strict mode
//! - **Typed mapping** - bind columns by index or header name to setters on any `Default` type
//! - **Converter registry** - built-ins for primitives, `Option<T>` and (feature `datetime`) dates
//! - **Bounded parallelism** - at most a fixed window of rows in flight, lazy pull from the source
//! - **Order control** - results in source order (`keep_order`) or in completion order
//! - **Per-row errors** - tokenization, out-of-range and conversion failures are values
//!
//! ## Quick Start
//!
//! ```
//! use csvbeam::*;
//! # use anyhow::Result;
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     first_name: String,
//!     last_name: String,
//!     age: u32,
//! }
//!
//! # fn main() -> Result<()> {
//! let mapping = CsvMapping::<Person>::builder()
//!     .map(0, |p: &mut Person, v: String| p.first_name = v)?
//!     .map(1, |p: &mut Person, v: String| p.last_name = v)?
//!     .map(2, |p: &mut Person, v: u32| p.age = v)?
//!     .build();
//!
//! let config = CsvConfig::new(
//!     Dialect::delimited(';'),
//!     ParserOptions::default().with_keep_order(true),
//! );
//! let parser = CsvParser::new(config, mapping)?;
//!
//! let data = "first;last;age\nPhilipp;Wagner;38\nMax;Mustermann;n/a\n";
//! let results: Vec<_> = parser.read_from_str(data, &CsvReaderOptions::default()).collect();
//!
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].entity().map(|p| p.age), Some(38));
//! assert_eq!(results[1].reason(), Some(ErrorReason::Conversion));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Dialect and tokenizers
//!
//! A [`Dialect`] describes the text format. The default [`FsmTokenizer`] is a finite-state
//! machine over one line; [`GrammarTokenizer`], [`StringSplitTokenizer`] and
//! [`QuotedStringTokenizer`] implement the same [`Tokenizer`] trait and can be passed to
//! [`CsvParser::with_tokenizer`].
//!
//! ### Mapping
//!
//! A [`CsvMapping`] is an immutable table of `(column index, property)` bindings. Build it with
//! [`CsvMappingBuilder`] or, when columns are addressed by name, with [`HeaderMappingBuilder`]
//! against a header row. All checks happen at build time and fail with a [`ConfigError`].
//!
//! ### Pipeline
//!
//! [`CsvParser::parse`] takes any iterator of [`Row`]s and returns a lazy [`ParseStream`].
//! Header, blank and comment rows are filtered first; the rest are tokenized and mapped in
//! parallel. Dropping or cancelling the stream stops dispatch.
//!
//! ## Feature Flags
//!
//! - `datetime` (default) - chrono-backed date, time and date-time converters
//! - `regex` (default) - [`QuotedStringTokenizer`]
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (pool start-up, mapping construction, per-row failures at
//! `trace`, parse summaries at `debug`). Install any subscriber to see them.

pub mod converter;
pub mod dialect;
pub mod error;
pub mod io;
pub mod mapping;
pub mod metrics;
pub mod options;
pub mod pipeline;
pub mod row;
pub mod runner;
pub mod tokenizer;
pub mod validation;

pub use converter::{FnConverter, TypeConverter, TypeConverterProvider};
pub use dialect::{Dialect, QuoteStyle};
pub use error::{ConfigError, ConvertError, CsvMappingError, ErrorReason, TokenizationError};
pub use io::{CsvReaderOptions, rows_from_reader, rows_from_str};
pub use mapping::{
    CsvMapping, CsvMappingBuilder, CsvMappingResult, HeaderMappingBuilder, partition_results,
};
pub use metrics::ParseSummary;
pub use options::{CsvConfig, ParserOptions};
pub use pipeline::{CsvParser, ParseStream};
pub use row::{Row, TokenizedRow};
pub use runner::CancelToken;
#[cfg(feature = "regex")]
pub use tokenizer::QuotedStringTokenizer;
pub use tokenizer::{FsmTokenizer, GrammarTokenizer, StringSplitTokenizer, Tokenizer};
pub use validation::ErrorCollector;
