//! The parse pipeline: raw rows in, [`CsvMappingResult`]s out.
//!
//! Stages, in order:
//! 1. skip the header (row index 0) when configured
//! 2. drop blank and whitespace-only rows
//! 3. drop rows starting with the comment marker
//! 4. tokenize, on the worker pool
//! 5. drop rows that tokenized to zero fields
//! 6. map via the [`CsvMapping`]
//!
//! Stages 1-3 run on the consuming thread as rows are pulled; 4-6 run on workers. Every row
//! that reaches stage 4 yields exactly one result unless it tokenizes to nothing or the stream is
//! cancelled before the row starts.

use crate::error::{ConfigError, CsvMappingError};
use crate::io::{CsvReaderOptions, rows_from_str};
use crate::mapping::{CsvMapping, CsvMappingResult};
use crate::metrics::{ParseStats, ParseSummary};
use crate::options::{CsvConfig, ParserOptions};
use crate::row::Row;
use crate::runner::{CancelToken, FanOut, WorkerPool};
use crate::tokenizer::{FsmTokenizer, Tokenizer};
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Parses rows of delimited text into entities of type `E`.
///
/// Construction validates the configuration and starts a worker pool sized by
/// `degree_of_parallelism`. The parser is reusable; each call to [`CsvParser::parse`] returns an
/// independent [`ParseStream`].
pub struct CsvParser<E> {
    options: ParserOptions,
    tokenizer: Arc<dyn Tokenizer>,
    mapping: Arc<CsvMapping<E>>,
    pool: Arc<WorkerPool>,
}

impl<E> CsvParser<E>
where
    E: Default + Send + 'static,
{
    /// Parser using the finite-state tokenizer for `config.dialect`.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the dialect or options are invalid or the worker pool
    /// cannot be started.
    pub fn new(config: CsvConfig, mapping: CsvMapping<E>) -> Result<Self, ConfigError> {
        config.dialect.validate()?;
        Self::with_tokenizer(config.options, FsmTokenizer::new(config.dialect), mapping)
    }

    /// Parser using any [`Tokenizer`].
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the options are invalid or the worker pool cannot be started.
    pub fn with_tokenizer<T>(
        options: ParserOptions,
        tokenizer: T,
        mapping: CsvMapping<E>,
    ) -> Result<Self, ConfigError>
    where
        T: Tokenizer + 'static,
    {
        options.validate()?;
        let pool = WorkerPool::new(options.degree_of_parallelism)?;
        debug!(%options, columns = mapping.len(), "created CSV parser");
        Ok(Self {
            options,
            tokenizer: Arc::new(tokenizer),
            mapping: Arc::new(mapping),
            pool: Arc::new(pool),
        })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn mapping(&self) -> &CsvMapping<E> {
        &self.mapping
    }

    /// Run the pipeline over `rows`.
    ///
    /// Rows are pulled lazily as results are consumed. Results arrive in row order when
    /// `keep_order` is set, otherwise in completion order.
    pub fn parse<'a, I>(&self, rows: I) -> ParseStream<'a, E>
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'a,
    {
        let stats = Arc::new(ParseStats::new());

        let skip_header = self.options.skip_header;
        let comment = self.options.comment_character.clone();
        let filter_stats = Arc::clone(&stats);
        let upstream = rows.into_iter().filter(move |row| {
            filter_stats.row_read();
            if skip_header && row.index == 0 {
                filter_stats.header_skipped();
                return false;
            }
            if row.text.trim().is_empty() {
                filter_stats.blank_skipped();
                return false;
            }
            if !comment.is_empty() && row.text.starts_with(comment.as_str()) {
                filter_stats.comment_skipped();
                return false;
            }
            true
        });

        let tokenizer = Arc::clone(&self.tokenizer);
        let mapping = Arc::clone(&self.mapping);
        let trim_fields = self.options.trim_fields;
        let task_stats = Arc::clone(&stats);
        let task = move |row: Row| -> Option<CsvMappingResult<E>> {
            let result = match tokenizer.tokenize(&row.text) {
                Err(e) => CsvMappingResult::Failure {
                    row_index: row.index,
                    error: CsvMappingError::tokenization(&row.text, e),
                },
                Ok(fields) if fields.is_empty() => {
                    task_stats.empty_dropped();
                    return None;
                }
                Ok(mut fields) => {
                    if trim_fields {
                        for field in &mut fields {
                            let trimmed = field.trim();
                            if trimmed.len() != field.len() {
                                *field = trimmed.to_string();
                            }
                        }
                    }
                    mapping.map(row.index, &fields)
                }
            };
            match &result {
                CsvMappingResult::Success { .. } => task_stats.succeeded(),
                CsvMappingResult::Failure { row_index, error } => {
                    trace!(row = row_index, %error, "row failed");
                    task_stats.failed(error.reason);
                }
            }
            Some(result)
        };

        ParseStream {
            inner: FanOut::new(
                upstream,
                task,
                Arc::clone(&self.pool),
                self.options.keep_order,
            ),
            stats,
            finished: false,
        }
    }

    /// Split `data` into lines and parse them.
    pub fn read_from_str(
        &self,
        data: &str,
        reader_options: &CsvReaderOptions,
    ) -> ParseStream<'static, E> {
        self.parse(rows_from_str(data, reader_options))
    }

    /// Read a whole file as UTF-8 and parse its lines.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not valid UTF-8.
    pub fn read_from_file(
        &self,
        path: impl AsRef<Path>,
        reader_options: &CsvReaderOptions,
    ) -> Result<ParseStream<'static, E>> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read CSV file {}", path.display()))?;
        Ok(self.read_from_str(&data, reader_options))
    }
}

impl<E> fmt::Debug for CsvParser<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvParser")
            .field("options", &self.options)
            .field("mapping", &self.mapping)
            .field("workers", &self.pool.degree())
            .finish_non_exhaustive()
    }
}

/// Lazy stream of mapping results. Dropping it cancels outstanding work.
pub struct ParseStream<'a, E> {
    inner: FanOut<'a, Row, CsvMappingResult<E>>,
    stats: Arc<ParseStats>,
    finished: bool,
}

impl<E> ParseStream<'_, E>
where
    E: Send + 'static,
{
    /// Stop dispatching rows. Results already computed are still yielded.
    pub fn cancel(&self) {
        let in_flight = self.inner.in_flight();
        if in_flight > 0 {
            warn!(in_flight, "parse stream cancelled with rows in flight");
        }
        self.inner.cancel_token().cancel();
    }

    /// Token that cancels this stream from elsewhere, including another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.inner.cancel_token()
    }

    /// Counters so far.
    pub fn summary(&self) -> ParseSummary {
        self.stats.snapshot()
    }

    /// Drain the stream into successes and failures.
    pub fn partition(self) -> (Vec<(usize, E)>, Vec<(usize, CsvMappingError)>) {
        crate::mapping::partition_results(self)
    }
}

impl<E> Iterator for ParseStream<'_, E>
where
    E: Send + 'static,
{
    type Item = CsvMappingResult<E>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next();
        if next.is_none() && !self.finished {
            self.finished = true;
            debug!(summary = %self.stats.snapshot(), "parse finished");
        }
        next
    }
}

impl<E> Drop for ParseStream<'_, E> {
    fn drop(&mut self) {
        if !self.finished {
            let in_flight = self.inner.in_flight();
            if in_flight > 0 {
                warn!(in_flight, "parse stream dropped with rows in flight");
            } else {
                debug!(summary = %self.stats.snapshot(), "parse stream dropped");
            }
        }
    }
}
