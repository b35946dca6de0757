//! Row types flowing through the pipeline.

use serde::{Deserialize, Serialize};

/// One physical line of input and its position in the source (0-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub index: usize,
    pub text: String,
}

impl Row {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Number every line from 0.
    pub fn enumerate<I, S>(lines: I) -> impl Iterator<Item = Row>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lines
            .into_iter()
            .enumerate()
            .map(|(index, text)| Row::new(index, text))
    }
}

/// A row after tokenization. Consumed exactly once by the row mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedRow {
    pub index: usize,
    pub fields: Vec<String>,
}

impl TokenizedRow {
    pub fn new(index: usize, fields: Vec<String>) -> Self {
        Self { index, fields }
    }
}
