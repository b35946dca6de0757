use crate::error::TokenizationError;
use crate::tokenizer::Tokenizer;

/// Splits on every occurrence of the delimiter. Quotes have no meaning.
#[derive(Debug, Clone)]
pub struct StringSplitTokenizer {
    delimiter: char,
    trim: bool,
}

impl StringSplitTokenizer {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            trim: false,
        }
    }

    /// Trim surrounding whitespace from every field.
    #[must_use]
    pub fn trimmed(mut self) -> Self {
        self.trim = true;
        self
    }
}

impl Tokenizer for StringSplitTokenizer {
    fn tokenize(&self, line: &str) -> Result<Vec<String>, TokenizationError> {
        if line.is_empty() {
            return Ok(Vec::new());
        }
        Ok(line
            .split(self.delimiter)
            .map(|f| if self.trim { f.trim() } else { f })
            .map(str::to_string)
            .collect())
    }
}
