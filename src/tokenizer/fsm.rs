//! Character-at-a-time finite-state tokenizer.
//!
//! The machine state (current state, field buffer, finished fields) lives on the stack of a
//! single [`tokenize`] call, so one [`FsmTokenizer`] can be shared by every worker.
//!
//! The tokenizer sees one physical line at a time. A quoted field that spans a line break can
//! only be tokenized if the caller joins the physical lines of that record first.

use crate::dialect::Dialect;
use crate::error::TokenizationError;
use crate::tokenizer::Tokenizer;
use std::iter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartRecord,
    StartField,
    EscapedChar,
    InField,
    InQuotedField,
    EscapeInQuotedField,
    QuoteInQuotedField,
    EatCrNl,
    AfterEscapedCrNl,
}

/// Dialect-relative class of one input symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Delimiter,
    Quote,
    Escape,
    Newline,
    Space,
    Other,
    EndOfInput,
}

fn classify(c: Option<char>, dialect: &Dialect) -> CharClass {
    match c {
        None => CharClass::EndOfInput,
        Some('\r' | '\n') => CharClass::Newline,
        Some(c) if c == dialect.delimiter => CharClass::Delimiter,
        Some(c) if c == dialect.quote_char && dialect.quoting_enabled() => CharClass::Quote,
        Some(c) if Some(c) == dialect.escape() => CharClass::Escape,
        Some(' ') => CharClass::Space,
        Some(_) => CharClass::Other,
    }
}

struct Machine<'d> {
    dialect: &'d Dialect,
    state: State,
    field: String,
    fields: Vec<String>,
}

impl<'d> Machine<'d> {
    fn new(dialect: &'d Dialect, capacity: usize) -> Self {
        Self {
            dialect,
            state: State::StartRecord,
            field: String::with_capacity(capacity),
            fields: Vec::new(),
        }
    }

    fn save_field(&mut self) {
        self.fields.push(std::mem::take(&mut self.field));
    }

    fn end_record(&mut self) {
        self.save_field();
        self.state = State::StartRecord;
    }

    fn step(&mut self, c: Option<char>, position: usize) -> Result<(), TokenizationError> {
        use CharClass as C;
        use State as S;

        let class = classify(c, self.dialect);
        match (self.state, class) {
            (S::StartRecord, C::EndOfInput) => {}
            (S::StartRecord, C::Newline) => self.state = S::EatCrNl,
            (S::StartRecord, _) => {
                self.state = S::StartField;
                return self.step(c, position);
            }

            (S::StartField, C::Newline) => {
                self.save_field();
                self.state = S::EatCrNl;
            }
            (S::StartField, C::EndOfInput) => self.end_record(),
            (S::StartField, C::Quote) => self.state = S::InQuotedField,
            (S::StartField, C::Escape) => self.state = S::EscapedChar,
            (S::StartField, C::Space) if self.dialect.skip_initial_space => {}
            (S::StartField, C::Delimiter) => self.save_field(),
            (S::StartField, _) => {
                self.field.extend(c);
                self.state = S::InField;
            }

            (S::EscapedChar, C::Newline) => {
                self.field.extend(c);
                self.state = S::AfterEscapedCrNl;
            }
            // An escaped end of line is kept as a line feed.
            (S::EscapedChar, C::EndOfInput) => {
                self.field.push('\n');
                self.end_record();
            }
            (S::EscapedChar, _) => {
                self.field.extend(c);
                self.state = S::InField;
            }

            (S::AfterEscapedCrNl, C::EndOfInput) => self.end_record(),
            (S::AfterEscapedCrNl, _) => {
                self.state = S::InField;
                return self.step(c, position);
            }

            (S::InField, C::Newline) => {
                self.save_field();
                self.state = S::EatCrNl;
            }
            (S::InField, C::EndOfInput) => self.end_record(),
            (S::InField, C::Escape) => self.state = S::EscapedChar,
            (S::InField, C::Delimiter) => {
                self.save_field();
                self.state = S::StartField;
            }
            (S::InField, C::Quote) => self.state = S::InQuotedField,
            (S::InField, _) => self.field.extend(c),

            (S::InQuotedField, C::EndOfInput) => return self.end_inside_quotes(position),
            (S::InQuotedField, C::Escape) => self.state = S::EscapeInQuotedField,
            (S::InQuotedField, C::Quote) => {
                self.state = if self.dialect.double_quote {
                    S::QuoteInQuotedField
                } else {
                    S::InField
                };
            }
            (S::InQuotedField, _) => self.field.extend(c),

            (S::EscapeInQuotedField, C::EndOfInput) => {
                self.field.push('\n');
                return self.end_inside_quotes(position);
            }
            (S::EscapeInQuotedField, _) => {
                self.field.extend(c);
                self.state = S::InQuotedField;
            }

            (S::QuoteInQuotedField, C::Quote) => {
                self.field.extend(c);
                self.state = S::InQuotedField;
            }
            (S::QuoteInQuotedField, C::Delimiter) => {
                self.save_field();
                self.state = S::StartField;
            }
            (S::QuoteInQuotedField, C::Newline) => {
                self.save_field();
                self.state = S::EatCrNl;
            }
            (S::QuoteInQuotedField, C::EndOfInput) => self.end_record(),
            (S::QuoteInQuotedField, _) => {
                if self.dialect.strict {
                    return Err(TokenizationError::DelimiterExpectedAfterQuote {
                        delimiter: self.dialect.delimiter,
                        quote: self.dialect.quote_char,
                        position,
                    });
                }
                self.field.extend(c);
                self.state = S::InField;
            }

            (S::EatCrNl, C::Newline) => {}
            (S::EatCrNl, C::EndOfInput) => self.state = S::StartRecord,
            (S::EatCrNl, _) => {
                return Err(TokenizationError::NewlineInUnquotedField { position });
            }
        }
        Ok(())
    }

    /// The line ended while a quoted field was still open.
    fn end_inside_quotes(&mut self, position: usize) -> Result<(), TokenizationError> {
        if self.dialect.strict {
            return Err(TokenizationError::UnexpectedEndOfData { position });
        }
        self.end_record();
        Ok(())
    }
}

/// Tokenize one line under `dialect`.
///
/// An empty line yields an empty field list. A line holding only whitespace is not empty: it
/// yields one field with that whitespace (the parser drops such rows before tokenizing). A NUL
/// character anywhere in the line is an error.
///
/// # Errors
/// Returns a [`TokenizationError`] for NUL bytes, text after an unquoted line terminator, and,
/// in strict mode, for a closing quote not followed by a delimiter or line end, or a line that
/// ends inside quotes.
pub fn tokenize(line: &str, dialect: &Dialect) -> Result<Vec<String>, TokenizationError> {
    if let Some(position) = line.chars().position(|c| c == '\0') {
        return Err(TokenizationError::NullByte { position });
    }

    let mut machine = Machine::new(dialect, line.len());
    for (position, c) in line.chars().map(Some).chain(iter::once(None)).enumerate() {
        machine.step(c, position)?;
    }
    Ok(machine.fields)
}

/// [`Tokenizer`] backed by the finite-state machine.
#[derive(Debug, Clone, Default)]
pub struct FsmTokenizer {
    dialect: Dialect,
}

impl FsmTokenizer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }
}

impl Tokenizer for FsmTokenizer {
    fn tokenize(&self, line: &str) -> Result<Vec<String>, TokenizationError> {
        tokenize(line, &self.dialect)
    }
}
