//! Whole-line tokenizer built from small composable parsing rules.
//!
//! This is the cross-check for [`FsmTokenizer`](crate::tokenizer::FsmTokenizer): for valid
//! RFC4180 input both produce the same fields. It always behaves like a strict, double-quoting
//! dialect; only the delimiter, quote and escape characters of the [`Dialect`] are used.
//!
//! Grammar:
//! ```text
//! record     := cell (delimiter cell)* newline* END
//! cell       := quoted | literal
//! quoted     := quote (escape quote | !quote)* quote
//! literal    := (!delimiter !newline !quote)*
//! ```
//!
//! A quote inside an unquoted cell is rejected. The FSM rejects it too unless a later quote
//! closes the section (`a"b,c"` yields `["ab,c"]` there).

use crate::dialect::Dialect;
use crate::error::TokenizationError;
use crate::tokenizer::Tokenizer;
use std::fmt;

/// Why a rule did not match, and where.
#[derive(Debug, Clone, Copy)]
struct Miss<'a> {
    at: &'a str,
    expected: &'static str,
}

/// Parsed value plus the unconsumed input.
type Step<'a, T> = Result<(T, &'a str), Miss<'a>>;

type RecordRule = Box<dyn for<'a> Fn(&'a str) -> Step<'a, Vec<String>> + Send + Sync>;

fn satisfy(
    expected: &'static str,
    pred: impl Fn(char) -> bool,
) -> impl Fn(&str) -> Step<'_, char> {
    move |input| match input.chars().next() {
        Some(c) if pred(c) => Ok((c, &input[c.len_utf8()..])),
        _ => Err(Miss {
            at: input,
            expected,
        }),
    }
}

fn symbol(c: char, expected: &'static str) -> impl Fn(&str) -> Step<'_, char> {
    satisfy(expected, move |x| x == c)
}

fn end(expected: &'static str) -> impl Fn(&str) -> Step<'_, ()> {
    move |input| {
        if input.is_empty() {
            Ok(((), input))
        } else {
            Err(Miss {
                at: input,
                expected,
            })
        }
    }
}

/// Run `p` then `q`, keeping the result of `q`.
fn then<A, B>(
    p: impl Fn(&str) -> Step<'_, A>,
    q: impl Fn(&str) -> Step<'_, B>,
) -> impl Fn(&str) -> Step<'_, B> {
    move |input| {
        let (_, rest) = p(input)?;
        q(rest)
    }
}

/// `open p close`, keeping the result of `p`.
fn between<A, B, C>(
    open: impl Fn(&str) -> Step<'_, A>,
    p: impl Fn(&str) -> Step<'_, B>,
    close: impl Fn(&str) -> Step<'_, C>,
) -> impl Fn(&str) -> Step<'_, B> {
    move |input| {
        let (_, rest) = open(input)?;
        let (value, rest) = p(rest)?;
        let (_, rest) = close(rest)?;
        Ok((value, rest))
    }
}

/// Try `p`; on any failure try `q` from the same input.
fn or<T>(
    p: impl Fn(&str) -> Step<'_, T>,
    q: impl Fn(&str) -> Step<'_, T>,
) -> impl Fn(&str) -> Step<'_, T> {
    move |input| p(input).or_else(|_| q(input))
}

/// Try `p`; only if it failed without consuming input, try `q`.
fn xor<T>(
    p: impl Fn(&str) -> Step<'_, T>,
    q: impl Fn(&str) -> Step<'_, T>,
) -> impl Fn(&str) -> Step<'_, T> {
    move |input| match p(input) {
        Err(miss) if miss.at.len() == input.len() => q(input),
        other => other,
    }
}

/// Zero or more `p`. A failure that consumed input is propagated.
fn many<T>(p: impl Fn(&str) -> Step<'_, T>) -> impl Fn(&str) -> Step<'_, Vec<T>> {
    move |input| {
        let mut out = Vec::new();
        let mut rest = input;
        loop {
            match p(rest) {
                Ok((value, next)) if next.len() < rest.len() => {
                    out.push(value);
                    rest = next;
                }
                Ok(_) => break,
                Err(miss) if miss.at.len() == rest.len() => break,
                Err(miss) => return Err(miss),
            }
        }
        Ok((out, rest))
    }
}

fn text(p: impl Fn(&str) -> Step<'_, Vec<char>>) -> impl Fn(&str) -> Step<'_, String> {
    move |input| p(input).map(|(chars, rest)| (chars.into_iter().collect(), rest))
}

fn is_newline(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn cell(delimiter: char, quote: char, escape: char) -> impl Fn(&str) -> Step<'_, String> {
    let escaped_quote = then(symbol(escape, "escape character"), symbol(quote, "quote"));
    let quoted_char = or(
        escaped_quote,
        satisfy("quoted content", move |c| c != quote),
    );
    let quoted = between(
        symbol(quote, "opening quote"),
        text(many(quoted_char)),
        symbol(quote, "closing quote"),
    );
    let literal = text(many(satisfy("cell content", move |c| {
        c != delimiter && c != quote && !is_newline(c)
    })));
    xor(quoted, literal)
}

fn boxed<F>(rule: F) -> RecordRule
where
    F: for<'a> Fn(&'a str) -> Step<'a, Vec<String>> + Send + Sync + 'static,
{
    Box::new(rule)
}

fn record(delimiter: char, quote: char, escape: char) -> RecordRule {
    let first = cell(delimiter, quote, escape);
    let rest = many(then(
        symbol(delimiter, "delimiter"),
        cell(delimiter, quote, escape),
    ));
    let terminator = then(
        many(satisfy("line terminator", is_newline)),
        end("delimiter or end of line"),
    );
    boxed(move |input| {
        let (head, remaining) = first(input)?;
        let (tail, remaining) = rest(remaining)?;
        let (_, remaining) = terminator(remaining)?;
        let mut fields = Vec::with_capacity(tail.len() + 1);
        fields.push(head);
        fields.extend(tail);
        Ok((fields, remaining))
    })
}

/// [`Tokenizer`] built from parsing rules. Used as a conformance oracle for the FSM.
pub struct GrammarTokenizer {
    dialect: Dialect,
    rule: RecordRule,
}

impl GrammarTokenizer {
    pub fn new(dialect: Dialect) -> Self {
        let rule = record(dialect.delimiter, dialect.quote_char, dialect.escape_char);
        Self { dialect, rule }
    }
}

impl Default for GrammarTokenizer {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl fmt::Debug for GrammarTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrammarTokenizer")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl Tokenizer for GrammarTokenizer {
    fn tokenize(&self, line: &str) -> Result<Vec<String>, TokenizationError> {
        if let Some(position) = line.chars().position(|c| c == '\0') {
            return Err(TokenizationError::NullByte { position });
        }
        if line.is_empty() {
            return Ok(Vec::new());
        }
        match (self.rule)(line) {
            Ok((fields, _)) => Ok(fields),
            Err(miss) => {
                let offset = line.len() - miss.at.len();
                Err(TokenizationError::Grammar {
                    position: line[..offset].chars().count(),
                    expected: miss.expected,
                })
            }
        }
    }
}
