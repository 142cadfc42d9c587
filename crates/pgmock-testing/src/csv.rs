//! Comma-separated fixture text.
//!
//! Records are separated by line breaks (`\n` or `\r\n`) and fields by
//! commas. A field that starts with `"` is quoted: it may contain commas and
//! line breaks, and `""` stands for a literal quote. Lines holding only
//! whitespace are skipped.
//!
//! Fixture ingestion is forgiving: the first record that is malformed or has
//! the wrong number of fields ends ingestion, and the rows read before it
//! are kept.

use std::fmt;
use std::sync::Arc;

use pgmock_types::SqlValue;
use thiserror::Error;

/// Maps one trimmed field of fixture text to a stored value.
pub type ValueParser = Arc<dyn Fn(&str) -> SqlValue + Send + Sync>;

/// Default field mapping: `null` in any letter case is NULL, everything
/// else is text.
///
/// ```rust
/// use pgmock_testing::csv::null_or_text;
/// use pgmock_testing::SqlValue;
///
/// assert_eq!(null_or_text("NULL"), SqlValue::Null);
/// assert_eq!(null_or_text("42"), SqlValue::Text("42".into()));
/// ```
pub fn null_or_text(field: &str) -> SqlValue {
    if field.eq_ignore_ascii_case("null") {
        SqlValue::Null
    } else {
        SqlValue::Text(field.to_owned())
    }
}

/// The default [`ValueParser`], wrapping [`null_or_text`].
pub fn default_value_parser() -> ValueParser {
    Arc::new(null_or_text)
}

/// A malformed record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A quoted field never closes.
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote {
        /// Line the record starts on (1-based).
        line: usize,
    },

    /// A quote appears inside an unquoted field, or text follows a closing
    /// quote.
    #[error("line {line}: bare or extraneous quote in field")]
    BareQuote {
        /// Line the quote appears on (1-based).
        line: usize,
    },
}

/// Iterator over the records of comma-separated text.
///
/// Yields at most one error, after which it is exhausted.
pub struct Records<'a> {
    rest: &'a str,
    line: usize,
    done: bool,
}

impl<'a> Records<'a> {
    /// Start reading `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            rest: input,
            line: 1,
            done: false,
        }
    }

    fn skip_blank_lines(&mut self) {
        while !self.rest.is_empty() {
            let (line, remainder) = self.rest.split_once('\n').unwrap_or((self.rest, ""));
            if !line.trim().is_empty() {
                break;
            }
            self.rest = remainder;
            self.line += 1;
        }
    }

    fn read_record(&mut self) -> Result<Vec<String>, RecordError> {
        let start_line = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut chars = self.rest.char_indices().peekable();
        let mut consumed = self.rest.len();

        'record: loop {
            if chars.next_if(|&(_, c)| c == '"').is_some() {
                loop {
                    match chars.next() {
                        Some((_, '"')) => {
                            if chars.next_if(|&(_, c)| c == '"').is_some() {
                                field.push('"');
                            } else {
                                break;
                            }
                        }
                        Some((_, c)) => {
                            if c == '\n' {
                                self.line += 1;
                            }
                            field.push(c);
                        }
                        None => return Err(RecordError::UnterminatedQuote { line: start_line }),
                    }
                }

                match chars.next() {
                    None => {
                        fields.push(std::mem::take(&mut field));
                        break 'record;
                    }
                    Some((_, ',')) => {
                        fields.push(std::mem::take(&mut field));
                        continue 'record;
                    }
                    Some((i, '\n')) => {
                        fields.push(std::mem::take(&mut field));
                        consumed = i + 1;
                        break 'record;
                    }
                    Some((i, '\r')) if chars.next_if(|&(_, c)| c == '\n').is_some() => {
                        fields.push(std::mem::take(&mut field));
                        consumed = i + 2;
                        break 'record;
                    }
                    Some(_) => return Err(RecordError::BareQuote { line: self.line }),
                }
            }

            loop {
                match chars.next() {
                    None => {
                        fields.push(std::mem::take(&mut field));
                        break 'record;
                    }
                    Some((_, ',')) => {
                        fields.push(std::mem::take(&mut field));
                        continue 'record;
                    }
                    Some((i, '\n')) => {
                        fields.push(std::mem::take(&mut field));
                        consumed = i + 1;
                        break 'record;
                    }
                    Some((i, '\r')) if chars.next_if(|&(_, c)| c == '\n').is_some() => {
                        fields.push(std::mem::take(&mut field));
                        consumed = i + 2;
                        break 'record;
                    }
                    Some((_, '"')) => return Err(RecordError::BareQuote { line: self.line }),
                    Some((_, c)) => field.push(c),
                }
            }
        }

        if consumed < self.rest.len() {
            self.line += 1;
        }
        self.rest = &self.rest[consumed..];
        Ok(fields)
    }
}

impl Iterator for Records<'_> {
    type Item = Result<Vec<String>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.skip_blank_lines();
        if self.rest.is_empty() {
            self.done = true;
            return None;
        }
        let record = self.read_record();
        if record.is_err() {
            self.done = true;
        }
        Some(record)
    }
}

impl fmt::Debug for Records<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("line", &self.line)
            .field("remaining", &self.rest.len())
            .field("done", &self.done)
            .finish()
    }
}

/// Parse fixture text into rows of exactly `arity` values.
///
/// The whole input and every field are trimmed before `parser` sees them.
pub(crate) fn parse_rows(input: &str, arity: usize, parser: &ValueParser) -> Vec<Vec<SqlValue>> {
    let mut rows = Vec::new();

    for record in Records::new(input.trim()) {
        match record {
            Ok(fields) if fields.len() == arity => {
                rows.push(fields.iter().map(|f| parser(f.trim())).collect());
            }
            Ok(fields) => {
                tracing::trace!(
                    expected = arity,
                    found = fields.len(),
                    kept = rows.len(),
                    "fixture record has wrong field count, stopping"
                );
                break;
            }
            Err(e) => {
                tracing::trace!(error = %e, kept = rows.len(), "malformed fixture record, stopping");
                break;
            }
        }
    }

    rows
}
