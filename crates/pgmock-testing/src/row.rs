//! Single-row fixtures.

use std::fmt;
use std::sync::Arc;

use pgmock_client::{CommandTag, Error, FieldDescription};
use pgmock_types::SqlValue;

use crate::csv::{self, ValueParser};
use crate::cursor::ComposedRow;

/// A fixture describing the result of a single-row query.
///
/// Holds at most one row; adding another replaces it. A fixture without a row
/// composes to a [`ComposedRow`] whose `scan` reports
/// [`Error::NoRows`].
///
/// ```rust
/// use pgmock_client::Row;
/// use pgmock_testing::{MockRow, row};
///
/// let mut found = MockRow::new(["id", "username"])
///     .add_row(row![1u32, "johndoe"])
///     .compose();
/// let (mut id, mut name) = (0u32, String::new());
/// found.scan(&mut [&mut id, &mut name]).unwrap();
/// assert_eq!((id, name.as_str()), (1, "johndoe"));
/// ```
#[derive(Clone)]
pub struct MockRow {
    columns: Vec<FieldDescription>,
    row: Option<Vec<SqlValue>>,
    error: Option<Error>,
    command_tag: CommandTag,
    value_parser: ValueParser,
}

impl MockRow {
    /// Create an empty fixture with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_columns(columns.into_iter().map(FieldDescription::new).collect())
    }

    /// Create an empty fixture with full column metadata.
    pub fn with_columns(columns: Vec<FieldDescription>) -> Self {
        Self {
            columns,
            row: None,
            error: None,
            command_tag: CommandTag::default(),
            value_parser: csv::default_value_parser(),
        }
    }

    /// Set the row, replacing any previous one.
    ///
    /// # Panics
    ///
    /// Panics if the number of values differs from the number of columns.
    #[must_use]
    #[allow(clippy::panic)]
    pub fn add_row<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        let row: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            panic!(
                "expected number of values to match number of columns: got {} values for {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.row = Some(row);
        self
    }

    /// Make `scan` fail with `err`.
    #[must_use]
    pub fn row_error(mut self, err: Error) -> Self {
        self.error = Some(err);
        self
    }

    /// Set the completion tag.
    #[must_use]
    pub fn add_command_tag(mut self, tag: CommandTag) -> Self {
        self.command_tag = tag;
        self
    }

    /// Replace how fields of fixture text become values.
    #[must_use]
    pub fn with_value_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str) -> SqlValue + Send + Sync + 'static,
    {
        self.value_parser = Arc::new(parser);
        self
    }

    /// Set the row from comma-separated text.
    ///
    /// Each well-formed record replaces the previous one, so the last record
    /// read wins.
    #[must_use]
    pub fn from_csv_string(mut self, text: &str) -> Self {
        let parsed = csv::parse_rows(text, self.columns.len(), &self.value_parser);
        if let Some(last) = parsed.into_iter().last() {
            self.row = Some(last);
        }
        self
    }

    /// Column metadata.
    #[must_use]
    pub fn columns(&self) -> &[FieldDescription] {
        &self.columns
    }

    /// The stored row, if any.
    #[must_use]
    pub fn row(&self) -> Option<&[SqlValue]> {
        self.row.as_deref()
    }

    /// Turn the fixture into a single-row result.
    #[must_use]
    pub fn compose(self) -> ComposedRow {
        tracing::trace!(has_row = self.row.is_some(), "composed single row");
        ComposedRow::new(self.columns, self.row, self.error, self.command_tag)
    }
}

impl fmt::Debug for MockRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRow")
            .field("columns", &self.columns)
            .field("row", &self.row)
            .field("error", &self.error)
            .field("command_tag", &self.command_tag)
            .field("value_parser", &"<fn>")
            .finish()
    }
}
