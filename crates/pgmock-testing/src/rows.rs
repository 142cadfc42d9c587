//! Multi-row fixtures.

use std::collections::HashMap;
use std::fmt;

use pgmock_client::{CommandTag, Error, FieldDescription};
use pgmock_types::SqlValue;

use crate::csv::{self, ValueParser};
use crate::cursor::ComposedRows;

/// A fixture describing the rows a query returns.
///
/// Build it up, then call [`compose`](MockRows::compose) to get a cursor, or
/// hand it to a mock expectation which composes a fresh cursor per call.
///
/// # Example
///
/// ```rust
/// use pgmock_client::Rows;
/// use pgmock_testing::{MockRows, row};
///
/// let mut rows = MockRows::new(["id", "username"])
///     .add_row(row![1u32, "johndoe"])
///     .add_row(row![2u32, "janedoe"])
///     .compose();
///
/// let mut seen = Vec::new();
/// while rows.next() {
///     let (mut id, mut name) = (0u32, String::new());
///     rows.scan(&mut [&mut id, &mut name]).unwrap();
///     seen.push((id, name));
/// }
/// assert_eq!(seen, vec![(1, "johndoe".to_string()), (2, "janedoe".to_string())]);
/// ```
#[derive(Clone)]
pub struct MockRows {
    pub(crate) columns: Vec<FieldDescription>,
    pub(crate) rows: Vec<Vec<SqlValue>>,
    pub(crate) row_errors: HashMap<usize, Error>,
    pub(crate) close_error: Option<Error>,
    pub(crate) command_tag: CommandTag,
    value_parser: ValueParser,
}

impl MockRows {
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
            rows: Vec::new(),
            row_errors: HashMap::new(),
            close_error: None,
            command_tag: CommandTag::default(),
            value_parser: csv::default_value_parser(),
        }
    }

    /// Append a row.
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
        self.rows.push(row);
        self
    }

    /// Attach an error to the row at `index` (0-based).
    ///
    /// Scanning that row returns the error instead of copying values, and
    /// [`Rows::err`](pgmock_client::Rows::err) reports it once the row has
    /// been reached. An index equal to the row count reports the error after
    /// the last row.
    #[must_use]
    pub fn row_error(mut self, index: usize, err: Error) -> Self {
        self.row_errors.insert(index, err);
        self
    }

    /// Make every `close` of the composed cursor fail with `err`.
    #[must_use]
    pub fn close_error(mut self, err: Error) -> Self {
        self.close_error = Some(err);
        self
    }

    /// Set the completion tag the cursor reports.
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
        self.value_parser = std::sync::Arc::new(parser);
        self
    }

    /// Append rows parsed from comma-separated text.
    ///
    /// See the [`csv`](crate::csv) module for the accepted format. Ingestion
    /// stops silently at the first malformed record or the first record whose
    /// field count differs from the column count.
    #[must_use]
    pub fn from_csv_string(mut self, text: &str) -> Self {
        let parsed = csv::parse_rows(text, self.columns.len(), &self.value_parser);
        self.rows.extend(parsed);
        self
    }

    /// Column metadata.
    #[must_use]
    pub fn columns(&self) -> &[FieldDescription] {
        &self.columns
    }

    /// Stored rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    /// Number of stored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Turn the fixture into a cursor positioned before the first row.
    #[must_use]
    pub fn compose(self) -> ComposedRows {
        ComposedRows::new(vec![self])
    }
}

/// Combine several fixtures into one cursor with a result set each.
///
/// ```rust
/// use pgmock_client::Rows;
/// use pgmock_testing::{MockRows, compose_rows, row};
///
/// let mut rows = compose_rows([
///     MockRows::new(["a"]).add_row(row![1]),
///     MockRows::new(["b"]).add_row(row![2]).add_row(row![3]),
/// ]);
/// assert!(rows.next());
/// assert!(!rows.next());
/// assert!(rows.next_result_set());
/// assert_eq!(rows.field_descriptions()[0].name(), "b");
/// ```
pub fn compose_rows<I>(sets: I) -> ComposedRows
where
    I: IntoIterator<Item = MockRows>,
{
    ComposedRows::new(sets.into_iter().collect())
}

impl fmt::Debug for MockRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRows")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("row_errors", &self.row_errors)
            .field("close_error", &self.close_error)
            .field("command_tag", &self.command_tag)
            .field("value_parser", &"<fn>")
            .finish()
    }
}

impl fmt::Display for MockRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        describe_sets(f, &[self])
    }
}

/// Render fixtures the way mock diagnostics print them.
pub(crate) fn describe_sets(f: &mut fmt::Formatter<'_>, sets: &[&MockRows]) -> fmt::Result {
    if sets.iter().all(|s| s.is_empty()) {
        return f.write_str("with empty rows");
    }

    f.write_str("should return rows:")?;
    if let [set] = sets {
        for (n, row) in set.rows.iter().enumerate() {
            write!(f, "\n    row {n} - ")?;
            write_row(f, row)?;
        }
        return Ok(());
    }

    for (i, set) in sets.iter().enumerate() {
        write!(f, "\n    result set: {i}")?;
        for (n, row) in set.rows.iter().enumerate() {
            write!(f, "\n      row {n} - ")?;
            write_row(f, row)?;
        }
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, row: &[SqlValue]) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}
