//! Result column metadata and the row cursor contracts.

use pgmock_types::{Scannable, SqlValue};

use crate::command_tag::CommandTag;
use crate::error::{Error, Result};

/// Text wire format code.
pub const TEXT_FORMAT: i16 = 0;
/// Binary wire format code.
pub const BINARY_FORMAT: i16 = 1;

/// Column metadata describing a result set column.
///
/// Only `name` is required; the remaining fields default to zero, which is
/// what the server reports for computed columns.
///
/// This struct is marked `#[non_exhaustive]` to allow adding new fields
/// in future versions without breaking semver compatibility. Use
/// [`FieldDescription::new()`] or builder methods to construct instances.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct FieldDescription {
    /// Column name.
    pub name: String,
    /// OID of the source table, 0 if none.
    pub table_oid: u32,
    /// Attribute number within the source table, 0 if none.
    pub table_attribute_number: u16,
    /// OID of the column's data type.
    pub data_type_oid: u32,
    /// Size of the data type, negative for variable-width types.
    pub data_type_size: i16,
    /// Type modifier (e.g. `varchar` length).
    pub type_modifier: i32,
    /// Wire format code.
    pub format: i16,
}

impl FieldDescription {
    /// Create a column description carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the source table and attribute number.
    #[must_use]
    pub fn with_table(mut self, table_oid: u32, attribute_number: u16) -> Self {
        self.table_oid = table_oid;
        self.table_attribute_number = attribute_number;
        self
    }

    /// Set the data type OID and size.
    #[must_use]
    pub fn with_data_type(mut self, oid: u32, size: i16) -> Self {
        self.data_type_oid = oid;
        self.data_type_size = size;
        self
    }

    /// Set the type modifier.
    #[must_use]
    pub fn with_type_modifier(mut self, modifier: i32) -> Self {
        self.type_modifier = modifier;
        self
    }

    /// Set the wire format code.
    #[must_use]
    pub fn with_format(mut self, format: i16) -> Self {
        self.format = format;
        self
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for FieldDescription {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FieldDescription {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// A forward-only cursor over one or more result sets.
///
/// The cursor starts before the first row; [`next`](Rows::next) must be
/// called before the first [`scan`](Rows::scan).
///
/// # Example
///
/// ```rust,ignore
/// let mut rows = pool.query("SELECT id FROM users", &[]).await?;
/// let mut ids = Vec::new();
/// while rows.next() {
///     let mut id = 0u32;
///     rows.scan(&mut [&mut id])?;
///     ids.push(id);
/// }
/// if let Some(err) = rows.err() {
///     return Err(err);
/// }
/// rows.close()?;
/// ```
pub trait Rows: Send {
    /// Advance to the next row. Returns `false` once the current result set
    /// is exhausted, and keeps returning `false` afterwards.
    fn next(&mut self) -> bool;

    /// Copy the current row into `dest`, one destination per column.
    fn scan(&mut self, dest: &mut [&mut dyn Scannable]) -> Result<()>;

    /// The current row's stored values, paired with the error attached to
    /// that row. Only [`Error::NoCurrentRow`] fails the call itself.
    fn values(&self) -> Result<(Vec<SqlValue>, Option<Error>)>;

    /// The current row's values as raw bytes; NULL columns are `None`.
    fn raw_values(&self) -> Result<Vec<Option<Vec<u8>>>>;

    /// Completion tag of the statement that produced these rows.
    fn command_tag(&self) -> CommandTag;

    /// Column metadata of the current result set.
    fn field_descriptions(&self) -> &[FieldDescription];

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;

    /// Error attached to the row most recently consumed by `next`, if any.
    fn err(&self) -> Option<Error>;

    /// Move to the next result set. Returns `false` if there is none.
    fn next_result_set(&mut self) -> bool;
}

/// The result of a single-row query.
pub trait Row: Send {
    /// Copy the row into `dest`, one destination per column.
    ///
    /// Returns [`Error::NoRows`] if the query matched nothing.
    fn scan(&mut self, dest: &mut [&mut dyn Scannable]) -> Result<()>;
}
