//! Client error types.

use std::fmt;

use pgmock_types::{ScanError, TypeError};
use thiserror::Error;

/// Well-known SQLSTATE codes.
pub mod codes {
    /// `undefined_column`.
    pub const COLUMN_NOT_EXISTS: &str = "42703";
    /// `unique_violation`.
    pub const DUPLICATE_KEY: &str = "23505";
    /// `invalid_text_representation`.
    pub const INVALID_INPUT_SYNTAX: &str = "22P02";
}

/// An error reported by the database server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    code: String,
    message: String,
}

impl DbError {
    /// Create a database error from a SQLSTATE code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// SQLSTATE code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Primary human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (SQLSTATE {})", self.message, self.code)
    }
}

impl std::error::Error for DbError {}

/// Errors returned by pools, transactions and row cursors.
///
/// Errors are `Clone` so a programmed failure can be replayed any number of
/// times.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Server returned an error.
    #[error("server error: {0}")]
    Database(DbError),

    /// A single-row query matched nothing.
    #[error("no rows in result set")]
    NoRows,

    /// `scan` was called without a current row.
    #[error("no current row")]
    NoCurrentRow,

    /// Destination count differs from the column count.
    #[error("incorrect argument number {given} for columns {expected}")]
    ArgumentCount {
        /// Number of destinations supplied.
        given: usize,
        /// Number of columns in the row.
        expected: usize,
    },

    /// A value could not be copied into its destination.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A query argument could not be converted.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// A column has no raw byte representation.
    #[error("column {column} holds a {kind} value, which has no raw byte form")]
    RawValue {
        /// Column name.
        column: String,
        /// Kind of the stored value.
        kind: &'static str,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transaction error.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// The pool has been closed.
    #[error("pool is closed")]
    PoolClosed,

    /// A mock received a call it was not told to expect.
    #[error("unexpected call: {0}")]
    UnexpectedCall(String),
}

impl Error {
    /// Build a server error from a SQLSTATE code and message.
    ///
    /// ```rust
    /// use pgmock_client::Error;
    ///
    /// let err = Error::database("23505", "duplicate key value violates unique constraint");
    /// assert!(err.is_duplicate_key());
    /// assert_eq!(err.code(), Some("23505"));
    /// ```
    pub fn database(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database(DbError::new(code, message))
    }

    /// Get the server error, if this is one.
    #[must_use]
    pub fn db_error(&self) -> Option<&DbError> {
        match self {
            Self::Database(e) => Some(e),
            _ => None,
        }
    }

    /// SQLSTATE code of a server error.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.db_error().map(DbError::code)
    }

    /// Message of a server error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.db_error().map(DbError::message)
    }

    /// Check if this error means a single-row query found nothing.
    #[must_use]
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }

    /// Check if this is a unique-constraint violation.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        self.code() == Some(codes::DUPLICATE_KEY)
    }

    /// Check if the server rejected a value's text representation.
    #[must_use]
    pub fn is_invalid_input_syntax(&self) -> bool {
        self.code() == Some(codes::INVALID_INPUT_SYNTAX)
    }

    /// Check if the statement referenced an unknown column.
    #[must_use]
    pub fn is_column_not_exists(&self) -> bool {
        self.code() == Some(codes::COLUMN_NOT_EXISTS)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
