//! Type conversion and scan error types.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors that can occur while converting a single value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// Type mismatch during conversion.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: &'static str,
        /// Actual type name.
        actual: String,
    },

    /// Value is out of range for target type.
    #[error("value out of range for {target_type}")]
    OutOfRange {
        /// Target type name.
        target_type: &'static str,
    },

    /// Text could not be parsed as the target type.
    #[error("cannot parse {input:?} as {target}")]
    Parse {
        /// Target type name.
        target: &'static str,
        /// The offending text.
        input: String,
    },

    /// Invalid encoding in string data.
    #[error("invalid string encoding: {0}")]
    InvalidEncoding(String),

    /// Invalid date/time value.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    /// Invalid decimal value.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    /// Invalid UUID value.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// Invalid JSON document.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Unsupported type conversion.
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Source kind.
        from: String,
        /// Target type.
        to: &'static str,
    },
}

/// Errors produced while assigning a stored column value into a destination.
///
/// Every variant names the column so a failing `scan` can be traced back to
/// the fixture definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// The destination is not a mutable output reference.
    #[error("destination argument must be a reference for column {column}")]
    NotAReference {
        /// Column name.
        column: String,
    },

    /// The destination reported a matching kind but refused the value.
    #[error("cannot set destination value for column {column}")]
    Unsettable {
        /// Column name.
        column: String,
        /// Underlying failure reported by the destination.
        #[source]
        source: TypeError,
    },

    /// No direct assignment and no conversion is available.
    #[error("destination kind '{dest}' not supported for value kind '{value}' of column '{column}'")]
    KindMismatch {
        /// Destination kind description.
        dest: String,
        /// Stored value kind.
        value: ValueKind,
        /// Column name.
        column: String,
    },

    /// The destination's conversion rejected the value.
    #[error("scanning value error for column '{column}': {source}")]
    Conversion {
        /// Column name.
        column: String,
        /// Error returned by the conversion.
        #[source]
        source: TypeError,
    },
}

impl ScanError {
    /// Name of the column the failure refers to.
    #[must_use]
    pub fn column(&self) -> &str {
        match self {
            Self::NotAReference { column }
            | Self::Unsettable { column, .. }
            | Self::KindMismatch { column, .. }
            | Self::Conversion { column, .. } => column,
        }
    }
}
