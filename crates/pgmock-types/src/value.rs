//! Stored fixture value representation.

use std::fmt;

use bytes::Bytes;

/// Runtime kind of a non-null [`SqlValue`].
///
/// Kinds are compared exactly when deciding whether a stored value can be
/// copied into a destination without conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Unsigned 64-bit integer.
    UInt64,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
    /// UTF-8 text.
    Text,
    /// Byte sequence.
    Bytes,
    /// Arbitrary precision decimal.
    #[cfg(feature = "decimal")]
    Decimal,
    /// UUID.
    #[cfg(feature = "uuid")]
    Uuid,
    /// Calendar date.
    #[cfg(feature = "chrono")]
    Date,
    /// Time of day.
    #[cfg(feature = "chrono")]
    Time,
    /// Timestamp without time zone.
    #[cfg(feature = "chrono")]
    Timestamp,
    /// Timestamp with offset.
    #[cfg(feature = "chrono")]
    TimestampTz,
    /// JSON document.
    #[cfg(feature = "json")]
    Json,
}

impl ValueKind {
    /// Get the kind name as used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Text => "string",
            Self::Bytes => "bytes",
            #[cfg(feature = "decimal")]
            Self::Decimal => "decimal",
            #[cfg(feature = "uuid")]
            Self::Uuid => "uuid",
            #[cfg(feature = "chrono")]
            Self::Date => "date",
            #[cfg(feature = "chrono")]
            Self::Time => "time",
            #[cfg(feature = "chrono")]
            Self::Timestamp => "timestamp",
            #[cfg(feature = "chrono")]
            Self::TimestampTz => "timestamptz",
            #[cfg(feature = "json")]
            Self::Json => "json",
        }
    }

    /// Check if this is one of the integer kinds.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::UInt64
        )
    }

    /// Check if this is one of the floating point kinds.
    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored column value.
///
/// `SqlValue::Null` is the null sentinel: scanning it leaves the destination
/// untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlValue {
    /// NULL value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Unsigned 8-bit integer.
    UInt8(u8),
    /// Unsigned 16-bit integer.
    UInt16(u16),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// Text value.
    Text(String),
    /// Byte sequence.
    Bytes(Bytes),
    /// Decimal value.
    #[cfg(feature = "decimal")]
    Decimal(rust_decimal::Decimal),
    /// UUID value.
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    /// Date value.
    #[cfg(feature = "chrono")]
    Date(chrono::NaiveDate),
    /// Time value.
    #[cfg(feature = "chrono")]
    Time(chrono::NaiveTime),
    /// Timestamp without time zone.
    #[cfg(feature = "chrono")]
    Timestamp(chrono::NaiveDateTime),
    /// Timestamp with offset.
    #[cfg(feature = "chrono")]
    TimestampTz(chrono::DateTime<chrono::FixedOffset>),
    /// JSON value.
    #[cfg(feature = "json")]
    Json(serde_json::Value),
}

impl SqlValue {
    /// Check if the value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the runtime kind, or `None` for NULL.
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Self::Null => return None,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int8(_) => ValueKind::Int8,
            Self::Int16(_) => ValueKind::Int16,
            Self::Int32(_) => ValueKind::Int32,
            Self::Int64(_) => ValueKind::Int64,
            Self::UInt8(_) => ValueKind::UInt8,
            Self::UInt16(_) => ValueKind::UInt16,
            Self::UInt32(_) => ValueKind::UInt32,
            Self::UInt64(_) => ValueKind::UInt64,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float64(_) => ValueKind::Float64,
            Self::Text(_) => ValueKind::Text,
            Self::Bytes(_) => ValueKind::Bytes,
            #[cfg(feature = "decimal")]
            Self::Decimal(_) => ValueKind::Decimal,
            #[cfg(feature = "uuid")]
            Self::Uuid(_) => ValueKind::Uuid,
            #[cfg(feature = "chrono")]
            Self::Date(_) => ValueKind::Date,
            #[cfg(feature = "chrono")]
            Self::Time(_) => ValueKind::Time,
            #[cfg(feature = "chrono")]
            Self::Timestamp(_) => ValueKind::Timestamp,
            #[cfg(feature = "chrono")]
            Self::TimestampTz(_) => ValueKind::TimestampTz,
            #[cfg(feature = "json")]
            Self::Json(_) => ValueKind::Json,
        };
        Some(kind)
    }

    /// Get the kind name, `"null"` for NULL.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind().map_or("null", |k| k.name())
    }

    /// Get the value as a bool, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get any integer value widened to `i128`.
    #[must_use]
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Int8(v) => Some(i128::from(*v)),
            Self::Int16(v) => Some(i128::from(*v)),
            Self::Int32(v) => Some(i128::from(*v)),
            Self::Int64(v) => Some(i128::from(*v)),
            Self::UInt8(v) => Some(i128::from(*v)),
            Self::UInt16(v) => Some(i128::from(*v)),
            Self::UInt32(v) => Some(i128::from(*v)),
            Self::UInt64(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Get the value as an f64, if it is a float.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float64(v) => Some(*v),
            Self::Float32(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    /// Get the value as a string slice, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the value as bytes, if it is a byte sequence.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Bytes(v) => write!(f, "{v:?}"),
            #[cfg(feature = "decimal")]
            Self::Decimal(v) => write!(f, "{v}"),
            #[cfg(feature = "uuid")]
            Self::Uuid(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::Date(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::Time(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::Timestamp(v) => write!(f, "{v}"),
            #[cfg(feature = "chrono")]
            Self::TimestampTz(v) => write!(f, "{}", v.to_rfc3339()),
            #[cfg(feature = "json")]
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i8> for SqlValue {
    fn from(v: i8) -> Self {
        Self::Int8(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u8> for SqlValue {
    fn from(v: u8) -> Self {
        Self::UInt8(v)
    }
}

impl From<u16> for SqlValue {
    fn from(v: u16) -> Self {
        Self::UInt16(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        Self::UInt64(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<Bytes> for SqlValue {
    fn from(v: Bytes) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(v))
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for SqlValue {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

#[cfg(feature = "decimal")]
impl From<rust_decimal::Decimal> for SqlValue {
    fn from(v: rust_decimal::Decimal) -> Self {
        Self::Decimal(v)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::NaiveDate> for SqlValue {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::NaiveTime> for SqlValue {
    fn from(v: chrono::NaiveTime) -> Self {
        Self::Time(v)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::NaiveDateTime> for SqlValue {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::DateTime<chrono::FixedOffset>> for SqlValue {
    fn from(v: chrono::DateTime<chrono::FixedOffset>) -> Self {
        Self::TimestampTz(v)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}
