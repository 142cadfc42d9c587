//! Scan destinations.
//!
//! A destination describes its shape through [`Scannable::slot_kind`] and may
//! expose a [`Scanner`] conversion for stored values of other kinds. Built-in
//! destinations cover the primitive Rust types; callers add their own types by
//! implementing both traits:
//!
//! ```rust
//! use pgmock_types::{Scannable, Scanner, SqlValue, TypeError};
//!
//! #[derive(Default)]
//! struct Email(String);
//!
//! impl Scanner for Email {
//!     fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
//!         match value.as_str() {
//!             Some(s) if s.contains('@') => {
//!                 self.0 = s.to_owned();
//!                 Ok(())
//!             }
//!             _ => Err(TypeError::Parse { target: "Email", input: value.to_string() }),
//!         }
//!     }
//! }
//!
//! impl Scannable for Email {
//!     fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
//!         Some(self)
//!     }
//! }
//! ```

use std::any::type_name;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::TypeError;
use crate::value::{SqlValue, ValueKind};

/// Shape of a scan destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Holds exactly one value kind.
    Exact(ValueKind),
    /// Accepts any value wholesale.
    Any,
    /// Caller-defined type; only reachable through its [`Scanner`].
    Custom(&'static str),
    /// Not a mutable output reference.
    ReadOnly(&'static str),
    /// Position is skipped.
    Discard,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(kind) => f.write_str(kind.name()),
            Self::Any => f.write_str("any"),
            Self::Custom(name) | Self::ReadOnly(name) => f.write_str(name),
            Self::Discard => f.write_str("ignored"),
        }
    }
}

/// Conversion hook used when a stored value's kind differs from the slot.
pub trait Scanner {
    /// Convert `value` into `self`.
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError>;

    /// Whether this scanner handles values of `kind` at all.
    ///
    /// Kinds that are not accepted are reported as a kind mismatch instead of
    /// a conversion failure.
    fn accepts(&self, kind: ValueKind) -> bool {
        let _ = kind;
        true
    }
}

/// A value that can receive a stored column value during `scan`.
pub trait Scannable {
    /// Shape of this destination.
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Custom(type_name::<Self>())
    }

    /// Copy a value whose kind matches [`slot_kind`](Self::slot_kind).
    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        Err(unsupported(value, type_name::<Self>()))
    }

    /// Conversion for values of other kinds, if this type has one.
    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        None
    }
}

/// Destination that discards its column.
///
/// ```rust
/// use pgmock_types::{assign, Ignore, SqlValue};
///
/// assert!(assign(&mut Ignore, &SqlValue::from(1), "id").is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Ignore;

impl Scannable for Ignore {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Discard
    }
}

impl Scannable for SqlValue {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Any
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        self.clone_from(value);
        Ok(())
    }
}

// Shared references cannot receive a value.
impl<T: ?Sized> Scannable for &T {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::ReadOnly(type_name::<T>())
    }
}

impl<T> Scannable for Option<T>
where
    T: Scannable + Scanner + Default,
{
    fn slot_kind(&self) -> SlotKind {
        match self {
            Some(inner) => inner.slot_kind(),
            None => T::default().slot_kind(),
        }
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        let mut inner = T::default();
        inner.set_value(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl<T> Scanner for Option<T>
where
    T: Scannable + Scanner + Default,
{
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        let mut inner = T::default();
        inner.scan(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        T::default().accepts(kind)
    }
}

fn unsupported(value: &SqlValue, to: &'static str) -> TypeError {
    TypeError::UnsupportedConversion {
        from: value.kind_name().to_owned(),
        to,
    }
}

fn mismatch(expected: &'static str, value: &SqlValue) -> TypeError {
    TypeError::TypeMismatch {
        expected,
        actual: value.kind_name().to_owned(),
    }
}

fn parse_text<T: FromStr>(input: &str, target: &'static str) -> Result<T, TypeError> {
    input.trim().parse().map_err(|_| TypeError::Parse {
        target,
        input: input.to_owned(),
    })
}

macro_rules! integer_slot {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scannable for $ty {
                fn slot_kind(&self) -> SlotKind {
                    SlotKind::Exact(ValueKind::$variant)
                }

                fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
                    match value {
                        SqlValue::$variant(v) => {
                            *self = *v;
                            Ok(())
                        }
                        other => Err(mismatch(stringify!($ty), other)),
                    }
                }

                fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
                    Some(self)
                }
            }

            impl Scanner for $ty {
                fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
                    *self = match value {
                        SqlValue::Text(s) => parse_text(s, stringify!($ty))?,
                        other => {
                            let wide = other
                                .as_integer()
                                .ok_or_else(|| unsupported(other, stringify!($ty)))?;
                            <$ty>::try_from(wide).map_err(|_| TypeError::OutOfRange {
                                target_type: stringify!($ty),
                            })?
                        }
                    };
                    Ok(())
                }

                fn accepts(&self, kind: ValueKind) -> bool {
                    kind.is_integer() || kind == ValueKind::Text
                }
            }
        )*
    };
}

integer_slot! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
}

impl Scannable for f32 {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Float32)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Float32(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("f32", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl Scanner for f32 {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => parse_text(s, "f32")?,
            SqlValue::Float64(v) => *v as f32,
            other => match other.as_integer() {
                Some(n) => n as f32,
                None => return Err(unsupported(other, "f32")),
            },
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind.is_integer() || kind.is_float() || kind == ValueKind::Text
    }
}

impl Scannable for f64 {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Float64)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Float64(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("f64", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl Scanner for f64 {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => parse_text(s, "f64")?,
            SqlValue::Float32(v) => f64::from(*v),
            other => match other.as_integer() {
                Some(n) => n as f64,
                None => return Err(unsupported(other, "f64")),
            },
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind.is_integer() || kind.is_float() || kind == ValueKind::Text
    }
}

impl Scannable for bool {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Bool)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Bool(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("bool", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl Scanner for bool {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "y" | "yes" | "on" | "1" => true,
                "f" | "false" | "n" | "no" | "off" | "0" => false,
                _ => {
                    return Err(TypeError::Parse {
                        target: "bool",
                        input: s.clone(),
                    });
                }
            },
            other => match other.as_integer() {
                Some(n) => n != 0,
                None => return Err(unsupported(other, "bool")),
            },
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind.is_integer() || kind == ValueKind::Text
    }
}

impl Scannable for String {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Text)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Text(v) => {
                self.clone_from(v);
                Ok(())
            }
            other => Err(mismatch("String", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl Scanner for String {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Null => return Err(unsupported(value, "String")),
            SqlValue::Bytes(b) => std::str::from_utf8(b)
                .map_err(|e| TypeError::InvalidEncoding(e.to_string()))?
                .to_owned(),
            other => other.to_string(),
        };
        Ok(())
    }
}

impl Scannable for Vec<u8> {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Bytes)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Bytes(v) => {
                *self = v.to_vec();
                Ok(())
            }
            other => Err(mismatch("Vec<u8>", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl Scanner for Vec<u8> {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Text(s) => {
                *self = s.as_bytes().to_vec();
                Ok(())
            }
            other => Err(unsupported(other, "Vec<u8>")),
        }
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind == ValueKind::Text
    }
}

impl Scannable for Bytes {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Bytes)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            // Copy so the destination never aliases fixture storage.
            SqlValue::Bytes(v) => {
                *self = Bytes::copy_from_slice(v);
                Ok(())
            }
            other => Err(mismatch("Bytes", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

impl Scanner for Bytes {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Text(s) => {
                *self = Bytes::copy_from_slice(s.as_bytes());
                Ok(())
            }
            other => Err(unsupported(other, "Bytes")),
        }
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind == ValueKind::Text
    }
}

#[cfg(feature = "decimal")]
impl Scannable for rust_decimal::Decimal {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Decimal)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Decimal(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("Decimal", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "decimal")]
impl Scanner for rust_decimal::Decimal {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| TypeError::InvalidDecimal(format!("{e}")))?,
            SqlValue::Float32(v) => rust_decimal::Decimal::try_from(*v)
                .map_err(|e| TypeError::InvalidDecimal(format!("{e}")))?,
            SqlValue::Float64(v) => rust_decimal::Decimal::try_from(*v)
                .map_err(|e| TypeError::InvalidDecimal(format!("{e}")))?,
            other => match other.as_integer() {
                Some(n) => rust_decimal::Decimal::try_from_i128_with_scale(n, 0).map_err(|_| {
                    TypeError::OutOfRange {
                        target_type: "Decimal",
                    }
                })?,
                None => return Err(unsupported(other, "Decimal")),
            },
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind.is_integer() || kind.is_float() || kind == ValueKind::Text
    }
}

#[cfg(feature = "uuid")]
impl Scannable for uuid::Uuid {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Uuid)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Uuid(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("Uuid", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "uuid")]
impl Scanner for uuid::Uuid {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| TypeError::InvalidUuid(format!("{e}")))?,
            SqlValue::Bytes(b) => {
                uuid::Uuid::from_slice(b).map_err(|e| TypeError::InvalidUuid(format!("{e}")))?
            }
            other => return Err(unsupported(other, "Uuid")),
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Text | ValueKind::Bytes)
    }
}

#[cfg(feature = "chrono")]
impl Scannable for chrono::NaiveDate {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Date)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Date(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("NaiveDate", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "chrono")]
impl Scanner for chrono::NaiveDate {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| TypeError::InvalidDateTime(format!("{e}")))?,
            SqlValue::Timestamp(v) => v.date(),
            other => return Err(unsupported(other, "NaiveDate")),
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Text | ValueKind::Timestamp)
    }
}

#[cfg(feature = "chrono")]
impl Scannable for chrono::NaiveTime {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Time)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Time(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("NaiveTime", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "chrono")]
impl Scanner for chrono::NaiveTime {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| TypeError::InvalidDateTime(format!("{e}")))?,
            SqlValue::Timestamp(v) => v.time(),
            other => return Err(unsupported(other, "NaiveTime")),
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Text | ValueKind::Timestamp)
    }
}

#[cfg(feature = "chrono")]
impl Scannable for chrono::NaiveDateTime {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Timestamp)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Timestamp(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("NaiveDateTime", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "chrono")]
impl Scanner for chrono::NaiveDateTime {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        *self = match value {
            SqlValue::Text(s) => {
                let s = s.trim();
                // Accept both ISO 8601 and the server's space-separated output.
                chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                    .or_else(|_| s.parse())
                    .map_err(|e| TypeError::InvalidDateTime(format!("{e}")))?
            }
            SqlValue::TimestampTz(v) => v.naive_utc(),
            other => return Err(unsupported(other, "NaiveDateTime")),
        };
        Ok(())
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Text | ValueKind::TimestampTz)
    }
}

#[cfg(feature = "chrono")]
impl Scannable for chrono::DateTime<chrono::FixedOffset> {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::TimestampTz)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::TimestampTz(v) => {
                *self = *v;
                Ok(())
            }
            other => Err(mismatch("DateTime<FixedOffset>", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "chrono")]
impl Scanner for chrono::DateTime<chrono::FixedOffset> {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Text(s) => {
                let s = s.trim();
                *self = chrono::DateTime::parse_from_rfc3339(s)
                    .or_else(|_| chrono::DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z"))
                    .map_err(|e| TypeError::InvalidDateTime(format!("{e}")))?;
                Ok(())
            }
            other => Err(unsupported(other, "DateTime<FixedOffset>")),
        }
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        kind == ValueKind::Text
    }
}

#[cfg(feature = "json")]
impl Scannable for serde_json::Value {
    fn slot_kind(&self) -> SlotKind {
        SlotKind::Exact(ValueKind::Json)
    }

    fn set_value(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Json(v) => {
                self.clone_from(v);
                Ok(())
            }
            other => Err(mismatch("JSON", other)),
        }
    }

    fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
        Some(self)
    }
}

#[cfg(feature = "json")]
impl Scanner for serde_json::Value {
    fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
        match value {
            SqlValue::Text(s) => {
                *self =
                    serde_json::from_str(s).map_err(|e| TypeError::InvalidJson(format!("{e}")))?;
                Ok(())
            }
            SqlValue::Bytes(b) => {
                *self =
                    serde_json::from_slice(b).map_err(|e| TypeError::InvalidJson(format!("{e}")))?;
                Ok(())
            }
            other => Err(unsupported(other, "JSON")),
        }
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        matches!(kind, ValueKind::Text | ValueKind::Bytes)
    }
}
