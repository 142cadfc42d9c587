//! # pgmock-types
//!
//! Value model and destination coercion for pgmock fixtures.
//!
//! Fixture rows store untyped [`SqlValue`]s. When code under test scans a row,
//! each stored value is copied into a caller-supplied destination through
//! [`assign`], which implements a three-tier policy:
//!
//! 1. direct copy when the destination holds exactly the stored value's
//!    [`ValueKind`] (or is a generic [`SqlValue`] slot),
//! 2. otherwise a [`Scanner`] conversion exposed by the destination,
//! 3. otherwise a kind-mismatch error naming the column.
//!
//! ## Features
//!
//! - `chrono` (default): date/time values via chrono
//! - `uuid` (default): UUID values
//! - `decimal` (default): decimal values via rust_decimal
//! - `json`: JSON values via serde_json
//!
//! ## Destination Mappings
//!
//! | Rust destination | Slot kind |
//! |------------------|-----------|
//! | `bool` | `bool` |
//! | `i8`/`i16`/`i32`/`i64` | `int8`..`int64` |
//! | `u8`/`u16`/`u32`/`u64` | `uint8`..`uint64` |
//! | `f32`/`f64` | `float32`/`float64` |
//! | `String` | `string` |
//! | `Vec<u8>`, `bytes::Bytes` | `bytes` |
//! | `rust_decimal::Decimal` | `decimal` |
//! | `uuid::Uuid` | `uuid` |
//! | `chrono::NaiveDate`/`NaiveTime`/`NaiveDateTime` | `date`/`time`/`timestamp` |
//! | `chrono::DateTime<FixedOffset>` | `timestamptz` |
//! | `SqlValue` | any |
//! | `Ignore` | discarded |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod assign;
pub mod error;
pub mod scan;
pub mod to_sql;
pub mod value;

pub use assign::assign;
pub use error::{ScanError, TypeError};
pub use scan::{Ignore, Scannable, Scanner, SlotKind};
pub use to_sql::ToSql;
pub use value::{SqlValue, ValueKind};
