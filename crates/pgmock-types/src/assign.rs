//! Value-to-destination assignment.

use crate::error::ScanError;
use crate::scan::{Scannable, SlotKind};
use crate::value::SqlValue;

/// Copy a stored column value into a destination.
///
/// The policy, in order:
///
/// 1. a discarding destination ([`Ignore`](crate::Ignore)) is skipped,
/// 2. a read-only destination fails with [`ScanError::NotAReference`],
/// 3. a null value leaves the destination untouched,
/// 4. a generic slot, or one whose kind equals the value's kind, is set
///    directly,
/// 5. a destination exposing a [`Scanner`](crate::Scanner) that accepts the
///    value's kind converts it,
/// 6. anything else fails with [`ScanError::KindMismatch`].
///
/// ```rust
/// use pgmock_types::{assign, ScanError, SqlValue};
///
/// let mut id = 0u32;
/// assign(&mut id, &SqlValue::from(7u32), "id").unwrap();
/// assert_eq!(id, 7);
///
/// let mut flag = false;
/// let err = assign(&mut flag, &SqlValue::from(1.5f64), "flag").unwrap_err();
/// assert!(matches!(err, ScanError::KindMismatch { .. }));
/// ```
pub fn assign(dest: &mut dyn Scannable, value: &SqlValue, column: &str) -> Result<(), ScanError> {
    let slot = dest.slot_kind();

    match slot {
        SlotKind::Discard => return Ok(()),
        SlotKind::ReadOnly(_) => {
            return Err(ScanError::NotAReference {
                column: column.to_owned(),
            });
        }
        _ => {}
    }

    let Some(kind) = value.kind() else {
        return Ok(());
    };

    let direct = match slot {
        SlotKind::Any => true,
        SlotKind::Exact(k) => k == kind,
        _ => false,
    };
    if direct {
        return dest.set_value(value).map_err(|source| ScanError::Unsettable {
            column: column.to_owned(),
            source,
        });
    }

    if let Some(scanner) = dest.as_scanner() {
        if scanner.accepts(kind) {
            return scanner.scan(value).map_err(|source| ScanError::Conversion {
                column: column.to_owned(),
                source,
            });
        }
    }

    Err(ScanError::KindMismatch {
        dest: slot.to_string(),
        value: kind,
        column: column.to_owned(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::TypeError;
    use crate::scan::{Ignore, Scanner};
    use crate::value::ValueKind;

    #[derive(Default)]
    struct Celsius(f64);

    impl Scanner for Celsius {
        fn scan(&mut self, value: &SqlValue) -> Result<(), TypeError> {
            match value.as_f64().or_else(|| value.as_integer().map(|n| n as f64)) {
                Some(v) => {
                    self.0 = v;
                    Ok(())
                }
                None => Err(TypeError::TypeMismatch {
                    expected: "number",
                    actual: value.kind_name().to_owned(),
                }),
            }
        }
    }

    impl Scannable for Celsius {
        fn as_scanner(&mut self) -> Option<&mut dyn Scanner> {
            Some(self)
        }
    }

    #[test]
    fn test_exact_kind_copies() {
        let mut s = String::new();
        assign(&mut s, &SqlValue::from("hello"), "greeting").unwrap();
        assert_eq!(s, "hello");
    }

    #[test]
    fn test_null_leaves_destination() {
        let mut n = 99i64;
        assign(&mut n, &SqlValue::Null, "n").unwrap();
        assert_eq!(n, 99);

        let mut opt = Some(3i32);
        assign(&mut opt, &SqlValue::Null, "opt").unwrap();
        assert_eq!(opt, Some(3));
    }

    #[test]
    fn test_generic_slot_takes_anything() {
        let mut any = SqlValue::Null;
        assign(&mut any, &SqlValue::from(2.5f64), "x").unwrap();
        assert_eq!(any, SqlValue::Float64(2.5));
    }

    #[test]
    fn test_ignore_skips() {
        assign(&mut Ignore, &SqlValue::from("whatever"), "x").unwrap();
    }

    #[test]
    fn test_read_only_destination() {
        let x = 1u32;
        let mut r = &x;
        let err = assign(&mut r, &SqlValue::from(2u32), "id").unwrap_err();
        assert_eq!(
            err.to_string(),
            "destination argument must be a reference for column id"
        );
    }

    #[test]
    fn test_read_only_checked_before_null() {
        let x = 1u32;
        let mut r = &x;
        assert!(assign(&mut r, &SqlValue::Null, "id").is_err());
    }

    #[test]
    fn test_custom_scanner() {
        let mut c = Celsius::default();
        assign(&mut c, &SqlValue::from(21i32), "temp").unwrap();
        assert!((c.0 - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_scanner_error_is_wrapped() {
        let mut c = Celsius::default();
        let err = assign(&mut c, &SqlValue::from("warm"), "temp").unwrap_err();
        assert!(matches!(err, ScanError::Conversion { .. }));
        assert!(
            err.to_string()
                .starts_with("scanning value error for column 'temp'")
        );
    }

    #[test]
    fn test_kind_mismatch_message() {
        let mut v = Vec::<u8>::new();
        let err = assign(&mut v, &SqlValue::from(5i32), "payload").unwrap_err();
        assert_eq!(
            err,
            ScanError::KindMismatch {
                dest: "bytes".into(),
                value: ValueKind::Int32,
                column: "payload".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "destination kind 'bytes' not supported for value kind 'int32' of column 'payload'"
        );
    }

    #[test]
    fn test_lenient_text_conversion() {
        let mut id = 0u32;
        assign(&mut id, &SqlValue::from("42"), "id").unwrap();
        assert_eq!(id, 42);
    }
}
