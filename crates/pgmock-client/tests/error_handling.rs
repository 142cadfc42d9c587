//! Error construction, classification and display.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pgmock_client::{CommandTag, DbError, Error, codes};
use pgmock_types::{ScanError, TypeError, ValueKind};

// =============================================================================
// Display
// =============================================================================

#[test]
fn test_database_error_display() {
    let err = Error::database(codes::DUPLICATE_KEY, "duplicate key value");
    assert_eq!(
        err.to_string(),
        "server error: duplicate key value (SQLSTATE 23505)"
    );
}

#[test]
fn test_scan_error_is_transparent() {
    let err: Error = ScanError::KindMismatch {
        dest: "bytes".into(),
        value: ValueKind::Int32,
        column: "payload".into(),
    }
    .into();
    assert_eq!(
        err.to_string(),
        "destination kind 'bytes' not supported for value kind 'int32' of column 'payload'"
    );
}

#[test]
fn test_type_error_is_wrapped() {
    let err: Error = TypeError::OutOfRange {
        target_type: "u8".into(),
    }
    .into();
    assert_eq!(err.to_string(), "type error: value out of range for u8");
}

#[test]
fn test_simple_variants() {
    assert_eq!(Error::NoRows.to_string(), "no rows in result set");
    assert_eq!(Error::PoolClosed.to_string(), "pool is closed");
    assert_eq!(
        Error::ArgumentCount {
            given: 3,
            expected: 2
        }
        .to_string(),
        "incorrect argument number 3 for columns 2"
    );
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_codes_only_on_database_errors() {
    for err in [
        Error::NoRows,
        Error::NoCurrentRow,
        Error::Config("x".into()),
        Error::UnexpectedCall("x".into()),
    ] {
        assert_eq!(err.code(), None);
        assert!(!err.is_duplicate_key());
        assert!(!err.is_column_not_exists());
        assert!(!err.is_invalid_input_syntax());
    }
}

#[test]
fn test_db_error_accessors() {
    let err = Error::Database(DbError::new(codes::INVALID_INPUT_SYNTAX, "bad int"));
    let db = err.db_error().unwrap();
    assert_eq!(db.code(), "22P02");
    assert_eq!(db.message(), "bad int");
    assert!(err.is_invalid_input_syntax());
}

#[test]
fn test_errors_replay_identically() {
    let err = Error::database("40P01", "deadlock detected");
    assert_eq!(err.clone(), err);
}

// =============================================================================
// Command Tags
// =============================================================================

#[test]
fn test_command_tag_rows_affected() {
    assert_eq!(CommandTag::new("insert", 1).as_str(), "INSERT 0 1");
    assert_eq!(CommandTag::new("UPDATE", 12).rows_affected(), 12);
    assert_eq!(CommandTag::from_raw("CREATE TABLE").rows_affected(), 0);
    assert!(CommandTag::from_raw("DELETE 3").is_delete());
}
