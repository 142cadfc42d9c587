//! # pgmock-testing
//!
//! In-memory doubles for code written against the `pgmock-client` contracts.
//!
//! Tests describe result sets as fixtures, program a [`MockPool`] or
//! [`MockTx`] with expectations, run the code under test, and then verify
//! which calls were made. No server or network is involved.
//!
//! ## Features
//!
//! - Multi-row fixtures ([`MockRows`]) and single-row fixtures ([`MockRow`])
//! - Cursors that scan into typed destinations with lenient coercion
//! - Fixtures loaded from comma-separated text, with `NULL` support
//! - Per-row and close-time error injection
//! - Pool and transaction mocks with call recording and verification
//!
//! ## Example
//!
//! ```rust
//! use pgmock_client::Executor;
//! use pgmock_testing::{MockPool, MockRows};
//!
//! # tokio_test::block_on(async {
//! let pool = MockPool::new();
//! pool.expect_query("SELECT id FROM users")
//!     .returns(MockRows::new(["id"]).from_csv_string("1\n2\n3\n"))
//!     .once();
//!
//! let mut rows = pool.query("SELECT id FROM users", &[]).await.unwrap();
//! let mut ids = Vec::new();
//! while rows.next() {
//!     let mut id = 0u32;
//!     rows.scan(&mut [&mut id]).unwrap();
//!     ids.push(id);
//! }
//! assert_eq!(ids, [1, 2, 3]);
//! pool.verify().unwrap();
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod csv;
pub mod cursor;
pub mod error;
pub mod mock;
pub mod pool;
pub mod row;
pub mod rows;
pub mod tx;

pub use cursor::{ComposedRow, ComposedRows};
pub use error::MockError;
pub use mock::{Call, Expectation, Method, kinds};
pub use pgmock_client::{CommandTag, Error};
pub use pgmock_types::SqlValue;
pub use pool::MockPool;
pub use row::MockRow;
pub use rows::{MockRows, compose_rows};
pub use tx::MockTx;

/// Build a `Vec<SqlValue>` from heterogeneous values.
///
/// ```rust
/// use pgmock_testing::{SqlValue, row};
///
/// let values = row![1u32, "johndoe", SqlValue::Null];
/// assert_eq!(values[1], SqlValue::Text("johndoe".into()));
/// ```
#[macro_export]
macro_rules! row {
    () => {
        ::std::vec::Vec::<$crate::SqlValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::SqlValue::from($value)),+]
    };
}
