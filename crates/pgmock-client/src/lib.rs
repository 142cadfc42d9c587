//! # pgmock-client
//!
//! Pool, transaction and row-cursor contracts for PostgreSQL-style clients.
//!
//! Application code written against [`Pool`], [`Transaction`], [`Rows`] and
//! [`Row`] can be driven by a real pool in production and by the in-memory
//! doubles of `pgmock-testing` in tests.
//!
//! ## Features
//!
//! - **Async contracts**: object-safe `#[async_trait]` traits for pools and
//!   transactions
//! - **Destination scanning**: rows copy values into `&mut dyn Scannable`
//!   destinations
//! - **Error classification**: SQLSTATE helpers for duplicate keys, unknown
//!   columns and invalid input
//! - **Connection strings**: keyword/value and URL forms with pool options
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgmock_client::{Pool, Result};
//!
//! async fn usernames(pool: &dyn Pool) -> Result<Vec<String>> {
//!     let mut rows = pool.query("SELECT username FROM users", &[]).await?;
//!     let mut names = Vec::new();
//!     while rows.next() {
//!         let mut name = String::new();
//!         rows.scan(&mut [&mut name])?;
//!         names.push(name);
//!     }
//!     rows.close()?;
//!     Ok(names)
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod command_tag;
pub mod config;
pub mod error;
pub mod executor;
pub mod row;
pub mod transaction;

// Re-export commonly used types
pub use command_tag::CommandTag;
pub use config::{PoolConfig, SslMode};
pub use error::{DbError, Error, Result, codes};
pub use executor::{BoxFuture, Executor, ExecutorExt, Pool, PoolExt, Transaction};
pub use pgmock_types::{Ignore, Scannable, Scanner, SqlValue, ToSql};
pub use row::{FieldDescription, Row, Rows};
pub use transaction::{AccessMode, IsolationLevel, TxOptions};
