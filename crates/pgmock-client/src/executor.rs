//! Statement execution, pool and transaction contracts.
//!
//! Code under test depends on these traits rather than on a concrete pool,
//! so a test can hand it a mock instead.

use async_trait::async_trait;
pub use futures_core::future::BoxFuture;
use pgmock_types::ToSql;

use crate::command_tag::CommandTag;
use crate::config::PoolConfig;
use crate::error::Result;
use crate::row::{Row, Rows};
use crate::transaction::TxOptions;

/// Anything that can run statements: a pool or an open transaction.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement that returns no rows.
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<CommandTag>;

    /// Run a query and return a cursor over its rows.
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Box<dyn Rows>>;

    /// Run a query expected to return at most one row.
    ///
    /// Errors surface when the returned row is scanned.
    async fn query_row(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Box<dyn Row>;
}

/// A connection pool.
#[async_trait]
pub trait Pool: Executor {
    /// Start a transaction with server-default options.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Start a transaction with explicit options.
    async fn begin_tx(&self, options: TxOptions) -> Result<Box<dyn Transaction>>;

    /// Check that the database is reachable.
    async fn ping(&self) -> Result<()>;

    /// Close the pool.
    fn close(&self);

    /// The configuration the pool was created with.
    fn config(&self) -> PoolConfig;
}

/// An open transaction.
#[async_trait]
pub trait Transaction: Executor {
    /// Start a nested transaction backed by a savepoint.
    async fn begin(&self) -> Result<Box<dyn Transaction>>;

    /// Commit the transaction.
    async fn commit(&self) -> Result<()>;

    /// Roll the transaction back.
    async fn rollback(&self) -> Result<()>;
}

/// Callback helpers available on every [`Executor`].
#[async_trait]
pub trait ExecutorExt: Executor {
    /// Run a query and hand each row to `f`.
    ///
    /// Stops at the first error from the query, a row, or `f`. Returns the
    /// cursor's completion tag once every row was handled and the cursor
    /// closed cleanly.
    async fn query_func<F>(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        mut f: F,
    ) -> Result<CommandTag>
    where
        F: FnMut(&mut dyn Rows) -> Result<()> + Send,
    {
        let mut rows = self.query(sql, params).await?;
        while rows.next() {
            if let Some(err) = rows.err() {
                let _ = rows.close();
                return Err(err);
            }
            if let Err(err) = f(rows.as_mut()) {
                let _ = rows.close();
                return Err(err);
            }
        }
        rows.close()?;
        Ok(rows.command_tag())
    }
}

impl<E: Executor + ?Sized> ExecutorExt for E {}

/// Transaction-scoped callback helpers available on every [`Pool`].
///
/// ```rust,ignore
/// pool.begin_func(|tx| {
///     Box::pin(async move {
///         tx.execute("DELETE FROM sessions", &[]).await?;
///         Ok(())
///     })
/// })
/// .await?;
/// ```
#[async_trait]
pub trait PoolExt: Pool {
    /// Begin a transaction, run `f` in it, then commit if `f` succeeded or
    /// roll back if it failed.
    async fn begin_func<F, R>(&self, f: F) -> Result<R>
    where
        F: for<'t> FnOnce(&'t dyn Transaction) -> BoxFuture<'t, Result<R>> + Send,
        R: Send,
    {
        let tx = self.begin().await?;
        run_in_transaction(tx, f).await
    }

    /// Like [`begin_func`](Self::begin_func), with explicit options.
    async fn begin_tx_func<F, R>(&self, options: TxOptions, f: F) -> Result<R>
    where
        F: for<'t> FnOnce(&'t dyn Transaction) -> BoxFuture<'t, Result<R>> + Send,
        R: Send,
    {
        let tx = self.begin_tx(options).await?;
        run_in_transaction(tx, f).await
    }
}

impl<P: Pool + ?Sized> PoolExt for P {}

async fn run_in_transaction<F, R>(tx: Box<dyn Transaction>, f: F) -> Result<R>
where
    F: for<'t> FnOnce(&'t dyn Transaction) -> BoxFuture<'t, Result<R>> + Send,
    R: Send,
{
    match f(tx.as_ref()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback after failed callback also failed");
            }
            Err(err)
        }
    }
}
