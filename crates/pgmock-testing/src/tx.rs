//! Mock transaction.

use async_trait::async_trait;
use pgmock_client::{CommandTag, Error, Executor, Result, Row, Rows, Transaction};
use pgmock_types::{SqlValue, ToSql};

use crate::cursor::ComposedRow;
use crate::error::MockError;
use crate::mock::{Call, Expectation, Method, Shared, kinds};
use crate::rows::compose_rows;

/// A transaction double that answers calls from registered expectations.
///
/// Clones share one recorder: register expectations on a `MockTx`, hand a
/// clone to [`MockPool::expect_begin`](crate::MockPool::expect_begin), and
/// assert on the first handle afterwards.
///
/// After a successful `commit` or `rollback` every further call fails with
/// [`Error::Transaction`].
#[derive(Debug, Clone, Default)]
pub struct MockTx {
    shared: Shared,
}

impl MockTx {
    /// Create a transaction with no expectations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect an `execute` of `sql`.
    pub fn expect_execute(&self, sql: &str) -> Expectation<kinds::Execute> {
        self.shared.expect(Method::Execute, Some(sql))
    }

    /// Expect a `query` of `sql`.
    pub fn expect_query(&self, sql: &str) -> Expectation<kinds::Query> {
        self.shared.expect(Method::Query, Some(sql))
    }

    /// Expect a `query_row` of `sql`.
    pub fn expect_query_row(&self, sql: &str) -> Expectation<kinds::QueryRow> {
        self.shared.expect(Method::QueryRow, Some(sql))
    }

    /// Expect a nested `begin`.
    pub fn expect_begin(&self) -> Expectation<kinds::Begin> {
        self.shared.expect(Method::Begin, None)
    }

    /// Expect a `commit`.
    pub fn expect_commit(&self) -> Expectation<kinds::Unit> {
        self.shared.expect(Method::Commit, None)
    }

    /// Expect a `rollback`.
    pub fn expect_rollback(&self) -> Expectation<kinds::Unit> {
        self.shared.expect(Method::Rollback, None)
    }

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.shared.calls()
    }

    /// Number of calls to `method`.
    #[must_use]
    pub fn call_count(&self, method: Method) -> usize {
        self.shared.call_count(method)
    }

    /// Whether `method` was called at all.
    #[must_use]
    pub fn was_called(&self, method: Method) -> bool {
        self.call_count(method) > 0
    }

    /// Whether `method` was called with exactly this SQL and these arguments.
    #[must_use]
    pub fn was_called_with(&self, method: Method, sql: &str, args: &[SqlValue]) -> bool {
        self.shared.was_called_with(method, Some(sql), args)
    }

    /// Check that every expectation was called as often as required.
    pub fn verify(&self) -> std::result::Result<(), MockError> {
        self.shared.verify()
    }

    fn finish(&self, method: Method) -> Result<()> {
        self.shared.dispatch(method, None, &[])?.into_done()?;
        self.shared
            .mark_closed(Error::Transaction("transaction is closed".into()));
        Ok(())
    }
}

#[async_trait]
impl Executor for MockTx {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<CommandTag> {
        self.shared
            .dispatch(Method::Execute, Some(sql), params)?
            .into_tag()
    }

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Box<dyn Rows>> {
        let sets = self
            .shared
            .dispatch(Method::Query, Some(sql), params)?
            .into_rows()?;
        Ok(Box::new(compose_rows(sets)))
    }

    async fn query_row(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Box<dyn Row> {
        match self
            .shared
            .dispatch(Method::QueryRow, Some(sql), params)
            .and_then(|r| r.into_row())
        {
            Ok(row) => Box::new(row.compose()),
            Err(err) => Box::new(ComposedRow::failed(err)),
        }
    }
}

#[async_trait]
impl Transaction for MockTx {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self.shared.dispatch(Method::Begin, None, &[])?.into_tx()?;
        Ok(Box::new(tx))
    }

    async fn commit(&self) -> Result<()> {
        self.finish(Method::Commit)
    }

    async fn rollback(&self) -> Result<()> {
        self.finish(Method::Rollback)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_closes() {
        let tx = MockTx::new();
        tx.expect_commit().once();
        tx.expect_rollback();

        tx.commit().await.unwrap();
        let err = tx.rollback().await.unwrap_err();
        assert!(matches!(err, Error::Transaction(_)));
        assert_eq!(tx.call_count(Method::Rollback), 1);
    }

    #[tokio::test]
    async fn test_failed_commit_stays_open() {
        let tx = MockTx::new();
        tx.expect_commit()
            .once()
            .returns_error(Error::database("40001", "could not serialize access"));
        tx.expect_rollback().once();

        assert!(tx.commit().await.is_err());
        tx.rollback().await.unwrap();
        tx.verify().unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_recorder() {
        let tx = MockTx::new();
        let handed_out = tx.clone();
        tx.expect_execute("UPDATE t SET x = 1")
            .returns(CommandTag::new("UPDATE", 3));

        let tag = handed_out.execute("UPDATE t SET x = 1", &[]).await.unwrap();
        assert_eq!(tag.rows_affected(), 3);
        assert!(tx.was_called(Method::Execute));
    }
}
