//! Mock pool.

use async_trait::async_trait;
use pgmock_client::{
    CommandTag, Error, Executor, Pool, PoolConfig, Result, Row, Rows, Transaction, TxOptions,
};
use pgmock_types::{SqlValue, ToSql};

use crate::cursor::ComposedRow;
use crate::error::MockError;
use crate::mock::{Call, Expectation, Method, Shared, kinds};
use crate::rows::compose_rows;

/// A pool double that answers calls from registered expectations.
///
/// # Example
///
/// ```rust
/// use pgmock_client::{CommandTag, Executor};
/// use pgmock_testing::{MockPool, row};
///
/// # tokio_test::block_on(async {
/// let pool = MockPool::new();
/// pool.expect_execute("DELETE FROM sessions WHERE user_id = $1")
///     .with_args(row![7i64])
///     .returns(CommandTag::new("DELETE", 2))
///     .once();
///
/// let tag = pool
///     .execute("DELETE FROM sessions WHERE user_id = $1", &[&7i64])
///     .await
///     .unwrap();
/// assert_eq!(tag.rows_affected(), 2);
/// pool.verify().unwrap();
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockPool {
    shared: Shared,
    config: PoolConfig,
}

impl MockPool {
    /// Create a pool with no expectations and a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration reported by [`Pool::config`].
    #[must_use]
    pub fn with_config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
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

    /// Expect a `begin`.
    pub fn expect_begin(&self) -> Expectation<kinds::Begin> {
        self.shared.expect(Method::Begin, None)
    }

    /// Expect a `begin_tx` with these options.
    ///
    /// Calls are matched on the `BEGIN` statement the options produce.
    pub fn expect_begin_tx(&self, options: TxOptions) -> Expectation<kinds::Begin> {
        self.shared.expect(Method::BeginTx, Some(&options.begin_sql()))
    }

    /// Expect a `ping`.
    pub fn expect_ping(&self) -> Expectation<kinds::Unit> {
        self.shared.expect(Method::Ping, None)
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
}

#[async_trait]
impl Executor for MockPool {
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
impl Pool for MockPool {
    async fn begin(&self) -> Result<Box<dyn Transaction>> {
        let tx = self.shared.dispatch(Method::Begin, None, &[])?.into_tx()?;
        Ok(Box::new(tx))
    }

    async fn begin_tx(&self, options: TxOptions) -> Result<Box<dyn Transaction>> {
        let tx = self
            .shared
            .dispatch(Method::BeginTx, Some(&options.begin_sql()), &[])?
            .into_tx()?;
        Ok(Box::new(tx))
    }

    async fn ping(&self) -> Result<()> {
        self.shared.dispatch(Method::Ping, None, &[])?.into_done()
    }

    fn close(&self) {
        tracing::debug!("closing mock pool");
        self.shared.close(Method::Close, Error::PoolClosed);
    }

    fn config(&self) -> PoolConfig {
        self.config.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pgmock_client::IsolationLevel;

    #[tokio::test]
    async fn test_unexpected_query_row_fails_on_scan() {
        let pool = MockPool::new();
        let mut row = pool.query_row("SELECT 1", &[]).await;
        let mut one = 0i32;
        let err = row.scan(&mut [&mut one]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedCall(_)));
    }

    #[tokio::test]
    async fn test_begin_tx_matches_options() {
        let pool = MockPool::new();
        let opts = TxOptions::new().isolation_level(IsolationLevel::Serializable);
        pool.expect_begin_tx(opts).once();

        assert!(pool.begin_tx(TxOptions::new()).await.is_err());
        assert!(pool.begin_tx(opts).await.is_ok());
        pool.verify().unwrap();
    }

    #[tokio::test]
    async fn test_close_rejects_later_calls() {
        let pool = MockPool::new();
        pool.expect_ping();
        pool.ping().await.unwrap();
        pool.close();
        assert_eq!(pool.ping().await.unwrap_err(), Error::PoolClosed);
        assert!(pool.was_called(Method::Close));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = PoolConfig::new().max_conns(12);
        let pool = MockPool::new().with_config(config.clone());
        assert_eq!(pool.config(), config);
    }
}
