//! Call recording and expectation matching shared by [`MockPool`] and
//! [`MockTx`].
//!
//! Each `expect_*` call registers an expectation immediately and returns an
//! [`Expectation`] handle for refining it. Incoming calls are matched against
//! expectations in registration order; the first one whose method, SQL,
//! arguments and remaining call budget fit answers the call.
//!
//! SQL is compared after collapsing runs of whitespace, so indentation in a
//! raw string literal does not matter.
//!
//! [`MockPool`]: crate::MockPool
//! [`MockTx`]: crate::MockTx

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use pgmock_client::{CommandTag, Error, Result};
use pgmock_types::{SqlValue, ToSql};

use crate::error::MockError;
use crate::row::MockRow;
use crate::rows::MockRows;
use crate::tx::MockTx;

/// Mocked operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `Executor::execute`.
    Execute,
    /// `Executor::query`.
    Query,
    /// `Executor::query_row`.
    QueryRow,
    /// `Pool::begin` or `Transaction::begin`.
    Begin,
    /// `Pool::begin_tx`.
    BeginTx,
    /// `Transaction::commit`.
    Commit,
    /// `Transaction::rollback`.
    Rollback,
    /// `Pool::ping`.
    Ping,
    /// `Pool::close`.
    Close,
}

impl Method {
    /// Operation name as used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Execute => "execute",
            Self::Query => "query",
            Self::QueryRow => "query_row",
            Self::Begin => "begin",
            Self::BeginTx => "begin_tx",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
            Self::Ping => "ping",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A call received by a mock.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Operation invoked.
    pub method: Method,
    /// Statement text, for statement-carrying operations.
    pub sql: Option<String>,
    /// Converted arguments.
    pub args: Vec<SqlValue>,
}

impl Call {
    fn matches(&self, method: Method, sql: Option<&str>, args: &[SqlValue]) -> bool {
        self.method == method
            && same_sql(self.sql.as_deref(), sql)
            && self.args.as_slice() == args
    }
}

/// Marker types selecting which responses an [`Expectation`] accepts.
pub mod kinds {
    /// `execute` expectations.
    #[derive(Debug)]
    pub enum Execute {}
    /// `query` expectations.
    #[derive(Debug)]
    pub enum Query {}
    /// `query_row` expectations.
    #[derive(Debug)]
    pub enum QueryRow {}
    /// `begin` and `begin_tx` expectations.
    #[derive(Debug)]
    pub enum Begin {}
    /// `commit`, `rollback` and `ping` expectations.
    #[derive(Debug)]
    pub enum Unit {}
}

#[derive(Debug, Clone)]
pub(crate) enum Response {
    Tag(CommandTag),
    Rows(Vec<MockRows>),
    Row(MockRow),
    Tx(MockTx),
    Done,
    Fail(Error),
}

impl Response {
    fn default_for(method: Method) -> Self {
        match method {
            Method::Execute => Self::Tag(CommandTag::default()),
            Method::Query => Self::Rows(vec![MockRows::new(Vec::<String>::new())]),
            Method::QueryRow => Self::Row(MockRow::new(Vec::<String>::new())),
            Method::Begin | Method::BeginTx => Self::Tx(MockTx::new()),
            Method::Commit | Method::Rollback | Method::Ping | Method::Close => Self::Done,
        }
    }

    fn variant(&self) -> &'static str {
        match self {
            Self::Tag(_) => "command tag",
            Self::Rows(_) => "rows",
            Self::Row(_) => "row",
            Self::Tx(_) => "transaction",
            Self::Done => "completion",
            Self::Fail(_) => "error",
        }
    }

    fn mismatch(self, wanted: &str) -> Error {
        Error::UnexpectedCall(format!(
            "expected a {wanted} response, found {}",
            self.variant()
        ))
    }

    pub(crate) fn into_tag(self) -> Result<CommandTag> {
        match self {
            Self::Tag(tag) => Ok(tag),
            other => Err(other.mismatch("command tag")),
        }
    }

    pub(crate) fn into_rows(self) -> Result<Vec<MockRows>> {
        match self {
            Self::Rows(sets) => Ok(sets),
            other => Err(other.mismatch("rows")),
        }
    }

    pub(crate) fn into_row(self) -> Result<MockRow> {
        match self {
            Self::Row(row) => Ok(row),
            other => Err(other.mismatch("row")),
        }
    }

    pub(crate) fn into_tx(self) -> Result<MockTx> {
        match self {
            Self::Tx(tx) => Ok(tx),
            other => Err(other.mismatch("transaction")),
        }
    }

    pub(crate) fn into_done(self) -> Result<()> {
        match self {
            Self::Done => Ok(()),
            other => Err(other.mismatch("completion")),
        }
    }
}

#[derive(Debug)]
struct Expected {
    method: Method,
    sql: Option<String>,
    args: Option<Vec<SqlValue>>,
    response: Response,
    times: Option<usize>,
    calls: usize,
}

impl Expected {
    fn accepts(&self, method: Method, sql: Option<&str>, args: &[SqlValue]) -> bool {
        self.method == method
            && same_sql(self.sql.as_deref(), sql)
            && self.args.as_deref().is_none_or(|expected| expected == args)
            && self.times.is_none_or(|limit| self.calls < limit)
    }

    fn satisfied(&self) -> bool {
        match self.times {
            Some(n) => self.calls == n,
            None => self.calls > 0,
        }
    }

    fn describe(&self) -> String {
        let mut out = self.method.to_string();
        if let Some(sql) = &self.sql {
            out.push_str(&format!(" `{sql}`"));
        }
        if let Some(args) = &self.args {
            out.push_str(&format!(" with {args:?}"));
        }
        match self.times {
            Some(n) => out.push_str(&format!(": expected {n} call(s), got {}", self.calls)),
            None => out.push_str(": never called"),
        }
        out
    }
}

#[derive(Debug, Default)]
struct Recorder {
    expectations: Vec<Expected>,
    calls: Vec<Call>,
    closed: Option<Error>,
}

/// Recorder shared between a mock and its clones.
#[derive(Debug, Clone, Default)]
pub(crate) struct Shared(Arc<Mutex<Recorder>>);

impl Shared {
    pub(crate) fn expect<K>(&self, method: Method, sql: Option<&str>) -> Expectation<K> {
        let mut recorder = self.0.lock();
        recorder.expectations.push(Expected {
            method,
            sql: sql.map(str::to_owned),
            args: None,
            response: Response::default_for(method),
            times: None,
            calls: 0,
        });
        Expectation {
            shared: self.clone(),
            index: recorder.expectations.len() - 1,
            _kind: PhantomData,
        }
    }

    /// Record a call and produce the matching expectation's response.
    pub(crate) fn dispatch(
        &self,
        method: Method,
        sql: Option<&str>,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Response> {
        let args = params
            .iter()
            .map(|p| p.to_sql())
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut recorder = self.0.lock();
        recorder.calls.push(Call {
            method,
            sql: sql.map(str::to_owned),
            args: args.clone(),
        });

        if let Some(err) = &recorder.closed {
            tracing::debug!(method = %method, "call on closed mock");
            return Err(err.clone());
        }

        let Some(expected) = recorder
            .expectations
            .iter_mut()
            .find(|e| e.accepts(method, sql, &args))
        else {
            tracing::warn!(
                method = %method,
                sql = sql.unwrap_or_default(),
                args = ?args,
                "unexpected mock call"
            );
            let mut detail = method.to_string();
            if let Some(sql) = sql {
                detail.push_str(&format!(" `{sql}`"));
            }
            detail.push_str(&format!(" with {args:?}"));
            return Err(Error::UnexpectedCall(detail));
        };

        expected.calls += 1;
        tracing::debug!(
            method = %method,
            sql = sql.unwrap_or_default(),
            calls = expected.calls,
            "matched mock expectation"
        );

        match &expected.response {
            Response::Fail(err) => Err(err.clone()),
            response => Ok(response.clone()),
        }
    }

    /// Record a call that needs no expectation and reject later calls.
    pub(crate) fn close(&self, method: Method, closed: Error) {
        let mut recorder = self.0.lock();
        recorder.calls.push(Call {
            method,
            sql: None,
            args: Vec::new(),
        });
        recorder.closed = Some(closed);
    }

    pub(crate) fn mark_closed(&self, closed: Error) {
        self.0.lock().closed = Some(closed);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.lock().calls.clone()
    }

    pub(crate) fn call_count(&self, method: Method) -> usize {
        self.0
            .lock()
            .calls
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub(crate) fn was_called_with(&self, method: Method, sql: Option<&str>, args: &[SqlValue]) -> bool {
        self.0
            .lock()
            .calls
            .iter()
            .any(|c| c.matches(method, sql, args))
    }

    pub(crate) fn verify(&self) -> std::result::Result<(), MockError> {
        let unmet: Vec<String> = self
            .0
            .lock()
            .expectations
            .iter()
            .filter(|e| !e.satisfied())
            .map(Expected::describe)
            .collect();
        if unmet.is_empty() {
            Ok(())
        } else {
            Err(MockError::UnmetExpectations(unmet))
        }
    }
}

/// Handle to a registered expectation.
///
/// Without [`times`](Expectation::times) an expectation answers any number of
/// calls and must be called at least once to verify.
pub struct Expectation<K> {
    shared: Shared,
    index: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Expectation<K> {
    fn update(&self, f: impl FnOnce(&mut Expected)) {
        if let Some(expected) = self.shared.0.lock().expectations.get_mut(self.index) {
            f(expected);
        }
    }

    /// Only match calls whose converted arguments equal `args`.
    ///
    /// Build the list with [`row!`](crate::row).
    pub fn with_args(self, args: Vec<SqlValue>) -> Self {
        self.update(|e| e.args = Some(args));
        self
    }

    /// Answer exactly `n` calls.
    pub fn times(self, n: usize) -> Self {
        self.update(|e| e.times = Some(n));
        self
    }

    /// Answer exactly one call.
    pub fn once(self) -> Self {
        self.times(1)
    }

    /// Fail matching calls with `err`.
    pub fn returns_error(self, err: Error) -> Self {
        self.update(|e| e.response = Response::Fail(err));
        self
    }
}

impl Expectation<kinds::Execute> {
    /// Complete matching calls with `tag`.
    pub fn returns(self, tag: CommandTag) -> Self {
        self.update(|e| e.response = Response::Tag(tag));
        self
    }
}

impl Expectation<kinds::Query> {
    /// Answer matching calls with a fresh cursor over `rows`.
    pub fn returns(self, rows: MockRows) -> Self {
        self.returns_result_sets(vec![rows])
    }

    /// Answer matching calls with a fresh cursor over several result sets.
    pub fn returns_result_sets(self, sets: Vec<MockRows>) -> Self {
        self.update(|e| e.response = Response::Rows(sets));
        self
    }
}

impl Expectation<kinds::QueryRow> {
    /// Answer matching calls with `row`.
    pub fn returns(self, row: MockRow) -> Self {
        self.update(|e| e.response = Response::Row(row));
        self
    }
}

impl Expectation<kinds::Begin> {
    /// Answer matching calls with `tx`.
    ///
    /// `tx` shares its recorder with the transaction handed to the caller, so
    /// the test can keep it for assertions.
    pub fn returns(self, tx: MockTx) -> Self {
        self.update(|e| e.response = Response::Tx(tx));
        self
    }
}

impl<K> fmt::Debug for Expectation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("index", &self.index)
            .finish()
    }
}

fn same_sql(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.split_whitespace().eq(b.split_whitespace()),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_same_sql_ignores_layout() {
        assert!(same_sql(
            Some("SELECT id\n    FROM users"),
            Some("SELECT id FROM users")
        ));
        assert!(!same_sql(Some("SELECT 1"), Some("SELECT 2")));
        assert!(!same_sql(Some("SELECT 1"), None));
        assert!(same_sql(None, None));
    }

    #[test]
    fn test_first_match_wins_until_exhausted() {
        let shared = Shared::default();
        shared
            .expect::<kinds::Execute>(Method::Execute, Some("DELETE FROM t"))
            .returns(CommandTag::new("DELETE", 1))
            .once();
        shared
            .expect::<kinds::Execute>(Method::Execute, Some("DELETE FROM t"))
            .returns(CommandTag::new("DELETE", 0));

        let first = shared.dispatch(Method::Execute, Some("DELETE FROM t"), &[]).unwrap();
        let second = shared.dispatch(Method::Execute, Some("DELETE FROM t"), &[]).unwrap();
        assert_eq!(first.into_tag().unwrap().rows_affected(), 1);
        assert_eq!(second.into_tag().unwrap().rows_affected(), 0);
        assert!(shared.verify().is_ok());
    }

    #[test]
    fn test_args_must_match() {
        let shared = Shared::default();
        shared
            .expect::<kinds::Execute>(Method::Execute, Some("DELETE FROM t WHERE id = $1"))
            .with_args(vec![SqlValue::Int32(1)]);

        let err = shared
            .dispatch(Method::Execute, Some("DELETE FROM t WHERE id = $1"), &[&2i32])
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedCall(_)));
        assert!(
            shared
                .dispatch(Method::Execute, Some("DELETE FROM t WHERE id = $1"), &[&1i32])
                .is_ok()
        );
    }

    #[test]
    fn test_verify_reports_unmet() {
        let shared = Shared::default();
        shared.expect::<kinds::Unit>(Method::Ping, None).times(2);
        shared.dispatch(Method::Ping, None, &[]).unwrap();

        let err = shared.verify().unwrap_err();
        assert_eq!(
            err,
            MockError::UnmetExpectations(vec!["ping: expected 2 call(s), got 1".into()])
        );
    }

    #[test]
    fn test_calls_are_recorded_even_when_unexpected() {
        let shared = Shared::default();
        assert!(shared.dispatch(Method::Query, Some("SELECT 1"), &[]).is_err());
        assert_eq!(shared.call_count(Method::Query), 1);
        assert!(shared.was_called_with(Method::Query, Some("SELECT 1"), &[]));
    }

    #[test]
    fn test_closed_rejects_calls() {
        let shared = Shared::default();
        shared.expect::<kinds::Unit>(Method::Ping, None);
        shared.close(Method::Close, Error::PoolClosed);
        assert_eq!(
            shared.dispatch(Method::Ping, None, &[]).unwrap_err(),
            Error::PoolClosed
        );
    }
}
