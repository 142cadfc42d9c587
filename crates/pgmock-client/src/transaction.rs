//! Transaction support.
//!
//! This module provides transaction isolation levels, access modes and the
//! options passed to [`Pool::begin_tx`](crate::Pool::begin_tx).

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Read uncommitted. The server treats this as read committed.
    ReadUncommitted,

    /// Read committed (server default).
    ///
    /// Each statement sees only data committed before it began.
    #[default]
    ReadCommitted,

    /// Repeatable read.
    ///
    /// All statements in the transaction see the snapshot taken by its first
    /// statement.
    RepeatableRead,

    /// Serializable (highest isolation).
    ///
    /// Like repeatable read, but transactions that could not have run
    /// serially fail with a serialization error.
    Serializable,
}

impl IsolationLevel {
    /// Get the isolation level name as used in SQL.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Transaction access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Reads and writes allowed.
    #[default]
    ReadWrite,
    /// Writes rejected.
    ReadOnly,
}

/// Options for starting a transaction.
///
/// Unset fields leave the server default in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxOptions {
    /// Isolation level.
    pub isolation_level: Option<IsolationLevel>,
    /// Access mode.
    pub access_mode: Option<AccessMode>,
    /// Whether a serializable read-only transaction may block to obtain a
    /// safe snapshot.
    pub deferrable: bool,
}

impl TxOptions {
    /// Options with every field at the server default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the isolation level.
    #[must_use]
    pub fn isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }

    /// Set the access mode.
    #[must_use]
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = Some(mode);
        self
    }

    /// Make the transaction read-only.
    #[must_use]
    pub fn read_only(self) -> Self {
        self.access_mode(AccessMode::ReadOnly)
    }

    /// Mark the transaction deferrable.
    #[must_use]
    pub fn deferrable(mut self, deferrable: bool) -> Self {
        self.deferrable = deferrable;
        self
    }

    /// The `BEGIN` statement these options describe.
    ///
    /// ```rust
    /// use pgmock_client::{IsolationLevel, TxOptions};
    ///
    /// let opts = TxOptions::new()
    ///     .isolation_level(IsolationLevel::Serializable)
    ///     .read_only();
    /// assert_eq!(opts.begin_sql(), "BEGIN ISOLATION LEVEL SERIALIZABLE READ ONLY");
    /// ```
    #[must_use]
    pub fn begin_sql(&self) -> String {
        let mut sql = String::from("BEGIN");
        if let Some(level) = self.isolation_level {
            sql.push_str(" ISOLATION LEVEL ");
            sql.push_str(level.name());
        }
        match self.access_mode {
            Some(AccessMode::ReadOnly) => sql.push_str(" READ ONLY"),
            Some(AccessMode::ReadWrite) => sql.push_str(" READ WRITE"),
            None => {}
        }
        if self.deferrable {
            sql.push_str(" DEFERRABLE");
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_level_name() {
        assert_eq!(IsolationLevel::ReadCommitted.name(), "READ COMMITTED");
        assert_eq!(IsolationLevel::Serializable.name(), "SERIALIZABLE");
    }

    #[test]
    fn test_default_isolation_level() {
        assert_eq!(IsolationLevel::default(), IsolationLevel::ReadCommitted);
    }

    #[test]
    fn test_begin_sql_defaults() {
        assert_eq!(TxOptions::new().begin_sql(), "BEGIN");
    }

    #[test]
    fn test_begin_sql_all_options() {
        let opts = TxOptions::new()
            .isolation_level(IsolationLevel::RepeatableRead)
            .access_mode(AccessMode::ReadWrite)
            .deferrable(true);
        assert_eq!(
            opts.begin_sql(),
            "BEGIN ISOLATION LEVEL REPEATABLE READ READ WRITE DEFERRABLE"
        );
    }
}
