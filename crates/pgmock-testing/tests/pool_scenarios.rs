//! End-to-end scenarios: application code driven through `dyn Pool`.
//!
//! The repository below is written only against the `pgmock-client`
//! contracts, the way production code would be, and the mocks stand in for
//! the database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pgmock_client::{
    CommandTag, Error, Executor, ExecutorExt, IsolationLevel, Pool, PoolExt, Result, Transaction,
    TxOptions, codes,
};
use pgmock_testing::{Method, MockPool, MockRow, MockRows, MockTx, row};

const SELECT_IDS: &str = "SELECT id FROM users";
const SELECT_USER: &str = "SELECT id, username, email FROM users WHERE id = $1";
const INSERT_USER: &str = "INSERT INTO users (username, email) VALUES ($1, $2)";

#[derive(Debug, PartialEq)]
struct User {
    id: u32,
    username: String,
    email: String,
}

struct UserRepo<'a> {
    pool: &'a dyn Pool,
}

impl UserRepo<'_> {
    async fn ids(&self) -> Result<Vec<u32>> {
        let mut rows = self.pool.query(SELECT_IDS, &[]).await?;
        let mut ids = Vec::new();
        while rows.next() {
            let mut id = 0u32;
            rows.scan(&mut [&mut id])?;
            ids.push(id);
        }
        if let Some(err) = rows.err() {
            return Err(err);
        }
        rows.close()?;
        Ok(ids)
    }

    async fn find(&self, id: u32) -> Result<User> {
        let mut user = User {
            id: 0,
            username: String::new(),
            email: String::new(),
        };
        self.pool
            .query_row(SELECT_USER, &[&id])
            .await
            .scan(&mut [&mut user.id, &mut user.username, &mut user.email])?;
        Ok(user)
    }

    async fn insert(&self, username: &str, email: &str) -> Result<u64> {
        let tag = self.pool.execute(INSERT_USER, &[&username, &email]).await?;
        Ok(tag.rows_affected())
    }

    async fn insert_all(&self, users: &[(&str, &str)]) -> Result<()> {
        let tx = self.pool.begin().await?;
        for (username, email) in users {
            if let Err(err) = tx.execute(INSERT_USER, &[username, email]).await {
                tx.rollback().await?;
                return Err(err);
            }
        }
        tx.commit().await
    }
}

// =============================================================================
// Query
// =============================================================================

mod query {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_scanned_in_order() {
        let pool = MockPool::new();
        pool.expect_query(SELECT_IDS)
            .returns(
                MockRows::new(["id"])
                    .add_row(row![1u32])
                    .add_row(row![2u32])
                    .add_row(row![3u32]),
            )
            .once();

        let ids = UserRepo { pool: &pool }.ids().await.unwrap();

        assert_eq!(ids, [1, 2, 3]);
        assert!(pool.was_called_with(Method::Query, SELECT_IDS, &[]));
        pool.verify().unwrap();
    }

    #[tokio::test]
    async fn test_row_error_surfaces_after_iteration() {
        let pool = MockPool::new();
        pool.expect_query(SELECT_IDS).returns(
            MockRows::new(["id"])
                .add_row(row![1u32])
                .row_error(1, Error::database("57014", "canceling statement")),
        );

        let err = UserRepo { pool: &pool }.ids().await.unwrap_err();
        assert_eq!(err.code(), Some("57014"));
    }

    #[tokio::test]
    async fn test_query_error() {
        let pool = MockPool::new();
        pool.expect_query(SELECT_IDS)
            .returns_error(Error::database(codes::COLUMN_NOT_EXISTS, "column \"id\" does not exist"));

        let err = UserRepo { pool: &pool }.ids().await.unwrap_err();
        assert!(err.is_column_not_exists());
    }

    #[tokio::test]
    async fn test_close_error_is_reported() {
        let pool = MockPool::new();
        pool.expect_query(SELECT_IDS).returns(
            MockRows::new(["id"])
                .add_row(row![1u32])
                .close_error(Error::database("08006", "connection failure")),
        );

        let err = UserRepo { pool: &pool }.ids().await.unwrap_err();
        assert_eq!(err.code(), Some("08006"));
    }
}

// =============================================================================
// QueryRow
// =============================================================================

mod query_row {
    use super::*;

    #[tokio::test]
    async fn test_find_user() {
        let pool = MockPool::new();
        pool.expect_query_row(SELECT_USER)
            .with_args(row![1u32])
            .returns(
                MockRow::new(["id", "username", "email"])
                    .add_row(row![1u32, "johndoe", "john@example.com"]),
            )
            .once();

        let user = UserRepo { pool: &pool }.find(1).await.unwrap();

        assert_eq!(
            user,
            User {
                id: 1,
                username: "johndoe".into(),
                email: "john@example.com".into(),
            }
        );
        pool.verify().unwrap();
    }

    #[tokio::test]
    async fn test_missing_user_is_no_rows() {
        let pool = MockPool::new();
        pool.expect_query_row(SELECT_USER)
            .returns(MockRow::new(["id", "username", "email"]));

        let err = UserRepo { pool: &pool }.find(42).await.unwrap_err();
        assert!(err.is_no_rows());
    }

    #[tokio::test]
    async fn test_unmatched_args_are_rejected() {
        let pool = MockPool::new();
        pool.expect_query_row(SELECT_USER).with_args(row![1u32]);

        let err = UserRepo { pool: &pool }.find(2).await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedCall(_)));
        assert!(pool.verify().is_err());
    }
}

// =============================================================================
// Execute
// =============================================================================

mod execute {
    use super::*;

    #[tokio::test]
    async fn test_insert_reports_rows_affected() {
        let pool = MockPool::new();
        pool.expect_execute(INSERT_USER)
            .with_args(row!["johndoe", "john@example.com"])
            .returns(CommandTag::new("INSERT", 1))
            .once();

        let affected = UserRepo { pool: &pool }
            .insert("johndoe", "john@example.com")
            .await
            .unwrap();

        assert_eq!(affected, 1);
        assert!(pool.was_called_with(
            Method::Execute,
            INSERT_USER,
            &row!["johndoe", "john@example.com"]
        ));
        pool.verify().unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_key() {
        let pool = MockPool::new();
        pool.expect_execute(INSERT_USER).returns_error(Error::database(
            codes::DUPLICATE_KEY,
            "duplicate key value violates unique constraint \"users_username_key\"",
        ));

        let err = UserRepo { pool: &pool }
            .insert("johndoe", "john@example.com")
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
        assert!(!err.is_no_rows());
    }

    #[tokio::test]
    async fn test_statement_layout_does_not_matter() {
        let pool = MockPool::new();
        pool.expect_execute(
            "INSERT INTO users (username, email)
                 VALUES ($1, $2)",
        )
        .returns(CommandTag::new("INSERT", 1));

        let affected = UserRepo { pool: &pool }
            .insert("janedoe", "jane@example.com")
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }
}

// =============================================================================
// Transactions
// =============================================================================

mod transactions {
    use super::*;

    #[tokio::test]
    async fn test_begin_exec_commit() {
        let tx = MockTx::new();
        tx.expect_execute(INSERT_USER)
            .with_args(row!["johndoe", "john@example.com"])
            .returns(CommandTag::new("INSERT", 1))
            .once();
        tx.expect_execute(INSERT_USER)
            .with_args(row!["janedoe", "jane@example.com"])
            .returns(CommandTag::new("INSERT", 1))
            .once();
        tx.expect_commit().once();

        let pool = MockPool::new();
        pool.expect_begin().returns(tx.clone()).once();

        UserRepo { pool: &pool }
            .insert_all(&[
                ("johndoe", "john@example.com"),
                ("janedoe", "jane@example.com"),
            ])
            .await
            .unwrap();

        assert!(pool.was_called(Method::Begin));
        assert_eq!(tx.call_count(Method::Execute), 2);
        assert!(tx.was_called(Method::Commit));
        assert!(!tx.was_called(Method::Rollback));
        pool.verify().unwrap();
        tx.verify().unwrap();
    }

    #[tokio::test]
    async fn test_failed_exec_rolls_back() {
        let tx = MockTx::new();
        tx.expect_execute(INSERT_USER)
            .returns_error(Error::database(codes::INVALID_INPUT_SYNTAX, "invalid input syntax"));
        tx.expect_rollback().once();

        let pool = MockPool::new();
        pool.expect_begin().returns(tx.clone());

        let err = UserRepo { pool: &pool }
            .insert_all(&[("johndoe", "not-an-email")])
            .await
            .unwrap_err();

        assert!(err.is_invalid_input_syntax());
        assert!(!tx.was_called(Method::Commit));
        tx.verify().unwrap();
    }

    #[tokio::test]
    async fn test_use_after_commit_fails() {
        let tx = MockTx::new();
        tx.expect_commit();
        tx.expect_execute(INSERT_USER);

        let pool = MockPool::new();
        pool.expect_begin().returns(tx.clone());

        let handle = pool.begin().await.unwrap();
        handle.commit().await.unwrap();
        let err = handle
            .execute(INSERT_USER, &[&"johndoe", &"john@example.com"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transaction(_)));
    }

    #[tokio::test]
    async fn test_nested_begin_is_a_savepoint_mock() {
        let inner = MockTx::new();
        inner.expect_rollback().once();
        let outer = MockTx::new();
        outer.expect_begin().returns(inner.clone());
        outer.expect_commit().once();

        let nested = outer.begin().await.unwrap();
        nested.rollback().await.unwrap();
        outer.commit().await.unwrap();

        inner.verify().unwrap();
        outer.verify().unwrap();
    }
}

// =============================================================================
// Callback Helpers
// =============================================================================

mod callbacks {
    use super::*;

    #[tokio::test]
    async fn test_begin_func_commits_on_success() {
        let tx = MockTx::new();
        tx.expect_execute(INSERT_USER)
            .returns(CommandTag::new("INSERT", 1))
            .once();
        tx.expect_commit().once();

        let pool = MockPool::new();
        pool.expect_begin().returns(tx.clone()).once();

        let affected = pool
            .begin_func(|tx| {
                Box::pin(async move {
                    let tag = tx
                        .execute(INSERT_USER, &[&"johndoe", &"john@example.com"])
                        .await?;
                    Ok::<_, Error>(tag.rows_affected())
                })
            })
            .await
            .unwrap();

        assert_eq!(affected, 1);
        assert!(!tx.was_called(Method::Rollback));
        pool.verify().unwrap();
        tx.verify().unwrap();
    }

    #[tokio::test]
    async fn test_begin_func_rolls_back_on_error() {
        let tx = MockTx::new();
        tx.expect_execute(INSERT_USER)
            .returns_error(Error::database(codes::DUPLICATE_KEY, "duplicate key"));
        tx.expect_rollback().once();

        let pool = MockPool::new();
        pool.expect_begin().returns(tx.clone());

        let err = pool
            .begin_func(|tx| {
                Box::pin(async move {
                    tx.execute(INSERT_USER, &[&"johndoe", &"john@example.com"])
                        .await?;
                    Ok::<_, Error>(())
                })
            })
            .await
            .unwrap_err();

        assert!(err.is_duplicate_key());
        assert!(!tx.was_called(Method::Commit));
        tx.verify().unwrap();
    }

    #[tokio::test]
    async fn test_begin_func_reports_commit_failure() {
        let tx = MockTx::new();
        tx.expect_commit()
            .returns_error(Error::database("40001", "could not serialize access"));

        let pool = MockPool::new();
        pool.expect_begin().returns(tx.clone());

        let err = pool
            .begin_func(|_tx| Box::pin(async { Ok::<_, Error>(()) }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("40001"));
    }

    #[tokio::test]
    async fn test_begin_func_without_transaction() {
        let pool = MockPool::new();
        pool.expect_begin()
            .returns_error(Error::database("53300", "too many connections"));

        let err = pool
            .begin_func(|_tx| Box::pin(async { Ok::<_, Error>(()) }))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("53300"));
    }

    #[tokio::test]
    async fn test_begin_tx_func_passes_options() {
        let options = TxOptions::new().isolation_level(IsolationLevel::Serializable);
        let tx = MockTx::new();
        tx.expect_commit().once();

        let pool = MockPool::new();
        pool.expect_begin_tx(options).returns(tx.clone()).once();

        pool.begin_tx_func(options, |_tx| Box::pin(async { Ok::<_, Error>(()) }))
            .await
            .unwrap();

        assert!(pool.was_called(Method::BeginTx));
        pool.verify().unwrap();
        tx.verify().unwrap();
    }

    #[tokio::test]
    async fn test_query_func_visits_every_row() {
        let pool = MockPool::new();
        pool.expect_query(SELECT_IDS).returns(
            MockRows::new(["id"])
                .add_row(row![1u32])
                .add_row(row![2u32])
                .add_command_tag(CommandTag::new("SELECT", 2)),
        );

        let mut ids = Vec::new();
        let tag = pool
            .query_func(SELECT_IDS, &[], |rows| {
                let mut id = 0u32;
                rows.scan(&mut [&mut id])?;
                ids.push(id);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(ids, [1, 2]);
        assert_eq!(tag.rows_affected(), 2);
    }

    #[tokio::test]
    async fn test_query_func_stops_at_callback_error() {
        let pool = MockPool::new();
        pool.expect_query(SELECT_IDS).returns(
            MockRows::new(["id"])
                .add_row(row![1u32])
                .add_row(row![2u32]),
        );

        let mut visited = 0;
        let err = pool
            .query_func(SELECT_IDS, &[], |_rows| {
                visited += 1;
                Err(Error::database("P0001", "stop"))
            })
            .await
            .unwrap_err();

        assert_eq!(visited, 1);
        assert_eq!(err.code(), Some("P0001"));
    }

    #[tokio::test]
    async fn test_query_func_surfaces_row_error() {
        let tx = MockTx::new();
        tx.expect_query(SELECT_IDS).returns(
            MockRows::new(["id"])
                .add_row(row![1u32])
                .add_row(row![2u32])
                .row_error(1, Error::database("57014", "canceling statement")),
        );

        let mut ids = Vec::new();
        let err = tx
            .query_func(SELECT_IDS, &[], |rows| {
                let mut id = 0u32;
                rows.scan(&mut [&mut id])?;
                ids.push(id);
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(ids, [1]);
        assert_eq!(err.code(), Some("57014"));
    }
}
