//! User repository trait and its pooled implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DbErr, FromQueryResult};
use tokio::time::timeout;

use crate::config::{StoreConfig, DEFAULT_OP_TIMEOUT};
use crate::db::Database;
use crate::domain::User;
use crate::error::{OptionExt, StoreError, StoreResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const SELECT_BY_ID: &str = "SELECT id, name, email, phone FROM users WHERE id = ?";
const SELECT_ALL: &str = "SELECT id, name, email, phone FROM users";
const INSERT: &str = "INSERT INTO users (id, name, email, phone) VALUES (?, ?, ?, ?)";
const UPDATE: &str = "UPDATE users SET name = ?, email = ?, phone = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM users WHERE id = ?";

/// User repository trait for dependency injection.
///
/// Callers hold this abstraction rather than [`UserStore`] so the storage
/// engine can be substituted, e.g. with [`MockUserRepository`] in tests.
/// Operations are independent of each other and each runs under the
/// per-operation deadline.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Release the connection pool. Idempotent; every operation issued
    /// afterwards fails with [`StoreError::Closed`].
    async fn close(&self);

    /// Find a user by exact `id` equality.
    ///
    /// A missing row is [`StoreError::NotFound`]. An empty `id` is a valid
    /// query that matches nothing, not an input error.
    async fn find_by_id(&self, id: &str) -> StoreResult<User>;

    /// Fetch every user, in the store's natural return order.
    ///
    /// An empty table yields an empty `Vec`, not an error.
    async fn find_all(&self) -> StoreResult<Vec<User>>;

    /// Insert a user. `user.id` must be supplied by the caller.
    async fn create(&self, user: &User) -> StoreResult<()>;

    /// Rewrite name, email and phone of the row matching `user.id`.
    ///
    /// No matching row is [`StoreError::NotFound`].
    async fn update(&self, user: &User) -> StoreResult<()>;

    /// Delete the row matching `id`.
    ///
    /// No matching row is [`StoreError::NotFound`].
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Row shape produced by the user queries.
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    phone: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// Concrete [`UserRepository`] backed by a sea-orm connection pool.
///
/// Holds no mutable state besides the pool handle and the closed flag, so a
/// single instance can serve concurrent callers.
#[derive(Debug)]
pub struct UserStore {
    db: Database,
    op_timeout: Duration,
}

impl UserStore {
    /// Connect with an explicit dialect, connection URL and pool bounds,
    /// using the default 5-second operation deadline.
    ///
    /// Connectivity is probed eagerly; an unreachable store fails
    /// construction rather than the first operation.
    pub async fn connect(
        dialect: &str,
        url: &str,
        max_idle: u32,
        max_open: u32,
    ) -> StoreResult<Self> {
        let config = StoreConfig {
            dialect: dialect.to_string(),
            url: url.to_string(),
            max_idle,
            max_open,
            op_timeout: DEFAULT_OP_TIMEOUT,
        };
        Self::connect_with_config(&config).await
    }

    /// Connect from a full [`StoreConfig`].
    pub async fn connect_with_config(config: &StoreConfig) -> StoreResult<Self> {
        let db = Database::connect(config).await?;
        Ok(Self {
            db,
            op_timeout: config.op_timeout,
        })
    }

    /// Override the per-operation deadline.
    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Run one store interaction under the operation deadline.
    ///
    /// On deadline expiry the future is dropped, abandoning the in-flight
    /// query instead of letting it run on.
    async fn bounded<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        self.db.ensure_open()?;
        match timeout(self.op_timeout, op).await {
            Ok(res) => res.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout),
        }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn close(&self) {
        self.db.close().await;
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<User> {
        let stmt = self.db.stmt(SELECT_BY_ID, vec![id.into()]);
        let row = self
            .bounded(UserRow::find_by_statement(stmt).one(self.db.conn()))
            .await?;
        row.map(User::from).ok_or_not_found()
    }

    async fn find_all(&self) -> StoreResult<Vec<User>> {
        let stmt = self.db.stmt(SELECT_ALL, Vec::new());
        let rows = self
            .bounded(UserRow::find_by_statement(stmt).all(self.db.conn()))
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn create(&self, user: &User) -> StoreResult<()> {
        let stmt = self.db.stmt(
            INSERT,
            vec![
                user.id.clone().into(),
                user.name.clone().into(),
                user.email.clone().into(),
                user.phone.clone().into(),
            ],
        );
        // Execute success is create success; a clean insert always affects
        // one row, and constraint violations surface as Database errors.
        self.bounded(self.db.conn().execute(stmt)).await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let stmt = self.db.stmt(
            UPDATE,
            vec![
                user.name.clone().into(),
                user.email.clone().into(),
                user.phone.clone().into(),
                user.id.clone().into(),
            ],
        );
        let result = self.bounded(self.db.conn().execute(stmt)).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let stmt = self.db.stmt(DELETE, vec![id.into()]);
        let result = self.bounded(self.db.conn().execute(stmt)).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
