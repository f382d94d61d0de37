//! Database connection and lifecycle management.

use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbBackend,
    Statement, Value,
};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Resolve a dialect name to a backend this build recognizes.
pub(crate) fn resolve_dialect(dialect: &str) -> StoreResult<DbBackend> {
    match dialect {
        "mysql" => Ok(DbBackend::MySql),
        "postgres" | "postgresql" => Ok(DbBackend::Postgres),
        "sqlite" | "sqlite3" => Ok(DbBackend::Sqlite),
        other => Err(StoreError::UnsupportedDialect(other.to_string())),
    }
}

/// Rewrite `?` placeholders to the `$1..$n` form Postgres expects.
///
/// The statements this crate issues contain no string literals, so a plain
/// scan over the text is sufficient.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 4);
    let mut n = 0u32;
    for ch in sql.chars() {
        if ch == '?' {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Pooled connection with close tracking.
///
/// Owns the pool from construction until [`Database::close`]; the closed flag
/// makes `close` idempotent and lets operations fail fast afterwards instead
/// of racing the pool teardown.
#[derive(Debug)]
pub(crate) struct Database {
    conn: DatabaseConnection,
    backend: DbBackend,
    closed: AtomicBool,
}

impl Database {
    /// Open a pool and eagerly probe connectivity.
    ///
    /// Fail-fast policy: a bad dialect, an unreachable store or a failed ping
    /// error here, at startup, rather than on first use. Connecting and
    /// pinging are both bounded by the configured operation deadline.
    pub(crate) async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        if config.dialect.is_empty() {
            return Err(StoreError::config("dialect must not be empty"));
        }
        if config.url.is_empty() {
            return Err(StoreError::config("connection url must not be empty"));
        }
        let backend = resolve_dialect(&config.dialect)?;
        let (max_idle, max_open) = config.pool_bounds();

        let mut options = ConnectOptions::new(config.url.as_str());
        options
            .min_connections(max_idle)
            .max_connections(max_open)
            .connect_timeout(config.op_timeout)
            .acquire_timeout(config.op_timeout);

        let conn = match timeout(config.op_timeout, SeaDatabase::connect(options)).await {
            Ok(conn) => conn?,
            Err(_) => return Err(StoreError::Timeout),
        };

        if conn.get_database_backend() != backend {
            return Err(StoreError::config(format!(
                "connection url does not match dialect {:?}",
                config.dialect
            )));
        }

        match timeout(config.op_timeout, conn.ping()).await {
            Ok(res) => res?,
            Err(_) => return Err(StoreError::Timeout),
        }

        info!(dialect = %config.dialect, max_idle, max_open, "user store connected");

        Ok(Self {
            conn,
            backend,
            closed: AtomicBool::new(false),
        })
    }

    /// Fail with [`StoreError::Closed`] once the pool has been released.
    pub(crate) fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// Build a backend-tagged statement from `?`-placeholder SQL.
    pub(crate) fn stmt(&self, sql: &str, values: Vec<Value>) -> Statement {
        let sql = match self.backend {
            DbBackend::Postgres => numbered_placeholders(sql),
            _ => sql.to_string(),
        };
        Statement::from_sql_and_values(self.backend, sql, values)
    }

    pub(crate) fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Release the pool. Second and later calls are no-ops.
    pub(crate) async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.conn.close_by_ref().await {
            debug!(error = %err, "error while closing connection pool");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_dialects_resolve() {
        assert_eq!(resolve_dialect("mysql").unwrap(), DbBackend::MySql);
        assert_eq!(resolve_dialect("postgres").unwrap(), DbBackend::Postgres);
        assert_eq!(resolve_dialect("postgresql").unwrap(), DbBackend::Postgres);
        assert_eq!(resolve_dialect("sqlite").unwrap(), DbBackend::Sqlite);
        assert_eq!(resolve_dialect("sqlite3").unwrap(), DbBackend::Sqlite);
    }

    #[test]
    fn unknown_dialect_is_rejected() {
        let err = resolve_dialect("mssql").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedDialect(d) if d == "mssql"));
    }

    #[test]
    fn placeholders_are_numbered_for_postgres() {
        assert_eq!(
            numbered_placeholders("INSERT INTO users (id, name, email, phone) VALUES (?, ?, ?, ?)"),
            "INSERT INTO users (id, name, email, phone) VALUES ($1, $2, $3, $4)"
        );
        assert_eq!(
            numbered_placeholders("SELECT id, name, email, phone FROM users"),
            "SELECT id, name, email, phone FROM users"
        );
    }
}
