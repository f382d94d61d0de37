//! Error handling for the store.
//!
//! Every failure is surfaced as a returned [`StoreError`]; nothing is retried
//! or logged on the error path. [`StoreError::Timeout`] is its own variant so
//! callers can decide to retry deadline misses.

use thiserror::Error;

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Invalid construction input (empty dialect or url, url/dialect mismatch)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Dialect names a backend this build does not recognize
    #[error("unsupported dialect: {0}")]
    UnsupportedDialect(String),

    /// Underlying store error, surfaced verbatim
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No row matched the given id
    #[error("user not found")]
    NotFound,

    /// The per-operation deadline elapsed before the store responded
    #[error("operation timed out")]
    Timeout,

    /// Operation issued after `close()`
    #[error("store is closed")]
    Closed,
}

/// Result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Extension trait for Option -> StoreError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> StoreResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> StoreResult<T> {
        self.ok_or(StoreError::NotFound)
    }
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        StoreError::Config(msg.into())
    }

    /// Whether the caller may reasonably retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout)
    }
}
