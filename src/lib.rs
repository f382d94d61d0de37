//! User Store
//!
//! Data-access layer for a single `users` table in a relational store.
//! Callers obtain a [`UserStore`] through a fail-fast constructor, then issue
//! CRUD operations via the [`UserRepository`] trait; each operation runs one
//! parameterized statement under a bounded deadline.
//!
//! ```no_run
//! use user_store::{User, UserRepository, UserStore};
//!
//! # async fn demo() -> user_store::StoreResult<()> {
//! let store = UserStore::connect("mysql", "mysql://root@localhost/user_db", 5, 10).await?;
//! store
//!     .create(&User {
//!         id: "u1".into(),
//!         name: "Ann".into(),
//!         email: "a@x.com".into(),
//!         phone: "111".into(),
//!     })
//!     .await?;
//! let user = store.find_by_id("u1").await?;
//! assert_eq!(user.name, "Ann");
//! store.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod db;
pub mod domain;
pub mod error;
pub mod repository;

pub use config::{StoreConfig, DEFAULT_OP_TIMEOUT};
pub use domain::User;
pub use error::{OptionExt, StoreError, StoreResult};
pub use repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::MockUserRepository;
