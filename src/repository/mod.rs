//! Repository layer - data access abstraction.
//!
//! Repositories provide an abstraction over data persistence, decoupling
//! callers from the concrete storage engine.

mod user_repository;

pub use user_repository::{UserRepository, UserStore};

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
