//! User domain entity.

use serde::{Deserialize, Serialize};

/// User record as stored in the `users` table.
///
/// `id` is caller-supplied; this layer enforces no uniqueness or format
/// constraints on any field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}
