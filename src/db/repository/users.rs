//! Read-only lookups against the legacy users table.

use async_trait::async_trait;
use std::collections::HashMap;

use super::error::RepositoryResult;
use crate::models::User;

/// Repository trait for owner resolution.
///
/// The users table is owned by the external system; this service never
/// writes to it, and a missing row is a normal outcome (`Ok(None)`), not
/// an error. The mapper substitutes a placeholder owner in that case.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a single user, tolerating absence.
    async fn get_user(&self, id: i64) -> RepositoryResult<Option<User>>;

    /// Batch-fetch users by id in one round trip. IDs with no matching row
    /// are simply absent from the result map.
    async fn get_users_by_ids(&self, ids: &[i64]) -> RepositoryResult<HashMap<i64, User>>;
}
