use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::db::models::User;
use crate::error::DatabaseError;

/// Persistence seam for user records.
///
/// Implementations do not enforce email uniqueness on their own unless the
/// backing store does; callers check before inserting.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError>;

    /// Returns `DatabaseError::Duplicate` when the store rejects the email.
    async fn insert(&self, user: &User) -> Result<(), DatabaseError>;

    /// Releases the underlying connection. Called once at process exit.
    async fn shutdown(&self) {}
}
