use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::filter::RecordFilter;
use crate::models::{StoredRecord, UserRecord};

/// Repository for records owned by a single user
#[async_trait]
pub trait RecordRepository<T: StoredRecord>: Send + Sync {
    /// Store a new record
    async fn insert(&self, record: &T) -> Result<T, RepositoryError>;

    /// Get a record by id, only if it belongs to `user_id`
    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<T>, RepositoryError>;

    /// List one page of matching records with the total number of matches
    async fn list(&self, filter: &RecordFilter) -> Result<(Vec<T>, usize), RepositoryError>;

    /// Replace a stored record; returns `false` when no record of the same
    /// user has its id
    async fn update(&self, record: &T) -> Result<bool, RepositoryError>;

    /// Delete a record; returns `false` when the user owns no such record
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Repository for accounts
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Store a new account; fails with `Conflict` on a duplicate username or email
    async fn create(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;
}
