use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::filter::{RecordFilter, SortOrder};
use super::traits::{RecordRepository, UserRepositoryTrait};
use crate::models::{StoredRecord, UserRecord};

/// In-memory storage for records of type `T`
#[derive(Debug)]
pub struct InMemoryRecordRepository<T> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> Clone for InMemoryRecordRepository<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T> Default for InMemoryRecordRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryRecordRepository<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<T: StoredRecord> RecordRepository<T> for InMemoryRecordRepository<T> {
    async fn insert(&self, record: &T) -> Result<T, RepositoryError> {
        let mut store = self.records.write()?;
        if store.contains_key(&record.id()) {
            return Err(RepositoryError::Conflict(format!(
                "{} already holds id {}",
                T::TABLE,
                record.id()
            )));
        }
        store.insert(record.id(), record.clone());
        Ok(record.clone())
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<T>, RepositoryError> {
        let store = self.records.read()?;
        Ok(store.get(&id).filter(|r| r.user_id() == user_id).cloned())
    }

    async fn list(&self, filter: &RecordFilter) -> Result<(Vec<T>, usize), RepositoryError> {
        filter
            .check_columns::<T>()
            .map_err(RepositoryError::InvalidFilter)?;

        let store = self.records.read()?;
        let mut matching: Vec<T> = store.values().filter(|r| filter.matches(*r)).cloned().collect();

        matching.sort_by(|a, b| {
            let cmp = a.timestamp().cmp(&b.timestamp()).then_with(|| a.id().cmp(&b.id()));
            match filter.order {
                SortOrder::Ascending => cmp,
                SortOrder::Descending => cmp.reverse(),
            }
        });

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();

        Ok((page, total))
    }

    async fn update(&self, record: &T) -> Result<bool, RepositoryError> {
        let mut store = self.records.write()?;
        match store.get_mut(&record.id()) {
            Some(existing) if existing.user_id() == record.user_id() => {
                *existing = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.records.write()?;
        if store.get(&id).is_some_and(|r| r.user_id() == user_id) {
            store.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// In-memory account storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_where(
        &self,
        predicate: impl Fn(&UserRecord) -> bool,
    ) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self.users.read()?;
        Ok(users.values().find(|u| predicate(u)).cloned())
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryUserRepository {
    async fn create(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError> {
        let mut users = self.users.write()?;
        if users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict(format!(
                "username {} is taken",
                user.username
            )));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(format!(
                "email {} is taken",
                user.email
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        let users = self.users.read()?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_where(|u| u.username == username)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_where(|u| u.email == email)
    }
}
