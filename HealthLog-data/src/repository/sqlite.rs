//! SQLite-backed repositories

use std::marker::PhantomData;

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use super::filter::RecordFilter;
use super::traits::{RecordRepository, UserRepositoryTrait};
use crate::database::SqlitePool;
use crate::models::{format_timestamp, StoredRecord, UserRecord};

/// Generic repository storing `T` in its own table
pub struct SqliteRecordRepository<T> {
    pool: SqlitePool,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteRecordRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: StoredRecord> SqliteRecordRepository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn select_sql() -> String {
        format!("SELECT {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
    }
}

#[async_trait]
impl<T: StoredRecord> RecordRepository<T> for SqliteRecordRepository<T> {
    async fn insert(&self, record: &T) -> Result<T, RepositoryError> {
        debug!("Inserting into {}: id={}", T::TABLE, record.id());

        let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::COLUMNS.join(", "),
            placeholders
        );

        let conn = self.pool.get()?;
        conn.execute(&sql, params_from_iter(record.to_values()))
            .map_err(RepositoryError::from_insert)?;

        Ok(record.clone())
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Option<T>, RepositoryError> {
        debug!("Getting from {}: id={}", T::TABLE, id);

        let sql = format!("{} WHERE id = ?1 AND user_id = ?2", Self::select_sql());
        let conn = self.pool.get()?;
        let record = conn
            .query_row(&sql, params![id.to_string(), user_id.to_string()], |row| T::from_row(row))
            .optional()?;

        Ok(record)
    }

    async fn list(&self, filter: &RecordFilter) -> Result<(Vec<T>, usize), RepositoryError> {
        filter
            .check_columns::<T>()
            .map_err(RepositoryError::InvalidFilter)?;

        let (clause, params) = filter.where_clause::<T>();
        debug!("Listing {} WHERE {}", T::TABLE, clause);

        let conn = self.pool.get()?;

        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {}", T::TABLE, clause);
        let total: i64 = conn.query_row(&count_sql, params_from_iter(params.iter()), |row| row.get(0))?;

        let sql = format!(
            "{} WHERE {} {}",
            Self::select_sql(),
            clause,
            filter.order_and_page::<T>()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| T::from_row(row))?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }

        Ok((records, usize::try_from(total).unwrap_or_default()))
    }

    async fn update(&self, record: &T) -> Result<bool, RepositoryError> {
        debug!("Updating {}: id={}", T::TABLE, record.id());

        // id and user_id are never rewritten
        let assignments = T::COLUMNS[2..]
            .iter()
            .map(|column| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ? AND user_id = ?",
            T::TABLE,
            assignments
        );

        let mut values = record.to_values().split_off(2);
        values.push(Value::Text(record.id().to_string()));
        values.push(Value::Text(record.user_id().to_string()));

        let conn = self.pool.get()?;
        let changed = conn.execute(&sql, params_from_iter(values))?;

        Ok(changed > 0)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, RepositoryError> {
        debug!("Deleting from {}: id={}", T::TABLE, id);

        let sql = format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", T::TABLE);
        let conn = self.pool.get()?;
        let changed = conn.execute(&sql, params![id.to_string(), user_id.to_string()])?;

        Ok(changed > 0)
    }
}

/// Account repository over the `users` table
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn find_by(&self, column: &str, value: String) -> Result<Option<UserRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE {} = ?1",
            UserRecord::SELECT_COLUMNS,
            column
        );
        let conn = self.pool.get()?;
        let user = conn
            .query_row(&sql, params![value], |row| UserRecord::from_row(row))
            .optional()?;

        Ok(user)
    }
}

#[async_trait]
impl UserRepositoryTrait for SqliteUserRepository {
    async fn create(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError> {
        debug!("Creating user: username={}", user.username);

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.name,
                format_timestamp(&user.created_at),
                format_timestamp(&user.updated_at),
            ],
        )
        .map_err(RepositoryError::from_insert)?;

        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_by("id", id.to_string())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_by("username", username.to_string())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        self.find_by("email", email.to_string())
    }
}
