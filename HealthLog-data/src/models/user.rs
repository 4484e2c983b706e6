use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{read_timestamp, read_uuid};

/// Storage model for an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,

    /// bcrypt hash of the account password
    pub password_hash: Option<String>,

    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub(crate) const SELECT_COLUMNS: &'static str =
        "id, username, email, password_hash, name, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: read_uuid(row, 0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            name: row.get(4)?,
            created_at: read_timestamp(row, 5)?,
            updated_at: read_timestamp(row, 6)?,
        })
    }
}
