use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_timestamp, optional_text, read_timestamp, read_uuid, StoredRecord};

/// Storage model for a tracked medication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,

    /// Free-form dosage, e.g. "10mg" or "5 units"
    pub dosage: String,

    /// Free-form schedule, e.g. "Once daily"
    pub frequency: String,

    /// Inactive medications are kept so their logs stay meaningful
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl StoredRecord for MedicationRecord {
    const TABLE: &'static str = "medications";
    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "name", "dosage", "frequency", "is_active", "created_at"];
    const TIMESTAMP_COLUMN: &'static str = "created_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.user_id.to_string()),
            Value::Text(self.name.clone()),
            Value::Text(self.dosage.clone()),
            Value::Text(self.frequency.clone()),
            Value::Integer(i64::from(self.is_active)),
            Value::Text(format_timestamp(&self.created_at)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: read_uuid(row, 0)?,
            user_id: read_uuid(row, 1)?,
            name: row.get(2)?,
            dosage: row.get(3)?,
            frequency: row.get(4)?,
            is_active: row.get(5)?,
            created_at: read_timestamp(row, 6)?,
        })
    }
}

/// Storage model for a single dose log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medication_id: Uuid,

    /// Whether the scheduled dose was taken
    pub taken: bool,

    pub notes: Option<String>,
    pub taken_at: DateTime<Utc>,
}

impl StoredRecord for MedicationLogRecord {
    const TABLE: &'static str = "medication_logs";
    const COLUMNS: &'static [&'static str] =
        &["id", "user_id", "medication_id", "taken", "notes", "taken_at"];
    const TIMESTAMP_COLUMN: &'static str = "taken_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.taken_at
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.user_id.to_string()),
            Value::Text(self.medication_id.to_string()),
            Value::Integer(i64::from(self.taken)),
            optional_text(&self.notes),
            Value::Text(format_timestamp(&self.taken_at)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: read_uuid(row, 0)?,
            user_id: read_uuid(row, 1)?,
            medication_id: read_uuid(row, 2)?,
            taken: row.get(3)?,
            notes: row.get(4)?,
            taken_at: read_timestamp(row, 5)?,
        })
    }
}
