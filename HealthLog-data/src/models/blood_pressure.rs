use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_timestamp, optional_integer, optional_text, read_timestamp, read_uuid, StoredRecord};

/// Storage model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureRecord {
    /// Unique identifier for the reading
    pub id: Uuid,

    /// Owner of the reading
    pub user_id: Uuid,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    pub pulse: Option<u16>,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was taken
    pub recorded_at: DateTime<Utc>,

    /// When the reading was stored
    pub created_at: DateTime<Utc>,
}

impl StoredRecord for BloodPressureRecord {
    const TABLE: &'static str = "blood_pressure_readings";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "systolic",
        "diastolic",
        "pulse",
        "notes",
        "recorded_at",
        "created_at",
    ];
    const TIMESTAMP_COLUMN: &'static str = "recorded_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.user_id.to_string()),
            Value::Integer(i64::from(self.systolic)),
            Value::Integer(i64::from(self.diastolic)),
            optional_integer(self.pulse.map(i64::from)),
            optional_text(&self.notes),
            Value::Text(format_timestamp(&self.recorded_at)),
            Value::Text(format_timestamp(&self.created_at)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: read_uuid(row, 0)?,
            user_id: read_uuid(row, 1)?,
            systolic: row.get(2)?,
            diastolic: row.get(3)?,
            pulse: row.get(4)?,
            notes: row.get(5)?,
            recorded_at: read_timestamp(row, 6)?,
            created_at: read_timestamp(row, 7)?,
        })
    }
}
