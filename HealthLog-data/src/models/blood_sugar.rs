use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_timestamp, optional_text, read_timestamp, read_uuid, StoredRecord};

/// Storage model for a blood sugar reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodSugarRecord {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Glucose level in mg/dL
    pub glucose: u16,

    /// Meal context label, one of the seven `meal_type` values
    pub meal_type: String,

    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoredRecord for BloodSugarRecord {
    const TABLE: &'static str = "blood_sugar_readings";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "glucose",
        "meal_type",
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
            Value::Integer(i64::from(self.glucose)),
            Value::Text(self.meal_type.clone()),
            optional_text(&self.notes),
            Value::Text(format_timestamp(&self.recorded_at)),
            Value::Text(format_timestamp(&self.created_at)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: read_uuid(row, 0)?,
            user_id: read_uuid(row, 1)?,
            glucose: row.get(2)?,
            meal_type: row.get(3)?,
            notes: row.get(4)?,
            recorded_at: read_timestamp(row, 5)?,
            created_at: read_timestamp(row, 6)?,
        })
    }
}
