//! Storage models, one per table
//!
//! Timestamps are stored as fixed-width RFC 3339 text in UTC with millisecond
//! precision, so string comparison in SQL orders them chronologically.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use uuid::Uuid;

pub mod blood_pressure;
pub mod blood_sugar;
pub mod medication;
pub mod user;
pub mod weight;

pub use blood_pressure::BloodPressureRecord;
pub use blood_sugar::BloodSugarRecord;
pub use medication::{MedicationLogRecord, MedicationRecord};
pub use user::UserRecord;
pub use weight::WeightRecord;

/// A user-owned row that the generic repositories can persist
pub trait StoredRecord: Clone + Send + Sync + 'static {
    /// Table holding the records
    const TABLE: &'static str;

    /// Every column of the table, starting with `id` and `user_id`
    const COLUMNS: &'static [&'static str];

    /// Column used for range filters and ordering
    const TIMESTAMP_COLUMN: &'static str;

    fn id(&self) -> Uuid;

    fn user_id(&self) -> Uuid;

    /// Value of `TIMESTAMP_COLUMN`
    fn timestamp(&self) -> DateTime<Utc>;

    /// Column values in `COLUMNS` order
    fn to_values(&self) -> Vec<Value>;

    /// Build a record from a row selected with `COLUMNS`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Value of a single column, as it would be stored
    fn column_value(&self, column: &str) -> Option<Value> {
        Self::COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|index| self.to_values().swap_remove(index))
    }
}

/// Format a timestamp the way it is stored
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn read_uuid(row: &Row<'_>, index: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(index)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(crate) fn read_timestamp(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(crate) fn optional_text(value: &Option<String>) -> Value {
    value.as_ref().map_or(Value::Null, |text| Value::Text(text.clone()))
}

pub(crate) fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}
