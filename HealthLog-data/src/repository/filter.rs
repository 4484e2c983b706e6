//! Composable record filters
//!
//! A [`RecordFilter`] is rendered to a parameterised `WHERE` clause by the
//! SQLite backend and evaluated directly by the in-memory backend, so both
//! backends return the same rows for the same filter.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::Value;
use uuid::Uuid;

use crate::models::{format_timestamp, StoredRecord};

/// Ordering of listed records by their timestamp column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first
    Ascending,
    /// Newest first
    #[default]
    Descending,
}

/// Filter for listing the records of a single user
#[derive(Debug, Clone)]
pub struct RecordFilter {
    pub user_id: Uuid,
    /// Inclusive lower bound on the timestamp column
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the timestamp column
    pub until: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the timestamp column
    pub before: Option<DateTime<Utc>>,
    /// Column equality conditions
    pub conditions: Vec<(&'static str, Value)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub order: SortOrder,
}

impl RecordFilter {
    /// Match every record of `user_id`, newest first
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            since: None,
            until: None,
            before: None,
            conditions: Vec::new(),
            limit: None,
            offset: None,
            order: SortOrder::default(),
        }
    }

    pub fn since(mut self, at: DateTime<Utc>) -> Self {
        self.since = Some(at.trunc_subsecs(3));
        self
    }

    pub fn until(mut self, at: DateTime<Utc>) -> Self {
        self.until = Some(at.trunc_subsecs(3));
        self
    }

    pub fn before(mut self, at: DateTime<Utc>) -> Self {
        self.before = Some(at.trunc_subsecs(3));
        self
    }

    /// Require `column` to equal `value` as stored
    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push((column, value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Reject conditions on columns the record type does not have
    pub(crate) fn check_columns<T: StoredRecord>(&self) -> Result<(), String> {
        match self
            .conditions
            .iter()
            .find(|(column, _)| !T::COLUMNS.contains(column))
        {
            Some((column, _)) => Err(format!("{} has no column {}", T::TABLE, column)),
            None => Ok(()),
        }
    }

    /// Render the `WHERE` clause and its bound parameters
    pub(crate) fn where_clause<T: StoredRecord>(&self) -> (String, Vec<Value>) {
        let ts = T::TIMESTAMP_COLUMN;
        let mut clauses = vec!["user_id = ?".to_string()];
        let mut params = vec![Value::Text(self.user_id.to_string())];

        if let Some(since) = &self.since {
            clauses.push(format!("{} >= ?", ts));
            params.push(Value::Text(format_timestamp(since)));
        }
        if let Some(until) = &self.until {
            clauses.push(format!("{} <= ?", ts));
            params.push(Value::Text(format_timestamp(until)));
        }
        if let Some(before) = &self.before {
            clauses.push(format!("{} < ?", ts));
            params.push(Value::Text(format_timestamp(before)));
        }
        for (column, value) in &self.conditions {
            clauses.push(format!("{} = ?", column));
            params.push(value.clone());
        }

        (clauses.join(" AND "), params)
    }

    /// `ORDER BY` and `LIMIT` suffix of a listing query
    pub(crate) fn order_and_page<T: StoredRecord>(&self) -> String {
        let direction = match self.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let limit = self.limit.map_or(-1, |l| l as i64);
        let offset = self.offset.unwrap_or(0);

        format!(
            "ORDER BY {ts} {dir}, id {dir} LIMIT {limit} OFFSET {offset}",
            ts = T::TIMESTAMP_COLUMN,
            dir = direction,
            limit = limit,
            offset = offset,
        )
    }

    /// Evaluate the filter against a record in memory
    pub fn matches<T: StoredRecord>(&self, record: &T) -> bool {
        if record.user_id() != self.user_id {
            return false;
        }

        let at = record.timestamp();
        if self.since.is_some_and(|since| at < since) {
            return false;
        }
        if self.until.is_some_and(|until| at > until) {
            return false;
        }
        if self.before.is_some_and(|before| at >= before) {
            return false;
        }

        self.conditions
            .iter()
            .all(|(column, value)| record.column_value(column).as_ref() == Some(value))
    }
}
