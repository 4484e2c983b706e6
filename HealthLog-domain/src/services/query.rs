use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::{IntoParams, ToSchema};

use health_log_data::repository::RecordFilter;

use super::errors::ServiceError;

/// Date window and paging of a listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
pub struct ListQuery {
    /// Only readings at or after this time
    pub start: Option<DateTime<Utc>>,
    /// Only readings at or before this time
    pub end: Option<DateTime<Utc>>,
    /// Page size, 50 when omitted
    pub limit: Option<usize>,
    /// Number of readings to skip
    pub offset: Option<usize>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: usize = 50;
    pub const MAX_LIMIT: usize = 1000;

    pub fn effective_limit(&self, default: usize) -> usize {
        self.limit.unwrap_or(default)
    }

    /// Newest-first filter of the user's records inside the window
    pub fn to_filter(&self, user_id: Uuid, default_limit: usize) -> Result<RecordFilter, ServiceError> {
        let limit = self.effective_limit(default_limit);
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(ServiceError::Validation(format!(
                "limit: Limit must be between 1 and {}",
                Self::MAX_LIMIT
            )));
        }

        let mut filter = RecordFilter::for_user(user_id)
            .limit(limit)
            .offset(self.offset.unwrap_or(0));

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ServiceError::Validation(
                    "start: Start must not be after end".to_string(),
                ));
            }
        }
        if let Some(start) = self.start {
            filter = filter.since(start);
        }
        if let Some(end) = self.end {
            filter = filter.until(end);
        }

        Ok(filter)
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[cfg_attr(feature = "with-api", aliases(
    BloodPressurePage = Page<crate::entities::BloodPressureReading>,
    BloodSugarPage = Page<crate::entities::BloodSugarReading>,
    WeightPage = Page<crate::entities::WeightReading>,
    MedicationLogPage = Page<crate::entities::MedicationLogDetail>
))]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of matching records across all pages
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_and_maximum_limit() {
        let user = Uuid::new_v4();
        let filter = ListQuery::default().to_filter(user, ListQuery::DEFAULT_LIMIT).unwrap();
        assert_eq!(filter.limit, Some(50));
        assert_eq!(filter.offset, Some(0));

        let too_many = ListQuery { limit: Some(1001), ..Default::default() };
        assert!(matches!(
            too_many.to_filter(user, ListQuery::DEFAULT_LIMIT),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let query = ListQuery {
            start: Some(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(query.to_filter(Uuid::new_v4(), 50).is_err());
    }
}
