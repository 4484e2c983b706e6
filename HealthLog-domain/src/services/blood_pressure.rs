use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use health_log_data::models::BloodPressureRecord;
use health_log_data::repository::RecordRepository;

use crate::entities::blood_pressure::{
    validate_pair, BloodPressureCategory, BloodPressureReading, CreateBloodPressureRequest,
    UpdateBloodPressureRequest,
};
use crate::entities::conversions::{self, storage_precision};
use crate::services::errors::{format_validation_errors, map_repo_error, validate_request, ServiceError};
use crate::services::insights::categorize_blood_pressure;
use crate::services::query::{ListQuery, Page};

/// Trait for blood pressure service operations
#[async_trait]
pub trait BloodPressureServiceTrait: Send + Sync {
    /// Create a new blood pressure reading
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ServiceError>;

    /// Get a blood pressure reading by ID
    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<BloodPressureReading, ServiceError>;

    /// List readings, newest first
    async fn list_readings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<BloodPressureReading>, ServiceError>;

    /// Apply the present fields of `request` to a stored reading
    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ServiceError>;

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;

    /// Get severity category for a blood pressure reading
    fn get_severity(&self, reading: &BloodPressureReading) -> BloodPressureCategory {
        categorize_blood_pressure(reading.systolic, reading.diastolic)
    }
}

/// Blood pressure service for domain logic
#[derive(Clone)]
pub struct BloodPressureService {
    repository: Arc<dyn RecordRepository<BloodPressureRecord>>,
}

impl BloodPressureService {
    /// Create a new blood pressure service
    pub fn new(repository: Arc<dyn RecordRepository<BloodPressureRecord>>) -> Self {
        Self { repository }
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> Result<BloodPressureRecord, ServiceError> {
        self.repository
            .get(user_id, id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Blood pressure reading with ID {} not found", id)))
    }
}

#[async_trait]
impl BloodPressureServiceTrait for BloodPressureService {
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ServiceError> {
        validate_request(&request)?;

        let record = conversions::convert_to_data_blood_pressure(request, user_id, Utc::now());
        let stored = self.repository.insert(&record).await.map_err(map_repo_error)?;

        info!(
            "Created blood pressure reading {} for user {}",
            stored.id, user_id
        );
        Ok(conversions::convert_to_domain_blood_pressure(stored))
    }

    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<BloodPressureReading, ServiceError> {
        let record = self.find(user_id, id).await?;
        Ok(conversions::convert_to_domain_blood_pressure(record))
    }

    async fn list_readings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<BloodPressureReading>, ServiceError> {
        let filter = query.to_filter(user_id, ListQuery::DEFAULT_LIMIT)?;
        let (records, total) = self.repository.list(&filter).await.map_err(map_repo_error)?;
        debug!("Listed {} of {} blood pressure readings", records.len(), total);

        Ok(Page {
            items: records
                .into_iter()
                .map(conversions::convert_to_domain_blood_pressure)
                .collect(),
            total,
            limit: filter.limit.unwrap_or(ListQuery::DEFAULT_LIMIT),
            offset: filter.offset.unwrap_or(0),
        })
    }

    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateBloodPressureRequest,
    ) -> Result<BloodPressureReading, ServiceError> {
        validate_request(&request)?;

        let mut record = self.find(user_id, id).await?;
        if let Some(systolic) = request.systolic {
            record.systolic = systolic;
        }
        if let Some(diastolic) = request.diastolic {
            record.diastolic = diastolic;
        }
        if let Some(pulse) = request.pulse {
            record.pulse = Some(pulse);
        }
        if let Some(notes) = request.notes {
            record.notes = Some(notes);
        }
        if let Some(recorded_at) = request.recorded_at {
            record.recorded_at = storage_precision(recorded_at);
        }

        // The pair is re-checked against the merged reading
        if let Err(error) = validate_pair(record.systolic, record.diastolic) {
            let mut errors = validator::ValidationErrors::new();
            errors.add("__all__", error);
            return Err(ServiceError::Validation(format_validation_errors(&errors)));
        }

        if !self.repository.update(&record).await.map_err(map_repo_error)? {
            return Err(ServiceError::NotFound(format!(
                "Blood pressure reading with ID {} not found",
                id
            )));
        }

        info!("Updated blood pressure reading {} for user {}", id, user_id);
        Ok(conversions::convert_to_domain_blood_pressure(record))
    }

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.repository.delete(user_id, id).await.map_err(map_repo_error)? {
            return Err(ServiceError::NotFound(format!(
                "Blood pressure reading with ID {} not found",
                id
            )));
        }

        info!("Deleted blood pressure reading {} for user {}", id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use health_log_data::repository::InMemoryRecordRepository;

    fn service() -> BloodPressureService {
        BloodPressureService::new(Arc::new(InMemoryRecordRepository::new()))
    }

    fn request(systolic: u16, diastolic: u16) -> CreateBloodPressureRequest {
        CreateBloodPressureRequest {
            systolic,
            diastolic,
            pulse: Some(72),
            notes: None,
            recorded_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_reading() {
        let service = service();
        let user = Uuid::new_v4();

        let created = service.create_reading(user, request(120, 80)).await.unwrap();
        assert_eq!(created.systolic, 120);

        let fetched = service.get_reading(user, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_reading() {
        let service = service();
        let user = Uuid::new_v4();

        let result = service.create_reading(user, request(350, 80)).await;
        assert!(matches!(result, Err(ServiceError::Validation(ref msg)) if msg.contains("Systolic")));

        let result = service.create_reading(user, request(80, 80)).await;
        assert!(matches!(result, Err(ServiceError::Validation(ref msg)) if msg.contains("greater than")));
    }

    #[tokio::test]
    async fn test_other_users_reading_is_not_found() {
        let service = service();
        let created = service.create_reading(Uuid::new_v4(), request(120, 80)).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(matches!(
            service.get_reading(stranger, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_reading(stranger, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_checks_merged_pair() {
        let service = service();
        let user = Uuid::new_v4();
        let created = service.create_reading(user, request(120, 80)).await.unwrap();

        let lower_systolic = UpdateBloodPressureRequest {
            systolic: Some(75),
            ..Default::default()
        };
        assert!(matches!(
            service.update_reading(user, created.id, lower_systolic).await,
            Err(ServiceError::Validation(_))
        ));

        let notes = UpdateBloodPressureRequest {
            diastolic: Some(78),
            notes: Some("after coffee".to_string()),
            ..Default::default()
        };
        let updated = service.update_reading(user, created.id, notes).await.unwrap();
        assert_eq!(updated.diastolic, 78);
        assert_eq!(updated.systolic, 120);
        assert_eq!(updated.notes.as_deref(), Some("after coffee"));
    }

    #[tokio::test]
    async fn test_list_window_and_paging() {
        let service = service();
        let user = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        for day in 0..5 {
            let req = CreateBloodPressureRequest {
                recorded_at: Some(base + Duration::days(day)),
                ..request(120 + day as u16, 80)
            };
            service.create_reading(user, req).await.unwrap();
        }

        let query = ListQuery {
            start: Some(base + Duration::days(1)),
            limit: Some(2),
            ..Default::default()
        };
        let page = service.list_readings(user, &query).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.limit, 2);
        let systolic: Vec<u16> = page.items.iter().map(|r| r.systolic).collect();
        assert_eq!(systolic, vec![124, 123]);
    }

    #[test]
    fn test_get_severity() {
        let service = service();
        let reading = BloodPressureReading {
            id: Uuid::new_v4(),
            systolic: 185,
            diastolic: 95,
            pulse: None,
            notes: None,
            recorded_at: Utc::now(),
            created_at: Utc::now(),
        };
        assert_eq!(service.get_severity(&reading), BloodPressureCategory::HypertensiveCrisis);
    }
}
