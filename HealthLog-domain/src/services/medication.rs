use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::IntoParams;

use health_log_data::models::{MedicationLogRecord, MedicationRecord};
use health_log_data::repository::{RecordFilter, RecordRepository};

use crate::entities::conversions::{self, storage_precision};
use crate::entities::medication::{
    CreateMedicationLogRequest, CreateMedicationRequest, Medication, MedicationLog,
    MedicationLogDetail, UpdateMedicationLogRequest, UpdateMedicationRequest,
};
use crate::services::errors::{map_repo_error, validate_request, ServiceError};
use crate::services::query::{ListQuery, Page};

/// Filters of a dose log listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
pub struct LogQuery {
    /// Only logs of this medication
    pub medication_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Only taken (or skipped) doses
    pub taken: Option<bool>,
    /// Page size, 100 when omitted
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl LogQuery {
    pub const DEFAULT_LIMIT: usize = 100;
}

#[async_trait]
pub trait MedicationServiceTrait: Send + Sync {
    async fn create_medication(
        &self,
        user_id: Uuid,
        request: CreateMedicationRequest,
    ) -> Result<Medication, ServiceError>;

    async fn get_medication(&self, user_id: Uuid, id: Uuid) -> Result<Medication, ServiceError>;

    /// The user's medications, optionally only active or inactive ones
    async fn list_medications(
        &self,
        user_id: Uuid,
        active: Option<bool>,
    ) -> Result<Vec<Medication>, ServiceError>;

    async fn update_medication(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateMedicationRequest,
    ) -> Result<Medication, ServiceError>;

    /// Soft delete: the medication and its logs are kept
    async fn deactivate_medication(&self, user_id: Uuid, id: Uuid) -> Result<Medication, ServiceError>;

    async fn create_log(
        &self,
        user_id: Uuid,
        request: CreateMedicationLogRequest,
    ) -> Result<MedicationLog, ServiceError>;

    async fn get_log(&self, user_id: Uuid, id: Uuid) -> Result<MedicationLogDetail, ServiceError>;

    async fn list_logs(
        &self,
        user_id: Uuid,
        query: &LogQuery,
    ) -> Result<Page<MedicationLogDetail>, ServiceError>;

    /// Logs taken on the UTC calendar day of `now`, newest first
    async fn today_logs(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<MedicationLogDetail>, ServiceError>;

    async fn update_log(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateMedicationLogRequest,
    ) -> Result<MedicationLog, ServiceError>;

    async fn delete_log(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct MedicationService {
    medications: Arc<dyn RecordRepository<MedicationRecord>>,
    logs: Arc<dyn RecordRepository<MedicationLogRecord>>,
}

fn medication_not_found() -> ServiceError {
    ServiceError::NotFound("Medication not found".to_string())
}

fn log_not_found() -> ServiceError {
    ServiceError::NotFound("Medication log not found".to_string())
}

/// Midnight starting the UTC day of `now` and the midnight after it
pub(crate) fn day_window(now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let today = now.date_naive();
    let start = today.and_time(chrono::NaiveTime::MIN).and_utc();
    let end = today
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(chrono::NaiveTime::MIN).and_utc())
        .ok_or_else(|| ServiceError::Validation(format!("Date out of range: {}", today)))?;
    Ok((start, end))
}

impl MedicationService {
    pub fn new(
        medications: Arc<dyn RecordRepository<MedicationRecord>>,
        logs: Arc<dyn RecordRepository<MedicationLogRecord>>,
    ) -> Self {
        Self { medications, logs }
    }

    async fn find_medication(&self, user_id: Uuid, id: Uuid) -> Result<MedicationRecord, ServiceError> {
        self.medications
            .get(user_id, id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(medication_not_found)
    }

    async fn find_log(&self, user_id: Uuid, id: Uuid) -> Result<MedicationLogRecord, ServiceError> {
        self.logs
            .get(user_id, id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(log_not_found)
    }

    /// Every medication of the user, keyed by id
    async fn medication_index(&self, user_id: Uuid) -> Result<HashMap<Uuid, MedicationRecord>, ServiceError> {
        let (records, _) = self
            .medications
            .list(&RecordFilter::for_user(user_id))
            .await
            .map_err(map_repo_error)?;
        Ok(records.into_iter().map(|record| (record.id, record)).collect())
    }

    /// Logs matching `filter` joined with their medications
    pub(crate) async fn detailed_logs(
        &self,
        filter: &RecordFilter,
    ) -> Result<(Vec<MedicationLogDetail>, usize), ServiceError> {
        let (records, total) = self.logs.list(filter).await.map_err(map_repo_error)?;
        let index = self.medication_index(filter.user_id).await?;

        let details = records
            .into_iter()
            .map(|record| {
                let medication = index.get(&record.medication_id);
                conversions::convert_to_domain_log_detail(record, medication)
            })
            .collect();
        Ok((details, total))
    }
}

#[async_trait]
impl MedicationServiceTrait for MedicationService {
    async fn create_medication(
        &self,
        user_id: Uuid,
        request: CreateMedicationRequest,
    ) -> Result<Medication, ServiceError> {
        validate_request(&request)?;

        let record = conversions::convert_to_data_medication(request, user_id, Utc::now());
        let stored = self.medications.insert(&record).await.map_err(map_repo_error)?;

        info!("Created medication {} for user {}", stored.id, user_id);
        Ok(conversions::convert_to_domain_medication(stored))
    }

    async fn get_medication(&self, user_id: Uuid, id: Uuid) -> Result<Medication, ServiceError> {
        Ok(conversions::convert_to_domain_medication(
            self.find_medication(user_id, id).await?,
        ))
    }

    async fn list_medications(
        &self,
        user_id: Uuid,
        active: Option<bool>,
    ) -> Result<Vec<Medication>, ServiceError> {
        let mut filter = RecordFilter::for_user(user_id);
        if let Some(active) = active {
            filter = filter.eq("is_active", active);
        }

        let (records, total) = self.medications.list(&filter).await.map_err(map_repo_error)?;
        debug!("Listed {} medications for user {}", total, user_id);
        Ok(records
            .into_iter()
            .map(conversions::convert_to_domain_medication)
            .collect())
    }

    async fn update_medication(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateMedicationRequest,
    ) -> Result<Medication, ServiceError> {
        validate_request(&request)?;

        let mut record = self.find_medication(user_id, id).await?;
        if let Some(name) = request.name {
            record.name = name.trim().to_string();
        }
        if let Some(dosage) = request.dosage {
            record.dosage = dosage.trim().to_string();
        }
        if let Some(frequency) = request.frequency {
            record.frequency = frequency.trim().to_string();
        }
        if let Some(is_active) = request.is_active {
            record.is_active = is_active;
        }

        if !self.medications.update(&record).await.map_err(map_repo_error)? {
            return Err(medication_not_found());
        }

        info!("Updated medication {} for user {}", id, user_id);
        Ok(conversions::convert_to_domain_medication(record))
    }

    async fn deactivate_medication(&self, user_id: Uuid, id: Uuid) -> Result<Medication, ServiceError> {
        let mut record = self.find_medication(user_id, id).await?;
        record.is_active = false;

        if !self.medications.update(&record).await.map_err(map_repo_error)? {
            return Err(medication_not_found());
        }

        info!("Deactivated medication {} for user {}", id, user_id);
        Ok(conversions::convert_to_domain_medication(record))
    }

    async fn create_log(
        &self,
        user_id: Uuid,
        request: CreateMedicationLogRequest,
    ) -> Result<MedicationLog, ServiceError> {
        validate_request(&request)?;

        if self
            .medications
            .get(user_id, request.medication_id)
            .await
            .map_err(map_repo_error)?
            .is_none()
        {
            warn!(
                "User {} tried to log unknown medication {}",
                user_id, request.medication_id
            );
            return Err(medication_not_found());
        }

        let record = conversions::convert_to_data_medication_log(request, user_id, Utc::now());
        let stored = self.logs.insert(&record).await.map_err(map_repo_error)?;

        info!(
            "Logged dose {} of medication {} for user {}",
            stored.id, stored.medication_id, user_id
        );
        Ok(conversions::convert_to_domain_medication_log(stored))
    }

    async fn get_log(&self, user_id: Uuid, id: Uuid) -> Result<MedicationLogDetail, ServiceError> {
        let record = self.find_log(user_id, id).await?;
        let medication = self
            .medications
            .get(user_id, record.medication_id)
            .await
            .map_err(map_repo_error)?;
        Ok(conversions::convert_to_domain_log_detail(record, medication.as_ref()))
    }

    async fn list_logs(
        &self,
        user_id: Uuid,
        query: &LogQuery,
    ) -> Result<Page<MedicationLogDetail>, ServiceError> {
        let window = ListQuery {
            start: query.start,
            end: query.end,
            limit: query.limit,
            offset: query.offset,
        };
        let mut filter = window.to_filter(user_id, LogQuery::DEFAULT_LIMIT)?;
        if let Some(medication_id) = query.medication_id {
            filter = filter.eq("medication_id", medication_id.to_string());
        }
        if let Some(taken) = query.taken {
            filter = filter.eq("taken", taken);
        }

        let (items, total) = self.detailed_logs(&filter).await?;
        debug!("Listed {} of {} medication logs", items.len(), total);

        Ok(Page {
            items,
            total,
            limit: filter.limit.unwrap_or(LogQuery::DEFAULT_LIMIT),
            offset: filter.offset.unwrap_or(0),
        })
    }

    async fn today_logs(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<MedicationLogDetail>, ServiceError> {
        let (start, end) = day_window(now)?;
        let filter = RecordFilter::for_user(user_id).since(start).before(end);
        let (items, _) = self.detailed_logs(&filter).await?;
        Ok(items)
    }

    async fn update_log(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateMedicationLogRequest,
    ) -> Result<MedicationLog, ServiceError> {
        validate_request(&request)?;

        let mut record = self.find_log(user_id, id).await?;
        if let Some(taken) = request.taken {
            record.taken = taken;
        }
        if let Some(notes) = request.notes {
            record.notes = Some(notes);
        }
        if let Some(taken_at) = request.taken_at {
            record.taken_at = storage_precision(taken_at);
        }

        if !self.logs.update(&record).await.map_err(map_repo_error)? {
            return Err(log_not_found());
        }

        info!("Updated medication log {} for user {}", id, user_id);
        Ok(conversions::convert_to_domain_medication_log(record))
    }

    async fn delete_log(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.logs.delete(user_id, id).await.map_err(map_repo_error)? {
            return Err(log_not_found());
        }

        info!("Deleted medication log {} for user {}", id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use health_log_data::repository::InMemoryRecordRepository;

    fn service() -> MedicationService {
        MedicationService::new(
            Arc::new(InMemoryRecordRepository::new()),
            Arc::new(InMemoryRecordRepository::new()),
        )
    }

    fn lisinopril() -> CreateMedicationRequest {
        CreateMedicationRequest {
            name: "  Lisinopril ".to_string(),
            dosage: "10mg".to_string(),
            frequency: "Once daily".to_string(),
        }
    }

    fn log_at(medication_id: Uuid, taken: bool, taken_at: DateTime<Utc>) -> CreateMedicationLogRequest {
        CreateMedicationLogRequest {
            medication_id,
            taken,
            notes: None,
            taken_at: Some(taken_at),
        }
    }

    #[tokio::test]
    async fn test_create_trims_and_deactivate_keeps_record() {
        let service = service();
        let user = Uuid::new_v4();

        let medication = service.create_medication(user, lisinopril()).await.unwrap();
        assert_eq!(medication.name, "Lisinopril");
        assert!(medication.is_active);

        let deactivated = service.deactivate_medication(user, medication.id).await.unwrap();
        assert!(!deactivated.is_active);

        let active = service.list_medications(user, Some(true)).await.unwrap();
        assert!(active.is_empty());
        let inactive = service.list_medications(user, Some(false)).await.unwrap();
        assert_eq!(inactive.len(), 1);
        let all = service.list_medications(user, None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_log_requires_own_medication() {
        let service = service();
        let owner = Uuid::new_v4();
        let medication = service.create_medication(owner, lisinopril()).await.unwrap();

        let stranger = Uuid::new_v4();
        let result = service
            .create_log(stranger, log_at(medication.id, true, Utc::now()))
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(ref msg)) if msg == "Medication not found"));

        let log = service
            .create_log(owner, log_at(medication.id, true, Utc::now()))
            .await
            .unwrap();
        let detail = service.get_log(owner, log.id).await.unwrap();
        assert_eq!(detail.medication_name.as_deref(), Some("Lisinopril"));
        assert_eq!(detail.dosage.as_deref(), Some("10mg"));
    }

    #[tokio::test]
    async fn test_today_logs_cover_the_utc_day() {
        let service = service();
        let user = Uuid::new_v4();
        let medication = service.create_medication(user, lisinopril()).await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();

        for at in [
            midnight - Duration::milliseconds(1),
            midnight,
            midnight + Duration::hours(8),
            midnight + Duration::days(1),
        ] {
            service.create_log(user, log_at(medication.id, true, at)).await.unwrap();
        }

        let today = service.today_logs(user, now).await.unwrap();
        let times: Vec<DateTime<Utc>> = today.iter().map(|log| log.taken_at).collect();
        assert_eq!(times, vec![midnight + Duration::hours(8), midnight]);
    }

    #[tokio::test]
    async fn test_list_logs_filters() {
        let service = service();
        let user = Uuid::new_v4();
        let first = service.create_medication(user, lisinopril()).await.unwrap();
        let second = service
            .create_medication(
                user,
                CreateMedicationRequest {
                    name: "Metformin".to_string(),
                    dosage: "500mg".to_string(),
                    frequency: "Twice daily".to_string(),
                },
            )
            .await
            .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();

        service.create_log(user, log_at(first.id, true, at)).await.unwrap();
        service.create_log(user, log_at(first.id, false, at + Duration::hours(1))).await.unwrap();
        service.create_log(user, log_at(second.id, true, at + Duration::hours(2))).await.unwrap();

        let default_page = service.list_logs(user, &LogQuery::default()).await.unwrap();
        assert_eq!(default_page.total, 3);
        assert_eq!(default_page.limit, 100);

        let query = LogQuery {
            medication_id: Some(first.id),
            taken: Some(true),
            ..Default::default()
        };
        let page = service.list_logs(user, &query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].taken_at, at);
        assert_eq!(page.items[0].frequency.as_deref(), Some("Once daily"));
    }

    #[tokio::test]
    async fn test_update_and_delete_log() {
        let service = service();
        let user = Uuid::new_v4();
        let medication = service.create_medication(user, lisinopril()).await.unwrap();
        let log = service
            .create_log(user, log_at(medication.id, true, Utc::now()))
            .await
            .unwrap();

        let update = UpdateMedicationLogRequest {
            taken: Some(false),
            notes: Some("forgot".to_string()),
            ..Default::default()
        };
        let updated = service.update_log(user, log.id, update).await.unwrap();
        assert!(!updated.taken);

        service.delete_log(user, log.id).await.unwrap();
        assert!(matches!(
            service.delete_log(user, log.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_day_window() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let (start, end) = day_window(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
