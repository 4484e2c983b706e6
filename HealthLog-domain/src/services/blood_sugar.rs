use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use health_log_data::models::BloodSugarRecord;
use health_log_data::repository::RecordRepository;

use crate::entities::blood_sugar::{
    BloodSugarReading, CreateBloodSugarRequest, MealType, UpdateBloodSugarRequest,
};
use crate::entities::conversions::{self, storage_precision};
use crate::services::errors::{map_repo_error, validate_request, ServiceError};
use crate::services::query::{ListQuery, Page};

#[async_trait]
pub trait BloodSugarServiceTrait: Send + Sync {
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateBloodSugarRequest,
    ) -> Result<BloodSugarReading, ServiceError>;

    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<BloodSugarReading, ServiceError>;

    /// List readings, newest first, optionally of a single meal type
    async fn list_readings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
        meal_type: Option<MealType>,
    ) -> Result<Page<BloodSugarReading>, ServiceError>;

    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateBloodSugarRequest,
    ) -> Result<BloodSugarReading, ServiceError>;

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct BloodSugarService {
    repository: Arc<dyn RecordRepository<BloodSugarRecord>>,
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Blood sugar reading with ID {} not found", id))
}

/// Stored rows carry the meal type as text
pub(crate) fn to_domain(record: BloodSugarRecord) -> Result<BloodSugarReading, ServiceError> {
    let id = record.id;
    conversions::convert_to_domain_blood_sugar(record).map_err(|msg| {
        error!("Stored blood sugar reading {} is unreadable: {}", id, msg);
        ServiceError::Repository(msg)
    })
}

impl BloodSugarService {
    pub fn new(repository: Arc<dyn RecordRepository<BloodSugarRecord>>) -> Self {
        Self { repository }
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> Result<BloodSugarRecord, ServiceError> {
        self.repository
            .get(user_id, id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl BloodSugarServiceTrait for BloodSugarService {
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateBloodSugarRequest,
    ) -> Result<BloodSugarReading, ServiceError> {
        validate_request(&request)?;

        let record = conversions::convert_to_data_blood_sugar(request, user_id, Utc::now());
        let stored = self.repository.insert(&record).await.map_err(map_repo_error)?;

        info!("Created blood sugar reading {} for user {}", stored.id, user_id);
        to_domain(stored)
    }

    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<BloodSugarReading, ServiceError> {
        to_domain(self.find(user_id, id).await?)
    }

    async fn list_readings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
        meal_type: Option<MealType>,
    ) -> Result<Page<BloodSugarReading>, ServiceError> {
        let mut filter = query.to_filter(user_id, ListQuery::DEFAULT_LIMIT)?;
        if let Some(meal_type) = meal_type {
            filter = filter.eq("meal_type", meal_type.as_str().to_string());
        }

        let (records, total) = self.repository.list(&filter).await.map_err(map_repo_error)?;
        debug!("Listed {} of {} blood sugar readings", records.len(), total);

        Ok(Page {
            items: records
                .into_iter()
                .map(to_domain)
                .collect::<Result<Vec<_>, _>>()?,
            total,
            limit: filter.limit.unwrap_or(ListQuery::DEFAULT_LIMIT),
            offset: filter.offset.unwrap_or(0),
        })
    }

    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateBloodSugarRequest,
    ) -> Result<BloodSugarReading, ServiceError> {
        validate_request(&request)?;

        let mut record = self.find(user_id, id).await?;
        if let Some(glucose) = request.glucose {
            record.glucose = glucose;
        }
        if let Some(meal_type) = request.meal_type {
            record.meal_type = meal_type.as_str().to_string();
        }
        if let Some(notes) = request.notes {
            record.notes = Some(notes);
        }
        if let Some(recorded_at) = request.recorded_at {
            record.recorded_at = storage_precision(recorded_at);
        }

        if !self.repository.update(&record).await.map_err(map_repo_error)? {
            return Err(not_found(id));
        }

        info!("Updated blood sugar reading {} for user {}", id, user_id);
        to_domain(record)
    }

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.repository.delete(user_id, id).await.map_err(map_repo_error)? {
            return Err(not_found(id));
        }

        info!("Deleted blood sugar reading {} for user {}", id, user_id);
        Ok(())
    }
}
