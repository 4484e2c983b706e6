use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use health_log_data::models::WeightRecord;
use health_log_data::repository::RecordRepository;

use crate::entities::conversions::{self, storage_precision};
use crate::entities::weight::{CreateWeightRequest, UpdateWeightRequest, WeightReading};
use crate::services::errors::{map_repo_error, validate_request, ServiceError};
use crate::services::query::{ListQuery, Page};

#[async_trait]
pub trait WeightServiceTrait: Send + Sync {
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateWeightRequest,
    ) -> Result<WeightReading, ServiceError>;

    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<WeightReading, ServiceError>;

    async fn list_readings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<WeightReading>, ServiceError>;

    async fn update_reading(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateWeightRequest,
    ) -> Result<WeightReading, ServiceError>;

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct WeightService {
    repository: Arc<dyn RecordRepository<WeightRecord>>,
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Weight reading with ID {} not found", id))
}

fn check_finite(weight: f64) -> Result<(), ServiceError> {
    if weight.is_finite() {
        Ok(())
    } else {
        Err(ServiceError::Validation(
            "weight: Weight must be between 10 and 1000 kg".to_string(),
        ))
    }
}

impl WeightService {
    pub fn new(repository: Arc<dyn RecordRepository<WeightRecord>>) -> Self {
        Self { repository }
    }

    async fn find(&self, user_id: Uuid, id: Uuid) -> Result<WeightRecord, ServiceError> {
        self.repository
            .get(user_id, id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl WeightServiceTrait for WeightService {
    async fn create_reading(
        &self,
        user_id: Uuid,
        request: CreateWeightRequest,
    ) -> Result<WeightReading, ServiceError> {
        check_finite(request.weight)?;
        validate_request(&request)?;

        let record = conversions::convert_to_data_weight(request, user_id, Utc::now());
        let stored = self.repository.insert(&record).await.map_err(map_repo_error)?;

        info!("Created weight reading {} for user {}", stored.id, user_id);
        Ok(conversions::convert_to_domain_weight(stored))
    }

    async fn get_reading(&self, user_id: Uuid, id: Uuid) -> Result<WeightReading, ServiceError> {
        Ok(conversions::convert_to_domain_weight(self.find(user_id, id).await?))
    }

    async fn list_readings(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> Result<Page<WeightReading>, ServiceError> {
        let filter = query.to_filter(user_id, ListQuery::DEFAULT_LIMIT)?;
        let (records, total) = self.repository.list(&filter).await.map_err(map_repo_error)?;
        debug!("Listed {} of {} weight readings", records.len(), total);

        Ok(Page {
            items: records
                .into_iter()
                .map(conversions::convert_to_domain_weight)
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
        request: UpdateWeightRequest,
    ) -> Result<WeightReading, ServiceError> {
        if let Some(weight) = request.weight {
            check_finite(weight)?;
        }
        validate_request(&request)?;

        let mut record = self.find(user_id, id).await?;
        if let Some(weight) = request.weight {
            record.weight_kg = weight;
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

        info!("Updated weight reading {} for user {}", id, user_id);
        Ok(conversions::convert_to_domain_weight(record))
    }

    async fn delete_reading(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        if !self.repository.delete(user_id, id).await.map_err(map_repo_error)? {
            return Err(not_found(id));
        }

        info!("Deleted weight reading {} for user {}", id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_log_data::repository::InMemoryRecordRepository;

    fn service() -> WeightService {
        WeightService::new(Arc::new(InMemoryRecordRepository::new()))
    }

    #[tokio::test]
    async fn test_non_finite_weight_is_rejected() {
        let service = service();
        let request = CreateWeightRequest {
            weight: f64::NAN,
            notes: None,
            recorded_at: None,
        };
        assert!(matches!(
            service.create_reading(Uuid::new_v4(), request).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_weight() {
        let service = service();
        let user = Uuid::new_v4();
        let created = service
            .create_reading(
                user,
                CreateWeightRequest { weight: 80.5, notes: None, recorded_at: None },
            )
            .await
            .unwrap();

        let update = UpdateWeightRequest { weight: Some(79.9), ..Default::default() };
        let updated = service.update_reading(user, created.id, update).await.unwrap();
        assert_eq!(updated.weight, 79.9);

        let page = service.list_readings(user, &ListQuery::default()).await.unwrap();
        assert_eq!(page.items, vec![updated]);
    }
}
