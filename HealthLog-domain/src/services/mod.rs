// Domain services
// This module contains business logic implementations.
pub mod blood_pressure;
pub mod blood_sugar;
pub mod dashboard;
pub mod errors;
pub mod insights;
pub mod medication;
pub mod query;
pub mod weight;

use std::sync::Arc;

use health_log_data::database::SqlitePool;
use health_log_data::repository::Repositories;

use crate::auth::{AuthService, JwtConfig};
use crate::health::{HealthService, HealthServiceTrait};

// Re-export service traits and implementations
pub use blood_pressure::{BloodPressureService, BloodPressureServiceTrait};
pub use blood_sugar::{BloodSugarService, BloodSugarServiceTrait};
pub use dashboard::{
    BloodPressureChart, BloodSugarChart, DashboardService, DashboardServiceTrait, DashboardStats,
    WeightChart,
};
pub use errors::{format_validation_errors, ServiceError};
pub use medication::{LogQuery, MedicationService, MedicationServiceTrait};
pub use query::{ListQuery, Page};
pub use weight::{WeightService, WeightServiceTrait};

/// Every service the API needs, sharing one set of repositories
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub blood_pressure: Arc<dyn BloodPressureServiceTrait>,
    pub blood_sugar: Arc<dyn BloodSugarServiceTrait>,
    pub weight: Arc<dyn WeightServiceTrait>,
    pub medications: Arc<dyn MedicationServiceTrait>,
    pub dashboard: Arc<dyn DashboardServiceTrait>,
    pub health: Arc<dyn HealthServiceTrait>,
}

impl Services {
    /// Wire the services over `repositories`; `pool` backs the health check
    pub fn new(
        repositories: Repositories,
        pool: Option<SqlitePool>,
        jwt: JwtConfig,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            auth: AuthService::new(repositories.users.clone(), jwt, bcrypt_cost),
            blood_pressure: Arc::new(BloodPressureService::new(repositories.blood_pressure.clone())),
            blood_sugar: Arc::new(BloodSugarService::new(repositories.blood_sugar.clone())),
            weight: Arc::new(WeightService::new(repositories.weight.clone())),
            medications: Arc::new(MedicationService::new(
                repositories.medications.clone(),
                repositories.medication_logs.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(&repositories)),
            health: Arc::new(HealthService::new(pool)),
        }
    }

    /// Services over the SQLite pool
    pub fn sqlite(pool: SqlitePool, jwt: JwtConfig, bcrypt_cost: u32) -> Self {
        Self::new(Repositories::sqlite(pool.clone()), Some(pool), jwt, bcrypt_cost)
    }
}
