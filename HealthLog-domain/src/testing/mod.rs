// Testing utilities and fixtures for the domain layer
// This module is only available when the "mock" feature is enabled

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use health_log_data::repository::Repositories;

use crate::auth::JwtConfig;
use crate::entities::blood_pressure::CreateBloodPressureRequest;
use crate::entities::blood_sugar::{CreateBloodSugarRequest, MealType};
use crate::entities::medication::CreateMedicationRequest;
use crate::entities::weight::CreateWeightRequest;
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::Services;

/// Signing secret of tokens issued in tests
pub const TEST_JWT_SECRET: &str = "health-log-test-secret";

/// Lowest cost bcrypt accepts
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_JWT_SECRET)
}

/// Services over fresh in-memory repositories
pub fn in_memory_services() -> Services {
    Services::new(Repositories::in_memory(), None, test_jwt_config(), TEST_BCRYPT_COST)
}

pub fn blood_pressure_request(
    systolic: u16,
    diastolic: u16,
    recorded_at: Option<DateTime<Utc>>,
) -> CreateBloodPressureRequest {
    CreateBloodPressureRequest {
        systolic,
        diastolic,
        pulse: Some(72),
        notes: None,
        recorded_at,
    }
}

pub fn blood_sugar_request(
    glucose: u16,
    meal_type: MealType,
    recorded_at: Option<DateTime<Utc>>,
) -> CreateBloodSugarRequest {
    CreateBloodSugarRequest {
        glucose,
        meal_type,
        notes: None,
        recorded_at,
    }
}

pub fn weight_request(weight: f64, recorded_at: Option<DateTime<Utc>>) -> CreateWeightRequest {
    CreateWeightRequest {
        weight,
        notes: None,
        recorded_at,
    }
}

pub fn medication_request(name: &str) -> CreateMedicationRequest {
    CreateMedicationRequest {
        name: name.to_string(),
        dosage: "10mg".to_string(),
        frequency: "Once daily".to_string(),
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
        }
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let details = match self.database_status {
            ComponentStatus::Healthy => None,
            ComponentStatus::Degraded => Some("Database is experiencing high load".to_string()),
            ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
        };
        let status = match self.database_status {
            ComponentStatus::Healthy => SystemStatus::Healthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
        };

        let mut components = BTreeMap::new();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status,
                details,
            },
        );

        SystemHealth { status, components }
    }

    async fn check_database_status(&self) -> Result<String, String> {
        match self.database_status {
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
            _ => Ok("Mock database".to_string()),
        }
    }
}
