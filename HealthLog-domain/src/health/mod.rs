//! Domain layer health check functionality

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use health_log_data::database::{self, SqlitePool};

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: BTreeMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Description of the storage backend, or an error when it is unreachable
    async fn check_database_status(&self) -> Result<String, String>;
}

/// Health checks over the storage the services run on
#[derive(Clone, Default)]
pub struct HealthService {
    /// `None` when the repositories live in memory
    pool: Option<SqlitePool>,
}

impl HealthService {
    pub fn new(pool: Option<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn check_database_status(&self) -> Result<String, String> {
        let Some(pool) = self.pool.clone() else {
            return Ok("In-memory repositories".to_string());
        };

        tokio::task::spawn_blocking(move || database::describe_pool(&pool))
            .await
            .map_err(|e| format!("Health check task failed: {}", e))?
            .map_err(|e| format!("Database connection error: {}", e))
    }

    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(info) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: Some(info),
            },
            Err(e) => {
                warn!("Database health check failed: {}", e);
                HealthComponent {
                    status: ComponentStatus::Unhealthy,
                    details: Some(e),
                }
            }
        };

        let overall_status = match db_component.status {
            ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
            ComponentStatus::Degraded => SystemStatus::Degraded,
            ComponentStatus::Healthy => SystemStatus::Healthy,
        };

        SystemHealth {
            status: overall_status,
            components: [("database".to_string(), db_component)].into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_log_data::database::{create_sqlite_pool, DatabaseConfig};

    #[tokio::test]
    async fn test_in_memory_health() {
        let health = HealthService::default().get_system_health().await;
        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("database"));
    }

    #[tokio::test]
    async fn test_sqlite_pool_health() {
        let pool = create_sqlite_pool(&DatabaseConfig::in_memory()).unwrap();
        let service = HealthService::new(Some(pool));

        let info = service.check_database_status().await.unwrap();
        assert!(info.contains("SQLite"));
        assert_eq!(service.get_system_health().await.status, SystemStatus::Healthy);
    }
}
