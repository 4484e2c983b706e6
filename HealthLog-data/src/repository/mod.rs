// Repository module structure
pub mod errors;
mod filter;
mod in_memory;
mod sqlite;
mod traits;

use std::sync::Arc;

use crate::database::SqlitePool;
use crate::models::{
    BloodPressureRecord, BloodSugarRecord, MedicationLogRecord, MedicationRecord, WeightRecord,
};

// Re-export commonly used types
pub use errors::RepositoryError;
pub use filter::{RecordFilter, SortOrder};
pub use in_memory::{InMemoryRecordRepository, InMemoryUserRepository};
pub use sqlite::{SqliteRecordRepository, SqliteUserRepository};
pub use traits::{RecordRepository, UserRepositoryTrait};

/// One repository per table
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepositoryTrait>,
    pub blood_pressure: Arc<dyn RecordRepository<BloodPressureRecord>>,
    pub blood_sugar: Arc<dyn RecordRepository<BloodSugarRecord>>,
    pub weight: Arc<dyn RecordRepository<WeightRecord>>,
    pub medications: Arc<dyn RecordRepository<MedicationRecord>>,
    pub medication_logs: Arc<dyn RecordRepository<MedicationLogRecord>>,
}

impl Repositories {
    /// Repositories backed by the SQLite pool
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            blood_pressure: Arc::new(SqliteRecordRepository::new(pool.clone())),
            blood_sugar: Arc::new(SqliteRecordRepository::new(pool.clone())),
            weight: Arc::new(SqliteRecordRepository::new(pool.clone())),
            medications: Arc::new(SqliteRecordRepository::new(pool.clone())),
            medication_logs: Arc::new(SqliteRecordRepository::new(pool)),
        }
    }

    /// Repositories that keep everything in process memory
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            blood_pressure: Arc::new(InMemoryRecordRepository::new()),
            blood_sugar: Arc::new(InMemoryRecordRepository::new()),
            weight: Arc::new(InMemoryRecordRepository::new()),
            medications: Arc::new(InMemoryRecordRepository::new()),
            medication_logs: Arc::new(InMemoryRecordRepository::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_sqlite_pool, DatabaseConfig};
    use crate::models::UserRecord;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn backends() -> Vec<(&'static str, Repositories)> {
        let pool = create_sqlite_pool(&DatabaseConfig::in_memory()).unwrap();
        vec![
            ("memory", Repositories::in_memory()),
            ("sqlite", Repositories::sqlite(pool)),
        ]
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn bp(user_id: Uuid, systolic: u16, recorded_at: DateTime<Utc>) -> BloodPressureRecord {
        BloodPressureRecord {
            id: Uuid::new_v4(),
            user_id,
            systolic,
            diastolic: 80,
            pulse: Some(70),
            notes: None,
            recorded_at,
            created_at: recorded_at,
        }
    }

    fn user(username: &str, email: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some("hash".to_string()),
            name: None,
            created_at: at(1, 0),
            updated_at: at(1, 0),
        }
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_owner() {
        for (name, repos) in backends() {
            let owner = Uuid::new_v4();
            let reading = repos.blood_pressure.insert(&bp(owner, 120, at(1, 8))).await.unwrap();

            let found = repos.blood_pressure.get(owner, reading.id).await.unwrap();
            assert_eq!(found.as_ref(), Some(&reading), "backend {}", name);

            let other = repos.blood_pressure.get(Uuid::new_v4(), reading.id).await.unwrap();
            assert!(other.is_none(), "backend {}", name);
        }
    }

    #[tokio::test]
    async fn test_list_filters_orders_and_pages() {
        for (name, repos) in backends() {
            let owner = Uuid::new_v4();
            for (day, systolic) in [(1, 110), (2, 120), (3, 130), (4, 140)] {
                repos.blood_pressure.insert(&bp(owner, systolic, at(day, 8))).await.unwrap();
            }
            repos.blood_pressure.insert(&bp(Uuid::new_v4(), 200, at(2, 8))).await.unwrap();

            let filter = RecordFilter::for_user(owner).since(at(2, 0)).limit(2);
            let (page, total) = repos.blood_pressure.list(&filter).await.unwrap();
            assert_eq!(total, 3, "backend {}", name);
            let systolic: Vec<u16> = page.iter().map(|r| r.systolic).collect();
            assert_eq!(systolic, vec![140, 130], "backend {}", name);

            let filter = RecordFilter::for_user(owner)
                .before(at(3, 8))
                .order(SortOrder::Ascending)
                .offset(1);
            let (page, total) = repos.blood_pressure.list(&filter).await.unwrap();
            assert_eq!(total, 2, "backend {}", name);
            assert_eq!(page.len(), 1, "backend {}", name);
            assert_eq!(page[0].systolic, 120, "backend {}", name);
        }
    }

    #[tokio::test]
    async fn test_equality_conditions_on_stored_values() {
        for (name, repos) in backends() {
            let owner = Uuid::new_v4();
            let medication_id = Uuid::new_v4();
            for (hour, taken) in [(8, true), (12, false), (20, true)] {
                let log = MedicationLogRecord {
                    id: Uuid::new_v4(),
                    user_id: owner,
                    medication_id,
                    taken,
                    notes: None,
                    taken_at: at(1, hour),
                };
                repos.medication_logs.insert(&log).await.unwrap();
            }

            let filter = RecordFilter::for_user(owner)
                .eq("medication_id", medication_id.to_string())
                .eq("taken", true);
            let (logs, total) = repos.medication_logs.list(&filter).await.unwrap();
            assert_eq!(total, 2, "backend {}", name);
            assert!(logs.iter().all(|l| l.taken), "backend {}", name);

            let filter = RecordFilter::for_user(owner).eq("weight_kg", 1.0);
            assert!(matches!(
                repos.medication_logs.list(&filter).await,
                Err(RepositoryError::InvalidFilter(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_require_owner() {
        for (name, repos) in backends() {
            let owner = Uuid::new_v4();
            let mut weight = WeightRecord {
                id: Uuid::new_v4(),
                user_id: owner,
                weight_kg: 80.0,
                notes: None,
                recorded_at: at(1, 7),
                created_at: at(1, 7),
            };
            repos.weight.insert(&weight).await.unwrap();

            weight.weight_kg = 79.5;
            weight.notes = Some("after run".to_string());
            assert!(repos.weight.update(&weight).await.unwrap(), "backend {}", name);

            let stored = repos.weight.get(owner, weight.id).await.unwrap().unwrap();
            assert_eq!(stored.weight_kg, 79.5, "backend {}", name);
            assert_eq!(stored.notes.as_deref(), Some("after run"), "backend {}", name);

            let foreign = WeightRecord { user_id: Uuid::new_v4(), ..weight.clone() };
            assert!(!repos.weight.update(&foreign).await.unwrap(), "backend {}", name);

            assert!(!repos.weight.delete(Uuid::new_v4(), weight.id).await.unwrap(), "backend {}", name);
            assert!(repos.weight.delete(owner, weight.id).await.unwrap(), "backend {}", name);
            assert!(repos.weight.get(owner, weight.id).await.unwrap().is_none(), "backend {}", name);
        }
    }

    #[tokio::test]
    async fn test_duplicate_users_conflict() {
        for (name, repos) in backends() {
            let alice = repos.users.create(&user("alice", "alice@example.com")).await.unwrap();

            let same_name = repos.users.create(&user("alice", "other@example.com")).await;
            assert!(matches!(same_name, Err(RepositoryError::Conflict(_))), "backend {}", name);

            let same_email = repos.users.create(&user("alicia", "alice@example.com")).await;
            assert!(matches!(same_email, Err(RepositoryError::Conflict(_))), "backend {}", name);

            let by_name = repos.users.find_by_username("alice").await.unwrap();
            assert_eq!(by_name.map(|u| u.id), Some(alice.id), "backend {}", name);
            let by_email = repos.users.find_by_email("alice@example.com").await.unwrap();
            assert_eq!(by_email.map(|u| u.id), Some(alice.id), "backend {}", name);
            assert!(repos.users.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_limit_zero_still_counts() {
        for (name, repos) in backends() {
            let owner = Uuid::new_v4();
            let start = at(1, 0);
            for offset in 0..3 {
                repos
                    .blood_pressure
                    .insert(&bp(owner, 120, start + Duration::hours(offset)))
                    .await
                    .unwrap();
            }

            let (page, total) = repos
                .blood_pressure
                .list(&RecordFilter::for_user(owner).limit(0))
                .await
                .unwrap();
            assert!(page.is_empty(), "backend {}", name);
            assert_eq!(total, 3, "backend {}", name);
        }
    }
}
