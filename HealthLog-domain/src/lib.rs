// HealthLog Domain
// This crate contains the business logic for the HealthLog application

// Grouping and statistics over time series of readings
pub mod aggregation;

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from health_log_data for convenience
pub use health_log_data::database;
pub use health_log_data::repository::Repositories;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
