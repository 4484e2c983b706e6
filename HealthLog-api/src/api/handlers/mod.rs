pub mod auth;
pub mod blood_pressure;
pub mod blood_sugar;
pub mod dashboard;
pub mod health;
pub mod medication_logs;
pub mod medications;
pub mod weight;
