// HealthLog-api lib.rs
//
// HTTP layer of HealthLog: routing, handlers, configuration and the OpenAPI
// document. Business logic lives in health_log_domain.

pub mod api;
pub mod config;
pub mod openapi;
