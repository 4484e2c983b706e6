pub mod errors;
pub mod handlers;
pub mod routes;

use axum::Router;

use health_log_domain::services::Services;

use crate::config::AppConfig;

/// State shared by every handler
pub type AppState = Services;

/// Create the application router over `services`
pub fn create_application(services: Services, config: &AppConfig) -> Router {
    routes::create_app(services, config.cors_allowed_origins.as_deref())
}
