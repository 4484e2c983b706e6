use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use health_log_domain::auth::auth_middleware;
use health_log_domain::services::Services;

use crate::api::handlers::{
    auth, blood_pressure, blood_sugar, dashboard, health, medication_logs, medications, weight,
};
use crate::api::AppState;
use crate::openapi::configure_swagger_routes;

/// Routes of signed-in users, nested under `/api/v1`
fn api_routes(services: &Services) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/blood-pressure",
            get(blood_pressure::list_blood_pressure).post(blood_pressure::create_blood_pressure),
        )
        .route(
            "/blood-pressure/:id",
            get(blood_pressure::get_blood_pressure)
                .put(blood_pressure::update_blood_pressure)
                .delete(blood_pressure::delete_blood_pressure),
        )
        .route(
            "/blood-sugar",
            get(blood_sugar::list_blood_sugar).post(blood_sugar::create_blood_sugar),
        )
        .route(
            "/blood-sugar/:id",
            get(blood_sugar::get_blood_sugar)
                .put(blood_sugar::update_blood_sugar)
                .delete(blood_sugar::delete_blood_sugar),
        )
        .route("/weight", get(weight::list_weight).post(weight::create_weight))
        .route(
            "/weight/:id",
            get(weight::get_weight)
                .put(weight::update_weight)
                .delete(weight::delete_weight),
        )
        .route(
            "/medications",
            get(medications::list_medications).post(medications::create_medication),
        )
        .route(
            "/medications/:id",
            get(medications::get_medication)
                .put(medications::update_medication)
                .delete(medications::deactivate_medication),
        )
        .route(
            "/medication-logs",
            get(medication_logs::list_medication_logs).post(medication_logs::create_medication_log),
        )
        .route(
            "/medication-logs/:id",
            get(medication_logs::get_medication_log)
                .put(medication_logs::update_medication_log)
                .delete(medication_logs::delete_medication_log),
        )
        .route("/dashboard/stats", get(dashboard::get_stats))
        .route("/dashboard/charts/blood-pressure", get(dashboard::blood_pressure_chart))
        .route("/dashboard/charts/blood-sugar", get(dashboard::blood_sugar_chart))
        .route("/dashboard/charts/weight", get(dashboard::weight_chart))
        .layer(middleware::from_fn_with_state(
            services.auth.clone(),
            auth_middleware,
        ))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

/// CORS for the configured origins, or any origin when none are configured
pub fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origin = match allowed_origins {
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// Create the application router
pub fn create_app(services: Services, allowed_origins: Option<&[String]>) -> Router {
    debug!("Creating application router");

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    let app = Router::new()
        .merge(public_routes())
        .nest("/api/v1", api_routes(&services))
        .with_state(services);

    debug!("API routes nested");

    health::initialize_server_start_time();

    app.merge(configure_swagger_routes())
        .layer(security_headers)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
