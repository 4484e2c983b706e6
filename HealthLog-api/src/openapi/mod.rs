use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the `bearer` JWT scheme the protected paths refer to
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::signup,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh,
        crate::api::handlers::auth::me,

        // Blood pressure endpoints
        crate::api::handlers::blood_pressure::create_blood_pressure,
        crate::api::handlers::blood_pressure::list_blood_pressure,
        crate::api::handlers::blood_pressure::get_blood_pressure,
        crate::api::handlers::blood_pressure::update_blood_pressure,
        crate::api::handlers::blood_pressure::delete_blood_pressure,

        // Blood sugar endpoints
        crate::api::handlers::blood_sugar::create_blood_sugar,
        crate::api::handlers::blood_sugar::list_blood_sugar,
        crate::api::handlers::blood_sugar::get_blood_sugar,
        crate::api::handlers::blood_sugar::update_blood_sugar,
        crate::api::handlers::blood_sugar::delete_blood_sugar,

        // Weight endpoints
        crate::api::handlers::weight::create_weight,
        crate::api::handlers::weight::list_weight,
        crate::api::handlers::weight::get_weight,
        crate::api::handlers::weight::update_weight,
        crate::api::handlers::weight::delete_weight,

        // Medication endpoints
        crate::api::handlers::medications::create_medication,
        crate::api::handlers::medications::list_medications,
        crate::api::handlers::medications::get_medication,
        crate::api::handlers::medications::update_medication,
        crate::api::handlers::medications::deactivate_medication,
        crate::api::handlers::medication_logs::create_medication_log,
        crate::api::handlers::medication_logs::list_medication_logs,
        crate::api::handlers::medication_logs::get_medication_log,
        crate::api::handlers::medication_logs::update_medication_log,
        crate::api::handlers::medication_logs::delete_medication_log,

        // Dashboard endpoints
        crate::api::handlers::dashboard::get_stats,
        crate::api::handlers::dashboard::blood_pressure_chart,
        crate::api::handlers::dashboard::blood_sugar_chart,
        crate::api::handlers::dashboard::weight_chart
    ),
    components(
        schemas(
            crate::api::errors::ErrorResponse,
            crate::api::errors::MessageResponse,
            crate::api::handlers::health::HealthResponse,
            health_log_domain::health::HealthComponent,
            health_log_domain::health::ComponentStatus,

            // Auth schemas
            health_log_domain::auth::SignupRequest,
            health_log_domain::auth::LoginRequest,
            health_log_domain::auth::RefreshRequest,
            health_log_domain::auth::AuthResponse,
            health_log_domain::auth::UserProfile,
            health_log_domain::auth::AuthenticatedUser,

            // Readings
            health_log_domain::entities::BloodPressureReading,
            health_log_domain::entities::CreateBloodPressureRequest,
            health_log_domain::entities::UpdateBloodPressureRequest,
            health_log_domain::entities::BloodPressureCategory,
            health_log_domain::entities::BloodSugarReading,
            health_log_domain::entities::CreateBloodSugarRequest,
            health_log_domain::entities::UpdateBloodSugarRequest,
            health_log_domain::entities::MealType,
            health_log_domain::entities::WeightReading,
            health_log_domain::entities::CreateWeightRequest,
            health_log_domain::entities::UpdateWeightRequest,

            // Medications
            health_log_domain::entities::Medication,
            health_log_domain::entities::CreateMedicationRequest,
            health_log_domain::entities::UpdateMedicationRequest,
            health_log_domain::entities::MedicationLog,
            health_log_domain::entities::CreateMedicationLogRequest,
            health_log_domain::entities::UpdateMedicationLogRequest,
            health_log_domain::entities::MedicationLogDetail,

            // Pages
            health_log_domain::services::query::BloodPressurePage,
            health_log_domain::services::query::BloodSugarPage,
            health_log_domain::services::query::WeightPage,
            health_log_domain::services::query::MedicationLogPage,

            health_log_domain::aggregation::GroupMode
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Signup, login and token refresh"),
        (name = "blood_pressure", description = "Blood pressure readings"),
        (name = "blood_sugar", description = "Blood sugar readings"),
        (name = "weight", description = "Weight readings"),
        (name = "medications", description = "Medications"),
        (name = "medication_logs", description = "Dose logs of medications"),
        (name = "dashboard", description = "Statistics and charts")
    ),
    info(
        title = "HealthLog API",
        version = "0.1.0",
        description = "API for logging health readings and charting them over time",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
