use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use health_log_domain::auth::AuthenticatedUser;
use health_log_domain::entities::medication::{
    CreateMedicationRequest, Medication, UpdateMedicationRequest,
};

use crate::api::errors::{ApiResult, ErrorResponse};
use crate::api::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MedicationQuery {
    /// Only active (or only deactivated) medications
    pub active: Option<bool>,
}

#[utoipa::path(
    post,
    path = "/api/v1/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = Medication),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medications"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateMedicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let medication = state.medications.create_medication(user.user_id, request).await?;
    info!("Medication created with ID: {}", medication.id);
    Ok((StatusCode::CREATED, Json(medication)))
}

/// List medications by name
#[utoipa::path(
    get,
    path = "/api/v1/medications",
    params(MedicationQuery),
    responses(
        (status = 200, description = "Medications of the user", body = Vec<Medication>)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medications"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_medications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MedicationQuery>,
) -> ApiResult<Json<Vec<Medication>>> {
    Ok(Json(state.medications.list_medications(user.user_id, query.active).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/medications/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    responses(
        (status = 200, description = "Medication found", body = Medication),
        (status = 404, description = "Medication not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medications"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Medication>> {
    Ok(Json(state.medications.get_medication(user.user_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/medications/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = Medication),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medications"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMedicationRequest>,
) -> ApiResult<Json<Medication>> {
    let medication = state.medications.update_medication(user.user_id, id, request).await?;
    info!("Medication {} updated", id);
    Ok(Json(medication))
}

/// Deactivate a medication; its logs are kept
#[utoipa::path(
    delete,
    path = "/api/v1/medications/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    responses(
        (status = 200, description = "Medication deactivated, returned under `medication` with a message"),
        (status = 404, description = "Medication not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medications"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn deactivate_medication(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let medication = state.medications.deactivate_medication(user.user_id, id).await?;
    info!("Medication {} deactivated", id);
    Ok(Json(serde_json::json!({
        "message": "Medication deactivated",
        "medication": medication,
    })))
}
