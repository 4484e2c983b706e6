use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use health_log_domain::auth::AuthenticatedUser;
use health_log_domain::entities::blood_pressure::{
    BloodPressureReading, CreateBloodPressureRequest, UpdateBloodPressureRequest,
};
use health_log_domain::services::query::BloodPressurePage;
use health_log_domain::services::ListQuery;

use crate::api::errors::{ApiResult, ErrorResponse, MessageResponse};
use crate::api::AppState;

/// Record a blood pressure reading
#[utoipa::path(
    post,
    path = "/api/v1/blood-pressure",
    request_body = CreateBloodPressureRequest,
    responses(
        (status = 201, description = "Blood pressure reading created", body = BloodPressureReading),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_blood_pressure(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBloodPressureRequest>,
) -> ApiResult<impl IntoResponse> {
    let reading = state.blood_pressure.create_reading(user.user_id, request).await?;
    info!("Blood pressure reading created with ID: {}", reading.id);
    Ok((StatusCode::CREATED, Json(reading)))
}

/// List blood pressure readings, newest first
#[utoipa::path(
    get,
    path = "/api/v1/blood-pressure",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of blood pressure readings", body = BloodPressurePage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_blood_pressure(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<BloodPressurePage>> {
    debug!("Listing blood pressure readings: {:?}", query);
    Ok(Json(state.blood_pressure.list_readings(user.user_id, &query).await?))
}

/// Get a single blood pressure reading by ID
#[utoipa::path(
    get,
    path = "/api/v1/blood-pressure/{id}",
    params(
        ("id" = Uuid, Path, description = "Blood pressure reading ID")
    ),
    responses(
        (status = 200, description = "Blood pressure reading found", body = BloodPressureReading),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_blood_pressure(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BloodPressureReading>> {
    Ok(Json(state.blood_pressure.get_reading(user.user_id, id).await?))
}

/// Update fields of a blood pressure reading
#[utoipa::path(
    put,
    path = "/api/v1/blood-pressure/{id}",
    params(
        ("id" = Uuid, Path, description = "Blood pressure reading ID")
    ),
    request_body = UpdateBloodPressureRequest,
    responses(
        (status = 200, description = "Blood pressure reading updated", body = BloodPressureReading),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_blood_pressure(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBloodPressureRequest>,
) -> ApiResult<Json<BloodPressureReading>> {
    let reading = state.blood_pressure.update_reading(user.user_id, id, request).await?;
    info!("Blood pressure reading {} updated", id);
    Ok(Json(reading))
}

/// Delete a blood pressure reading
#[utoipa::path(
    delete,
    path = "/api/v1/blood-pressure/{id}",
    params(
        ("id" = Uuid, Path, description = "Blood pressure reading ID")
    ),
    responses(
        (status = 200, description = "Blood pressure reading deleted", body = MessageResponse),
        (status = 404, description = "Blood pressure reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_blood_pressure(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.blood_pressure.delete_reading(user.user_id, id).await?;
    info!("Blood pressure reading {} deleted", id);
    Ok(Json(MessageResponse::new("Blood pressure reading deleted")))
}
