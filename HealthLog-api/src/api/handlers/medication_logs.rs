use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use health_log_domain::auth::AuthenticatedUser;
use health_log_domain::entities::medication::{
    CreateMedicationLogRequest, MedicationLog, MedicationLogDetail, UpdateMedicationLogRequest,
};
use health_log_domain::services::query::MedicationLogPage;
use health_log_domain::services::LogQuery;

use crate::api::errors::{ApiResult, ErrorResponse, MessageResponse};
use crate::api::AppState;

/// Listing parameters of dose logs
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MedicationLogListQuery {
    /// Return only the logs of the current UTC day, as a plain list
    pub today: Option<bool>,
    pub medication_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Only taken (or skipped) doses
    pub taken: Option<bool>,
    /// Page size, 100 when omitted
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl From<MedicationLogListQuery> for LogQuery {
    fn from(query: MedicationLogListQuery) -> Self {
        LogQuery {
            medication_id: query.medication_id,
            start: query.start,
            end: query.end,
            taken: query.taken,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/medication-logs",
    request_body = CreateMedicationLogRequest,
    responses(
        (status = 201, description = "Dose logged", body = MedicationLog),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Medication not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medication_logs"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_medication_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateMedicationLogRequest>,
) -> ApiResult<impl IntoResponse> {
    let log = state.medications.create_log(user.user_id, request).await?;
    info!("Medication log created with ID: {}", log.id);
    Ok((StatusCode::CREATED, Json(log)))
}

/// List dose logs with medication details, newest first
#[utoipa::path(
    get,
    path = "/api/v1/medication-logs",
    params(MedicationLogListQuery),
    responses(
        (status = 200, description = "Page of dose logs, or a list of today's logs when `today=true`", body = MedicationLogPage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medication_logs"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_medication_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MedicationLogListQuery>,
) -> ApiResult<Response> {
    debug!("Listing medication logs: {:?}", query);

    if query.today.unwrap_or(false) {
        let logs = state.medications.today_logs(user.user_id, Utc::now()).await?;
        return Ok(Json(logs).into_response());
    }

    let page = state.medications.list_logs(user.user_id, &query.into()).await?;
    Ok(Json(page).into_response())
}

#[utoipa::path(
    get,
    path = "/api/v1/medication-logs/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication log ID")
    ),
    responses(
        (status = 200, description = "Dose log found", body = MedicationLogDetail),
        (status = 404, description = "Dose log not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medication_logs"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_medication_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MedicationLogDetail>> {
    Ok(Json(state.medications.get_log(user.user_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/medication-logs/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication log ID")
    ),
    request_body = UpdateMedicationLogRequest,
    responses(
        (status = 200, description = "Dose log updated", body = MedicationLog),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Dose log not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medication_logs"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_medication_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMedicationLogRequest>,
) -> ApiResult<Json<MedicationLog>> {
    let log = state.medications.update_log(user.user_id, id, request).await?;
    info!("Medication log {} updated", id);
    Ok(Json(log))
}

#[utoipa::path(
    delete,
    path = "/api/v1/medication-logs/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication log ID")
    ),
    responses(
        (status = 200, description = "Dose log deleted", body = MessageResponse),
        (status = 404, description = "Dose log not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "medication_logs"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_medication_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.medications.delete_log(user.user_id, id).await?;
    info!("Medication log {} deleted", id);
    Ok(Json(MessageResponse::new("Medication log deleted")))
}
