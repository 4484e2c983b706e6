use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use health_log_domain::auth::AuthenticatedUser;
use health_log_domain::entities::blood_sugar::{
    BloodSugarReading, CreateBloodSugarRequest, MealType, UpdateBloodSugarRequest,
};
use health_log_domain::services::query::BloodSugarPage;
use health_log_domain::services::ListQuery;

use crate::api::errors::{ApiResult, ErrorResponse, MessageResponse};
use crate::api::AppState;

/// Listing parameters of blood sugar readings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BloodSugarQuery {
    /// Only readings at or after this time
    pub start: Option<DateTime<Utc>>,
    /// Only readings at or before this time
    pub end: Option<DateTime<Utc>>,
    /// Only readings of this meal type
    pub meal_type: Option<MealType>,
    /// Page size, 50 when omitted
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl BloodSugarQuery {
    fn split(self) -> (ListQuery, Option<MealType>) {
        let list = ListQuery {
            start: self.start,
            end: self.end,
            limit: self.limit,
            offset: self.offset,
        };
        (list, self.meal_type)
    }
}

/// Record a blood sugar reading
#[utoipa::path(
    post,
    path = "/api/v1/blood-sugar",
    request_body = CreateBloodSugarRequest,
    responses(
        (status = 201, description = "Blood sugar reading created", body = BloodSugarReading),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_sugar"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_blood_sugar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBloodSugarRequest>,
) -> ApiResult<impl IntoResponse> {
    let reading = state.blood_sugar.create_reading(user.user_id, request).await?;
    info!("Blood sugar reading created with ID: {}", reading.id);
    Ok((StatusCode::CREATED, Json(reading)))
}

/// List blood sugar readings, newest first
#[utoipa::path(
    get,
    path = "/api/v1/blood-sugar",
    params(BloodSugarQuery),
    responses(
        (status = 200, description = "Page of blood sugar readings", body = BloodSugarPage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_sugar"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_blood_sugar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<BloodSugarQuery>,
) -> ApiResult<Json<BloodSugarPage>> {
    debug!("Listing blood sugar readings: {:?}", query);
    let (list, meal_type) = query.split();
    Ok(Json(state.blood_sugar.list_readings(user.user_id, &list, meal_type).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/blood-sugar/{id}",
    params(
        ("id" = Uuid, Path, description = "Blood sugar reading ID")
    ),
    responses(
        (status = 200, description = "Blood sugar reading found", body = BloodSugarReading),
        (status = 404, description = "Blood sugar reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_sugar"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_blood_sugar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BloodSugarReading>> {
    Ok(Json(state.blood_sugar.get_reading(user.user_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/blood-sugar/{id}",
    params(
        ("id" = Uuid, Path, description = "Blood sugar reading ID")
    ),
    request_body = UpdateBloodSugarRequest,
    responses(
        (status = 200, description = "Blood sugar reading updated", body = BloodSugarReading),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Blood sugar reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_sugar"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_blood_sugar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBloodSugarRequest>,
) -> ApiResult<Json<BloodSugarReading>> {
    let reading = state.blood_sugar.update_reading(user.user_id, id, request).await?;
    info!("Blood sugar reading {} updated", id);
    Ok(Json(reading))
}

#[utoipa::path(
    delete,
    path = "/api/v1/blood-sugar/{id}",
    params(
        ("id" = Uuid, Path, description = "Blood sugar reading ID")
    ),
    responses(
        (status = 200, description = "Blood sugar reading deleted", body = MessageResponse),
        (status = 404, description = "Blood sugar reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "blood_sugar"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_blood_sugar(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.blood_sugar.delete_reading(user.user_id, id).await?;
    info!("Blood sugar reading {} deleted", id);
    Ok(Json(MessageResponse::new("Blood sugar reading deleted")))
}
