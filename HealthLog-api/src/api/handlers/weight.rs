use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use health_log_domain::auth::AuthenticatedUser;
use health_log_domain::entities::weight::{CreateWeightRequest, UpdateWeightRequest, WeightReading};
use health_log_domain::services::query::WeightPage;
use health_log_domain::services::ListQuery;

use crate::api::errors::{ApiResult, ErrorResponse, MessageResponse};
use crate::api::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/weight",
    request_body = CreateWeightRequest,
    responses(
        (status = 201, description = "Weight reading created", body = WeightReading),
        (status = 400, description = "Invalid request data", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "weight"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn create_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateWeightRequest>,
) -> ApiResult<impl IntoResponse> {
    let reading = state.weight.create_reading(user.user_id, request).await?;
    info!("Weight reading created with ID: {}", reading.id);
    Ok((StatusCode::CREATED, Json(reading)))
}

#[utoipa::path(
    get,
    path = "/api/v1/weight",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of weight readings", body = WeightPage),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "weight"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<WeightPage>> {
    debug!("Listing weight readings: {:?}", query);
    Ok(Json(state.weight.list_readings(user.user_id, &query).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/weight/{id}",
    params(
        ("id" = Uuid, Path, description = "Weight reading ID")
    ),
    responses(
        (status = 200, description = "Weight reading found", body = WeightReading),
        (status = 404, description = "Weight reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "weight"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WeightReading>> {
    Ok(Json(state.weight.get_reading(user.user_id, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/weight/{id}",
    params(
        ("id" = Uuid, Path, description = "Weight reading ID")
    ),
    request_body = UpdateWeightRequest,
    responses(
        (status = 200, description = "Weight reading updated", body = WeightReading),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 404, description = "Weight reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "weight"
)]
#[instrument(skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn update_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWeightRequest>,
) -> ApiResult<Json<WeightReading>> {
    let reading = state.weight.update_reading(user.user_id, id, request).await?;
    info!("Weight reading {} updated", id);
    Ok(Json(reading))
}

#[utoipa::path(
    delete,
    path = "/api/v1/weight/{id}",
    params(
        ("id" = Uuid, Path, description = "Weight reading ID")
    ),
    responses(
        (status = 200, description = "Weight reading deleted", body = MessageResponse),
        (status = 404, description = "Weight reading not found", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "weight"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn delete_weight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.weight.delete_reading(user.user_id, id).await?;
    info!("Weight reading {} deleted", id);
    Ok(Json(MessageResponse::new("Weight reading deleted")))
}
