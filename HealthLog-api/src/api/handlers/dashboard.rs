use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::IntoParams;

use health_log_domain::aggregation::GroupMode;
use health_log_domain::auth::AuthenticatedUser;
use health_log_domain::services::{BloodPressureChart, BloodSugarChart, DashboardStats, WeightChart};

use crate::api::errors::{ApiResult, ErrorResponse};
use crate::api::AppState;

/// Window and bucketing of a chart
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChartQuery {
    /// Number of days back from today, 1 to 3650
    pub days: Option<u32>,
    /// `day` (default) or `week`
    #[serde(alias = "groupBy")]
    pub group_by: Option<String>,
}

impl ChartQuery {
    fn mode(&self) -> ApiResult<GroupMode> {
        match self.group_by.as_deref() {
            None => Ok(GroupMode::default()),
            Some(value) => Ok(value.parse::<GroupMode>()?),
        }
    }
}

/// Dashboard statistics of the current day and week
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    responses(
        (status = 200, description = "Blood sugar, medication, weight and blood pressure statistics"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "dashboard"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.dashboard.stats(user.user_id, Utc::now()).await?))
}

/// Blood pressure averages per day or week
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/charts/blood-pressure",
    params(ChartQuery),
    responses(
        (status = 200, description = "Bucketed systolic, diastolic and pulse averages with a period summary"),
        (status = 400, description = "Invalid days or group_by", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "dashboard"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn blood_pressure_chart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<BloodPressureChart>> {
    let mode = query.mode()?;
    debug!("Blood pressure chart: days={:?}, group_by={}", query.days, mode);
    let chart = state
        .dashboard
        .blood_pressure_chart(user.user_id, query.days, mode, Utc::now())
        .await?;
    Ok(Json(chart))
}

/// Blood sugar averages per meal type, per day or week
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/charts/blood-sugar",
    params(ChartQuery),
    responses(
        (status = 200, description = "Bucketed glucose averages by meal type with a period summary"),
        (status = 400, description = "Invalid days or group_by", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "dashboard"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn blood_sugar_chart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<BloodSugarChart>> {
    let mode = query.mode()?;
    debug!("Blood sugar chart: days={:?}, group_by={}", query.days, mode);
    let chart = state
        .dashboard
        .blood_sugar_chart(user.user_id, query.days, mode, Utc::now())
        .await?;
    Ok(Json(chart))
}

/// Weight averages per day or week
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/charts/weight",
    params(ChartQuery),
    responses(
        (status = 200, description = "Bucketed weight averages with a period summary"),
        (status = 400, description = "Invalid days or group_by", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "dashboard"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn weight_chart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<WeightChart>> {
    let mode = query.mode()?;
    debug!("Weight chart: days={:?}, group_by={}", query.days, mode);
    let chart = state
        .dashboard
        .weight_chart(user.user_id, query.days, mode, Utc::now())
        .await?;
    Ok(Json(chart))
}
