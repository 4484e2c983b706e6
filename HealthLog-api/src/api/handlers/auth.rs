use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use tracing::{info, instrument};

use health_log_domain::auth::{AuthResponse, AuthenticatedUser, LoginRequest, RefreshRequest, SignupRequest};

use crate::api::errors::{ApiResult, ErrorResponse};
use crate::api::AppState;

/// Create an account and sign it in
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid signup data", body = ErrorResponse),
        (status = 409, description = "Username or email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state.auth.signup(request).await?;
    info!("Account created for user {}", response.user.id);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange credentials for an access and refresh token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Missing credentials", body = ErrorResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(state.auth.login(request).await?))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = AuthResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(state.auth.refresh(&request.refresh_token).await?))
}

/// Identity behind the bearer token
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = AuthenticatedUser),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(
        ("bearer" = [])
    ),
    tag = "auth"
)]
pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> Json<AuthenticatedUser> {
    Json(user)
}
