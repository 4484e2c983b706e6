//! Authentication for the HealthLog API
//!
//! Credentials sign-in issuing HS256 JWTs, and the middleware that guards
//! the routes of signed-in users

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod logging;
pub mod service;
pub mod token;

pub use service::{
    AuthResponse, AuthService, LoginRequest, RefreshRequest, SignupRequest, UserProfile,
    DEFAULT_BCRYPT_COST,
};
pub use token::{Claims, JwtConfig, SecurityError, TokenType};

/// User information extracted from authenticated requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

#[cfg(feature = "with-api")]
mod middleware {
    use axum::{
        body::Body,
        extract::State,
        http::{header, Request, StatusCode},
        middleware::Next,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;
    use tracing::{debug, warn};

    use super::logging::{log_auth_event, AuthEvent, AuthEventType};
    use super::service::AuthService;

    fn reject(request_path: String, started: std::time::Instant, details: &str) -> Response {
        let event = AuthEvent::new(AuthEventType::TokenValidation, None, false)
            .with_details(details)
            .with_resource(request_path)
            .with_duration(started.elapsed().as_millis() as u64)
            .with_auth_method("jwt");
        log_auth_event(event);

        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "message": details })),
        )
            .into_response()
    }

    /// Authentication middleware for protected routes
    pub async fn auth_middleware(
        State(auth): State<AuthService>,
        mut req: Request<Body>,
        next: Next,
    ) -> Response {
        let request_path = req.uri().path().to_string();
        let start_time = std::time::Instant::now();

        let auth_header = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => match value.to_str() {
                Ok(auth_str) => auth_str,
                Err(_) => {
                    warn!("Invalid Authorization header format");
                    return reject(request_path, start_time, "Invalid Authorization header format");
                }
            },
            None => {
                debug!("Missing Authorization header");
                return reject(request_path, start_time, "Missing Authorization header");
            }
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            warn!("Authorization header does not contain Bearer token");
            return reject(
                request_path,
                start_time,
                "Authorization header does not contain Bearer token",
            );
        };

        match auth.authenticate(token) {
            Ok(user) => {
                let user_id = user.user_id.to_string();
                let event = AuthEvent::new(AuthEventType::TokenValidation, Some(&user_id), true)
                    .with_resource(request_path)
                    .with_duration(start_time.elapsed().as_millis() as u64)
                    .with_auth_method("jwt");
                log_auth_event(event);

                req.extensions_mut().insert(user);
                next.run(req).await
            }
            Err(e) => {
                warn!("Rejected bearer token: {}", e);
                reject(request_path, start_time, &e.to_string())
            }
        }
    }
}

#[cfg(feature = "with-api")]
pub use middleware::auth_middleware;
