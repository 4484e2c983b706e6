use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventType {
    /// User login attempt
    Login,
    /// Failed login attempt
    FailedLogin,
    /// User registration
    Registration,
    /// Token refresh
    TokenRefresh,
    /// Bearer token check on a protected route
    TokenValidation,
}

impl std::fmt::Display for AuthEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventType::Login => write!(f, "LOGIN"),
            AuthEventType::FailedLogin => write!(f, "FAILED_LOGIN"),
            AuthEventType::Registration => write!(f, "REGISTRATION"),
            AuthEventType::TokenRefresh => write!(f, "TOKEN_REFRESH"),
            AuthEventType::TokenValidation => write!(f, "TOKEN_VALIDATION"),
        }
    }
}

/// Authentication event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthEvent {
    pub event_type: AuthEventType,
    /// User ID or login name (if available)
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub details: Option<String>,
    /// The resource being accessed (if applicable)
    pub resource: Option<String>,
    /// Duration of the operation in milliseconds (if applicable)
    pub duration_ms: Option<u64>,
    /// Authentication method used (password, jwt, refresh_token)
    pub auth_method: Option<String>,
}

impl AuthEvent {
    pub fn new(event_type: AuthEventType, user_id: Option<&str>, success: bool) -> Self {
        Self {
            event_type,
            user_id: user_id.map(String::from),
            timestamp: Utc::now(),
            success,
            details: None,
            resource: None,
            duration_ms: None,
            auth_method: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_auth_method(mut self, auth_method: impl Into<String>) -> Self {
        self.auth_method = Some(auth_method.into());
        self
    }
}

/// Log an authentication event as structured fields
pub fn log_auth_event(event: AuthEvent) {
    let user_id = event.user_id.as_deref().unwrap_or("anonymous");
    let status = if event.success { "SUCCESS" } else { "FAILURE" };
    let details = event.details.as_deref().unwrap_or("");
    let resource = event.resource.as_deref().unwrap_or("");
    let method = event.auth_method.as_deref().unwrap_or("");

    if event.success {
        info!(
            event_type = %event.event_type,
            user_id,
            resource,
            method,
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id,
            status,
            event.timestamp.to_rfc3339(),
            details
        );
    } else {
        warn!(
            event_type = %event.event_type,
            user_id,
            resource,
            method,
            duration_ms = event.duration_ms,
            "AUTH-LOG [{}] [{}] [{}] [{}] {}",
            event.event_type,
            user_id,
            status,
            event.timestamp.to_rfc3339(),
            details
        );
    }
}

/// Log a successful login
pub fn log_successful_login(user_id: &str) {
    let event = AuthEvent::new(AuthEventType::Login, Some(user_id), true).with_auth_method("password");
    log_auth_event(event);
}

/// Log a failed login attempt
pub fn log_failed_login(login: &str, reason: &str) {
    let event = AuthEvent::new(AuthEventType::FailedLogin, Some(login), false)
        .with_details(reason)
        .with_auth_method("password");
    log_auth_event(event);
}

/// Log an account registration
pub fn log_registration(user_id: &str, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::Registration, Some(user_id), success)
        .with_auth_method("password");

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}

/// Log a token refresh
pub fn log_token_refresh(user_id: Option<&str>, success: bool, details: Option<&str>) {
    let mut event = AuthEvent::new(AuthEventType::TokenRefresh, user_id, success)
        .with_auth_method("refresh_token");

    if let Some(d) = details {
        event = event.with_details(d);
    }

    log_auth_event(event);
}
