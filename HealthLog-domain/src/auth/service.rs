use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use health_log_data::models::UserRecord;
use health_log_data::repository::UserRepositoryTrait;

use crate::auth::logging::{log_failed_login, log_registration, log_successful_login, log_token_refresh};
use crate::auth::token::{Claims, JwtConfig, SecurityError, TokenType};
use crate::auth::AuthenticatedUser;
use crate::services::errors::{map_repo_error, validate_request, ServiceError};

pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Signup request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub name: Option<String>,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    /// Username or email
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Public part of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Token pair issued on signup, login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Credentials sign-in over the user repository
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepositoryTrait>,
    jwt: JwtConfig,
    bcrypt_cost: u32,
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid username or password".to_string())
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepositoryTrait>, jwt: JwtConfig, bcrypt_cost: u32) -> Self {
        Self { users, jwt, bcrypt_cost }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    fn issue_tokens(&self, user: &UserRecord) -> Result<AuthResponse, ServiceError> {
        let issue = |token_type| {
            self.jwt
                .generate_token(user.id, &user.username, token_type)
                .map_err(|e| ServiceError::Repository(e.to_string()))
        };

        Ok(AuthResponse {
            access_token: issue(TokenType::Access)?,
            refresh_token: issue(TokenType::Refresh)?,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expiration(TokenType::Access).num_seconds(),
            user: UserProfile::from(user),
        })
    }

    /// Create an account and sign it in
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse, ServiceError> {
        validate_request(&request)?;

        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();
        let password = request.password;
        let cost = self.bcrypt_cost;

        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ServiceError::Repository(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                ServiceError::Repository(SecurityError::Hashing(e.to_string()).to_string())
            })?;

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash: Some(password_hash),
            name: request.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: now,
            updated_at: now,
        };

        let user = match self.users.create(&record).await {
            Ok(user) => user,
            Err(e) => {
                log_registration(&record.username, false, Some(&e.to_string()));
                return Err(map_repo_error(e));
            }
        };

        log_registration(&user.id.to_string(), true, None);
        info!("Registered user {} ({})", user.username, user.id);
        self.issue_tokens(&user)
    }

    /// Sign in with a username or email and a password
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ServiceError> {
        validate_request(&request)?;

        let login = request.username.trim();
        let user = match self.users.find_by_username(login).await.map_err(map_repo_error)? {
            Some(user) => Some(user),
            None => self
                .users
                .find_by_email(&login.to_lowercase())
                .await
                .map_err(map_repo_error)?,
        };

        let Some(user) = user else {
            log_failed_login(login, "Unknown user");
            return Err(invalid_credentials());
        };
        let Some(hash) = user.password_hash.clone() else {
            log_failed_login(login, "Account has no password");
            return Err(invalid_credentials());
        };

        let password = request.password;
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ServiceError::Repository(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                error!("Failed to verify password hash: {}", e);
                ServiceError::Repository(SecurityError::Hashing(e.to_string()).to_string())
            })?;

        if !valid {
            log_failed_login(login, "Wrong password");
            return Err(invalid_credentials());
        }

        log_successful_login(&user.id.to_string());
        self.issue_tokens(&user)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ServiceError> {
        let claims = match self.jwt.validate_token(refresh_token, TokenType::Refresh) {
            Ok(claims) => claims,
            Err(e) => {
                log_token_refresh(None, false, Some(&e.to_string()));
                return Err(ServiceError::Unauthorized("Invalid or expired refresh token".to_string()));
            }
        };

        let user_id = claims
            .user_id()
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))?;
        let Some(user) = self.users.find_by_id(user_id).await.map_err(map_repo_error)? else {
            log_token_refresh(Some(&claims.sub), false, Some("User no longer exists"));
            return Err(ServiceError::Unauthorized("Invalid or expired refresh token".to_string()));
        };

        log_token_refresh(Some(&claims.sub), true, None);
        self.issue_tokens(&user)
    }

    /// Identity carried by a valid access token
    pub fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, SecurityError> {
        let claims: Claims = self.jwt.validate_token(access_token, TokenType::Access)?;
        debug!("Access token valid for user {}", claims.sub);
        Ok(AuthenticatedUser {
            user_id: claims.user_id()?,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_log_data::repository::InMemoryUserRepository;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            JwtConfig::new("auth-service-test-secret"),
            4,
        )
    }

    fn signup(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            name: Some("Alice".to_string()),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login_by_username_or_email() {
        let service = service();
        let created = service.signup(signup("alice", "Alice@Example.com")).await.unwrap();
        assert_eq!(created.token_type, "Bearer");
        assert_eq!(created.user.email, "alice@example.com");

        let by_name = service
            .login(LoginRequest { username: "alice".into(), password: "secret123".into() })
            .await
            .unwrap();
        assert_eq!(by_name.user.id, created.user.id);

        let by_email = service
            .login(LoginRequest { username: "alice@example.com".into(), password: "secret123".into() })
            .await
            .unwrap();
        let identity = service.authenticate(&by_email.access_token).unwrap();
        assert_eq!(identity.user_id, created.user.id);
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let service = service();
        service.signup(signup("alice", "alice@example.com")).await.unwrap();

        let result = service
            .login(LoginRequest { username: "alice".into(), password: "wrong-password".into() })
            .await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));

        let result = service
            .login(LoginRequest { username: "nobody".into(), password: "secret123".into() })
            .await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_signup_validation_and_conflicts() {
        let service = service();
        let short = SignupRequest { password: "123".into(), ..signup("alice", "alice@example.com") };
        assert!(matches!(service.signup(short).await, Err(ServiceError::Validation(_))));

        let bad_email = signup("alice", "not-an-email");
        assert!(matches!(service.signup(bad_email).await, Err(ServiceError::Validation(_))));

        service.signup(signup("alice", "alice@example.com")).await.unwrap();
        assert!(matches!(
            service.signup(signup("alice", "other@example.com")).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            service.signup(signup("bob", "alice@example.com")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_tokens() {
        let service = service();
        let tokens = service.signup(signup("alice", "alice@example.com")).await.unwrap();

        let refreshed = service.refresh(&tokens.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.username, "alice");

        assert!(matches!(
            service.refresh(&tokens.access_token).await,
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(service.authenticate(&tokens.refresh_token).is_err());
    }
}
