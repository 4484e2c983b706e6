use std::env;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Token of the other type
    #[error("Expected a {expected:?} token")]
    WrongTokenType { expected: TokenType },

    /// Configuration error
    #[error("Security configuration error: {0}")]
    ConfigError(String),

    /// Password hashing failed
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// Token types for authentication
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived access token
    Access,
    /// Long-lived refresh token
    Refresh,
}

/// Authentication claims for JSON Web Tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    pub token_type: TokenType,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, SecurityError> {
        Uuid::parse_str(&self.sub).map_err(|_| SecurityError::InvalidToken)
    }
}

/// Signing key and lifetimes of issued tokens
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    pub issuer: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("access_token_minutes", &self.access_token_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .finish_non_exhaustive()
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("Invalid value for {}: {}, using default", name, value);
            default
        }),
        Err(_) => default,
    }
}

impl JwtConfig {
    pub const DEFAULT_ISSUER: &'static str = "health-log-api";

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: Self::DEFAULT_ISSUER.to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
        }
    }

    /// Load JWT settings from the environment; `JWT_SECRET` is required
    pub fn from_env() -> Result<Self, SecurityError> {
        let secret = env::var("JWT_SECRET").map_err(|e| {
            error!("JWT_SECRET environment variable not found: {}", e);
            SecurityError::ConfigError("JWT_SECRET environment variable not found".to_string())
        })?;
        if secret.is_empty() {
            return Err(SecurityError::ConfigError("JWT_SECRET must not be empty".to_string()));
        }

        Ok(Self {
            secret,
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| Self::DEFAULT_ISSUER.to_string()),
            access_token_minutes: env_or("ACCESS_TOKEN_EXPIRATION_MINUTES", 15),
            refresh_token_days: env_or("REFRESH_TOKEN_EXPIRATION_DAYS", 7),
        })
    }

    /// Get the expiration duration for this token type
    pub fn expiration(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => Duration::minutes(self.access_token_minutes),
            TokenType::Refresh => Duration::days(self.refresh_token_days),
        }
    }

    /// Generate a new signed token
    pub fn generate_token(
        &self,
        user_id: Uuid,
        username: &str,
        token_type: TokenType,
    ) -> Result<String, SecurityError> {
        let now = Utc::now();
        let expiration = now + self.expiration(token_type);

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            token_type,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!("Failed to encode JWT token: {}", e);
            SecurityError::TokenValidation(e.to_string())
        })?;

        debug!("Generated {:?} token for user {}, expires {}", token_type, user_id, expiration);
        Ok(token)
    }

    /// Validate a token of the expected type and return the decoded claims
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                SecurityError::TokenValidation("Invalid signature".to_string())
            }
            _ => SecurityError::TokenValidation(e.to_string()),
        })?;

        if token_data.claims.token_type != expected {
            return Err(SecurityError::WrongTokenType { expected });
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            issuer: "test-issuer".to_string(),
            ..JwtConfig::new("test_secret_key_for_testing_only")
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let config = config();
        let user_id = Uuid::new_v4();

        let token = config.generate_token(user_id, "alice", TokenType::Access).unwrap();
        assert!(!token.is_empty());

        let claims = config.validate_token(&token, TokenType::Access).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_token_type_is_checked() {
        let config = config();
        let refresh = config
            .generate_token(Uuid::new_v4(), "alice", TokenType::Refresh)
            .unwrap();

        match config.validate_token(&refresh, TokenType::Access) {
            Err(SecurityError::WrongTokenType { expected: TokenType::Access }) => {}
            other => panic!("Expected WrongTokenType but got: {:?}", other),
        }
    }

    #[test]
    fn test_token_expiration() {
        let config = config();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "alice".to_string(),
            iss: "test-issuer".to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test_secret_key_for_testing_only"),
        )
        .unwrap();

        match config.validate_token(&token, TokenType::Access) {
            Err(SecurityError::TokenExpired) => {}
            err => panic!("Expected TokenExpired error but got: {:?}", err),
        }
    }

    #[test]
    fn test_invalid_token_and_foreign_secret() {
        let config = config();
        assert!(config.validate_token("invalid.token.format", TokenType::Access).is_err());

        let other = JwtConfig {
            issuer: "test-issuer".to_string(),
            ..JwtConfig::new("another-secret")
        };
        let token = other.generate_token(Uuid::new_v4(), "alice", TokenType::Access).unwrap();
        assert!(matches!(
            config.validate_token(&token, TokenType::Access),
            Err(SecurityError::TokenValidation(_))
        ));
    }

    #[test]
    fn test_different_token_types() {
        let config = config();
        assert_eq!(config.expiration(TokenType::Access), Duration::minutes(15));
        assert_eq!(config.expiration(TokenType::Refresh), Duration::days(7));
    }
}
