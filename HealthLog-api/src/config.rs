//! Server configuration read from the environment

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use health_log_domain::auth::{JwtConfig, DEFAULT_BCRYPT_COST};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATABASE_FILE: &str = "health_log.db";

/// Settings of the HTTP server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
    /// `None` allows any origin
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl AppConfig {
    /// Read `PORT`, `DATA_DIR`, `JWT_*`, `BCRYPT_COST` and `CORS_ALLOWED_ORIGINS`
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("PORT must be a number, got '{}'", value))?,
            Err(_) => DEFAULT_PORT,
        };

        let data_dir = PathBuf::from(
            env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        );

        let jwt = JwtConfig::from_env().context("invalid JWT configuration")?;

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(value) => value
                .parse::<u32>()
                .with_context(|| format!("BCRYPT_COST must be a number, got '{}'", value))?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|value| parse_origins(&value))
            .filter(|origins| !origins.is_empty());

        if cors_allowed_origins.is_none() {
            warn!("CORS_ALLOWED_ORIGINS not set, allowing any origin");
        }

        info!(
            "Configuration loaded: port={}, data_dir={}, bcrypt_cost={}",
            port,
            data_dir.display(),
            bcrypt_cost
        );

        Ok(Self {
            port,
            data_dir,
            jwt,
            bcrypt_cost,
            cors_allowed_origins,
        })
    }

    /// Database file inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
