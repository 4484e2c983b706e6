//! Database connection module for the HealthLog application
//!
//! SQLite is the only supported backend. The pool is created once at startup
//! and shared by every repository.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Shared SQLite connection pool
pub type SqlitePool = Arc<r2d2::Pool<SqliteConnectionManager>>;

/// Set once by `initialize_database_pool`
static DB_POOL: OnceCell<SqlitePool> = OnceCell::new();

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based or in-memory)
    Sqlite,
}

impl std::str::FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type
    pub db_type: DatabaseType,
    /// Path to SQLite database file, `None` for an in-memory database
    pub sqlite_path: Option<String>,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some("./data/health_log.db".to_string()),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a private in-memory database
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// capped at a single connection.
    pub fn in_memory() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: None,
            max_connections: 1,
            timeout_seconds: 5,
        }
    }

    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type: DatabaseType = env::var("DB_TYPE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse()?;

        let defaults = Self::default();

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path == ":memory:" => None,
            Ok(path) => Some(path),
            Err(_) => {
                info!("No DB_SQLITE_PATH provided, using default path");
                defaults.sqlite_path
            }
        };

        let max_connections = parse_env("DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        let timeout_seconds = parse_env("DB_TIMEOUT_SECONDS")?.unwrap_or(defaults.timeout_seconds);

        info!(
            "Database configuration: type={:?}, path={:?}, max_connections={}, timeout={}s",
            db_type, sqlite_path, max_connections, timeout_seconds
        );

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            max_connections,
            timeout_seconds,
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, DatabaseError> {
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| DatabaseError::ConfigError(format!("{} must be a number, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}

/// Create a SQLite pool for the given configuration and run migrations on it
pub fn create_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = match &config.sqlite_path {
        Some(path) => match open_file_pool(config, path) {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to open SQLite database at {}: {}", path, e);
                warn!("Falling back to in-memory SQLite database");
                open_memory_pool(config)?
            }
        },
        None => open_memory_pool(config)?,
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn)?;

    Ok(pool)
}

fn open_file_pool(config: &DatabaseConfig, sqlite_path: &str) -> Result<SqlitePool, DatabaseError> {
    info!("Initializing SQLite database at: {}", sqlite_path);

    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::ConfigError(format!("cannot create {:?}: {}", parent, e)))?;
        }
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    info!("SQLite connection pool created successfully");
    Ok(Arc::new(pool))
}

fn open_memory_pool(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(SqliteConnectionManager::memory())?;

    Ok(Arc::new(pool))
}

/// Initialize the global database connection pool from the environment
pub fn initialize_database_pool() -> Result<SqlitePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;
    info!("Initializing database pool with type: {:?}", config.db_type);

    let pool = create_sqlite_pool(&config)?;
    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    Ok(pool)
}

/// Describe a pool: backing file and connection counts
pub fn describe_pool(pool: &SqlitePool) -> Result<String, DatabaseError> {
    let conn = pool.get()?;
    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;

    let location = if path.is_empty() || path == ":memory:" {
        "SQLite in-memory database".to_string()
    } else {
        format!("SQLite database at {}", path)
    };

    let state = pool.state();
    Ok(format!(
        "{} (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}
