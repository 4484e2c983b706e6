use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_blood_pressure_table(conn)?;
    create_blood_sugar_table(conn)?;
    create_weight_table(conn)?;
    create_medication_tables(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

fn migrate(conn: &Connection, step: &str, sql: &str) -> Result<(), DatabaseError> {
    info!("Applying migration step: {}", step);

    conn.execute_batch(sql)
        .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", step, e)))
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    migrate(
        conn,
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT,
            name TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
}

/// Create the blood pressure readings table and its timestamp index
fn create_blood_pressure_table(conn: &Connection) -> Result<(), DatabaseError> {
    migrate(
        conn,
        "blood_pressure_readings",
        "CREATE TABLE IF NOT EXISTS blood_pressure_readings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            systolic INTEGER NOT NULL,
            diastolic INTEGER NOT NULL,
            pulse INTEGER,
            notes TEXT,
            recorded_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_blood_pressure_readings_user_recorded
        ON blood_pressure_readings (user_id, recorded_at DESC);",
    )
}

/// Create the blood sugar readings table and its timestamp index
fn create_blood_sugar_table(conn: &Connection) -> Result<(), DatabaseError> {
    migrate(
        conn,
        "blood_sugar_readings",
        "CREATE TABLE IF NOT EXISTS blood_sugar_readings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            glucose INTEGER NOT NULL,
            meal_type TEXT NOT NULL CHECK (meal_type IN (
                'before_breakfast', 'after_breakfast', 'before_lunch', 'after_lunch',
                'before_dinner', 'after_dinner', 'bedtime'
            )),
            notes TEXT,
            recorded_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_blood_sugar_readings_user_recorded
        ON blood_sugar_readings (user_id, recorded_at DESC);",
    )
}

/// Create the weight readings table and its timestamp index
fn create_weight_table(conn: &Connection) -> Result<(), DatabaseError> {
    migrate(
        conn,
        "weight_readings",
        "CREATE TABLE IF NOT EXISTS weight_readings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            weight_kg REAL NOT NULL,
            notes TEXT,
            recorded_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_weight_readings_user_recorded
        ON weight_readings (user_id, recorded_at DESC);",
    )
}

/// Create the medications and medication logs tables
fn create_medication_tables(conn: &Connection) -> Result<(), DatabaseError> {
    migrate(
        conn,
        "medications",
        "CREATE TABLE IF NOT EXISTS medications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            dosage TEXT NOT NULL,
            frequency TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS medication_logs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            medication_id TEXT NOT NULL REFERENCES medications (id) ON DELETE CASCADE,
            taken INTEGER NOT NULL DEFAULT 1,
            notes TEXT,
            taken_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_medication_logs_user_taken_at
        ON medication_logs (user_id, taken_at DESC);",
    )
}
