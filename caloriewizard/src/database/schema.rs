//! Database schema and upgrades
//!
//! This module handles database initialization. The schema version lives in
//! `PRAGMA user_version`; an older version is upgraded destructively by
//! dropping and recreating every table.

use crate::config::SCHEMA_VERSION;
use crate::error::{AppError, Result};
use sqlx::sqlite::SqlitePool;

const SCHEMA: &str = include_str!("schema.sql");

/// Tables in child-first order so drops never trip a foreign key
pub const TABLES: [&str; 6] = [
    "weight_entries",
    "water_logs",
    "food_log_items",
    "food_logs",
    "food_items",
    "users",
];

/// Initialize database with schema
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    let current_version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    tracing::info!("Current database version: {}", current_version);

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    if current_version > SCHEMA_VERSION {
        return Err(AppError::Schema(format!(
            "database version {} is newer than supported {}",
            current_version, SCHEMA_VERSION
        )));
    }

    let mut tx = pool.begin().await?;

    if current_version != 0 {
        tracing::warn!(
            "Upgrading schema {} -> {}: dropping all tables",
            current_version,
            SCHEMA_VERSION
        );

        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
                .execute(&mut *tx)
                .await?;
        }
    }

    for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    // PRAGMA values cannot be bound as parameters
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Database initialization complete");
    Ok(())
}
