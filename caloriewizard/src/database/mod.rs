//! Database module
//!
//! This module provides all database functionality including:
//! - Schema and destructive upgrades
//! - Model definitions
//! - Repository layer for CRUD and query operations

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::initialize_database;

use crate::config::{DB_BUSY_TIMEOUT_SECS, MAX_DB_CONNECTIONS};
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Build connection options shared by schema and application connections.
fn connect_options(url: &str) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(url).map(|opts| {
        opts.create_if_missing(true)
            .busy_timeout(Duration::from_secs(DB_BUSY_TIMEOUT_SECS))
            .foreign_keys(true)
    })
}

fn pool_options() -> SqlitePoolOptions {
    // Connections never expire so an in-memory store survives idle periods
    SqlitePoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Create and initialize a connection pool for the store file at `db_path`.
///
/// The schema is created on a dedicated connection that is closed before
/// the application pool is opened, so the application never sees a
/// half-upgraded schema.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Creating database connection pool at: {:?}", db_path);

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let options = connect_options(&url)?.journal_mode(SqliteJournalMode::Wal);

    let schema_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options.clone())
        .await?;

    initialize_database(&schema_pool).await?;
    schema_pool.close().await;

    let pool = pool_options().connect_with(options).await?;

    tracing::info!("Database pool created successfully");

    Ok(pool)
}

/// Create and initialize a pool over a private in-memory store.
pub async fn create_memory_pool() -> Result<SqlitePool> {
    let pool = pool_options()
        .connect_with(connect_options("sqlite::memory:")?)
        .await?;

    initialize_database(&pool).await?;

    Ok(pool)
}
