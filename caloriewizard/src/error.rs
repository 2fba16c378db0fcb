//! Error types for CalorieWizard
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the UI layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("Food item not found: {0}")]
    FoodItemNotFound(i64),

    #[error("An account already exists for {0}")]
    DuplicateEmail(String),

    #[error("Login failed. Please check your credentials.")]
    InvalidCredentials,

    #[error("No user is logged in")]
    NotLoggedIn,

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("Invalid {0}")]
    Validation(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Map a unique-constraint failure on `users.email` to `DuplicateEmail`,
    /// passing every other database error through.
    pub(crate) fn from_insert_user(err: sqlx::Error, email: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEmail(email.to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
