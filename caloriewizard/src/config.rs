//! Application configuration constants
//!
//! Central location for store layout, crypto parameters, unit conversions,
//! and validation boundaries used throughout the application.

// ===== Store =====

/// File name of the embedded store inside the app data directory
pub const DATABASE_FILE_NAME: &str = "caloriewizard.db";

/// Current schema version, kept in `PRAGMA user_version`.
/// Bumping it drops and recreates every table on next open.
pub const SCHEMA_VERSION: i64 = 12;

/// The store is single-writer; one pooled connection serializes all access.
pub const MAX_DB_CONNECTIONS: u32 = 1;

/// How long a statement waits on a locked database file before failing
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;

// ===== Preferences =====

/// JSON preference file holding the current session
pub const PREFERENCES_FILE_NAME: &str = "app_prefs.json";

// ===== Crypto =====

/// Service name under which keys live in the OS credential store
pub const KEYSTORE_SERVICE_NAME: &str = "CalorieWizard";

/// Alias of the password-protection key
pub const PASSWORD_KEY_ALIAS: &str = "password_key";

/// AES-256 key length in bytes
pub const KEY_SIZE: usize = 32;

/// GCM initialization vector length in bytes (96 bits)
pub const IV_SIZE: usize = 12;

/// GCM authentication tag length in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

// ===== Unit Conversions =====

pub const POUNDS_PER_STONE: i64 = 14;
pub const INCHES_PER_FOOT: i64 = 12;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const METERS_PER_INCH: f64 = 0.0254;
pub const KG_PER_STONE: f64 = 6.35029;
pub const KG_PER_POUND: f64 = 0.453592;

// ===== BMI Bands =====

/// Lower bound of the normal band; anything below is underweight
pub const BMI_NORMAL_MIN: f64 = 18.5;
/// Lower bound of the overweight band
pub const BMI_OVERWEIGHT_MIN: f64 = 25.0;
/// Lower bound of the obesity band
pub const BMI_OBESITY_MIN: f64 = 30.0;

// ===== Validation =====

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 16;

/// Symbols a password must draw at least one character from
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&+=";

/// Upper bound on a plausible age in years
pub const MAX_AGE_YEARS: i64 = 130;

/// Upper bound on a plausible weigh-in, in pounds (100 stone)
pub const MAX_WEIGHT_POUNDS: i64 = 1_400;
