//! CalorieWizard library
//!
//! Data, persistence and password-protection core of the CalorieWizard
//! diet tracker. The UI layer drives it through `app::AppState`.

pub mod app;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod metrics;
pub mod services;
