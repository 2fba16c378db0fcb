//! Session service
//!
//! Persists the logged-in user id in a JSON preference file. The id is
//! handed to callers as an explicit `Session` value.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Preferences kept between launches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppPreferences {
    #[serde(default)]
    pub current_user_id: Option<i64>,
}

/// A logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
}

/// Service for loading and saving the current session
#[derive(Clone)]
pub struct SessionStore {
    prefs_path: PathBuf,
}

impl SessionStore {
    pub fn new(prefs_path: PathBuf) -> Self {
        Self { prefs_path }
    }

    /// Load preferences from disk or create defaults if not present
    pub async fn load(&self) -> Result<AppPreferences> {
        if !self.prefs_path.exists() {
            tracing::info!("Preferences file not found, creating defaults");
            let default = AppPreferences::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.prefs_path).await?;
        let prefs: AppPreferences = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse preferences: {}", e)))?;

        Ok(prefs)
    }

    /// Save preferences to disk
    pub async fn save(&self, prefs: &AppPreferences) -> Result<()> {
        let content = serde_json::to_string_pretty(prefs)?;

        fs::write(&self.prefs_path, content).await?;
        tracing::debug!("Preferences saved to {:?}", self.prefs_path);

        Ok(())
    }

    /// The persisted session, if someone is logged in
    pub async fn current(&self) -> Result<Option<Session>> {
        let prefs = self.load().await?;
        Ok(prefs.current_user_id.map(|user_id| Session { user_id }))
    }

    /// The persisted session, or `NotLoggedIn`
    pub async fn require(&self) -> Result<Session> {
        self.current().await?.ok_or(AppError::NotLoggedIn)
    }

    /// Persist `user_id` as the logged-in user
    pub async fn begin(&self, user_id: i64) -> Result<Session> {
        let mut prefs = self.load().await?;
        prefs.current_user_id = Some(user_id);
        self.save(&prefs).await?;

        tracing::info!("Session started for user {}", user_id);
        Ok(Session { user_id })
    }

    /// Forget the logged-in user
    pub async fn clear(&self) -> Result<()> {
        let mut prefs = self.load().await?;
        prefs.current_user_id = None;
        self.save(&prefs).await?;

        tracing::info!("Session cleared");
        Ok(())
    }
}
