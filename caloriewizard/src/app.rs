//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::{DATABASE_FILE_NAME, PASSWORD_KEY_ALIAS, PREFERENCES_FILE_NAME};
use crate::crypto::{KeyStore, PasswordCipher};
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::services::{AccountService, DiaryService, SessionStore, WaterService, WeightService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub repo: Repository,
    pub cipher: PasswordCipher,
    pub sessions: SessionStore,
    pub accounts: AccountService,
    pub diary: DiaryService,
    pub water: WaterService,
    pub weight: WeightService,
}

impl AppState {
    pub fn new(
        app_data_dir: PathBuf,
        repo: Repository,
        cipher: PasswordCipher,
        sessions: SessionStore,
    ) -> Self {
        Self {
            accounts: AccountService::new(repo.clone(), cipher.clone(), sessions.clone()),
            diary: DiaryService::new(repo.clone()),
            water: WaterService::new(repo.clone()),
            weight: WeightService::new(repo.clone()),
            app_data_dir,
            repo,
            cipher,
            sessions,
        }
    }
}

/// Install the tracing subscriber. Later calls leave the first one in place.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caloriewizard=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("Logging initialized");
    }
}

/// Application setup - called once on startup
pub async fn setup(app_data_dir: PathBuf, key_store: Arc<dyn KeyStore>) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", app_data_dir);

    tokio::fs::create_dir_all(&app_data_dir).await?;

    let pool = create_pool(&app_data_dir.join(DATABASE_FILE_NAME)).await?;
    let repo = Repository::new(pool);

    let cipher = PasswordCipher::new(key_store, PASSWORD_KEY_ALIAS);
    cipher.initialize()?;

    let sessions = SessionStore::new(app_data_dir.join(PREFERENCES_FILE_NAME));

    let state = AppState::new(app_data_dir, repo, cipher, sessions);

    tracing::info!("Application initialized successfully");

    Ok(state)
}
