//! Water intake service

use crate::database::{Repository, WaterIntakeEntry};
use crate::error::Result;
use crate::services::session::Session;
use chrono::Local;

/// Service for the daily glass counter
#[derive(Clone)]
pub struct WaterService {
    repo: Repository,
}

impl WaterService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Today's entry, created at zero on first access
    pub async fn today(&self, session: &Session) -> Result<WaterIntakeEntry> {
        self.repo
            .get_water_intake(session.user_id, Local::now().date_naive())
            .await
    }

    pub async fn increase(&self, session: &Session) -> Result<WaterIntakeEntry> {
        self.adjust(session, 1).await
    }

    /// Remove one glass; a count of zero stays at zero
    pub async fn decrease(&self, session: &Session) -> Result<WaterIntakeEntry> {
        self.adjust(session, -1).await
    }

    async fn adjust(&self, session: &Session, delta: i64) -> Result<WaterIntakeEntry> {
        let mut entry = self.today(session).await?;

        let glasses = (entry.glasses + delta).max(0);
        if glasses == entry.glasses {
            return Ok(entry);
        }

        self.repo
            .update_water_intake(session.user_id, entry.date, glasses)
            .await?;
        entry.glasses = glasses;

        tracing::debug!(
            "Water intake for user {} on {}: {} glass(es)",
            session.user_id,
            entry.date,
            glasses
        );
        Ok(entry)
    }
}
