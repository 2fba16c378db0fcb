//! Weight service
//!
//! Weigh-ins and BMI for the logged-in user.

use crate::database::{Repository, WeightEntry};
use crate::error::Result;
use crate::metrics::BmiReport;
use crate::services::session::Session;
use crate::services::validation;
use chrono::NaiveDate;

/// Service for weight tracking
#[derive(Clone)]
pub struct WeightService {
    repo: Repository,
}

impl WeightService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Record a weigh-in and update the current weight.
    ///
    /// Returns `false` when nothing was written; the reason is logged.
    pub async fn record_weigh_in(&self, session: &Session, pounds: i64, date: NaiveDate) -> bool {
        if let Err(e) = validation::validate_weigh_in(pounds) {
            tracing::warn!("Weigh-in rejected for user {}: {}", session.user_id, e);
            return false;
        }

        match self.repo.add_weight_entry(session.user_id, pounds, date).await {
            Ok(entry) => {
                tracing::info!(
                    "Weigh-in {} recorded for user {} on {}",
                    entry.id,
                    session.user_id,
                    date
                );
                true
            }
            Err(e) => {
                tracing::error!("Failed to record weigh-in for user {}: {}", session.user_id, e);
                false
            }
        }
    }

    /// Weigh-ins, newest first
    pub async fn history(&self, session: &Session) -> Result<Vec<WeightEntry>> {
        self.repo.get_recent_weight_entries(session.user_id).await
    }

    pub async fn bmi(&self, session: &Session) -> Result<BmiReport> {
        self.repo.calculate_bmi(session.user_id).await
    }
}
