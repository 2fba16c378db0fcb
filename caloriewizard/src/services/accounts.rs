//! Accounts service
//!
//! Account creation, login and profile maintenance. Passwords are
//! encrypted with the password cipher before they reach the store and
//! are never logged.

use crate::crypto::PasswordCipher;
use crate::database::{NewUserProfile, Repository, Sex, UpdateUserRequest, UserProfile};
use crate::error::{AppError, Result};
use crate::services::session::{Session, SessionStore};
use crate::services::validation;
use serde::Deserialize;

/// Account details gathered across the sign-up steps
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountDraft {
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub sex: Option<Sex>,
    pub age: Option<i64>,
    pub height_feet: Option<i64>,
    pub height_inches: Option<i64>,
    pub weight_stone: Option<i64>,
    pub weight_pounds: Option<i64>,
    pub goal_weight_stone: Option<i64>,
    pub goal_weight_pounds: Option<i64>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub weekly_goals: Vec<String>,
    #[serde(default)]
    pub barriers: Vec<String>,
    pub activity_level: Option<String>,
}

impl AccountDraft {
    /// Required fields that are still unset
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("email", self.email.is_some()),
            ("password", self.password.is_some()),
            ("phone number", self.phone_number.is_some()),
            ("sex", self.sex.is_some()),
            ("age", self.age.is_some()),
            (
                "height",
                self.height_feet.is_some() && self.height_inches.is_some(),
            ),
            (
                "weight",
                self.weight_stone.is_some() && self.weight_pounds.is_some(),
            ),
            (
                "goal weight",
                self.goal_weight_stone.is_some() && self.goal_weight_pounds.is_some(),
            ),
        ];

        checks
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Fields editable from the account screen. `None` keeps the stored value.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUpdate {
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub age: Option<i64>,
    pub goal_weight_stone: Option<i64>,
    pub goal_weight_pounds: Option<i64>,
}

/// Service for account lifecycle
#[derive(Clone)]
pub struct AccountService {
    repo: Repository,
    cipher: PasswordCipher,
    sessions: SessionStore,
}

impl AccountService {
    pub fn new(repo: Repository, cipher: PasswordCipher, sessions: SessionStore) -> Self {
        Self {
            repo,
            cipher,
            sessions,
        }
    }

    /// Validate a completed draft and store the account
    pub async fn create_account(&self, draft: AccountDraft) -> Result<UserProfile> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            tracing::warn!("Account draft incomplete: {:?}", missing);
            return Err(AppError::Validation(format!(
                "account: missing {}",
                missing.join(", ")
            )));
        }

        let (
            Some(email),
            Some(password),
            Some(phone_number),
            Some(age),
            Some(height_feet),
            Some(height_inches),
            Some(weight_stone),
            Some(weight_pounds),
            Some(goal_weight_stone),
            Some(goal_weight_pounds),
        ) = (
            draft.email,
            draft.password,
            draft.phone_number,
            draft.age,
            draft.height_feet,
            draft.height_inches,
            draft.weight_stone,
            draft.weight_pounds,
            draft.goal_weight_stone,
            draft.goal_weight_pounds,
        )
        else {
            return Err(AppError::Validation("account: incomplete".to_string()));
        };

        validation::validate_email(&email)?;
        validation::validate_password(&password)?;
        validation::validate_phone(&phone_number)?;
        validation::validate_age(age)?;
        validation::validate_height(height_feet, height_inches)?;
        validation::validate_weight(weight_stone, weight_pounds)?;
        validation::validate_weight(goal_weight_stone, goal_weight_pounds)?;

        tracing::info!("Creating account for {}", email);

        self.cipher.initialize()?;
        let encrypted = self.cipher.encrypt_to_base64(&password)?;

        let profile = NewUserProfile {
            email,
            password: encrypted,
            phone_number,
            sex: draft.sex,
            age: Some(age),
            height_feet: Some(height_feet),
            height_inches: Some(height_inches),
            weight_stone: Some(weight_stone),
            weight_pounds: Some(weight_pounds),
            goal_weight_stone: Some(goal_weight_stone),
            goal_weight_pounds: Some(goal_weight_pounds),
            goals: draft.goals,
            weekly_goals: draft.weekly_goals,
            barriers: draft.barriers,
            activity_level: draft.activity_level,
        };

        let user = self.repo.add_user(&profile).await?;

        tracing::info!("Account created: {}", user.id);
        Ok(user)
    }

    /// Check credentials and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            tracing::warn!("Login rejected for unknown email {}", email);
            return Err(AppError::InvalidCredentials);
        };

        let stored = self.cipher.decrypt_from_base64(&user.password)?;
        if stored != password {
            tracing::warn!("Login rejected for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        self.sessions.begin(user.id).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.sessions.clear().await
    }

    /// Apply account-screen edits.
    ///
    /// Invalid input is an error; `Ok(false)` means the store did not
    /// change exactly one row.
    pub async fn update_account(&self, session: &Session, update: AccountUpdate) -> Result<bool> {
        validation::validate_email(&update.email)?;
        validation::validate_password(&update.password)?;
        validation::validate_phone(&update.phone_number)?;
        if let Some(age) = update.age {
            validation::validate_age(age)?;
        }
        validation::validate_optional_weight(update.goal_weight_stone, update.goal_weight_pounds)?;

        let req = UpdateUserRequest {
            id: session.user_id,
            email: update.email,
            password: self.cipher.encrypt_to_base64(&update.password)?,
            phone_number: update.phone_number,
            age: update.age,
            goal_weight_stone: update.goal_weight_stone,
            goal_weight_pounds: update.goal_weight_pounds,
        };

        let updated = self.repo.update_user(&req).await;
        if updated {
            tracing::info!("Account updated: {}", session.user_id);
        }
        Ok(updated)
    }

    /// Decrypt the stored password for display on the account screen
    pub async fn reveal_password(&self, session: &Session) -> Result<String> {
        let user = self.profile(session).await?;
        self.cipher.decrypt_from_base64(&user.password)
    }

    pub async fn profile(&self, session: &Session) -> Result<UserProfile> {
        self.repo
            .get_user_by_id(session.user_id)
            .await?
            .ok_or(AppError::UserNotFound(session.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MemoryKeyStore;
    use crate::database::create_memory_pool;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn create_test_service() -> (AccountService, TempDir) {
        let pool = create_memory_pool().await.unwrap();
        let temp_dir = TempDir::new().unwrap();

        let repo = Repository::new(pool);
        let cipher = PasswordCipher::new(Arc::new(MemoryKeyStore::new()), "test_key");
        let sessions = SessionStore::new(temp_dir.path().join("app_prefs.json"));

        (AccountService::new(repo, cipher, sessions), temp_dir)
    }

    fn complete_draft(email: &str) -> AccountDraft {
        AccountDraft {
            email: Some(email.to_string()),
            password: Some("Secur3P@ss".to_string()),
            phone_number: Some("07123456789".to_string()),
            sex: Some(Sex::Female),
            age: Some(34),
            height_feet: Some(5),
            height_inches: Some(8),
            weight_stone: Some(10),
            weight_pounds: Some(0),
            goal_weight_stone: Some(9),
            goal_weight_pounds: Some(7),
            goals: vec!["Lose weight".to_string()],
            weekly_goals: vec!["Lose 1 lb per week".to_string()],
            barriers: vec!["Lack of time".to_string()],
            activity_level: Some("Lightly active".to_string()),
        }
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            AccountDraft::default().missing_fields(),
            vec![
                "email",
                "password",
                "phone number",
                "sex",
                "age",
                "height",
                "weight",
                "goal weight"
            ]
        );

        let mut draft = complete_draft("a@b.com");
        assert!(draft.missing_fields().is_empty());

        draft.height_inches = None;
        assert_eq!(draft.missing_fields(), vec!["height"]);
    }

    #[tokio::test]
    async fn test_create_account_encrypts_password() {
        let (service, _temp) = create_test_service().await;

        let user = service.create_account(complete_draft("a@b.com")).await.unwrap();

        assert_eq!(user.email, "a@b.com");
        assert_ne!(user.password, "Secur3P@ss");
        assert_eq!(user.goals.0, vec!["Lose weight".to_string()]);
        assert_eq!(
            service.cipher.decrypt_from_base64(&user.password).unwrap(),
            "Secur3P@ss"
        );
    }

    #[tokio::test]
    async fn test_incomplete_draft_rejected() {
        let (service, _temp) = create_test_service().await;

        let mut draft = complete_draft("a@b.com");
        draft.age = None;

        let result = service.create_account(draft).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_invalid_password_rejected() {
        let (service, _temp) = create_test_service().await;

        let mut draft = complete_draft("a@b.com");
        draft.password = Some("password".to_string());

        let result = service.create_account(draft).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (service, _temp) = create_test_service().await;

        service.create_account(complete_draft("a@b.com")).await.unwrap();
        let result = service.create_account(complete_draft("a@b.com")).await;

        assert!(matches!(result, Err(AppError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (service, _temp) = create_test_service().await;
        let user = service.create_account(complete_draft("a@b.com")).await.unwrap();

        let session = service.login("a@b.com", "Secur3P@ss").await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(service.sessions.current().await.unwrap(), Some(session));

        service.logout().await.unwrap();
        assert_eq!(service.sessions.current().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (service, _temp) = create_test_service().await;
        service.create_account(complete_draft("a@b.com")).await.unwrap();

        let wrong_password = service.login("a@b.com", "Wr0ngP@ss").await;
        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));

        let unknown = service.login("nobody@b.com", "Secur3P@ss").await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));

        assert_eq!(service.sessions.current().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_account() {
        let (service, _temp) = create_test_service().await;
        service.create_account(complete_draft("a@b.com")).await.unwrap();
        let session = service.login("a@b.com", "Secur3P@ss").await.unwrap();

        let update = AccountUpdate {
            email: "new@b.com".to_string(),
            password: "N3wP@ssword".to_string(),
            phone_number: "07987654321".to_string(),
            age: Some(35),
            goal_weight_stone: Some(9),
            goal_weight_pounds: Some(0),
        };
        assert!(service.update_account(&session, update).await.unwrap());

        let profile = service.profile(&session).await.unwrap();
        assert_eq!(profile.email, "new@b.com");
        assert_eq!(profile.phone_number, "07987654321");
        assert_eq!(profile.age, Some(35));
        assert_eq!(profile.goal_weight_pounds, Some(0));
        assert_eq!(service.reveal_password(&session).await.unwrap(), "N3wP@ssword");

        assert!(service.login("new@b.com", "N3wP@ssword").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_unset_fields() {
        let (service, _temp) = create_test_service().await;
        service.create_account(complete_draft("a@b.com")).await.unwrap();
        let session = service.login("a@b.com", "Secur3P@ss").await.unwrap();

        let half_goal = AccountUpdate {
            email: "a@b.com".to_string(),
            password: "Secur3P@ss".to_string(),
            phone_number: "07123456789".to_string(),
            age: None,
            goal_weight_stone: Some(9),
            goal_weight_pounds: None,
        };
        let result = service.update_account(&session, half_goal.clone()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let no_changes = AccountUpdate {
            goal_weight_stone: None,
            ..half_goal
        };
        assert!(service.update_account(&session, no_changes).await.unwrap());

        let profile = service.profile(&session).await.unwrap();
        assert_eq!(profile.age, Some(34));
        assert_eq!(profile.goal_weight_stone, Some(9));
        assert_eq!(profile.goal_weight_pounds, Some(7));
    }

    #[tokio::test]
    async fn test_update_unknown_user_returns_false() {
        let (service, _temp) = create_test_service().await;
        service.cipher.initialize().unwrap();

        let update = AccountUpdate {
            email: "x@b.com".to_string(),
            password: "Secur3P@ss".to_string(),
            phone_number: "07123456789".to_string(),
            age: None,
            goal_weight_stone: None,
            goal_weight_pounds: None,
        };

        let updated = service
            .update_account(&Session { user_id: 999 }, update)
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_profile_for_missing_user() {
        let (service, _temp) = create_test_service().await;

        let result = service.profile(&Session { user_id: 42 }).await;
        assert!(matches!(result, Err(AppError::UserNotFound(42))));
    }
}
