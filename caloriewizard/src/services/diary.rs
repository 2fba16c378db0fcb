//! Diary service
//!
//! Food search, logging and the day's totals. Logged items carry a
//! nutrient snapshot scaled to the serving eaten, so later catalog edits
//! do not rewrite history.

use crate::database::{FoodItem, FoodLog, MealType, NewFoodItem, Nutrients, Repository};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::session::Session;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// One day of a user's diary
#[derive(Debug, Clone, Serialize)]
pub struct DiaryDay {
    pub date: NaiveDate,
    pub logs: Vec<FoodLog>,
    pub totals: Nutrients,
    pub by_meal: BTreeMap<MealType, Nutrients>,
}

/// Service for the food diary
#[derive(Clone)]
pub struct DiaryService {
    repo: Repository,
}

impl DiaryService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    pub async fn search_foods(&self, query: &str) -> Result<Vec<FoodItem>> {
        self.repo.search_food_items(query).await
    }

    /// Add an item to the shared catalog
    pub async fn create_food(&self, item: NewFoodItem) -> Result<FoodItem> {
        if item.name.trim().is_empty() {
            return Err(AppError::Validation("food name: empty".to_string()));
        }
        if !(item.portion_size.is_finite() && item.portion_size > 0.0) {
            return Err(AppError::Validation(format!(
                "portion size: {}",
                item.portion_size
            )));
        }

        tracing::info!("Creating food item: {}", item.name);

        let id = self.repo.add_food_item(&item).await?;
        self.repo
            .get_food_item(id)
            .await?
            .ok_or(AppError::FoodItemNotFound(id))
    }

    /// Log `serving_size` of a catalog item; returns the new log id
    pub async fn log_food(
        &self,
        session: &Session,
        food_id: i64,
        serving_size: f64,
        meal_type: MealType,
    ) -> Result<i64> {
        if !(serving_size.is_finite() && serving_size > 0.0) {
            return Err(AppError::Validation(format!("serving size: {}", serving_size)));
        }

        let food = self
            .repo
            .get_food_item(food_id)
            .await?
            .ok_or(AppError::FoodItemNotFound(food_id))?;

        let snapshot = food.nutrients.scale(serving_size / food.portion_size);

        let log_id = self
            .repo
            .add_food_log_with_item(
                session.user_id,
                Local::now().naive_local(),
                food.id,
                serving_size,
                meal_type,
                &snapshot,
            )
            .await?;

        tracing::info!(
            "Logged {} {} of {} to {} for user {}",
            serving_size,
            food.portion_unit,
            food.name,
            meal_type,
            session.user_id
        );

        Ok(log_id)
    }

    /// Create a catalog item and log one portion of it
    pub async fn log_custom_food(
        &self,
        session: &Session,
        item: NewFoodItem,
        meal_type: MealType,
    ) -> Result<i64> {
        let food = self.create_food(item).await?;
        self.log_food(session, food.id, food.portion_size, meal_type)
            .await
    }

    /// Today's logs with totals
    pub async fn today(&self, session: &Session) -> Result<DiaryDay> {
        self.day(session, Local::now().date_naive()).await
    }

    pub async fn day(&self, session: &Session, date: NaiveDate) -> Result<DiaryDay> {
        let logs = self
            .repo
            .get_food_logs_for_date(session.user_id, date)
            .await?;

        let items: Vec<_> = logs.iter().flat_map(|l| l.items.iter().cloned()).collect();

        Ok(DiaryDay {
            date,
            totals: metrics::daily_totals(&items),
            by_meal: metrics::totals_by_meal(&items),
            logs,
        })
    }

    /// Remove one of the session user's logs.
    ///
    /// Logs owned by another user are left alone and report `false`.
    pub async fn remove_entry(&self, session: &Session, log_id: i64) -> Result<bool> {
        match self.repo.get_food_log_owner(log_id).await? {
            Some(owner) if owner == session.user_id => {
                tracing::info!("Removing food log {} for user {}", log_id, owner);
                self.repo.delete_food_log(log_id).await
            }
            Some(owner) => {
                tracing::warn!(
                    "User {} tried to remove food log {} owned by {}",
                    session.user_id,
                    log_id,
                    owner
                );
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, NewUserProfile};

    async fn create_test_service() -> (DiaryService, Repository) {
        let pool = create_memory_pool().await.unwrap();
        let repo = Repository::new(pool);
        (DiaryService::new(repo.clone()), repo)
    }

    async fn create_user(repo: &Repository, email: &str) -> Session {
        let user = repo
            .add_user(&NewUserProfile {
                email: email.to_string(),
                password: "c2VjcmV0".to_string(),
                phone_number: "07123456789".to_string(),
                ..NewUserProfile::default()
            })
            .await
            .unwrap();
        Session { user_id: user.id }
    }

    fn oats() -> NewFoodItem {
        NewFoodItem {
            name: "Porridge oats".to_string(),
            description: "Rolled oats".to_string(),
            portion_unit: "g".to_string(),
            portion_size: 40.0,
            nutrients: Nutrients {
                calories: 150,
                carbs: 24.0,
                fats: 3.2,
                proteins: 4.4,
                fibre: 3.6,
                sodium: 2.0,
                potassium: 140.0,
                ..Nutrients::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_and_search_food() {
        let (service, _repo) = create_test_service().await;

        let food = service.create_food(oats()).await.unwrap();
        assert_eq!(food.name, "Porridge oats");

        let found = service.search_foods("OATS").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, food.id);

        assert!(service.search_foods("banana").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_food_rejects_bad_portion() {
        let (service, _repo) = create_test_service().await;

        let mut item = oats();
        item.portion_size = 0.0;

        let result = service.create_food(item).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_log_food_scales_snapshot() {
        let (service, repo) = create_test_service().await;
        let session = create_user(&repo, "a@b.com").await;
        let food = service.create_food(oats()).await.unwrap();

        service
            .log_food(&session, food.id, 60.0, MealType::Breakfast)
            .await
            .unwrap();

        let day = service.today(&session).await.unwrap();
        assert_eq!(day.logs.len(), 1);

        let item = &day.logs[0].items[0];
        assert_eq!(item.serving_size, 60.0);
        assert_eq!(item.meal_type, MealType::Breakfast);
        assert_eq!(item.nutrients.calories, 225);
        assert_eq!(item.nutrients.carbs, 36.0);
        assert_eq!(item.nutrients.potassium, 210.0);
        assert_eq!(item.nutrients.sodium, 3.0);

        assert_eq!(day.totals.calories, 225);
        assert_eq!(day.by_meal[&MealType::Breakfast].calories, 225);
    }

    #[tokio::test]
    async fn test_log_unknown_food() {
        let (service, repo) = create_test_service().await;
        let session = create_user(&repo, "a@b.com").await;

        let result = service.log_food(&session, 99, 10.0, MealType::Lunch).await;
        assert!(matches!(result, Err(AppError::FoodItemNotFound(99))));
        assert!(service.today(&session).await.unwrap().logs.is_empty());
    }

    #[tokio::test]
    async fn test_log_custom_food_and_totals() {
        let (service, repo) = create_test_service().await;
        let session = create_user(&repo, "a@b.com").await;

        service
            .log_custom_food(&session, oats(), MealType::Breakfast)
            .await
            .unwrap();

        let mut sandwich = oats();
        sandwich.name = "Ham sandwich".to_string();
        sandwich.portion_unit = "sandwich".to_string();
        sandwich.portion_size = 1.0;
        sandwich.nutrients.calories = 320;
        service
            .log_custom_food(&session, sandwich, MealType::Lunch)
            .await
            .unwrap();

        let day = service.today(&session).await.unwrap();
        assert_eq!(day.logs.len(), 2);
        assert_eq!(day.totals.calories, 470);
        assert_eq!(day.by_meal[&MealType::Breakfast].calories, 150);
        assert_eq!(day.by_meal[&MealType::Lunch].calories, 320);
        assert!(!day.by_meal.contains_key(&MealType::Dinner));
    }

    #[tokio::test]
    async fn test_days_are_per_user() {
        let (service, repo) = create_test_service().await;
        let alice = create_user(&repo, "alice@b.com").await;
        let bob = create_user(&repo, "bob@b.com").await;

        service
            .log_custom_food(&alice, oats(), MealType::Snack1)
            .await
            .unwrap();

        assert_eq!(service.today(&alice).await.unwrap().logs.len(), 1);
        assert!(service.today(&bob).await.unwrap().logs.is_empty());
    }

    #[tokio::test]
    async fn test_remove_entry_checks_owner() {
        let (service, repo) = create_test_service().await;
        let alice = create_user(&repo, "alice@b.com").await;
        let bob = create_user(&repo, "bob@b.com").await;

        let log_id = service
            .log_custom_food(&alice, oats(), MealType::Dinner)
            .await
            .unwrap();

        assert!(!service.remove_entry(&bob, log_id).await.unwrap());
        assert_eq!(service.today(&alice).await.unwrap().logs.len(), 1);

        assert!(service.remove_entry(&alice, log_id).await.unwrap());
        assert!(service.today(&alice).await.unwrap().logs.is_empty());

        assert!(!service.remove_entry(&alice, log_id).await.unwrap());
    }
}
