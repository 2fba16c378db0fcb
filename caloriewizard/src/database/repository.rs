//! Repository layer for database operations
//!
//! This module provides CRUD and query operations for all entities.
//! Every call acquires the store connection and releases it before
//! returning; multi-statement writes run in a transaction.

use super::models::*;
use crate::error::{AppError, Result};
use crate::metrics::{self, BmiReport};
use chrono::{Local, NaiveDate, NaiveDateTime};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const USER_COLUMNS: &str = r#"
    id, email, password, phone_number, sex, age, height_feet, height_inches,
    weight_stone, weight_pounds, goal_weight_stone, goal_weight_pounds,
    goals, weekly_goals, barriers, activity_level
"#;

const NUTRIENT_COLUMNS: &str = r#"
    calories, carbs, fats, proteins, fibre, sugar, saturated_fat,
    polyunsaturated_fat, monounsaturated_fat, cholesterol, sodium, potassium
"#;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ===== Users =====

    /// Insert a new user; the id is assigned by the store
    pub async fn add_user(&self, profile: &NewUserProfile) -> Result<UserProfile> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users (
                email, password, phone_number, sex, age, height_feet, height_inches,
                weight_stone, weight_pounds, goal_weight_stone, goal_weight_pounds,
                goals, weekly_goals, barriers, activity_level
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&profile.email)
        .bind(&profile.password)
        .bind(&profile.phone_number)
        .bind(profile.sex)
        .bind(profile.age)
        .bind(profile.height_feet)
        .bind(profile.height_inches)
        .bind(profile.weight_stone)
        .bind(profile.weight_pounds)
        .bind(profile.goal_weight_stone)
        .bind(profile.goal_weight_pounds)
        .bind(Json(&profile.goals))
        .bind(Json(&profile.weekly_goals))
        .bind(Json(&profile.barriers))
        .bind(&profile.activity_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_insert_user(e, &profile.email))?;

        tracing::debug!("Created user: {}", user.id);
        Ok(user)
    }

    /// Look up a user by exact email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Look up a user by id
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update account fields. `None` keeps the stored value.
    ///
    /// Returns whether exactly the targeted row changed; store failures are
    /// logged and reported as `false`.
    pub async fn update_user(&self, req: &UpdateUserRequest) -> bool {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, password = ?, phone_number = ?,
                age = COALESCE(?, age),
                goal_weight_stone = COALESCE(?, goal_weight_stone),
                goal_weight_pounds = COALESCE(?, goal_weight_pounds)
            WHERE id = ?
            "#,
        )
        .bind(&req.email)
        .bind(&req.password)
        .bind(&req.phone_number)
        .bind(req.age)
        .bind(req.goal_weight_stone)
        .bind(req.goal_weight_pounds)
        .bind(req.id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                tracing::debug!("Updated user {}: {} row(s)", req.id, done.rows_affected());
                done.rows_affected() == 1
            }
            Err(e) => {
                tracing::error!("Error updating user {}: {}", req.id, e);
                false
            }
        }
    }

    // ===== Food catalog =====

    /// Insert a catalog item and return its id
    pub async fn add_food_item(&self, item: &NewFoodItem) -> Result<i64> {
        if !item.nutrients.is_valid() {
            return Err(AppError::Validation(format!("nutrients for {}", item.name)));
        }

        let n = &item.nutrients;
        let id: i64 = sqlx::query_scalar(&format!(
            r#"
            INSERT INTO food_items (name, description, portion_unit, portion_size, {})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
            NUTRIENT_COLUMNS
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.portion_unit)
        .bind(item.portion_size)
        .bind(n.calories)
        .bind(n.carbs)
        .bind(n.fats)
        .bind(n.proteins)
        .bind(n.fibre)
        .bind(n.sugar)
        .bind(n.saturated_fat)
        .bind(n.polyunsaturated_fat)
        .bind(n.monounsaturated_fat)
        .bind(n.cholesterol)
        .bind(n.sodium)
        .bind(n.potassium)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Created food item: {} ({})", id, item.name);
        Ok(id)
    }

    /// Get a catalog item by id
    pub async fn get_food_item(&self, id: i64) -> Result<Option<FoodItem>> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT id, name, description, portion_unit, portion_size, {} FROM food_items WHERE id = ?",
            NUTRIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Substring search on food names, in storage order
    pub async fn search_food_items(&self, query: &str) -> Result<Vec<FoodItem>> {
        let pattern = format!("%{}%", escape_like(query));

        let items = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            SELECT id, name, description, portion_unit, portion_size, {}
            FROM food_items
            WHERE name LIKE ? ESCAPE '\'
            ORDER BY id
            "#,
            NUTRIENT_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    // ===== Food logs =====

    /// Record a logging event for a user
    pub async fn add_food_log(&self, user_id: i64, logged_at: NaiveDateTime) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_food_log(&mut *conn, user_id, logged_at).await?;

        tracing::debug!("Created food log: {} for user: {}", id, user_id);
        Ok(id)
    }

    /// Attach a consumed item to a log, copying the nutrient snapshot
    pub async fn add_food_log_item(
        &self,
        log_id: i64,
        food_id: i64,
        serving_size: f64,
        meal_type: MealType,
        snapshot: &Nutrients,
    ) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        let id = insert_food_log_item(&mut *conn, log_id, food_id, serving_size, meal_type, snapshot)
            .await?;

        tracing::debug!("Created food log item: {} in log: {}", id, log_id);
        Ok(id)
    }

    /// Write a log and its single item atomically; returns the log id
    pub async fn add_food_log_with_item(
        &self,
        user_id: i64,
        logged_at: NaiveDateTime,
        food_id: i64,
        serving_size: f64,
        meal_type: MealType,
        snapshot: &Nutrients,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let log_id = insert_food_log(&mut *tx, user_id, logged_at).await?;
        insert_food_log_item(&mut *tx, log_id, food_id, serving_size, meal_type, snapshot).await?;

        tx.commit().await?;

        tracing::debug!("Logged food {} as log {} for user {}", food_id, log_id, user_id);
        Ok(log_id)
    }

    /// Logs for the current local date
    pub async fn get_today_food_logs(&self, user_id: i64) -> Result<Vec<FoodLog>> {
        self.get_food_logs_for_date(user_id, Local::now().date_naive())
            .await
    }

    /// Logs whose timestamp falls on `date`, each hydrated with its items.
    ///
    /// Display fields come from the catalog, nutrients from the snapshot.
    pub async fn get_food_logs_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<FoodLog>> {
        let rows: Vec<(i64, i64, NaiveDateTime)> = sqlx::query_as(
            r#"
            SELECT id, user_id, logged_at FROM food_logs
            WHERE user_id = ? AND date(logged_at) = ?
            ORDER BY logged_at, id
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, ConsumedFoodItem>(
            r#"
            SELECT fli.id, fli.log_id, fli.food_id, fi.name, fi.description, fi.portion_unit,
                   fli.serving_size, fli.meal_type,
                   fli.calories, fli.carbs, fli.fats, fli.proteins, fli.fibre, fli.sugar,
                   fli.saturated_fat, fli.polyunsaturated_fat, fli.monounsaturated_fat,
                   fli.cholesterol, fli.sodium, fli.potassium
            FROM food_log_items fli
            JOIN food_items fi ON fi.id = fli.food_id
            JOIN food_logs fl ON fl.id = fli.log_id
            WHERE fl.user_id = ? AND date(fl.logged_at) = ?
            ORDER BY fli.id
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let mut logs: Vec<FoodLog> = rows
            .into_iter()
            .map(|(id, user_id, logged_at)| FoodLog {
                id,
                user_id,
                logged_at,
                items: Vec::new(),
            })
            .collect();

        for item in items {
            if let Some(log) = logs.iter_mut().find(|l| l.id == item.log_id) {
                log.items.push(item);
            }
        }

        Ok(logs)
    }

    /// Owner of a food log, if it exists
    pub async fn get_food_log_owner(&self, log_id: i64) -> Result<Option<i64>> {
        let owner = sqlx::query_scalar("SELECT user_id FROM food_logs WHERE id = ?")
            .bind(log_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    /// Remove a log; its items go with it through the foreign-key cascade
    pub async fn delete_food_log(&self, log_id: i64) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM food_logs WHERE id = ?")
            .bind(log_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted food log: {} ({} row(s))", log_id, rows);
        Ok(rows > 0)
    }

    // ===== Water intake =====

    /// Get the entry for `(user_id, date)`, creating a zero row if absent
    pub async fn get_water_intake(&self, user_id: i64, date: NaiveDate) -> Result<WaterIntakeEntry> {
        let created = sqlx::query(
            r#"
            INSERT INTO water_logs (user_id, date, glasses) VALUES (?, ?, 0)
            ON CONFLICT(user_id, date) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if created > 0 {
            tracing::debug!("Created water log for user {} on {}", user_id, date);
        }

        let entry = sqlx::query_as::<_, WaterIntakeEntry>(
            "SELECT id, user_id, date, glasses FROM water_logs WHERE user_id = ? AND date = ?",
        )
        .bind(user_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Overwrite the glass count for `(user_id, date)`
    pub async fn update_water_intake(&self, user_id: i64, date: NaiveDate, glasses: i64) -> Result<bool> {
        if glasses < 0 {
            return Err(AppError::Validation(format!("water intake: {}", glasses)));
        }

        let rows = sqlx::query("UPDATE water_logs SET glasses = ? WHERE user_id = ? AND date = ?")
            .bind(glasses)
            .bind(user_id)
            .bind(date)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    // ===== Weight =====

    /// BMI from the stored height and current weight
    pub async fn calculate_bmi(&self, user_id: i64) -> Result<BmiReport> {
        let report = match self.get_user_by_id(user_id).await? {
            Some(user) => metrics::bmi_for_user(&user),
            None => {
                tracing::debug!("No data found for user: {}", user_id);
                BmiReport::invalid()
            }
        };

        tracing::debug!("BMI for user {}: {:.1} ({})", user_id, report.value, report.class);
        Ok(report)
    }

    /// Record a weigh-in and move the user's current weight to it.
    ///
    /// Both writes commit together or not at all.
    pub async fn add_weight_entry(
        &self,
        user_id: i64,
        weight_pounds: i64,
        date: NaiveDate,
    ) -> Result<WeightEntry> {
        let mut tx = self.pool.begin().await?;

        let entry = sqlx::query_as::<_, WeightEntry>(
            r#"
            INSERT INTO weight_entries (user_id, weight_pounds, date)
            VALUES (?, ?, ?)
            RETURNING id, user_id, weight_pounds, date
            "#,
        )
        .bind(user_id)
        .bind(weight_pounds)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        let (stone, pounds) = metrics::pounds_to_stone(weight_pounds);
        let rows = sqlx::query("UPDATE users SET weight_stone = ?, weight_pounds = ? WHERE id = ?")
            .bind(stone)
            .bind(pounds)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows != 1 {
            // Dropping the transaction rolls back the insert
            return Err(AppError::UserNotFound(user_id));
        }

        tx.commit().await?;

        tracing::debug!("Recorded weigh-in {} for user {}: {} lb", entry.id, user_id, weight_pounds);
        Ok(entry)
    }

    /// All weigh-ins for a user, newest date first
    pub async fn get_recent_weight_entries(&self, user_id: i64) -> Result<Vec<WeightEntry>> {
        let entries = sqlx::query_as::<_, WeightEntry>(
            r#"
            SELECT id, user_id, weight_pounds, date FROM weight_entries
            WHERE user_id = ?
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

async fn insert_food_log(
    conn: &mut SqliteConnection,
    user_id: i64,
    logged_at: NaiveDateTime,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar("INSERT INTO food_logs (user_id, logged_at) VALUES (?, ?) RETURNING id")
        .bind(user_id)
        .bind(logged_at)
        .fetch_one(conn)
        .await?;

    Ok(id)
}

async fn insert_food_log_item(
    conn: &mut SqliteConnection,
    log_id: i64,
    food_id: i64,
    serving_size: f64,
    meal_type: MealType,
    n: &Nutrients,
) -> Result<i64> {
    if !n.is_valid() {
        return Err(AppError::Validation("nutrient snapshot".to_string()));
    }

    let id: i64 = sqlx::query_scalar(&format!(
        r#"
        INSERT INTO food_log_items (log_id, food_id, serving_size, meal_type, {})
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
        NUTRIENT_COLUMNS
    ))
    .bind(log_id)
    .bind(food_id)
    .bind(serving_size)
    .bind(meal_type)
    .bind(n.calories)
    .bind(n.carbs)
    .bind(n.fats)
    .bind(n.proteins)
    .bind(n.fibre)
    .bind(n.sugar)
    .bind(n.saturated_fat)
    .bind(n.polyunsaturated_fat)
    .bind(n.monounsaturated_fat)
    .bind(n.cholesterol)
    .bind(n.sodium)
    .bind(n.potassium)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

/// Escape LIKE wildcards so the query matches literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
