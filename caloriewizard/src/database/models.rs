//! Database models
//!
//! Rust structs representing database entities.
//! All models use serde for serialization to the UI layer.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;

/// Biological sex used for profile display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Sex {
    Male,
    Female,
}

/// Registered account with anthropometrics and goals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    /// Base64 of `iv || ciphertext`, never the plain password
    pub password: String,
    pub phone_number: String,
    pub sex: Option<Sex>,
    pub age: Option<i64>,
    pub height_feet: Option<i64>,
    pub height_inches: Option<i64>,
    pub weight_stone: Option<i64>,
    pub weight_pounds: Option<i64>,
    pub goal_weight_stone: Option<i64>,
    pub goal_weight_pounds: Option<i64>,
    pub goals: Json<Vec<String>>,
    pub weekly_goals: Json<Vec<String>>,
    pub barriers: Json<Vec<String>>,
    pub activity_level: Option<String>,
}

/// Insert payload for a new account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserProfile {
    pub email: String,
    /// Already-encrypted password (base64)
    pub password: String,
    pub phone_number: String,
    pub sex: Option<Sex>,
    pub age: Option<i64>,
    pub height_feet: Option<i64>,
    pub height_inches: Option<i64>,
    pub weight_stone: Option<i64>,
    pub weight_pounds: Option<i64>,
    pub goal_weight_stone: Option<i64>,
    pub goal_weight_pounds: Option<i64>,
    pub goals: Vec<String>,
    pub weekly_goals: Vec<String>,
    pub barriers: Vec<String>,
    pub activity_level: Option<String>,
}

/// Update account request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i64,
    pub email: String,
    /// Already-encrypted password (base64)
    pub password: String,
    pub phone_number: String,
    pub age: Option<i64>,
    pub goal_weight_stone: Option<i64>,
    pub goal_weight_pounds: Option<i64>,
}

/// Calorie count plus the eleven tracked nutrients.
///
/// Masses are grams except cholesterol, sodium and potassium (milligrams).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Nutrients {
    pub calories: i64,
    pub carbs: f64,
    pub fats: f64,
    pub proteins: f64,
    pub fibre: f64,
    pub sugar: f64,
    pub saturated_fat: f64,
    pub polyunsaturated_fat: f64,
    pub monounsaturated_fat: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub potassium: f64,
}

impl Nutrients {
    fn reals(&self) -> [f64; 11] {
        [
            self.carbs,
            self.fats,
            self.proteins,
            self.fibre,
            self.sugar,
            self.saturated_fat,
            self.polyunsaturated_fat,
            self.monounsaturated_fat,
            self.cholesterol,
            self.sodium,
            self.potassium,
        ]
    }

    /// True when every field is finite and non-negative
    pub fn is_valid(&self) -> bool {
        self.calories >= 0 && self.reals().iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Scale a portion's nutrients by `factor`. Calories are truncated.
    pub fn scale(&self, factor: f64) -> Nutrients {
        Nutrients {
            calories: (self.calories as f64 * factor) as i64,
            carbs: self.carbs * factor,
            fats: self.fats * factor,
            proteins: self.proteins * factor,
            fibre: self.fibre * factor,
            sugar: self.sugar * factor,
            saturated_fat: self.saturated_fat * factor,
            polyunsaturated_fat: self.polyunsaturated_fat * factor,
            monounsaturated_fat: self.monounsaturated_fat * factor,
            cholesterol: self.cholesterol * factor,
            sodium: self.sodium * factor,
            potassium: self.potassium * factor,
        }
    }
}

impl std::ops::Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
            proteins: self.proteins + rhs.proteins,
            fibre: self.fibre + rhs.fibre,
            sugar: self.sugar + rhs.sugar,
            saturated_fat: self.saturated_fat + rhs.saturated_fat,
            polyunsaturated_fat: self.polyunsaturated_fat + rhs.polyunsaturated_fat,
            monounsaturated_fat: self.monounsaturated_fat + rhs.monounsaturated_fat,
            cholesterol: self.cholesterol + rhs.cholesterol,
            sodium: self.sodium + rhs.sodium,
            potassium: self.potassium + rhs.potassium,
        }
    }
}

impl std::iter::Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Nutrients {
        iter.fold(Nutrients::default(), |acc, n| acc + n)
    }
}

/// Reusable food catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// e.g. "g", "ml", "slice"
    pub portion_unit: String,
    pub portion_size: f64,
    #[sqlx(flatten)]
    pub nutrients: Nutrients,
}

/// Create food item request
#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodItem {
    pub name: String,
    pub description: String,
    pub portion_unit: String,
    pub portion_size: f64,
    pub nutrients: Nutrients,
}

/// Diary section a logged item belongs to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack1,
    Snack2,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack1 => "snack1",
            MealType::Snack2 => "snack2",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged line item: catalog display fields joined with the nutrient
/// snapshot taken when it was logged
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsumedFoodItem {
    pub id: i64,
    pub log_id: i64,
    pub food_id: i64,
    pub name: String,
    pub description: String,
    pub portion_unit: String,
    pub serving_size: f64,
    pub meal_type: MealType,
    #[sqlx(flatten)]
    pub nutrients: Nutrients,
}

/// One logging event with its consumed items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: i64,
    pub user_id: i64,
    pub logged_at: NaiveDateTime,
    pub items: Vec<ConsumedFoodItem>,
}

/// Glasses of water drunk by a user on a calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WaterIntakeEntry {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub glasses: i64,
}

/// A single weigh-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WeightEntry {
    pub id: i64,
    pub user_id: i64,
    pub weight_pounds: i64,
    pub date: NaiveDate,
}
