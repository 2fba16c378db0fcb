//! Derived metrics
//!
//! Pure computations over query results: BMI and its weight band,
//! imperial/metric conversions, and nutrient totals.

use crate::config::{
    BMI_NORMAL_MIN, BMI_OBESITY_MIN, BMI_OVERWEIGHT_MIN, KG_PER_POUND, KG_PER_STONE,
    METERS_PER_FOOT, METERS_PER_INCH, POUNDS_PER_STONE,
};
use crate::database::{ConsumedFoodItem, MealType, Nutrients, UserProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Weight band for a BMI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obesity,
    /// The user is missing or has no height/weight on record
    InvalidUserData,
}

impl fmt::Display for BmiClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BmiClass::Underweight => "Underweight",
            BmiClass::Normal => "Normal weight",
            BmiClass::Overweight => "Overweight",
            BmiClass::Obesity => "Obesity",
            BmiClass::InvalidUserData => "Invalid user data",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiReport {
    pub value: f64,
    pub class: BmiClass,
}

impl BmiReport {
    pub fn invalid() -> Self {
        Self {
            value: 0.0,
            class: BmiClass::InvalidUserData,
        }
    }
}

pub fn height_in_meters(feet: i64, inches: i64) -> f64 {
    feet as f64 * METERS_PER_FOOT + inches as f64 * METERS_PER_INCH
}

pub fn weight_in_kg(stone: i64, pounds: i64) -> f64 {
    stone as f64 * KG_PER_STONE + pounds as f64 * KG_PER_POUND
}

/// Split a pound total into whole stone and remaining pounds
pub fn pounds_to_stone(pounds: i64) -> (i64, i64) {
    (pounds / POUNDS_PER_STONE, pounds % POUNDS_PER_STONE)
}

pub fn stone_to_pounds(stone: i64, pounds: i64) -> i64 {
    stone * POUNDS_PER_STONE + pounds
}

/// `kg / m²`, or zero when the height is not positive
pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    if height_m > 0.0 {
        weight_kg / (height_m * height_m)
    } else {
        0.0
    }
}

/// Band a BMI value. Bands are half-open so every value lands in one.
pub fn classify(bmi: f64) -> BmiClass {
    if bmi < BMI_NORMAL_MIN {
        BmiClass::Underweight
    } else if bmi < BMI_OVERWEIGHT_MIN {
        BmiClass::Normal
    } else if bmi < BMI_OBESITY_MIN {
        BmiClass::Overweight
    } else {
        BmiClass::Obesity
    }
}

/// BMI from a profile's stored height and current weight
pub fn bmi_for_user(user: &UserProfile) -> BmiReport {
    let (Some(feet), Some(inches), Some(stone), Some(pounds)) = (
        user.height_feet,
        user.height_inches,
        user.weight_stone,
        user.weight_pounds,
    ) else {
        return BmiReport::invalid();
    };

    let value = bmi(weight_in_kg(stone, pounds), height_in_meters(feet, inches));
    BmiReport {
        value,
        class: classify(value),
    }
}

/// Sum of the logged snapshot nutrients
pub fn daily_totals(items: &[ConsumedFoodItem]) -> Nutrients {
    items.iter().map(|i| i.nutrients).sum()
}

/// Per-meal sums; meals without items are absent
pub fn totals_by_meal(items: &[ConsumedFoodItem]) -> BTreeMap<MealType, Nutrients> {
    let mut totals: BTreeMap<MealType, Nutrients> = BTreeMap::new();
    for item in items {
        let entry = totals.entry(item.meal_type).or_default();
        *entry = *entry + item.nutrients;
    }
    totals
}
