//! Input validation for account fields
//!
//! Mirrors the checks the account screens apply before anything is stored.

use crate::config::{
    INCHES_PER_FOOT, MAX_AGE_YEARS, MAX_PASSWORD_LENGTH, MAX_WEIGHT_POUNDS, MIN_PASSWORD_LENGTH,
    PASSWORD_SYMBOLS, POUNDS_PER_STONE,
};
use crate::error::{AppError, Result};
use crate::metrics::stone_to_pounds;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$"
    )
    .unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^07\d{9}$").unwrap();
}

pub fn validate_email(email: &str) -> Result<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("email: {}", email)))
    }
}

/// 8-16 characters, no whitespace, with a digit, a lower-case letter,
/// an upper-case letter and one of `!@#$%^&+=`
pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    let valid = (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len)
        && !password.chars().any(char::is_whitespace)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "password: must be {}-{} characters with upper, lower, digit and one of {}",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH, PASSWORD_SYMBOLS
        )))
    }
}

/// UK mobile number: `07` and nine more digits
pub fn validate_phone(phone: &str) -> Result<()> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("phone number: {}", phone)))
    }
}

pub fn validate_age(age: i64) -> Result<()> {
    if (1..=MAX_AGE_YEARS).contains(&age) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("age: {}", age)))
    }
}

pub fn validate_height(feet: i64, inches: i64) -> Result<()> {
    if feet > 0 && (0..INCHES_PER_FOOT).contains(&inches) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("height: {}ft {}in", feet, inches)))
    }
}

/// A stone/pounds pair with pounds below one stone
pub fn validate_weight(stone: i64, pounds: i64) -> Result<()> {
    let in_range = (0..=MAX_WEIGHT_POUNDS / POUNDS_PER_STONE).contains(&stone)
        && (0..POUNDS_PER_STONE).contains(&pounds);

    if in_range && validate_weigh_in(stone_to_pounds(stone, pounds)).is_ok() {
        Ok(())
    } else {
        Err(AppError::Validation(format!("weight: {}st {}lb", stone, pounds)))
    }
}

/// Both halves of a goal weight, or neither
pub fn validate_optional_weight(stone: Option<i64>, pounds: Option<i64>) -> Result<()> {
    match (stone, pounds) {
        (Some(stone), Some(pounds)) => validate_weight(stone, pounds),
        (None, None) => Ok(()),
        _ => Err(AppError::Validation(
            "goal weight: stone and pounds must be given together".to_string(),
        )),
    }
}

pub fn validate_weigh_in(pounds: i64) -> Result<()> {
    if pounds > 0 && pounds <= MAX_WEIGHT_POUNDS {
        Ok(())
    } else {
        Err(AppError::Validation(format!("weigh-in: {}lb", pounds)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+diet@mail.example.co.uk").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_password() {
        assert!(validate_password("Secur3P@ss").is_ok());
        assert!(validate_password("Sh0rt!").is_err());
        assert!(validate_password("ThisIsWayTooLong1!").is_err());
        assert!(validate_password("nouppercase1!").is_err());
        assert!(validate_password("NOLOWERCASE1!").is_err());
        assert!(validate_password("NoDigitsHere!").is_err());
        assert!(validate_password("NoSymbol123").is_err());
        assert!(validate_password("Has Space1!").is_err());
    }

    #[test]
    fn test_phone() {
        assert!(validate_phone("07123456789").is_ok());
        assert!(validate_phone("0712345678").is_err());
        assert!(validate_phone("08123456789").is_err());
        assert!(validate_phone("+447123456789").is_err());
    }

    #[test]
    fn test_anthropometrics() {
        assert!(validate_age(30).is_ok());
        assert!(validate_age(0).is_err());
        assert!(validate_height(5, 11).is_ok());
        assert!(validate_height(5, 12).is_err());
        assert!(validate_weight(10, 13).is_ok());
        assert!(validate_weight(10, 14).is_err());
        assert!(validate_weight(0, 0).is_err());
        assert!(validate_weight(100, 0).is_ok());
        assert!(validate_weight(100, 1).is_err());
        assert!(validate_weigh_in(154).is_ok());
        assert!(validate_weigh_in(0).is_err());
    }

    #[test]
    fn test_huge_weight_rejected_without_overflow() {
        assert!(validate_weight(i64::MAX / 2, 0).is_err());
        assert!(validate_weight(i64::MAX, 13).is_err());
        assert!(validate_weight(i64::MIN, 0).is_err());
        assert!(validate_weigh_in(i64::MAX).is_err());
    }

    #[test]
    fn test_optional_weight_pairs() {
        assert!(validate_optional_weight(None, None).is_ok());
        assert!(validate_optional_weight(Some(9), Some(7)).is_ok());
        assert!(validate_optional_weight(Some(9), None).is_err());
        assert!(validate_optional_weight(None, Some(7)).is_err());
    }
}
