//! Engine error types
//!
//! Every engine error is detected before any state is mutated, so a caller can
//! correct the input and retry.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::MealSlot;

/// A food entry failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Macros total {total:.2} g exceeds portion size {portion:.2} g")]
    PortionExceeded { total: f64, portion: f64 },

    #[error("Declared {declared:.1} kcal does not match {computed:.1} kcal computed from macros")]
    CalorieMismatch { declared: f64, computed: f64 },

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Invalid portion size: {0}")]
    InvalidPortion(f64),

    #[error("Cannot convert '{from}' to '{to}'")]
    IncompatibleUnit { from: String, to: String },
}

/// A profile value is outside the range the calorie formulas accept
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("Invalid profile data: {field} = {value}")]
    InvalidProfileData { field: &'static str, value: String },
}

impl ProfileError {
    pub fn invalid(field: &'static str, value: impl ToString) -> Self {
        ProfileError::InvalidProfileData {
            field,
            value: value.to_string(),
        }
    }
}

/// A food diary mutation was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiaryError {
    #[error("Diary for {0} is closed")]
    DiaryClosed(NaiveDate),

    #[error("Invalid weight: {0} (must be in (0, 500] kg)")]
    InvalidWeight(f64),

    #[error("Invalid burned calories: {0}")]
    InvalidBurn(f64),

    #[error("No {slot} entry with id {meal_id}")]
    MealNotFound { slot: MealSlot, meal_id: String },

    #[error("Entry {meal_id} has no item at index {index}")]
    ItemNotFound { meal_id: String, index: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
