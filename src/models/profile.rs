//! User profile model
//!
//! The physical data and weight goal the calorie plan is derived from.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sex as used by the Harris-Benedict equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Weight goal
///
/// Persisted with the values the mobile app writes: "lose", "maintain", "gain".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Goal {
    #[serde(rename = "lose", alias = "loss")]
    Loss,
    #[serde(rename = "maintain", alias = "maintenance")]
    Maintenance,
    #[serde(rename = "gain")]
    Gain,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Loss => "lose",
            Goal::Maintenance => "maintain",
            Goal::Gain => "gain",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lose" | "loss" => Some(Goal::Loss),
            "maintain" | "maintenance" => Some(Goal::Maintenance),
            "gain" => Some(Goal::Gain),
            _ => None,
        }
    }

    /// Multiplier applied to BMR to get the daily target
    pub fn calorie_multiplier(&self) -> f64 {
        match self {
            Goal::Loss => 0.85,
            Goal::Maintenance => 1.00,
            Goal::Gain => 1.15,
        }
    }
}

/// A validated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub goal: Goal,
}

/// Full years between `birthday` and `on`, or None if `on` is before the birthday
pub fn age_on(birthday: NaiveDate, on: NaiveDate) -> Option<u32> {
    if on < birthday {
        return None;
    }
    let mut years = on.year() - birthday.year();
    if (on.month(), on.day()) < (birthday.month(), birthday.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
