//! Food item model
//!
//! A product or recipe portion as supplied by the caller. Composition comes from
//! outside the engine, one item at a time.

use serde::{Deserialize, Serialize};

use super::Nutrition;

/// A food item with nutrition for its declared portion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    /// Nutrition for `portion_size` of `portion_unit`
    pub nutrition: Nutrition,
    pub portion_size: f64,
    #[serde(default = "default_portion_unit")]
    pub portion_unit: String,
}

fn default_portion_unit() -> String {
    "g".to_string()
}

impl FoodItem {
    /// Create an item declared per 100 g
    pub fn per_100g(name: &str, calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            name: name.to_string(),
            nutrition: Nutrition::new(calories, protein, fat, carbs),
            portion_size: 100.0,
            portion_unit: default_portion_unit(),
        }
    }

    pub fn calories(&self) -> f64 {
        self.nutrition.calories
    }
}
