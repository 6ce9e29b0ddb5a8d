//! Meal slot and meal entry models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FoodItem, Nutrition};

/// Meal slot of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    /// All slots in declared order; the last one absorbs allocation residuals
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Snack,
        MealSlot::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack => "snack",
            MealSlot::Dinner => "dinner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "snack" => Some(MealSlot::Snack),
            "dinner" => Some(MealSlot::Dinner),
            _ => None,
        }
    }

    /// Percent of the daily calories assigned to this slot
    pub fn percent(&self) -> i64 {
        match self {
            MealSlot::Breakfast => 30,
            MealSlot::Lunch => 40,
            MealSlot::Snack => 5,
            MealSlot::Dinner => 25,
        }
    }

    /// Fraction of the daily calories assigned to this slot
    pub fn share(&self) -> f64 {
        self.percent() as f64 / 100.0
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged meal: the items eaten in a slot at one time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    pub slot: MealSlot,
    pub items: Vec<FoodItem>,
    /// Always the sum over `items`
    pub totals: Nutrition,
    pub logged_at: DateTime<Utc>,
}

impl Meal {
    pub fn new(slot: MealSlot, items: Vec<FoodItem>, logged_at: DateTime<Utc>) -> Self {
        let mut meal = Self {
            id: Uuid::new_v4().to_string(),
            slot,
            items,
            totals: Nutrition::zero(),
            logged_at,
        };
        meal.recompute();
        meal
    }

    pub fn recompute(&mut self) {
        self.totals = self.items.iter().map(|i| &i.nutrition).sum();
    }

    /// Remove one item and recompute; returns the removed item
    pub fn remove_item(&mut self, index: usize) -> Option<FoodItem> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.recompute();
        Some(item)
    }

    pub fn total_calories(&self) -> f64 {
        self.totals.calories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_shares_sum_to_one() {
        let total: f64 = MealSlot::ALL.iter().map(|s| s.share()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_meal_totals_follow_items() {
        let mut meal = Meal::new(
            MealSlot::Lunch,
            vec![
                FoodItem::per_100g("Rice", 130.0, 2.7, 0.3, 28.0),
                FoodItem::per_100g("Chicken", 165.0, 31.0, 3.6, 0.0),
            ],
            Utc::now(),
        );
        assert!((meal.total_calories() - 295.0).abs() < 1e-9);

        let removed = meal.remove_item(0).unwrap();
        assert_eq!(removed.name, "Rice");
        assert!((meal.total_calories() - 165.0).abs() < 1e-9);
        assert!((meal.totals.protein - 31.0).abs() < 1e-9);
        assert!(meal.remove_item(5).is_none());
    }
}
