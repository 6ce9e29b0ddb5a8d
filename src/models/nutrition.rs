//! Calorie and macronutrient amounts
//!
//! Used by food items, meal entries and the diary totals.

use serde::{Deserialize, Serialize};

/// kcal per gram of protein
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
/// kcal per gram of fat
pub const KCAL_PER_G_FAT: f64 = 9.0;
/// kcal per gram of carbohydrate
pub const KCAL_PER_G_CARBS: f64 = 4.0;

/// Calories plus the three macros, all for the same amount of food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub fat: f64,     // grams
    pub carbs: f64,   // grams
}

impl Nutrition {
    pub fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            calories,
            protein,
            fat,
            carbs,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale all values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            carbs: self.carbs * multiplier,
        }
    }

    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }

    /// Grams of macros, used against the portion size
    pub fn macro_grams(&self) -> f64 {
        self.protein + self.fat + self.carbs
    }

    /// Energy implied by the macros (4/9/4 kcal per gram)
    pub fn macro_calories(&self) -> f64 {
        self.protein * KCAL_PER_G_PROTEIN + self.fat * KCAL_PER_G_FAT + self.carbs * KCAL_PER_G_CARBS
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + *n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_calories() {
        let n = Nutrition::new(0.0, 10.0, 5.0, 20.0);
        assert!((n.macro_calories() - 165.0).abs() < 1e-9);
        assert!((n.macro_grams() - 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_and_scale() {
        let a = Nutrition::new(100.0, 1.0, 2.0, 3.0);
        let b = Nutrition::new(50.0, 4.0, 5.0, 6.0);
        let total: Nutrition = [a, b].iter().sum();
        assert_eq!(total, Nutrition::new(150.0, 5.0, 7.0, 9.0));
        assert_eq!(a * 2.0, Nutrition::new(200.0, 2.0, 4.0, 6.0));
    }
}
