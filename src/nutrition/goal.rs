//! Daily calorie and macro targets
//!
//! Harris-Benedict BMR, scaled by the weight goal, then split 30/30/40 into
//! protein, fat and carbohydrate grams.

use serde::Serialize;

use crate::error::ProfileError;
use crate::models::{Gender, Goal, UserProfile, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

pub const MAX_WEIGHT_KG: f64 = 500.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MAX_AGE: u32 = 120;

/// Share of daily calories from each macro
pub const PROTEIN_SHARE: f64 = 0.30;
pub const FAT_SHARE: f64 = 0.30;
pub const CARBS_SHARE: f64 = 0.40;

/// Planned weight change per week, in kg
const WEEKLY_WEIGHT_CHANGE_KG: f64 = 0.5;

/// Output of the goal calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaloriePlan {
    pub bmr: f64,
    /// BMR times the goal multiplier, unrounded
    pub target_calories: f64,
    pub daily_calorie_target: i64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
}

/// Macro grams for a daily calorie budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
}

impl MacroSplit {
    pub fn for_calories(calories: f64) -> Self {
        Self {
            protein_g: calories * PROTEIN_SHARE / KCAL_PER_G_PROTEIN,
            fat_g: calories * FAT_SHARE / KCAL_PER_G_FAT,
            carbs_g: calories * CARBS_SHARE / KCAL_PER_G_CARBS,
        }
    }
}

/// Stateless calculator; pass it where plans are made
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalCalculator;

impl GoalCalculator {
    /// Check the ranges the formulas are defined for
    pub fn check_inputs(weight_kg: f64, height_cm: f64, age: u32) -> Result<(), ProfileError> {
        if !weight_kg.is_finite() || weight_kg <= 0.0 || weight_kg > MAX_WEIGHT_KG {
            return Err(ProfileError::invalid("weight", weight_kg));
        }
        if !height_cm.is_finite() || height_cm <= 0.0 || height_cm > MAX_HEIGHT_CM {
            return Err(ProfileError::invalid("height", height_cm));
        }
        if age > MAX_AGE {
            return Err(ProfileError::invalid("age", age));
        }
        Ok(())
    }

    /// Basal metabolic rate in kcal/day
    pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> Result<f64, ProfileError> {
        Self::check_inputs(weight_kg, height_cm, age)?;
        let age = f64::from(age);
        let bmr = match gender {
            Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
            Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
        };
        Ok(bmr)
    }

    pub fn calculate(
        &self,
        weight_kg: f64,
        height_cm: f64,
        age: u32,
        gender: Gender,
        goal: Goal,
    ) -> Result<CaloriePlan, ProfileError> {
        let bmr = Self::bmr(weight_kg, height_cm, age, gender)?;
        let target_calories = bmr * goal.calorie_multiplier();
        // Whole calories, fraction dropped
        let daily_calorie_target = target_calories.trunc() as i64;
        let macros = MacroSplit::for_calories(daily_calorie_target as f64);

        Ok(CaloriePlan {
            bmr,
            target_calories,
            daily_calorie_target,
            protein_g: macros.protein_g,
            fat_g: macros.fat_g,
            carbs_g: macros.carbs_g,
        })
    }

    pub fn plan_for(&self, profile: &UserProfile) -> Result<CaloriePlan, ProfileError> {
        self.calculate(
            profile.weight_kg,
            profile.height_cm,
            profile.age,
            profile.gender,
            profile.goal,
        )
    }

    /// Weeks needed to reach the target weight at 0.5 kg per week
    pub fn weeks_to_target(current_kg: f64, target_kg: f64) -> u32 {
        let diff = (target_kg - current_kg).abs();
        (diff / WEEKLY_WEIGHT_CHANGE_KG).ceil() as u32
    }

    /// Daily step goal for a weight goal
    pub fn steps_goal(goal: Goal) -> u32 {
        match goal {
            Goal::Loss => 10_000,
            Goal::Maintenance => 7_000,
            Goal::Gain => 5_000,
        }
    }

    /// Daily water goal: 35 ml per kg, rounded to 0.1 L
    pub fn water_goal_liters(weight_kg: f64) -> f64 {
        (weight_kg * 35.0 / 1000.0 * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_male_bmr() {
        let bmr = GoalCalculator::bmr(70.0, 175.0, 30, Gender::Male).unwrap();
        // 88.362 + 937.79 + 839.825 - 170.31
        assert!((bmr - 1695.667).abs() < 1e-3);
    }

    #[test]
    fn test_female_bmr() {
        // 447.593 + 9.247*60 + 3.098*165 - 4.330*25
        let bmr = GoalCalculator::bmr(60.0, 165.0, 25, Gender::Female).unwrap();
        assert!((bmr - 1405.333).abs() < 1e-3);
    }

    #[test]
    fn test_goal_scaling() {
        let calc = GoalCalculator;
        let maintain = calc.calculate(70.0, 175.0, 30, Gender::Male, Goal::Maintenance).unwrap();
        assert_eq!(maintain.target_calories, maintain.bmr);
        assert_eq!(maintain.daily_calorie_target, 1695);

        let loss = calc.calculate(70.0, 175.0, 30, Gender::Male, Goal::Loss).unwrap();
        assert_eq!(loss.daily_calorie_target, (loss.bmr * 0.85).trunc() as i64);
        assert_eq!(loss.daily_calorie_target, 1441);

        let gain = calc.calculate(70.0, 175.0, 30, Gender::Male, Goal::Gain).unwrap();
        assert_eq!(gain.daily_calorie_target, 1950);
    }

    #[test]
    fn test_macro_split_sums_to_target() {
        let plan = GoalCalculator
            .calculate(82.5, 181.0, 41, Gender::Male, Goal::Loss)
            .unwrap();
        let kcal = plan.protein_g * 4.0 + plan.fat_g * 9.0 + plan.carbs_g * 4.0;
        assert!((kcal - plan.daily_calorie_target as f64).abs() < 1e-6);
    }

    #[test]
    fn test_profile_bounds() {
        assert!(GoalCalculator::bmr(0.0, 175.0, 30, Gender::Male).is_err());
        assert!(GoalCalculator::bmr(500.0, 175.0, 30, Gender::Male).is_ok());
        assert!(GoalCalculator::bmr(500.1, 175.0, 30, Gender::Male).is_err());
        assert!(GoalCalculator::bmr(70.0, 300.0, 30, Gender::Male).is_ok());
        assert!(GoalCalculator::bmr(70.0, 300.5, 30, Gender::Male).is_err());
        assert!(GoalCalculator::bmr(70.0, 175.0, 0, Gender::Male).is_ok());
        assert!(GoalCalculator::bmr(70.0, 175.0, 121, Gender::Male).is_err());
        assert!(GoalCalculator::bmr(f64::NAN, 175.0, 30, Gender::Male).is_err());

        let err = GoalCalculator::bmr(70.0, -1.0, 30, Gender::Female).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidProfileData { field: "height", .. }));
    }

    #[test]
    fn test_weeks_and_daily_goals() {
        assert_eq!(GoalCalculator::weeks_to_target(80.0, 75.0), 10);
        assert_eq!(GoalCalculator::weeks_to_target(70.0, 70.2), 1);
        assert_eq!(GoalCalculator::weeks_to_target(70.0, 70.0), 0);
        assert_eq!(GoalCalculator::steps_goal(Goal::Maintenance), 7000);
        assert!((GoalCalculator::water_goal_liters(70.0) - 2.5).abs() < 1e-9);
        assert!((GoalCalculator::water_goal_liters(63.0) - 2.2).abs() < 1e-9);
    }
}
