//! Food entry validation and portion scaling
//!
//! A food item must be internally consistent before it is logged: macros cannot
//! weigh more than the portion, and the declared calories must match the macros
//! within [`CALORIE_TOLERANCE`].

use serde::Serialize;

use super::goal::{CARBS_SHARE, FAT_SHARE, PROTEIN_SHARE};
use super::units;
use crate::error::ValidationError;
use crate::models::{FoodItem, Meal, Nutrition, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

/// Allowed gap between declared calories and 4/9/4 kcal from macros
pub const CALORIE_TOLERANCE: f64 = 10.0;

/// A meal that goes over its slot budget. Advisory only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetWarning {
    CalorieOverage { actual: f64, limit: f64 },
    ProteinOverage { actual: f64, limit: f64 },
    FatOverage { actual: f64, limit: f64 },
    CarbOverage { actual: f64, limit: f64 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NutritionValidator;

impl NutritionValidator {
    pub fn validate(&self, item: &FoodItem) -> Result<(), ValidationError> {
        check_product(item)?;

        let n = &item.nutrition;
        // Only weight portions can be compared in grams; volume and count
        // units carry no density.
        if let Some(g_per_unit) = units::grams_per_unit(&item.portion_unit) {
            let portion = item.portion_size * g_per_unit;
            let total = n.macro_grams();
            if total > portion {
                return Err(ValidationError::PortionExceeded { total, portion });
            }
        }

        let computed = n.macro_calories();
        if (n.calories - computed).abs() > CALORIE_TOLERANCE {
            return Err(ValidationError::CalorieMismatch {
                declared: n.calories,
                computed,
            });
        }

        Ok(())
    }

    /// Rescale to `new_size` of the same unit. Does not re-validate.
    pub fn scale_portion(&self, item: &FoodItem, new_size: f64) -> Result<FoodItem, ValidationError> {
        if !new_size.is_finite() || new_size <= 0.0 {
            return Err(ValidationError::InvalidPortion(new_size));
        }
        if !item.portion_size.is_finite() || item.portion_size <= 0.0 {
            return Err(ValidationError::InvalidPortion(item.portion_size));
        }

        let ratio = new_size / item.portion_size;
        Ok(FoodItem {
            name: item.name.clone(),
            nutrition: item.nutrition.scale(ratio),
            portion_size: new_size,
            portion_unit: item.portion_unit.clone(),
        })
    }

    /// Rescale to `quantity` given in `unit`, converting to the item's unit first
    pub fn scale_portion_to(
        &self,
        item: &FoodItem,
        quantity: f64,
        unit: &str,
    ) -> Result<FoodItem, ValidationError> {
        let converted = units::convert(quantity, unit, &item.portion_unit).ok_or_else(|| {
            ValidationError::IncompatibleUnit {
                from: unit.to_string(),
                to: item.portion_unit.clone(),
            }
        })?;
        self.scale_portion(item, converted)
    }

    pub fn check_meal_budget(&self, meal: &Meal, slot_target: i64) -> Vec<BudgetWarning> {
        check_totals(&meal.totals, slot_target)
    }
}

/// Basic sanity of a product before the consistency checks
fn check_product(item: &FoodItem) -> Result<(), ValidationError> {
    if item.name.trim().is_empty() {
        return Err(ValidationError::InvalidProduct("name is empty".to_string()));
    }
    let n = &item.nutrition;
    for (field, value) in [
        ("calories", n.calories),
        ("protein", n.protein),
        ("fat", n.fat),
        ("carbs", n.carbs),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidProduct(format!("{} = {}", field, value)));
        }
    }
    if !item.portion_size.is_finite() || item.portion_size <= 0.0 {
        return Err(ValidationError::InvalidProduct(format!(
            "portion size = {}",
            item.portion_size
        )));
    }
    Ok(())
}

/// Warnings for `totals` eaten in a slot whose budget is `slot_target` kcal
pub fn check_totals(totals: &Nutrition, slot_target: i64) -> Vec<BudgetWarning> {
    let target = slot_target as f64;
    let mut warnings = Vec::new();

    if totals.calories > target {
        warnings.push(BudgetWarning::CalorieOverage {
            actual: totals.calories,
            limit: target,
        });
    }

    let protein_limit = target * PROTEIN_SHARE / KCAL_PER_G_PROTEIN;
    if totals.protein > protein_limit {
        warnings.push(BudgetWarning::ProteinOverage {
            actual: totals.protein,
            limit: protein_limit,
        });
    }

    let fat_limit = target * FAT_SHARE / KCAL_PER_G_FAT;
    if totals.fat > fat_limit {
        warnings.push(BudgetWarning::FatOverage {
            actual: totals.fat,
            limit: fat_limit,
        });
    }

    let carbs_limit = target * CARBS_SHARE / KCAL_PER_G_CARBS;
    if totals.carbs > carbs_limit {
        warnings.push(BudgetWarning::CarbOverage {
            actual: totals.carbs,
            limit: carbs_limit,
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealSlot;
    use crate::nutrition::units::G_PER_OZ;
    use chrono::Utc;

    fn item(calories: f64, protein: f64, fat: f64, carbs: f64, portion: f64) -> FoodItem {
        FoodItem {
            name: "Test".to_string(),
            nutrition: Nutrition::new(calories, protein, fat, carbs),
            portion_size: portion,
            portion_unit: "g".to_string(),
        }
    }

    #[test]
    fn test_valid_item() {
        // 20*4 + 10*9 + 30*4 = 290
        let v = NutritionValidator;
        assert_eq!(v.validate(&item(290.0, 20.0, 10.0, 30.0, 100.0)), Ok(()));
        assert_eq!(v.validate(&item(300.0, 20.0, 10.0, 30.0, 100.0)), Ok(()));
    }

    #[test]
    fn test_portion_boundary_is_inclusive() {
        let v = NutritionValidator;
        // 25*4 + 25*9 + 50*4 = 525, macros weigh exactly the portion
        assert_eq!(v.validate(&item(525.0, 25.0, 25.0, 50.0, 100.0)), Ok(()));

        let err = v.validate(&item(525.0, 25.0, 25.0, 50.001, 100.0)).unwrap_err();
        assert!(matches!(err, ValidationError::PortionExceeded { .. }));
    }

    #[test]
    fn test_portion_in_other_units() {
        let v = NutritionValidator;
        // Almonds per 1 oz: 6*4 + 14*9 + 6*4 = 174, 26 g of macros in 28.35 g
        let mut almonds = item(170.0, 6.0, 14.0, 6.0, 1.0);
        almonds.portion_unit = "oz".to_string();
        assert_eq!(v.validate(&almonds), Ok(()));

        // 10 + 15 + 5 = 30 g does not fit in one ounce
        let mut heavy = item(195.0, 10.0, 15.0, 5.0, 1.0);
        heavy.portion_unit = "oz".to_string();
        match v.validate(&heavy).unwrap_err() {
            ValidationError::PortionExceeded { total, portion } => {
                assert_eq!(total, 30.0);
                assert!((portion - G_PER_OZ).abs() < 1e-9);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        // No density for volume or count portions
        let mut milk = item(170.0, 6.0, 14.0, 6.0, 1.0);
        milk.portion_unit = "cup".to_string();
        assert_eq!(v.validate(&milk), Ok(()));
        milk.portion_unit = "serving".to_string();
        assert_eq!(v.validate(&milk), Ok(()));
    }

    #[test]
    fn test_calorie_mismatch() {
        let v = NutritionValidator;
        let err = v.validate(&item(300.5, 20.0, 10.0, 30.0, 100.0)).unwrap_err();
        match err {
            ValidationError::CalorieMismatch { declared, computed } => {
                assert_eq!(declared, 300.5);
                assert_eq!(computed, 290.0);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(v.validate(&item(279.0, 20.0, 10.0, 30.0, 100.0)).is_err());
    }

    #[test]
    fn test_invalid_product() {
        let v = NutritionValidator;
        let mut bad = item(290.0, 20.0, 10.0, 30.0, 100.0);
        bad.name = "  ".to_string();
        assert!(matches!(v.validate(&bad), Err(ValidationError::InvalidProduct(_))));
        assert!(matches!(
            v.validate(&item(290.0, -1.0, 10.0, 30.0, 100.0)),
            Err(ValidationError::InvalidProduct(_))
        ));
        assert!(matches!(
            v.validate(&item(0.0, 0.0, 0.0, 0.0, 0.0)),
            Err(ValidationError::InvalidProduct(_))
        ));
    }

    #[test]
    fn test_scale_portion_roundtrip() {
        let v = NutritionValidator;
        let original = item(290.0, 20.0, 10.0, 30.0, 100.0);
        let scaled = v.scale_portion(&original, 37.0).unwrap();
        assert!((scaled.nutrition.protein - 7.4).abs() < 1e-9);
        assert_eq!(scaled.portion_size, 37.0);

        let back = v.scale_portion(&scaled, 100.0).unwrap();
        assert!((back.nutrition.calories - 290.0).abs() < 1e-9);
        assert!((back.nutrition.protein - 20.0).abs() < 1e-9);
        assert!((back.nutrition.fat - 10.0).abs() < 1e-9);
        assert!((back.nutrition.carbs - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_portion_rejects_bad_size() {
        let v = NutritionValidator;
        let original = item(290.0, 20.0, 10.0, 30.0, 100.0);
        assert_eq!(
            v.scale_portion(&original, 0.0),
            Err(ValidationError::InvalidPortion(0.0))
        );
    }

    #[test]
    fn test_scale_portion_to_other_unit() {
        let v = NutritionValidator;
        let original = item(290.0, 20.0, 10.0, 30.0, 100.0);
        let scaled = v.scale_portion_to(&original, 1.0, "oz").unwrap();
        assert!((scaled.portion_size - 28.3495).abs() < 1e-9);
        assert!((scaled.nutrition.calories - 290.0 * 0.283495).abs() < 1e-9);

        let err = v.scale_portion_to(&original, 1.0, "cup").unwrap_err();
        assert!(matches!(err, ValidationError::IncompatibleUnit { .. }));
    }

    #[test]
    fn test_meal_budget_warnings() {
        let v = NutritionValidator;
        // Snack target 100 kcal: protein 7.5 g, fat 3.33 g, carbs 10 g
        let meal = Meal::new(
            MealSlot::Snack,
            vec![item(120.0, 5.0, 4.0, 11.0, 50.0)],
            Utc::now(),
        );
        let warnings = v.check_meal_budget(&meal, 100);
        assert_eq!(warnings.len(), 3);
        assert!(matches!(warnings[0], BudgetWarning::CalorieOverage { .. }));
        assert!(matches!(warnings[1], BudgetWarning::FatOverage { .. }));
        assert!(matches!(warnings[2], BudgetWarning::CarbOverage { .. }));

        assert!(v.check_meal_budget(&meal, 1000).is_empty());
    }
}
