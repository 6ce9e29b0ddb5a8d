//! Portion units
//!
//! Conversion tables for the weight and volume units a portion can be declared
//! in. Count units ("each", "piece") only convert to themselves.

use serde::{Deserialize, Serialize};

/// Category of a portion unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// g, kg, oz, lb
    Weight,
    /// ml, l, tsp, tbsp, cup, fl oz
    Volume,
    /// each, piece, serving
    Count,
    /// Anything else (scoop, slice); only equal units convert
    Other,
}

// ============================================================================
// Conversion Constants
// ============================================================================

pub const G_PER_KG: f64 = 1000.0;
pub const G_PER_OZ: f64 = 28.3495;
pub const G_PER_LB: f64 = 453.592;

pub const ML_PER_LITER: f64 = 1000.0;
pub const ML_PER_TSP: f64 = 4.92892;
pub const ML_PER_TBSP: f64 = 14.7868;
pub const ML_PER_FL_OZ: f64 = 29.5735;
pub const ML_PER_CUP: f64 = 236.588;

fn normalize(unit: &str) -> String {
    unit.trim().to_lowercase()
}

/// Grams per unit for weight units
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    match normalize(unit).as_str() {
        "g" | "gram" | "grams" | "г" => Some(1.0),
        "kg" | "kilogram" | "kilograms" | "кг" => Some(G_PER_KG),
        "oz" | "ounce" | "ounces" => Some(G_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(G_PER_LB),
        _ => None,
    }
}

/// Milliliters per unit for volume units
pub fn ml_per_unit(unit: &str) -> Option<f64> {
    match normalize(unit).as_str() {
        "ml" | "milliliter" | "milliliters" | "мл" => Some(1.0),
        "l" | "liter" | "liters" | "litre" | "litres" | "л" => Some(ML_PER_LITER),
        "tsp" | "teaspoon" | "teaspoons" => Some(ML_PER_TSP),
        "tbsp" | "tablespoon" | "tablespoons" => Some(ML_PER_TBSP),
        "fl oz" | "floz" | "fluid ounce" | "fluid ounces" => Some(ML_PER_FL_OZ),
        "cup" | "cups" => Some(ML_PER_CUP),
        _ => None,
    }
}

pub fn categorize_unit(unit: &str) -> UnitCategory {
    if grams_per_unit(unit).is_some() {
        return UnitCategory::Weight;
    }
    if ml_per_unit(unit).is_some() {
        return UnitCategory::Volume;
    }
    match normalize(unit).as_str() {
        "each" | "piece" | "pieces" | "count" | "item" | "serving" | "servings" | "шт" => {
            UnitCategory::Count
        }
        _ => UnitCategory::Other,
    }
}

/// Convert `quantity` of `from` into `to`; None if the units do not mix
pub fn convert(quantity: f64, from: &str, to: &str) -> Option<f64> {
    if normalize(from) == normalize(to) {
        return Some(quantity);
    }
    match (categorize_unit(from), categorize_unit(to)) {
        (UnitCategory::Weight, UnitCategory::Weight) => {
            Some(quantity * grams_per_unit(from)? / grams_per_unit(to)?)
        }
        (UnitCategory::Volume, UnitCategory::Volume) => {
            Some(quantity * ml_per_unit(from)? / ml_per_unit(to)?)
        }
        (UnitCategory::Count, UnitCategory::Count) => Some(quantity),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(categorize_unit("g"), UnitCategory::Weight);
        assert_eq!(categorize_unit(" OZ "), UnitCategory::Weight);
        assert_eq!(categorize_unit("г"), UnitCategory::Weight);
        assert_eq!(categorize_unit("cup"), UnitCategory::Volume);
        assert_eq!(categorize_unit("each"), UnitCategory::Count);
        assert_eq!(categorize_unit("scoop"), UnitCategory::Other);
    }

    #[test]
    fn test_convert_within_category() {
        let g = convert(2.0, "oz", "g").unwrap();
        assert!((g - 56.699).abs() < 0.001);
        let l = convert(500.0, "ml", "l").unwrap();
        assert!((l - 0.5).abs() < 1e-12);
        assert_eq!(convert(3.0, "scoop", "Scoop"), Some(3.0));
        assert_eq!(convert(2.0, "piece", "each"), Some(2.0));
    }

    #[test]
    fn test_convert_across_categories_fails() {
        assert_eq!(convert(100.0, "g", "ml"), None);
        assert_eq!(convert(1.0, "each", "g"), None);
        assert_eq!(convert(1.0, "scoop", "g"), None);
    }
}
