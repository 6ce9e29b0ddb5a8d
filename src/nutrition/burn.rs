//! Calories burned from walking

/// kcal per step per kg of body weight
pub const KCAL_PER_STEP_PER_KG: f64 = 0.0005;

/// Estimated kcal burned walking `steps` at `weight_kg`
pub fn calories_burned(steps: f64, weight_kg: f64) -> f64 {
    if steps <= 0.0 || weight_kg <= 0.0 {
        return 0.0;
    }
    steps * KCAL_PER_STEP_PER_KG * weight_kg
}
