//! Data models
//!
//! Domain types for profiles, food, meals, trackers and the daily diary, plus
//! the document shapes they are stored as.

mod document;
mod food_diary;
mod food_item;
mod meal;
mod nutrition;
mod profile;
mod tracker;

pub use document::{
    date_key, parse_date_key, DocumentDefaults, FoodDiaryDocument, ProfileDocument, SCHEMA_VERSION,
};
pub use food_diary::{
    DiaryChange, DiaryEvent, DiaryState, FoodDiary, MacroName, NutritionTarget, SlotSummary, Steps,
    WaterIntake, DEFAULT_STEPS_TARGET,
};
pub use food_item::FoodItem;
pub use meal::{Meal, MealSlot};
pub use nutrition::{Nutrition, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
pub use profile::{age_on, Gender, Goal, UserProfile};
pub use tracker::{TrackerData, TrackerType};
