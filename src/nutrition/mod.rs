//! Nutrition calculation engine
//!
//! Pure, synchronous calculators: calorie plans, slot budgets, food validation,
//! tracker rules, step burn and the weekly rollup.

pub mod budget;
pub mod burn;
pub mod goal;
pub mod tracker;
pub mod units;
pub mod validator;
pub mod weekly;

pub use budget::{BudgetAllocator, SlotTargets};
pub use burn::calories_burned;
pub use goal::{CaloriePlan, GoalCalculator, MacroSplit};
pub use tracker::{TrackerEngine, TrackerRule};
pub use units::{categorize_unit, convert, UnitCategory};
pub use validator::{check_totals, BudgetWarning, NutritionValidator, CALORIE_TOLERANCE};
pub use weekly::{weekly_rollup, WeeklyTracker, WEEK_DAYS};
