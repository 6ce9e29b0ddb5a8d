//! End-to-end flow: profile, plan, diary changes and trackers, in memory and
//! through the stored-document tools.

use chrono::NaiveDate;

use easymeal::db::{migrations, Database};
use easymeal::models::{
    DiaryState, FoodDiary, FoodItem, Gender, Goal, MacroName, MealSlot, TrackerType, UserProfile,
};
use easymeal::nutrition::{calories_burned, weekly_rollup, BudgetWarning, GoalCalculator, TrackerEngine};
use easymeal::tools::diary::{self, ItemInput};
use easymeal::tools::profile::{self, ProfileInput};
use easymeal::tools::trackers::{self, TrackerAction};

fn profile() -> UserProfile {
    UserProfile {
        weight_kg: 70.0,
        target_weight_kg: 70.0,
        height_cm: 175.0,
        age: 30,
        gender: Gender::Male,
        goal: Goal::Maintenance,
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

#[test]
fn test_plan_for_reference_profile() {
    let plan = GoalCalculator.plan_for(&profile()).unwrap();
    assert!((plan.bmr - 1695.667).abs() < 0.001);
    assert_eq!(plan.daily_calorie_target, 1695);
    assert!((plan.protein_g - 127.125).abs() < 1e-9);
    assert!((plan.fat_g - 56.5).abs() < 1e-9);
    assert!((plan.carbs_g - 169.5).abs() < 1e-9);

    let diary = FoodDiary::generate_plan(date(1), &profile()).unwrap();
    let slots: Vec<i64> = MealSlot::ALL
        .iter()
        .map(|s| diary.slot_targets().get(*s))
        .collect();
    assert_eq!(slots, vec![509, 678, 85, 423]);
}

#[test]
fn test_day_in_memory() {
    let mut diary = FoodDiary::generate_plan(date(1), &profile()).unwrap();
    let engine = TrackerEngine;

    let porridge = FoodItem::per_100g("Oats", 379.0, 13.0, 7.0, 66.0);
    let change = diary.add_meal(MealSlot::Breakfast, vec![porridge]).unwrap();
    assert!(change.warnings.is_empty());

    let chicken = FoodItem::per_100g("Chicken breast", 165.0, 31.0, 3.6, 0.0);
    let change = diary
        .add_meal(MealSlot::Snack, vec![chicken])
        .unwrap();
    // Snack budget is only 85 kcal
    assert!(change
        .warnings
        .iter()
        .any(|w| matches!(w, BudgetWarning::CalorieOverage { .. })));

    let steps = engine.set_value(diary.tracker(TrackerType::Steps).unwrap(), 10_000.0);
    diary.save_tracker(&steps).unwrap();
    let burned = calories_burned(diary.steps().current as f64, diary.current_weight());
    assert!((burned - 350.0).abs() < 1e-9);
    diary.record_burned_calories(burned).unwrap();

    assert_eq!(diary.eaten_calories(), 379 + 165);
    assert_eq!(diary.burned_calories(), 350);
    assert_eq!(diary.remaining_calories(), 1695 - 544 + 350);
    let protein = diary.macro_target(MacroName::Protein).unwrap();
    assert!((protein.current_grams - 44.0).abs() < 1e-9);

    diary.refresh_state(date(2));
    assert_eq!(diary.state(), DiaryState::Closed);
    assert!(diary.record_burned_calories(10.0).is_err());

    let week = vec![diary];
    let rollup = weekly_rollup(&week, TrackerType::Steps);
    assert_eq!(rollup.total_days, 1);
    assert_eq!(rollup.days_completed, 1);
}

#[test]
fn test_day_through_tools() {
    let db = Database::open_in_memory().unwrap();
    db.with_conn(migrations::run_migrations).unwrap();
    let today = date(14);
    let key = "2025-10-14";

    let input = ProfileInput {
        weight_kg: 70.0,
        target_weight_kg: Some(66.0),
        height_cm: 175.0,
        age: None,
        birthday: Some("1995-03-02".to_string()),
        gender: "male".to_string(),
        goal: "maintain".to_string(),
    };
    let saved = profile::set_profile(&db, &input, today).unwrap();
    assert_eq!(saved.profile.age, 30);
    assert_eq!(saved.plan.daily_calorie_target, 1695);
    assert_eq!(saved.plan.weeks_to_target, 8);

    let salmon = ItemInput {
        item: FoodItem::per_100g("Salmon", 200.0, 20.0, 13.0, 0.0),
        quantity: Some(150.0),
        unit: Some("g".to_string()),
    };
    let resp = diary::log_meal(&db, key, today, "dinner", vec![salmon]).unwrap();
    assert_eq!(resp.diary.eaten_calories, 300);
    let meal_id = resp.diary.meals[0].id.clone();

    let resp = trackers::update_tracker(&db, key, today, "steps", TrackerAction::Set(10_000.0)).unwrap();
    assert_eq!(resp.burned_calories, 350);
    assert_eq!(resp.remaining_calories, 1695 - 300 + 350);

    for _ in 0..8 {
        trackers::update_tracker(&db, key, today, "water", TrackerAction::Increment).unwrap();
    }

    let view = diary::get_diary(&db, key, today).unwrap().unwrap();
    assert_eq!(view.eaten_calories, 300);
    assert_eq!(view.burned_calories, 350);
    assert_eq!(view.remaining_calories, 1695 - 300 + 350);
    assert_eq!(view.water_intake.current, 2.0);
    assert!(view
        .trackers
        .iter()
        .find(|t| t.tracker_type == TrackerType::Water)
        .unwrap()
        .is_completed);

    diary::remove_meal(&db, key, today, "dinner", &meal_id).unwrap();
    let view = diary::get_diary(&db, key, today).unwrap().unwrap();
    assert_eq!(view.remaining_calories, 1695 + 350);

    let weekly = trackers::weekly_progress(&db, today, Some("water")).unwrap();
    assert_eq!(weekly.trackers[0].days_completed, 1);
    assert_eq!(weekly.trackers[0].total_days, 1);

    // The next day the diary is read-only
    let tomorrow = date(15);
    assert!(diary::set_weight(&db, key, tomorrow, 69.0).is_err());
    let next = diary::get_or_create_diary(&db, "2025-10-15", tomorrow).unwrap();
    assert!(next.created);
    assert_eq!(next.diary.remaining_calories, 1695);
}
