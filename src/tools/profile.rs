//! Profile MCP Tools
//!
//! Store the user profile and preview the calorie plan derived from it.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{documents, Database};
use crate::models::{MealSlot, ProfileDocument, UserProfile};
use crate::nutrition::{BudgetAllocator, GoalCalculator};

/// Profile fields as supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct ProfileInput {
    pub weight_kg: f64,
    pub target_weight_kg: Option<f64>,
    pub height_cm: f64,
    pub age: Option<u32>,
    /// ISO date (YYYY-MM-DD), used when `age` is absent
    pub birthday: Option<String>,
    pub gender: String,
    pub goal: String,
}

/// Calories for one meal slot
#[derive(Debug, Serialize)]
pub struct SlotTarget {
    pub slot: MealSlot,
    pub calories: i64,
}

/// The plan a profile produces
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub bmr: f64,
    pub target_calories: f64,
    pub daily_calorie_target: i64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
    pub slot_targets: Vec<SlotTarget>,
    pub steps_goal: u32,
    pub water_goal_liters: f64,
    pub weeks_to_target: u32,
}

/// Response for set_profile / get_profile
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub plan: PlanResponse,
}

impl ProfileInput {
    fn to_document(&self) -> Result<ProfileDocument, String> {
        let birthday = match &self.birthday {
            Some(s) => Some(
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid birthday: {}. Use YYYY-MM-DD format.", s))?,
            ),
            None => None,
        };

        Ok(ProfileDocument {
            weight: Some(self.weight_kg),
            target_weight: self.target_weight_kg,
            height: Some(self.height_cm),
            age: self.age,
            birthday,
            gender: Some(self.gender.clone()),
            current_goal: Some(self.goal.clone()),
        })
    }
}

/// Compute the plan for a validated profile
pub fn plan_for(profile: &UserProfile) -> Result<PlanResponse, String> {
    let plan = GoalCalculator
        .plan_for(profile)
        .map_err(|e| e.to_string())?;

    let slot_targets = BudgetAllocator::allocate(plan.daily_calorie_target)
        .iter()
        .map(|(slot, calories)| SlotTarget { slot, calories })
        .collect();

    Ok(PlanResponse {
        bmr: plan.bmr,
        target_calories: plan.target_calories,
        daily_calorie_target: plan.daily_calorie_target,
        protein_g: plan.protein_g,
        fat_g: plan.fat_g,
        carbs_g: plan.carbs_g,
        slot_targets,
        steps_goal: GoalCalculator::steps_goal(profile.goal),
        water_goal_liters: GoalCalculator::water_goal_liters(profile.weight_kg),
        weeks_to_target: GoalCalculator::weeks_to_target(profile.weight_kg, profile.target_weight_kg),
    })
}

/// Read and validate the stored profile
pub(crate) fn load_profile(conn: &Connection, today: NaiveDate) -> Result<Option<UserProfile>, String> {
    let doc = documents::get_profile(conn).map_err(|e| format!("Failed to get profile: {}", e))?;
    match doc {
        Some(doc) => doc.to_profile(today).map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// Validate and store the profile. Diaries created afterwards use its plan.
pub fn set_profile(db: &Database, input: &ProfileInput, today: NaiveDate) -> Result<ProfileResponse, String> {
    let doc = input.to_document()?;
    let profile = doc.to_profile(today).map_err(|e| e.to_string())?;
    let plan = plan_for(&profile)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    documents::put_profile(&conn, &doc).map_err(|e| format!("Failed to save profile: {}", e))?;

    tracing::info!(
        "Profile saved: goal={} daily target={} kcal",
        profile.goal.as_str(),
        plan.daily_calorie_target
    );
    Ok(ProfileResponse { profile, plan })
}

pub fn get_profile(db: &Database, today: NaiveDate) -> Result<Option<ProfileResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    match load_profile(&conn, today)? {
        Some(profile) => {
            let plan = plan_for(&profile)?;
            Ok(Some(ProfileResponse { profile, plan }))
        }
        None => Ok(None),
    }
}

/// Compute a plan without storing anything
pub fn preview_plan(input: &ProfileInput, today: NaiveDate) -> Result<ProfileResponse, String> {
    let profile = input.to_document()?.to_profile(today).map_err(|e| e.to_string())?;
    let plan = plan_for(&profile)?;
    Ok(ProfileResponse { profile, plan })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::Goal;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    fn input() -> ProfileInput {
        ProfileInput {
            weight_kg: 70.0,
            target_weight_kg: Some(68.0),
            height_cm: 175.0,
            age: Some(30),
            birthday: None,
            gender: "male".to_string(),
            goal: "maintain".to_string(),
        }
    }

    #[test]
    fn test_preview_plan() {
        let resp = preview_plan(&input(), today()).unwrap();
        assert!((resp.plan.bmr - 1695.667).abs() < 0.001);
        assert_eq!(resp.plan.daily_calorie_target, 1695);
        let kcal: Vec<i64> = resp.plan.slot_targets.iter().map(|s| s.calories).collect();
        assert_eq!(kcal, vec![509, 678, 85, 423]);
        assert_eq!(resp.plan.steps_goal, 7000);
        assert_eq!(resp.plan.weeks_to_target, 4);
    }

    #[test]
    fn test_set_and_get_profile() {
        let db = setup();
        assert!(get_profile(&db, today()).unwrap().is_none());

        let mut lose = input();
        lose.goal = "lose".to_string();
        lose.age = None;
        lose.birthday = Some("1995-01-15".to_string());
        let saved = set_profile(&db, &lose, today()).unwrap();
        assert_eq!(saved.profile.age, 30);
        assert_eq!(saved.profile.goal, Goal::Loss);

        let loaded = get_profile(&db, today()).unwrap().unwrap();
        assert_eq!(loaded.profile, saved.profile);
        assert_eq!(loaded.plan.daily_calorie_target, saved.plan.daily_calorie_target);
    }

    #[test]
    fn test_invalid_profile_is_not_stored() {
        let db = setup();
        let mut bad = input();
        bad.height_cm = 0.0;
        assert!(set_profile(&db, &bad, today()).is_err());

        let mut bad_date = input();
        bad_date.age = None;
        bad_date.birthday = Some("15/01/1995".to_string());
        let err = set_profile(&db, &bad_date, today()).unwrap_err();
        assert!(err.contains("Invalid birthday"));

        assert!(get_profile(&db, today()).unwrap().is_none());
    }
}
