//! Food Diary MCP Tools
//!
//! Load a day's diary, apply one change, and store it again. Every change runs
//! inside a SQLite transaction.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::profile::load_profile;
use crate::db::{documents, Database};
use crate::error::DiaryError;
use crate::models::{
    DiaryChange, DiaryEvent, DiaryState, DocumentDefaults, FoodDiary, FoodDiaryDocument, FoodItem,
    MacroName, Meal, MealSlot, SlotSummary, Steps, TrackerData, WaterIntake, SCHEMA_VERSION,
};
use crate::nutrition::{BudgetWarning, NutritionValidator};

/// Macro progress as shown to the user
#[derive(Debug, Serialize)]
pub struct MacroView {
    pub name: MacroName,
    pub current_grams: f64,
    pub target_grams: f64,
    pub progress: f64,
    pub over_budget: bool,
}

/// A diary as returned by the tools
#[derive(Debug, Serialize)]
pub struct DiaryView {
    pub date: String,
    pub state: DiaryState,
    pub overall_calorie_target: i64,
    pub eaten_calories: i64,
    pub burned_calories: i64,
    pub remaining_calories: i64,
    pub nutrition: Vec<MacroView>,
    pub slots: Vec<SlotSummary>,
    pub meals: Vec<Meal>,
    pub trackers: Vec<TrackerData>,
    pub current_weight: f64,
    pub steps: Steps,
    pub water_intake: WaterIntake,
}

impl DiaryView {
    pub fn from_diary(diary: &FoodDiary) -> Self {
        Self {
            date: diary.date().format("%Y-%m-%d").to_string(),
            state: diary.state(),
            overall_calorie_target: diary.overall_calorie_target(),
            eaten_calories: diary.eaten_calories(),
            burned_calories: diary.burned_calories(),
            remaining_calories: diary.remaining_calories(),
            nutrition: diary
                .nutrition()
                .iter()
                .map(|n| MacroView {
                    name: n.name,
                    current_grams: n.current_grams,
                    target_grams: n.target_grams,
                    progress: n.progress(),
                    over_budget: n.is_over_budget(),
                })
                .collect(),
            slots: diary.slot_summaries(),
            meals: diary.meals().to_vec(),
            trackers: diary.trackers().to_vec(),
            current_weight: diary.current_weight(),
            steps: diary.steps(),
            water_intake: diary.water_intake(),
        }
    }
}

/// Response for get_or_create_diary
#[derive(Debug, Serialize)]
pub struct GetOrCreateDiaryResponse {
    pub created: bool,
    pub diary: DiaryView,
}

/// Response for every diary change
#[derive(Debug, Serialize)]
pub struct DiaryChangeResponse {
    pub diary: DiaryView,
    pub events: Vec<DiaryEvent>,
    pub warnings: Vec<BudgetWarning>,
}

/// A food item, optionally rescaled to the amount actually eaten
#[derive(Debug, Clone)]
pub struct ItemInput {
    pub item: FoodItem,
    pub quantity: Option<f64>,
    /// Unit of `quantity`; defaults to the item's portion unit
    pub unit: Option<String>,
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date: {}. Use YYYY-MM-DD format.", date))
}

pub fn parse_slot(slot: &str) -> Result<MealSlot, String> {
    MealSlot::from_str(slot).ok_or_else(|| {
        format!(
            "Invalid meal slot: {}. Must be one of: breakfast, lunch, snack, dinner",
            slot
        )
    })
}

// ============================================================================
// Loading
// ============================================================================

/// A diary loaded for a change, with the document it came from
pub(crate) struct LoadedDiary {
    pub diary: FoodDiary,
    /// What is stored now; None when the diary was just created
    pub stored: Option<FoodDiaryDocument>,
}

impl LoadedDiary {
    /// True when the stored document can take partial updates
    pub fn is_current(&self) -> bool {
        self.stored
            .as_ref()
            .map(|d| d.schema_version >= SCHEMA_VERSION)
            .unwrap_or(false)
    }
}

fn defaults(conn: &Connection, today: NaiveDate) -> DocumentDefaults {
    // A broken profile should not make stored diaries unreadable
    let profile = load_profile(conn, today).unwrap_or_else(|e| {
        tracing::warn!("Ignoring stored profile: {}", e);
        None
    });
    DocumentDefaults::from_profile(profile.as_ref())
}

pub(crate) fn load_diary(conn: &Connection, date: NaiveDate, today: NaiveDate) -> Result<Option<LoadedDiary>, String> {
    let stored = documents::get_diary(conn, date).map_err(|e| format!("Failed to get diary: {}", e))?;
    Ok(stored.map(|doc| LoadedDiary {
        diary: doc.clone().into_diary(date, today, &defaults(conn, today)),
        stored: Some(doc),
    }))
}

/// Load the diary for `date`, creating it from the profile (or the most recent
/// earlier diary) when none exists
pub(crate) fn load_or_create(conn: &Connection, date: NaiveDate, today: NaiveDate) -> Result<LoadedDiary, String> {
    if let Some(loaded) = load_diary(conn, date, today)? {
        return Ok(loaded);
    }

    let mut diary = match load_profile(conn, today)? {
        Some(profile) => FoodDiary::generate_plan(date, &profile).map_err(|e| e.to_string())?,
        None => {
            let previous = documents::latest_before(conn, date)
                .map_err(|e| format!("Failed to get diary: {}", e))?
                .ok_or_else(|| "No profile set. Call set_profile first.".to_string())?;
            let (prev_date, doc) = previous;
            doc.into_diary(prev_date, today, &defaults(conn, today)).next_day(date)
        }
    };
    diary.refresh_state(today);
    tracing::info!("Created diary for {}", date);

    Ok(LoadedDiary { diary, stored: None })
}

fn save(conn: &Connection, diary: &FoodDiary) -> Result<(), String> {
    documents::put_diary(conn, diary.date(), &FoodDiaryDocument::from_diary(diary))
        .map_err(|e| format!("Failed to save diary: {}", e))
}

/// Run one engine change against the stored diary for `date`
pub(crate) fn modify_diary<F>(
    db: &Database,
    date: NaiveDate,
    today: NaiveDate,
    change: F,
) -> Result<DiaryChangeResponse, String>
where
    F: FnOnce(&mut FoodDiary) -> Result<DiaryChange, DiaryError>,
{
    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn.transaction().map_err(|e| format!("Database error: {}", e))?;

    let mut loaded = load_or_create(&tx, date, today)?;
    let result = change(&mut loaded.diary).map_err(|e| e.to_string())?;
    save(&tx, &loaded.diary)?;
    tx.commit().map_err(|e| format!("Database error: {}", e))?;

    Ok(DiaryChangeResponse {
        diary: DiaryView::from_diary(&loaded.diary),
        events: result.events,
        warnings: result.warnings,
    })
}

// ============================================================================
// Diary Tools
// ============================================================================

/// Get or create the diary for a date. New and migrated documents are stored.
pub fn get_or_create_diary(db: &Database, date: &str, today: NaiveDate) -> Result<GetOrCreateDiaryResponse, String> {
    let date = parse_date(date)?;
    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn.transaction().map_err(|e| format!("Database error: {}", e))?;

    let loaded = load_or_create(&tx, date, today)?;
    let created = loaded.stored.is_none();
    if !loaded.is_current() {
        save(&tx, &loaded.diary)?;
    }
    tx.commit().map_err(|e| format!("Database error: {}", e))?;

    Ok(GetOrCreateDiaryResponse {
        created,
        diary: DiaryView::from_diary(&loaded.diary),
    })
}

/// Get a stored diary without creating one
pub fn get_diary(db: &Database, date: &str, today: NaiveDate) -> Result<Option<DiaryView>, String> {
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Ok(load_diary(&conn, date, today)?.map(|l| DiaryView::from_diary(&l.diary)))
}

/// Resolve an item to the amount eaten
pub fn resolve_item(input: ItemInput) -> Result<FoodItem, String> {
    match input.quantity {
        Some(quantity) => {
            let unit = input.unit.unwrap_or_else(|| input.item.portion_unit.clone());
            NutritionValidator
                .scale_portion_to(&input.item, quantity, &unit)
                .map_err(|e| e.to_string())
        }
        None => Ok(input.item),
    }
}

/// Log a meal entry in a slot
pub fn log_meal(
    db: &Database,
    date: &str,
    today: NaiveDate,
    slot: &str,
    items: Vec<ItemInput>,
) -> Result<DiaryChangeResponse, String> {
    let date = parse_date(date)?;
    let slot = parse_slot(slot)?;
    if items.is_empty() {
        return Err("A meal needs at least one item".to_string());
    }
    let items = items
        .into_iter()
        .map(resolve_item)
        .collect::<Result<Vec<_>, _>>()?;

    modify_diary(db, date, today, |diary| diary.add_meal(slot, items))
}

pub fn remove_meal(
    db: &Database,
    date: &str,
    today: NaiveDate,
    slot: &str,
    meal_id: &str,
) -> Result<DiaryChangeResponse, String> {
    let date = parse_date(date)?;
    let slot = parse_slot(slot)?;
    modify_diary(db, date, today, |diary| diary.remove_meal(slot, meal_id))
}

pub fn remove_food_item(
    db: &Database,
    date: &str,
    today: NaiveDate,
    meal_id: &str,
    index: usize,
) -> Result<DiaryChangeResponse, String> {
    let date = parse_date(date)?;
    modify_diary(db, date, today, |diary| diary.remove_food_item(meal_id, index))
}

pub fn set_weight(db: &Database, date: &str, today: NaiveDate, weight_kg: f64) -> Result<DiaryChangeResponse, String> {
    let date = parse_date(date)?;
    modify_diary(db, date, today, |diary| diary.set_current_weight(weight_kg))
}

pub fn record_burned_calories(
    db: &Database,
    date: &str,
    today: NaiveDate,
    calories: f64,
) -> Result<DiaryChangeResponse, String> {
    let date = parse_date(date)?;
    modify_diary(db, date, today, |diary| diary.record_burned_calories(calories))
}

/// Response for scale_food
#[derive(Debug, Serialize)]
pub struct ScaleFoodResponse {
    pub item: FoodItem,
    /// Validation problem with the original item, if any
    pub validation_error: Option<String>,
}

/// Rescale a food item without logging it
pub fn scale_food(input: ItemInput) -> Result<ScaleFoodResponse, String> {
    let validation_error = NutritionValidator
        .validate(&input.item)
        .err()
        .map(|e| e.to_string());
    let item = resolve_item(input)?;
    Ok(ScaleFoodResponse { item, validation_error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::Nutrition;
    use crate::tools::profile::{set_profile, ProfileInput};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 12).unwrap()
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        let input = ProfileInput {
            weight_kg: 70.0,
            target_weight_kg: Some(65.0),
            height_cm: 175.0,
            age: Some(30),
            birthday: None,
            gender: "male".to_string(),
            goal: "maintenance".to_string(),
        };
        set_profile(&db, &input, today()).unwrap();
        db
    }

    fn rice(quantity: Option<f64>) -> ItemInput {
        ItemInput {
            item: FoodItem::per_100g("Rice", 130.0, 2.7, 0.3, 28.0),
            quantity,
            unit: None,
        }
    }

    #[test]
    fn test_get_or_create_diary() {
        let db = setup();
        let first = get_or_create_diary(&db, "2025-08-12", today()).unwrap();
        assert!(first.created);
        assert_eq!(first.diary.overall_calorie_target, 1695);
        assert_eq!(first.diary.state, DiaryState::Open);

        let again = get_or_create_diary(&db, "2025-08-12", today()).unwrap();
        assert!(!again.created);

        assert!(get_diary(&db, "2025-08-13", today()).unwrap().is_none());
        assert!(get_or_create_diary(&db, "12/08/2025", today()).is_err());
    }

    #[test]
    fn test_no_profile_and_no_history() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        let err = get_or_create_diary(&db, "2025-08-12", today()).unwrap_err();
        assert!(err.contains("set_profile"));
    }

    #[test]
    fn test_log_and_remove_meal() {
        let db = setup();
        let resp = log_meal(&db, "2025-08-12", today(), "lunch", vec![rice(Some(200.0))]).unwrap();
        assert_eq!(resp.diary.eaten_calories, 260);
        assert_eq!(resp.diary.remaining_calories, 1695 - 260);
        assert!(resp.warnings.is_empty());
        let meal_id = resp.diary.meals[0].id.clone();

        let stored = get_diary(&db, "2025-08-12", today()).unwrap().unwrap();
        assert_eq!(stored.eaten_calories, 260);

        let resp = remove_meal(&db, "2025-08-12", today(), "lunch", &meal_id).unwrap();
        assert_eq!(resp.diary.eaten_calories, 0);
        assert!(remove_meal(&db, "2025-08-12", today(), "lunch", &meal_id).is_err());
    }

    #[test]
    fn test_rejected_change_is_not_stored() {
        let db = setup();
        log_meal(&db, "2025-08-12", today(), "dinner", vec![rice(None)]).unwrap();

        let bad = ItemInput {
            item: FoodItem::per_100g("Mystery", 900.0, 10.0, 10.0, 10.0),
            quantity: None,
            unit: None,
        };
        assert!(log_meal(&db, "2025-08-12", today(), "dinner", vec![bad]).is_err());
        assert!(set_weight(&db, "2025-08-12", today(), -3.0).is_err());

        let stored = get_diary(&db, "2025-08-12", today()).unwrap().unwrap();
        assert_eq!(stored.meals.len(), 1);
        assert_eq!(stored.current_weight, 70.0);
    }

    #[test]
    fn test_log_meal_per_ounce() {
        let db = setup();
        // 6*4 + 14*9 + 6*4 = 174, 26 g of macros per 28.35 g ounce
        let almonds = ItemInput {
            item: FoodItem {
                name: "Almonds".to_string(),
                nutrition: Nutrition::new(170.0, 6.0, 14.0, 6.0),
                portion_size: 1.0,
                portion_unit: "oz".to_string(),
            },
            quantity: None,
            unit: None,
        };
        let resp = log_meal(&db, "2025-08-12", today(), "snack", vec![almonds]).unwrap();
        assert_eq!(resp.diary.eaten_calories, 170);
    }

    #[test]
    fn test_absurd_burn_is_rejected() {
        let db = setup();
        record_burned_calories(&db, "2025-08-12", today(), 400.0).unwrap();

        let err = record_burned_calories(&db, "2025-08-12", today(), 1e19).unwrap_err();
        assert!(err.contains("Invalid burned calories"));
        let view = get_diary(&db, "2025-08-12", today()).unwrap().unwrap();
        assert_eq!(view.burned_calories, 400);
        assert_eq!(view.remaining_calories, 1695 + 400);
    }

    #[test]
    fn test_past_diary_is_closed() {
        let db = setup();
        get_or_create_diary(&db, "2025-08-12", today()).unwrap();

        let tomorrow = today().succ_opt().unwrap();
        let err = log_meal(&db, "2025-08-12", tomorrow, "lunch", vec![rice(None)]).unwrap_err();
        assert!(err.contains("closed"));
        let view = get_diary(&db, "2025-08-12", tomorrow).unwrap().unwrap();
        assert_eq!(view.state, DiaryState::Closed);
    }

    #[test]
    fn test_scale_food() {
        let resp = scale_food(ItemInput {
            item: FoodItem::per_100g("Rice", 130.0, 2.7, 0.3, 28.0),
            quantity: Some(0.25),
            unit: Some("kg".to_string()),
        })
        .unwrap();
        assert!((resp.item.nutrition.calories - 325.0).abs() < 1e-9);
        assert_eq!(resp.item.portion_size, 250.0);
        assert!(resp.validation_error.is_none());

        let err = scale_food(ItemInput {
            item: FoodItem::per_100g("Rice", 130.0, 2.7, 0.3, 28.0),
            quantity: Some(1.0),
            unit: Some("cup".to_string()),
        });
        assert!(err.is_err());
    }
}
