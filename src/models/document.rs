//! Stored document shapes
//!
//! Diaries are persisted as camelCase JSON keyed by `yyyy-MM-dd`. Documents
//! written before `schemaVersion` existed (version 0) may lack fields; loading
//! fills them in and recomputes everything derived, so a loaded diary always
//! satisfies the calorie balance.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::food_diary::{macro_targets, DEFAULT_STEPS_TARGET};
use super::{
    age_on, DiaryState, FoodDiary, FoodItem, Gender, Goal, MacroName, Meal, MealSlot, Nutrition,
    NutritionTarget, Steps, TrackerData, TrackerType, UserProfile, WaterIntake,
};
use crate::error::ProfileError;
use crate::nutrition::goal::MAX_WEIGHT_KG;
use crate::nutrition::{GoalCalculator, MacroSplit, SlotTargets, TrackerEngine};

pub const SCHEMA_VERSION: u32 = 1;

/// Storage key for a diary date
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionDocument {
    pub name: String,
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub target: f64,
}

/// Per-slot summary; only `target` is read back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDocument {
    pub name: String,
    #[serde(default)]
    pub calories: i64,
    #[serde(default)]
    pub target: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub portion_size: f64,
    #[serde(default = "default_unit")]
    pub portion_unit: String,
}

fn default_unit() -> String {
    "g".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDocument {
    pub id: String,
    pub slot: MealSlot,
    pub items: Vec<ItemDocument>,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub tracker_type: String,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepsDocument {
    #[serde(default)]
    pub current: u64,
    #[serde(default = "default_steps_target")]
    pub target: u64,
}

fn default_steps_target() -> u64 {
    DEFAULT_STEPS_TARGET
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterDocument {
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub target: f64,
}

/// A diary as stored
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDiaryDocument {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub overall_calories: Option<i64>,
    #[serde(default)]
    pub eaten_calories: i64,
    #[serde(default)]
    pub burned_calories: i64,
    #[serde(default)]
    pub remaining_calories: Option<i64>,
    #[serde(default)]
    pub nutrition: Vec<NutritionDocument>,
    #[serde(default)]
    pub meals: Vec<SlotDocument>,
    #[serde(default)]
    pub entries: Vec<EntryDocument>,
    #[serde(default)]
    pub trackers: Option<Vec<TrackerDocument>>,
    #[serde(default)]
    pub current_weight: Option<f64>,
    #[serde(default)]
    pub steps: Option<StepsDocument>,
    #[serde(default)]
    pub water_intake: Option<WaterDocument>,
}

/// Values used for fields an old document lacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentDefaults {
    pub weight_kg: f64,
    pub water_target: f64,
}

impl DocumentDefaults {
    pub fn from_profile(profile: Option<&UserProfile>) -> Self {
        match profile {
            Some(p) => Self {
                weight_kg: p.weight_kg,
                water_target: GoalCalculator::water_goal_liters(p.weight_kg),
            },
            None => Self {
                weight_kg: 0.0,
                water_target: 2.0,
            },
        }
    }
}

impl FoodDiaryDocument {
    pub fn from_diary(diary: &FoodDiary) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            overall_calories: Some(diary.overall_calorie_target),
            eaten_calories: diary.eaten_calories,
            burned_calories: diary.burned_calories,
            remaining_calories: Some(diary.remaining_calories),
            nutrition: diary
                .nutrition
                .iter()
                .map(|n| NutritionDocument {
                    name: n.name.as_str().to_string(),
                    current: n.current_grams,
                    target: n.target_grams,
                })
                .collect(),
            meals: diary
                .slot_summaries()
                .into_iter()
                .map(|s| SlotDocument {
                    name: s.slot.as_str().to_string(),
                    calories: s.calories,
                    target: Some(s.target),
                })
                .collect(),
            entries: diary.meals.iter().map(entry_document).collect(),
            trackers: Some(
                diary
                    .trackers
                    .iter()
                    .map(|t| TrackerDocument {
                        id: Some(t.id.clone()),
                        tracker_type: t.tracker_type.as_str().to_string(),
                        current_value: t.current_value,
                        is_completed: t.is_completed,
                        title: Some(t.title.clone()),
                        goal: Some(t.goal_description.clone()),
                    })
                    .collect(),
            ),
            current_weight: Some(diary.current_weight),
            steps: Some(StepsDocument {
                current: diary.steps.current,
                target: diary.steps.target,
            }),
            water_intake: Some(WaterDocument {
                current: diary.water_intake.current,
                target: diary.water_intake.target,
            }),
        }
    }

    /// Load into a diary, migrating older documents and closing past days
    pub fn into_diary(self, date: NaiveDate, today: NaiveDate, defaults: &DocumentDefaults) -> FoodDiary {
        if self.schema_version < SCHEMA_VERSION {
            tracing::debug!("Migrating diary {} from schema v{}", date, self.schema_version);
        }

        let overall = self.overall_calories.unwrap_or_else(|| {
            self.remaining_calories
                .unwrap_or(0)
                .saturating_add(self.eaten_calories)
                .saturating_sub(self.burned_calories)
        });

        let mut meals: Vec<Meal> = self.entries.into_iter().map(meal_from_entry).collect();
        if meals.is_empty() {
            meals = legacy_entries(&self.meals, date);
        }

        let known_targets: BTreeMap<MealSlot, i64> = self
            .meals
            .iter()
            .filter_map(|s| Some((MealSlot::from_str(&s.name)?, s.target?)))
            .collect();

        let trackers = match self.trackers {
            Some(stored) => restore_trackers(stored),
            None => TrackerData::default_set(),
        };

        let mut steps = self
            .steps
            .map(|s| Steps {
                current: s.current,
                target: s.target,
            })
            .unwrap_or(Steps {
                current: 0,
                target: DEFAULT_STEPS_TARGET,
            });
        let mut water_intake = self
            .water_intake
            .map(|w| WaterIntake {
                current: w.current,
                target: w.target,
            })
            .unwrap_or(WaterIntake {
                current: 0.0,
                target: defaults.water_target,
            });
        // Older documents only kept the tracker values
        if self.steps.is_none() {
            if let Some(t) = trackers.iter().find(|t| t.tracker_type == TrackerType::Steps) {
                steps.current = t.current_value.round() as u64;
            }
        }
        if self.water_intake.is_none() {
            if let Some(t) = trackers.iter().find(|t| t.tracker_type == TrackerType::Water) {
                water_intake.current = t.current_value;
            }
        }

        let current_weight = self
            .current_weight
            .filter(|w| w.is_finite() && *w > 0.0 && *w <= MAX_WEIGHT_KG)
            .unwrap_or(defaults.weight_kg);

        let mut diary = FoodDiary {
            date,
            state: DiaryState::Open,
            overall_calorie_target: overall,
            eaten_calories: 0,
            burned_calories: self.burned_calories.max(0),
            remaining_calories: overall,
            nutrition: restore_nutrition(&self.nutrition, overall),
            slot_targets: SlotTargets::from_partial(overall, &known_targets),
            meals,
            trackers,
            current_weight,
            steps,
            water_intake,
        };
        diary.recompute();

        if let Some(stored) = self.remaining_calories {
            if stored != diary.remaining_calories {
                tracing::debug!(
                    "Diary {} stored remaining {} kcal, recomputed {}",
                    date,
                    stored,
                    diary.remaining_calories
                );
            }
        }

        diary.refresh_state(today);
        diary
    }
}

fn entry_document(meal: &Meal) -> EntryDocument {
    EntryDocument {
        id: meal.id.clone(),
        slot: meal.slot,
        items: meal
            .items
            .iter()
            .map(|i| ItemDocument {
                name: i.name.clone(),
                calories: i.nutrition.calories,
                protein: i.nutrition.protein,
                fat: i.nutrition.fat,
                carbs: i.nutrition.carbs,
                portion_size: i.portion_size,
                portion_unit: i.portion_unit.clone(),
            })
            .collect(),
        logged_at: meal.logged_at,
    }
}

fn meal_from_entry(entry: EntryDocument) -> Meal {
    let items = entry
        .items
        .into_iter()
        .map(|i| FoodItem {
            name: i.name,
            nutrition: Nutrition::new(i.calories, i.protein, i.fat, i.carbs),
            portion_size: i.portion_size,
            portion_unit: i.portion_unit,
        })
        .collect();

    let mut meal = Meal::new(entry.slot, items, entry.logged_at);
    meal.id = entry.id;
    meal
}

/// Documents without entries only kept calories per slot; carry each as one item
fn legacy_entries(slots: &[SlotDocument], date: NaiveDate) -> Vec<Meal> {
    let logged_at = date
        .and_hms_opt(12, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    slots
        .iter()
        .filter(|s| s.calories > 0)
        .filter_map(|s| {
            let slot = MealSlot::from_str(&s.name)?;
            let item = FoodItem {
                name: format!("Logged {}", slot),
                nutrition: Nutrition::new(s.calories as f64, 0.0, 0.0, 0.0),
                portion_size: 1.0,
                portion_unit: "serving".to_string(),
            };
            Some(Meal::new(slot, vec![item], logged_at))
        })
        .collect()
}

fn restore_nutrition(stored: &[NutritionDocument], overall: i64) -> Vec<NutritionTarget> {
    let stored_target = |name: MacroName| {
        stored
            .iter()
            .find(|n| MacroName::from_str(&n.name) == Some(name))
            .map(|n| n.target)
    };

    let mut targets = macro_targets(&MacroSplit::for_calories(overall as f64));
    if MacroName::ALL.iter().all(|n| stored_target(*n).is_some()) {
        for target in &mut targets {
            target.target_grams = stored_target(target.name).unwrap_or(target.target_grams);
        }
    }
    targets
}

fn restore_trackers(stored: Vec<TrackerDocument>) -> Vec<TrackerData> {
    let engine = TrackerEngine;
    let mut trackers: Vec<TrackerData> = Vec::with_capacity(TrackerType::ALL.len());

    for doc in stored {
        let Some(tracker_type) = TrackerType::from_str(&doc.tracker_type) else {
            tracing::warn!("Skipping unknown tracker type '{}'", doc.tracker_type);
            continue;
        };
        if trackers.iter().any(|t| t.tracker_type == tracker_type) {
            continue;
        }

        let mut tracker = TrackerData::new(tracker_type);
        if let Some(id) = doc.id {
            tracker.id = id;
        }
        let tracker = engine.save(&engine.set_value(&tracker, doc.current_value));
        trackers.push(tracker);
    }

    for tracker_type in TrackerType::ALL {
        if !trackers.iter().any(|t| t.tracker_type == tracker_type) {
            trackers.push(TrackerData::new(tracker_type));
        }
    }
    trackers.sort_by_key(|t| t.tracker_type);
    trackers
}

/// The user profile as stored. Onboarding may leave fields unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub target_weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub current_goal: Option<String>,
}

impl ProfileDocument {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            weight: Some(profile.weight_kg),
            target_weight: Some(profile.target_weight_kg),
            height: Some(profile.height_cm),
            age: Some(profile.age),
            birthday: None,
            gender: Some(profile.gender.as_str().to_string()),
            current_goal: Some(profile.goal.as_str().to_string()),
        }
    }

    /// Validate into a profile. Age comes from `age`, else from `birthday` as of `on`.
    pub fn to_profile(&self, on: NaiveDate) -> Result<UserProfile, ProfileError> {
        let weight_kg = self.weight.ok_or_else(|| ProfileError::invalid("weight", "missing"))?;
        let height_cm = self.height.ok_or_else(|| ProfileError::invalid("height", "missing"))?;
        let target_weight_kg = self.target_weight.unwrap_or(weight_kg);
        if !target_weight_kg.is_finite() || target_weight_kg <= 0.0 || target_weight_kg > MAX_WEIGHT_KG {
            return Err(ProfileError::invalid("target_weight", target_weight_kg));
        }

        let age = match (self.age, self.birthday) {
            (Some(age), _) => age,
            (None, Some(birthday)) => {
                age_on(birthday, on).ok_or_else(|| ProfileError::invalid("birthday", birthday))?
            }
            (None, None) => return Err(ProfileError::invalid("age", "missing")),
        };

        let gender_str = self.gender.as_deref().unwrap_or_default();
        let gender = Gender::from_str(gender_str).ok_or_else(|| ProfileError::invalid("gender", gender_str))?;
        let goal_str = self.current_goal.as_deref().unwrap_or_default();
        let goal = Goal::from_str(goal_str).ok_or_else(|| ProfileError::invalid("goal", goal_str))?;

        GoalCalculator::check_inputs(weight_kg, height_cm, age)?;

        Ok(UserProfile {
            weight_kg,
            target_weight_kg,
            height_cm,
            age,
            gender,
            goal,
        })
    }
}
