//! Food diary aggregate
//!
//! The per-day record of calories eaten and burned, macro progress, meal
//! entries and trackers. Every mutation leaves
//! `remaining == overall - eaten + burned`.
//!
//! A diary is Open while its day is current and Closed once the day has passed;
//! closed diaries reject all mutations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{FoodItem, Meal, MealSlot, Nutrition, TrackerData, TrackerType, UserProfile};
use crate::error::{DiaryError, ProfileError};
use crate::nutrition::goal::MAX_WEIGHT_KG;
use crate::nutrition::{
    check_totals, BudgetAllocator, BudgetWarning, GoalCalculator, MacroSplit, NutritionValidator,
    SlotTargets, TrackerEngine,
};

/// Step goal used when a stored diary has none
pub const DEFAULT_STEPS_TARGET: u64 = 10_000;

/// Upper bound for calories burned in one day
pub const MAX_BURNED_CALORIES: f64 = 20_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaryState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacroName {
    Carbs,
    Protein,
    Fat,
}

impl MacroName {
    pub const ALL: [MacroName; 3] = [MacroName::Carbs, MacroName::Protein, MacroName::Fat];

    pub fn as_str(&self) -> &'static str {
        match self {
            MacroName::Carbs => "Carbs",
            MacroName::Protein => "Protein",
            MacroName::Fat => "Fat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "carbs" => Some(MacroName::Carbs),
            "protein" => Some(MacroName::Protein),
            "fat" => Some(MacroName::Fat),
            _ => None,
        }
    }

    fn of(&self, n: &Nutrition) -> f64 {
        match self {
            MacroName::Carbs => n.carbs,
            MacroName::Protein => n.protein,
            MacroName::Fat => n.fat,
        }
    }

    fn of_split(&self, split: &MacroSplit) -> f64 {
        match self {
            MacroName::Carbs => split.carbs_g,
            MacroName::Protein => split.protein_g,
            MacroName::Fat => split.fat_g,
        }
    }
}

/// Progress of one macro against its daily target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTarget {
    pub name: MacroName,
    pub current_grams: f64,
    pub target_grams: f64,
}

impl NutritionTarget {
    /// current / target, not clamped; above 1.0 means over budget
    pub fn progress(&self) -> f64 {
        if self.target_grams <= 0.0 {
            return 0.0;
        }
        self.current_grams / self.target_grams
    }

    pub fn is_over_budget(&self) -> bool {
        self.progress() > 1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Steps {
    pub current: u64,
    pub target: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterIntake {
    pub current: f64,
    pub target: f64,
}

/// Calories eaten in one slot against its target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub slot: MealSlot,
    pub calories: i64,
    pub target: i64,
}

/// Something that changed in a diary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiaryEvent {
    MealAdded { meal_id: String, slot: MealSlot, calories: f64 },
    MealRemoved { meal_id: String, slot: MealSlot },
    ItemRemoved { meal_id: String, item: String },
    BurnedCaloriesRecorded { burned_calories: i64 },
    WeightChanged { weight_kg: f64 },
    TrackerSaved { tracker_type: TrackerType, current_value: f64, is_completed: bool },
    BalanceChanged { eaten_calories: i64, burned_calories: i64, remaining_calories: i64 },
}

/// Result of a successful mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiaryChange {
    pub events: Vec<DiaryEvent>,
    pub warnings: Vec<BudgetWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodDiary {
    pub(crate) date: NaiveDate,
    pub(crate) state: DiaryState,
    pub(crate) overall_calorie_target: i64,
    pub(crate) eaten_calories: i64,
    pub(crate) burned_calories: i64,
    pub(crate) remaining_calories: i64,
    pub(crate) nutrition: Vec<NutritionTarget>,
    pub(crate) slot_targets: SlotTargets,
    pub(crate) meals: Vec<Meal>,
    pub(crate) trackers: Vec<TrackerData>,
    pub(crate) current_weight: f64,
    pub(crate) steps: Steps,
    pub(crate) water_intake: WaterIntake,
}

impl FoodDiary {
    /// Fresh open diary for `date` from the profile's calorie plan
    pub fn generate_plan(date: NaiveDate, profile: &UserProfile) -> Result<Self, ProfileError> {
        let plan = GoalCalculator.plan_for(profile)?;
        let overall = plan.daily_calorie_target;
        let split = MacroSplit {
            protein_g: plan.protein_g,
            fat_g: plan.fat_g,
            carbs_g: plan.carbs_g,
        };

        Ok(Self::zeroed(
            date,
            overall,
            macro_targets(&split),
            BudgetAllocator::allocate(overall),
            profile.weight_kg,
            Steps {
                current: 0,
                target: u64::from(GoalCalculator::steps_goal(profile.goal)),
            },
            WaterIntake {
                current: 0.0,
                target: GoalCalculator::water_goal_liters(profile.weight_kg),
            },
        ))
    }

    /// Open diary for a later day with the same targets and weight
    pub fn next_day(&self, date: NaiveDate) -> Self {
        let targets = self
            .nutrition
            .iter()
            .map(|n| NutritionTarget {
                name: n.name,
                current_grams: 0.0,
                target_grams: n.target_grams,
            })
            .collect();

        Self::zeroed(
            date,
            self.overall_calorie_target,
            targets,
            self.slot_targets.clone(),
            self.current_weight,
            Steps {
                current: 0,
                target: self.steps.target,
            },
            WaterIntake {
                current: 0.0,
                target: self.water_intake.target,
            },
        )
    }

    fn zeroed(
        date: NaiveDate,
        overall: i64,
        nutrition: Vec<NutritionTarget>,
        slot_targets: SlotTargets,
        current_weight: f64,
        steps: Steps,
        water_intake: WaterIntake,
    ) -> Self {
        Self {
            date,
            state: DiaryState::Open,
            overall_calorie_target: overall,
            eaten_calories: 0,
            burned_calories: 0,
            remaining_calories: overall,
            nutrition,
            slot_targets,
            meals: Vec::new(),
            trackers: TrackerData::default_set(),
            current_weight,
            steps,
            water_intake,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn state(&self) -> DiaryState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DiaryState::Open
    }

    pub fn overall_calorie_target(&self) -> i64 {
        self.overall_calorie_target
    }

    pub fn eaten_calories(&self) -> i64 {
        self.eaten_calories
    }

    pub fn burned_calories(&self) -> i64 {
        self.burned_calories
    }

    pub fn remaining_calories(&self) -> i64 {
        self.remaining_calories
    }

    pub fn nutrition(&self) -> &[NutritionTarget] {
        &self.nutrition
    }

    pub fn macro_target(&self, name: MacroName) -> Option<&NutritionTarget> {
        self.nutrition.iter().find(|n| n.name == name)
    }

    pub fn slot_targets(&self) -> &SlotTargets {
        &self.slot_targets
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn trackers(&self) -> &[TrackerData] {
        &self.trackers
    }

    pub fn tracker(&self, tracker_type: TrackerType) -> Option<&TrackerData> {
        self.trackers.iter().find(|t| t.tracker_type == tracker_type)
    }

    pub fn current_weight(&self) -> f64 {
        self.current_weight
    }

    pub fn steps(&self) -> Steps {
        self.steps
    }

    pub fn water_intake(&self) -> WaterIntake {
        self.water_intake
    }

    /// Everything eaten in a slot across its entries
    pub fn slot_totals(&self, slot: MealSlot) -> Nutrition {
        self.meals
            .iter()
            .filter(|m| m.slot == slot)
            .map(|m| &m.totals)
            .sum()
    }

    pub fn slot_summaries(&self) -> Vec<SlotSummary> {
        MealSlot::ALL
            .iter()
            .map(|slot| SlotSummary {
                slot: *slot,
                calories: self.slot_totals(*slot).calories.round() as i64,
                target: self.slot_targets.get(*slot),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Close the diary if its day is before `today`. Returns true if it closed now.
    pub fn refresh_state(&mut self, today: NaiveDate) -> bool {
        if self.state == DiaryState::Open && self.date < today {
            self.state = DiaryState::Closed;
            return true;
        }
        false
    }

    fn ensure_open(&self) -> Result<(), DiaryError> {
        match self.state {
            DiaryState::Open => Ok(()),
            DiaryState::Closed => Err(DiaryError::DiaryClosed(self.date)),
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub fn add_meal(&mut self, slot: MealSlot, items: Vec<FoodItem>) -> Result<DiaryChange, DiaryError> {
        self.add_meal_at(slot, items, Utc::now())
    }

    /// Log a meal entry. Items are validated before anything changes; budget
    /// warnings for the slot are returned but never block the entry.
    pub fn add_meal_at(
        &mut self,
        slot: MealSlot,
        items: Vec<FoodItem>,
        logged_at: DateTime<Utc>,
    ) -> Result<DiaryChange, DiaryError> {
        self.ensure_open()?;
        let validator = NutritionValidator;
        for item in &items {
            validator.validate(item)?;
        }

        let meal = Meal::new(slot, items, logged_at);
        let event = DiaryEvent::MealAdded {
            meal_id: meal.id.clone(),
            slot,
            calories: meal.total_calories(),
        };
        self.meals.push(meal);
        self.recompute();

        let warnings = check_totals(&self.slot_totals(slot), self.slot_targets.get(slot));
        Ok(DiaryChange {
            events: vec![event, self.balance_event()],
            warnings,
        })
    }

    pub fn remove_meal(&mut self, slot: MealSlot, meal_id: &str) -> Result<DiaryChange, DiaryError> {
        self.ensure_open()?;
        let index = self
            .meals
            .iter()
            .position(|m| m.slot == slot && m.id == meal_id)
            .ok_or_else(|| DiaryError::MealNotFound {
                slot,
                meal_id: meal_id.to_string(),
            })?;

        let removed = self.meals.remove(index);
        self.recompute();

        Ok(DiaryChange {
            events: vec![
                DiaryEvent::MealRemoved {
                    meal_id: removed.id,
                    slot,
                },
                self.balance_event(),
            ],
            warnings: Vec::new(),
        })
    }

    /// Remove one item from an entry; an entry left empty is removed too
    pub fn remove_food_item(&mut self, meal_id: &str, index: usize) -> Result<DiaryChange, DiaryError> {
        self.ensure_open()?;
        let position = self
            .meals
            .iter()
            .position(|m| m.id == meal_id)
            .ok_or_else(|| DiaryError::ItemNotFound {
                meal_id: meal_id.to_string(),
                index,
            })?;

        let meal = &mut self.meals[position];
        let item = meal.remove_item(index).ok_or_else(|| DiaryError::ItemNotFound {
            meal_id: meal_id.to_string(),
            index,
        })?;

        let mut events = vec![DiaryEvent::ItemRemoved {
            meal_id: meal_id.to_string(),
            item: item.name,
        }];
        if meal.items.is_empty() {
            let slot = meal.slot;
            self.meals.remove(position);
            events.push(DiaryEvent::MealRemoved {
                meal_id: meal_id.to_string(),
                slot,
            });
        }

        self.recompute();
        events.push(self.balance_event());
        Ok(DiaryChange {
            events,
            warnings: Vec::new(),
        })
    }

    /// Set (not add) the calories burned today
    pub fn record_burned_calories(&mut self, amount: f64) -> Result<DiaryChange, DiaryError> {
        self.ensure_open()?;
        if !amount.is_finite() || !(0.0..=MAX_BURNED_CALORIES).contains(&amount) {
            return Err(DiaryError::InvalidBurn(amount));
        }

        self.burned_calories = amount.round() as i64;
        self.recompute();

        Ok(DiaryChange {
            events: vec![
                DiaryEvent::BurnedCaloriesRecorded {
                    burned_calories: self.burned_calories,
                },
                self.balance_event(),
            ],
            warnings: Vec::new(),
        })
    }

    pub fn set_current_weight(&mut self, weight_kg: f64) -> Result<DiaryChange, DiaryError> {
        self.ensure_open()?;
        if !weight_kg.is_finite() || weight_kg <= 0.0 || weight_kg > MAX_WEIGHT_KG {
            return Err(DiaryError::InvalidWeight(weight_kg));
        }

        self.current_weight = weight_kg;
        Ok(DiaryChange {
            events: vec![DiaryEvent::WeightChanged { weight_kg }],
            warnings: Vec::new(),
        })
    }

    /// Store a tracker value, recomputing completion. The value is floored at
    /// 0 (binary trackers snap to 0 or 1). Steps and water trackers also
    /// update the matching daily counters.
    pub fn save_tracker(&mut self, tracker: &TrackerData) -> Result<DiaryChange, DiaryError> {
        self.ensure_open()?;
        let engine = TrackerEngine;
        let saved = engine.save(&engine.set_value(tracker, tracker.current_value));

        match saved.tracker_type {
            TrackerType::Steps => self.steps.current = saved.current_value.round() as u64,
            TrackerType::Water => self.water_intake.current = saved.current_value,
            _ => {}
        }

        let event = DiaryEvent::TrackerSaved {
            tracker_type: saved.tracker_type,
            current_value: saved.current_value,
            is_completed: saved.is_completed,
        };
        match self
            .trackers
            .iter_mut()
            .find(|t| t.tracker_type == saved.tracker_type)
        {
            Some(existing) => *existing = saved,
            None => self.trackers.push(saved),
        }

        Ok(DiaryChange {
            events: vec![event],
            warnings: Vec::new(),
        })
    }

    /// Re-derive eaten calories, macro progress and the remaining balance
    pub(crate) fn recompute(&mut self) {
        let totals: Nutrition = self.meals.iter().map(|m| &m.totals).sum();
        self.eaten_calories = totals.calories.round() as i64;
        for target in &mut self.nutrition {
            target.current_grams = target.name.of(&totals);
        }
        // Saturating: stored documents are not bounded like live input
        self.remaining_calories = self
            .overall_calorie_target
            .saturating_sub(self.eaten_calories)
            .saturating_add(self.burned_calories);
    }

    fn balance_event(&self) -> DiaryEvent {
        DiaryEvent::BalanceChanged {
            eaten_calories: self.eaten_calories,
            burned_calories: self.burned_calories,
            remaining_calories: self.remaining_calories,
        }
    }
}

/// Zero-progress macro targets in diary order (Carbs, Protein, Fat)
pub fn macro_targets(split: &MacroSplit) -> Vec<NutritionTarget> {
    MacroName::ALL
        .iter()
        .map(|name| NutritionTarget {
            name: *name,
            current_grams: 0.0,
            target_grams: name.of_split(split),
        })
        .collect()
}
