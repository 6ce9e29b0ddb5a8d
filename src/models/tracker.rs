//! Habit tracker model
//!
//! One tracker per type per day, either quantity based (water, steps, ...) or a
//! binary challenge (0 = not done, 1 = done).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tracker type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackerType {
    Water,
    Fruit,
    Vegetable,
    Protein,
    Steps,
    NoSugar,
    NoFastFood,
    NoLateNightEating,
}

impl TrackerType {
    pub const ALL: [TrackerType; 8] = [
        TrackerType::Water,
        TrackerType::Fruit,
        TrackerType::Vegetable,
        TrackerType::Protein,
        TrackerType::Steps,
        TrackerType::NoSugar,
        TrackerType::NoFastFood,
        TrackerType::NoLateNightEating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerType::Water => "water",
            TrackerType::Fruit => "fruit",
            TrackerType::Vegetable => "vegetable",
            TrackerType::Protein => "protein",
            TrackerType::Steps => "steps",
            TrackerType::NoSugar => "noSugar",
            TrackerType::NoFastFood => "noFastFood",
            TrackerType::NoLateNightEating => "noLateNightEating",
        }
    }

    /// Accepts the persisted camelCase names as well as snake_case
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s.trim().chars().filter(|c| *c != '_').collect();
        match key.to_lowercase().as_str() {
            "water" => Some(TrackerType::Water),
            "fruit" => Some(TrackerType::Fruit),
            "vegetable" => Some(TrackerType::Vegetable),
            "protein" => Some(TrackerType::Protein),
            "steps" => Some(TrackerType::Steps),
            "nosugar" => Some(TrackerType::NoSugar),
            "nofastfood" => Some(TrackerType::NoFastFood),
            "nolatenighteating" => Some(TrackerType::NoLateNightEating),
            _ => None,
        }
    }

    /// Challenge trackers only take the values 0 and 1
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            TrackerType::NoSugar | TrackerType::NoFastFood | TrackerType::NoLateNightEating
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackerType::Water => "Track Your Water Intake",
            TrackerType::Fruit => "Track Your Fruit Intake",
            TrackerType::Vegetable => "Track Your Vegetable Intake",
            TrackerType::Protein => "Track Your Protein Intake",
            TrackerType::Steps => "Track Your Steps",
            TrackerType::NoSugar => "No Sugar Challenge",
            TrackerType::NoFastFood => "No Fast Food Challenge",
            TrackerType::NoLateNightEating => "No Late-Night Eating Challenge",
        }
    }

    pub fn weekly_title(&self) -> &'static str {
        match self {
            TrackerType::Water => "Track Your Water Intake",
            TrackerType::Fruit => "Track Your Weekly Fruit Intake",
            TrackerType::Vegetable => "Track Your Weekly Vegetable Intake",
            TrackerType::Protein => "Track Your Weekly Protein Intake",
            TrackerType::Steps => "Track Your Steps Weekly",
            TrackerType::NoSugar => "Weekly No Sugar Challenge",
            TrackerType::NoFastFood => "Weekly No Fast Food Challenge",
            TrackerType::NoLateNightEating => "Weekly No Late-Night Eating Challenge",
        }
    }

    pub fn goal_description(&self) -> &'static str {
        match self {
            TrackerType::Water => "Goal: 2.00 L",
            TrackerType::Fruit => "Goal: 1 or 2 fruits per day",
            TrackerType::Vegetable => "Goal: 1 or 2 vegetables per day",
            TrackerType::Protein => "Goal: 50 g of protein",
            TrackerType::Steps => "Goal: 10000 steps",
            TrackerType::NoSugar => "Goal: 0g of added sugar per day",
            TrackerType::NoFastFood => "Goal: 0 fast food meals per day",
            TrackerType::NoLateNightEating => "Goal: No food after 8:00 PM",
        }
    }
}

impl std::fmt::Display for TrackerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one tracker for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerData {
    pub id: String,
    pub tracker_type: TrackerType,
    pub current_value: f64,
    pub is_completed: bool,
    pub title: String,
    pub goal_description: String,
}

impl TrackerData {
    /// A fresh tracker at zero
    pub fn new(tracker_type: TrackerType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tracker_type,
            current_value: 0.0,
            is_completed: false,
            title: tracker_type.title().to_string(),
            goal_description: tracker_type.goal_description().to_string(),
        }
    }

    /// One tracker per type, all at zero
    pub fn default_set() -> Vec<Self> {
        TrackerType::ALL.iter().map(|t| Self::new(*t)).collect()
    }
}
