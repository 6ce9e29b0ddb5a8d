//! Weekly tracker rollup
//!
//! Counts the days in a trailing window of at most seven diaries on which a
//! tracker was completed.

use serde::Serialize;

use crate::models::{FoodDiary, TrackerType};

pub const WEEK_DAYS: usize = 7;

/// Read-only weekly view of one tracker type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyTracker {
    pub title: String,
    pub goal: String,
    pub tracker_type: TrackerType,
    pub total_days: usize,
    pub days_completed: usize,
}

/// Roll up diaries ordered oldest first; only the last seven count
pub fn weekly_rollup(diaries: &[FoodDiary], tracker_type: TrackerType) -> WeeklyTracker {
    let window = &diaries[diaries.len().saturating_sub(WEEK_DAYS)..];
    let days_completed = window
        .iter()
        .filter(|diary| {
            diary
                .tracker(tracker_type)
                .map(|t| t.is_completed)
                .unwrap_or(false)
        })
        .count();

    WeeklyTracker {
        title: tracker_type.weekly_title().to_string(),
        goal: tracker_type.goal_description().to_string(),
        tracker_type,
        total_days: window.len(),
        days_completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Goal, UserProfile};
    use crate::nutrition::TrackerEngine;
    use chrono::NaiveDate;

    fn diaries(days: u32, water_done_on: &[u32]) -> Vec<FoodDiary> {
        let profile = UserProfile {
            weight_kg: 70.0,
            target_weight_kg: 68.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            goal: Goal::Maintenance,
        };
        let engine = TrackerEngine;
        (1..=days)
            .map(|day| {
                let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
                let mut diary = FoodDiary::generate_plan(date, &profile).unwrap();
                if water_done_on.contains(&day) {
                    let water = diary.tracker(TrackerType::Water).unwrap().clone();
                    let full = engine.set_value(&water, 2.0);
                    diary.save_tracker(&full).unwrap();
                }
                diary
            })
            .collect()
    }

    #[test]
    fn test_rollup_counts_completed_days() {
        let week = diaries(7, &[1, 3, 5, 7]);
        let rollup = weekly_rollup(&week, TrackerType::Water);
        assert_eq!(rollup.days_completed, 4);
        assert_eq!(rollup.total_days, 7);
        assert_eq!(rollup.title, "Track Your Water Intake");

        assert_eq!(weekly_rollup(&week, TrackerType::Fruit).days_completed, 0);
    }

    #[test]
    fn test_rollup_uses_last_seven_only() {
        let ten_days = diaries(10, &[1, 2, 3, 10]);
        let rollup = weekly_rollup(&ten_days, TrackerType::Water);
        assert_eq!(rollup.total_days, 7);
        assert_eq!(rollup.days_completed, 1);
    }

    #[test]
    fn test_rollup_short_history() {
        let three = diaries(3, &[2]);
        let rollup = weekly_rollup(&three, TrackerType::Water);
        assert_eq!(rollup.total_days, 3);
        assert_eq!(rollup.days_completed, 1);

        let empty = weekly_rollup(&[], TrackerType::Steps);
        assert_eq!(empty.total_days, 0);
        assert_eq!(empty.days_completed, 0);
    }
}
