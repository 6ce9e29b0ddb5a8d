//! Tracker stepping and completion rules
//!
//! | type               | step | completed when |
//! |--------------------|------|----------------|
//! | water (L)          | 0.25 | >= 2.0         |
//! | fruit, vegetable   | 1    | >= 1           |
//! | protein (g)        | 5    | >= 50          |
//! | steps              | 500  | >= 10000       |
//! | binary challenges  | 1    | == 1           |

use crate::models::{TrackerData, TrackerType};

/// Step size and completion threshold for a tracker type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerRule {
    pub step: f64,
    pub threshold: f64,
}

impl TrackerRule {
    pub fn for_type(tracker_type: TrackerType) -> Self {
        let (step, threshold) = match tracker_type {
            TrackerType::Water => (0.25, 2.0),
            TrackerType::Fruit | TrackerType::Vegetable => (1.0, 1.0),
            TrackerType::Protein => (5.0, 50.0),
            TrackerType::Steps => (500.0, 10_000.0),
            TrackerType::NoSugar | TrackerType::NoFastFood | TrackerType::NoLateNightEating => {
                (1.0, 1.0)
            }
        };
        Self { step, threshold }
    }
}

/// Stateless; every operation returns a new tracker value
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackerEngine;

impl TrackerEngine {
    pub fn increment(&self, tracker: &TrackerData) -> TrackerData {
        let step = TrackerRule::for_type(tracker.tracker_type).step;
        self.with_value(tracker, tracker.current_value + step)
    }

    pub fn decrement(&self, tracker: &TrackerData) -> TrackerData {
        let step = TrackerRule::for_type(tracker.tracker_type).step;
        self.with_value(tracker, tracker.current_value - step)
    }

    /// Absolute reading, e.g. a pedometer total
    pub fn set_value(&self, tracker: &TrackerData, value: f64) -> TrackerData {
        self.with_value(tracker, value)
    }

    /// Recompute the completion flag
    pub fn save(&self, tracker: &TrackerData) -> TrackerData {
        let mut saved = tracker.clone();
        saved.is_completed = self.is_completed(tracker.tracker_type, tracker.current_value);
        saved
    }

    pub fn is_completed(&self, tracker_type: TrackerType, value: f64) -> bool {
        let rule = TrackerRule::for_type(tracker_type);
        if tracker_type.is_binary() {
            value == rule.threshold
        } else {
            value >= rule.threshold
        }
    }

    fn with_value(&self, tracker: &TrackerData, value: f64) -> TrackerData {
        let mut value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        if tracker.tracker_type.is_binary() {
            value = if value >= 1.0 { 1.0 } else { 0.0 };
        }
        let mut next = tracker.clone();
        next.current_value = value;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(tracker_type: TrackerType, value: f64) -> TrackerData {
        let mut t = TrackerData::new(tracker_type);
        t.current_value = value;
        t
    }

    #[test]
    fn test_water_steps_and_completion() {
        let engine = TrackerEngine;
        let mut water = tracker(TrackerType::Water, 0.0);
        for _ in 0..7 {
            water = engine.increment(&water);
        }
        assert_eq!(water.current_value, 1.75);
        assert!(!engine.save(&water).is_completed);

        water = engine.save(&engine.increment(&water));
        assert_eq!(water.current_value, 2.0);
        assert!(water.is_completed);
    }

    #[test]
    fn test_completion_boundary() {
        let engine = TrackerEngine;
        assert!(!engine.save(&tracker(TrackerType::Water, 1.99)).is_completed);
        assert!(engine.save(&tracker(TrackerType::Water, 2.0)).is_completed);
        assert!(engine.save(&tracker(TrackerType::Water, 3.5)).is_completed);
        assert!(!engine.save(&tracker(TrackerType::Steps, 9_999.0)).is_completed);
        assert!(engine.save(&tracker(TrackerType::Steps, 10_000.0)).is_completed);
        assert!(engine.save(&tracker(TrackerType::Protein, 50.0)).is_completed);
        assert!(engine.save(&tracker(TrackerType::Fruit, 1.0)).is_completed);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let engine = TrackerEngine;
        let protein = engine.decrement(&tracker(TrackerType::Protein, 3.0));
        assert_eq!(protein.current_value, 0.0);
        let steps = engine.decrement(&tracker(TrackerType::Steps, 0.0));
        assert_eq!(steps.current_value, 0.0);
    }

    #[test]
    fn test_binary_tracker_stays_in_range() {
        let engine = TrackerEngine;
        let done = engine.increment(&engine.increment(&tracker(TrackerType::NoSugar, 0.0)));
        assert_eq!(done.current_value, 1.0);
        assert!(engine.save(&done).is_completed);

        let undone = engine.decrement(&done);
        assert_eq!(undone.current_value, 0.0);
        assert!(!engine.save(&undone).is_completed);

        assert_eq!(engine.set_value(&undone, 0.4).current_value, 0.0);
    }

    #[test]
    fn test_set_value() {
        let engine = TrackerEngine;
        let steps = engine.set_value(&tracker(TrackerType::Steps, 0.0), 12_345.0);
        assert_eq!(steps.current_value, 12_345.0);
        assert_eq!(engine.set_value(&steps, -5.0).current_value, 0.0);
        // Saving does not touch the value
        assert_eq!(engine.save(&steps).current_value, 12_345.0);
    }
}
