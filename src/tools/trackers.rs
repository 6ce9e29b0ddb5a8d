//! Tracker MCP Tools
//!
//! Habit trackers and the weekly rollup. Saving a tracker writes only the
//! changed parts of the stored document; saving steps also sets the day's
//! burned calories.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::diary::{load_diary, load_or_create, parse_date, LoadedDiary};
use crate::db::{documents, Database, TrackerPatch};
use crate::models::{
    DiaryEvent, DocumentDefaults, FoodDiary, FoodDiaryDocument, Steps, TrackerData, TrackerType, WaterIntake,
};
use crate::nutrition::{calories_burned, weekly_rollup, TrackerEngine, WeeklyTracker, WEEK_DAYS};

/// What to do with a tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerAction {
    Increment,
    Decrement,
    Set(f64),
}

impl TrackerAction {
    pub fn parse(action: &str, value: Option<f64>) -> Result<Self, String> {
        match action.trim().to_lowercase().as_str() {
            "increment" => Ok(TrackerAction::Increment),
            "decrement" => Ok(TrackerAction::Decrement),
            "set" => value
                .map(TrackerAction::Set)
                .ok_or_else(|| "Action 'set' needs a value".to_string()),
            _ => Err(format!(
                "Invalid action: {}. Must be one of: increment, decrement, set",
                action
            )),
        }
    }
}

pub fn parse_tracker_type(tracker_type: &str) -> Result<TrackerType, String> {
    TrackerType::from_str(tracker_type).ok_or_else(|| {
        let known: Vec<&str> = TrackerType::ALL.iter().map(|t| t.as_str()).collect();
        format!(
            "Invalid tracker type: {}. Must be one of: {}",
            tracker_type,
            known.join(", ")
        )
    })
}

/// Response for update_tracker
#[derive(Debug, Serialize)]
pub struct TrackerResponse {
    pub date: String,
    pub tracker: TrackerData,
    pub steps: Steps,
    pub water_intake: WaterIntake,
    pub burned_calories: i64,
    pub remaining_calories: i64,
    pub events: Vec<DiaryEvent>,
}

/// Response for weekly_progress
#[derive(Debug, Serialize)]
pub struct WeeklyProgressResponse {
    pub from: String,
    pub to: String,
    pub trackers: Vec<WeeklyTracker>,
}

/// Step a tracker or set its value, then save it
pub fn update_tracker(
    db: &Database,
    date: &str,
    today: NaiveDate,
    tracker_type: &str,
    action: TrackerAction,
) -> Result<TrackerResponse, String> {
    let date = parse_date(date)?;
    let tracker_type = parse_tracker_type(tracker_type)?;
    let engine = TrackerEngine;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn.transaction().map_err(|e| format!("Database error: {}", e))?;

    let mut loaded = load_or_create(&tx, date, today)?;
    let diary = &mut loaded.diary;
    let current = diary
        .tracker(tracker_type)
        .cloned()
        .unwrap_or_else(|| TrackerData::new(tracker_type));

    let next = match action {
        TrackerAction::Increment => engine.increment(&current),
        TrackerAction::Decrement => engine.decrement(&current),
        TrackerAction::Set(value) => engine.set_value(&current, value),
    };

    let mut events = diary.save_tracker(&next).map_err(|e| e.to_string())?.events;
    if tracker_type == TrackerType::Steps {
        let burned = calories_burned(diary.steps().current as f64, diary.current_weight());
        let change = diary.record_burned_calories(burned).map_err(|e| e.to_string())?;
        events.extend(change.events);
    }

    persist_tracker(&tx, &loaded, tracker_type)?;
    tx.commit().map_err(|e| format!("Database error: {}", e))?;

    let diary = &loaded.diary;
    let tracker = diary
        .tracker(tracker_type)
        .cloned()
        .ok_or_else(|| format!("Tracker {} missing after save", tracker_type))?;

    Ok(TrackerResponse {
        date: diary.date().format("%Y-%m-%d").to_string(),
        tracker,
        steps: diary.steps(),
        water_intake: diary.water_intake(),
        burned_calories: diary.burned_calories(),
        remaining_calories: diary.remaining_calories(),
        events,
    })
}

/// Patch the stored document in place when it is current, otherwise store it whole
fn persist_tracker(conn: &rusqlite::Connection, loaded: &LoadedDiary, tracker_type: TrackerType) -> Result<(), String> {
    let diary = &loaded.diary;
    let document = FoodDiaryDocument::from_diary(diary);

    let stored_index = if loaded.is_current() {
        loaded.stored.as_ref().and_then(|doc| {
            doc.trackers.as_ref()?.iter().position(|t| {
                TrackerType::from_str(&t.tracker_type) == Some(tracker_type)
            })
        })
    } else {
        None
    };
    let tracker = document.trackers.as_ref().and_then(|trackers| {
        trackers
            .iter()
            .find(|t| TrackerType::from_str(&t.tracker_type) == Some(tracker_type))
    });

    if let (Some(index), Some(tracker)) = (stored_index, tracker) {
        let patch = TrackerPatch {
            index,
            tracker: serde_json::to_value(tracker).map_err(|e| format!("Failed to encode tracker: {}", e))?,
            steps_current: diary.steps().current,
            water_current: diary.water_intake().current,
            burned_calories: diary.burned_calories(),
            remaining_calories: diary.remaining_calories(),
        };
        let patched = documents::patch_tracker(conn, diary.date(), &patch)
            .map_err(|e| format!("Failed to save tracker: {}", e))?;
        if patched {
            tracing::debug!("Patched {} tracker for {}", tracker_type, diary.date());
            return Ok(());
        }
    }

    documents::put_diary(conn, diary.date(), &document).map_err(|e| format!("Failed to save diary: {}", e))
}

/// Completion over the seven days ending `today`, for one tracker type or all
pub fn weekly_progress(
    db: &Database,
    today: NaiveDate,
    tracker_type: Option<&str>,
) -> Result<WeeklyProgressResponse, String> {
    let types = match tracker_type {
        Some(t) => vec![parse_tracker_type(t)?],
        None => TrackerType::ALL.to_vec(),
    };
    let from = today - Duration::days(WEEK_DAYS as i64 - 1);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let stored = documents::list_diaries(&conn, from, today)
        .map_err(|e| format!("Failed to list diaries: {}", e))?;

    let defaults = match super::profile::load_profile(&conn, today) {
        Ok(profile) => DocumentDefaults::from_profile(profile.as_ref()),
        Err(_) => DocumentDefaults::from_profile(None),
    };
    let diaries: Vec<FoodDiary> = stored
        .into_iter()
        .map(|(date, doc)| doc.into_diary(date, today, &defaults))
        .collect();

    Ok(WeeklyProgressResponse {
        from: from.format("%Y-%m-%d").to_string(),
        to: today.format("%Y-%m-%d").to_string(),
        trackers: types.into_iter().map(|t| weekly_rollup(&diaries, t)).collect(),
    })
}

/// Trackers for a stored diary
pub fn get_trackers(db: &Database, date: &str, today: NaiveDate) -> Result<Option<Vec<TrackerData>>, String> {
    let date = parse_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Ok(load_diary(&conn, date, today)?.map(|l| l.diary.trackers().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::tools::diary::{get_diary, get_or_create_diary};
    use crate::tools::profile::{set_profile, ProfileInput};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 14).unwrap()
    }

    fn key(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        let input = ProfileInput {
            weight_kg: 70.0,
            target_weight_kg: None,
            height_cm: 175.0,
            age: Some(30),
            birthday: None,
            gender: "male".to_string(),
            goal: "maintain".to_string(),
        };
        set_profile(&db, &input, today()).unwrap();
        db
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(TrackerAction::parse("Increment", None), Ok(TrackerAction::Increment));
        assert_eq!(TrackerAction::parse("set", Some(3.0)), Ok(TrackerAction::Set(3.0)));
        assert!(TrackerAction::parse("set", None).is_err());
        assert!(TrackerAction::parse("double", None).is_err());
        assert!(parse_tracker_type("coffee").is_err());
    }

    #[test]
    fn test_water_tracker() {
        let db = setup();
        let date = key(today());
        for _ in 0..8 {
            update_tracker(&db, &date, today(), "water", TrackerAction::Increment).unwrap();
        }
        let resp = update_tracker(&db, &date, today(), "water", TrackerAction::Decrement).unwrap();
        assert_eq!(resp.tracker.current_value, 1.75);
        assert!(!resp.tracker.is_completed);
        assert_eq!(resp.water_intake.current, 1.75);

        let resp = update_tracker(&db, &date, today(), "water", TrackerAction::Increment).unwrap();
        assert!(resp.tracker.is_completed);

        let stored = get_diary(&db, &date, today()).unwrap().unwrap();
        assert_eq!(stored.water_intake.current, 2.0);
    }

    #[test]
    fn test_steps_set_burned_calories() {
        let db = setup();
        let date = key(today());
        let resp = update_tracker(&db, &date, today(), "steps", TrackerAction::Set(10_000.0)).unwrap();
        assert!(resp.tracker.is_completed);
        assert_eq!(resp.steps.current, 10_000);
        assert_eq!(resp.burned_calories, 350);
        assert_eq!(resp.remaining_calories, 1695 + 350);

        // Burn is an absolute value, not added on each save
        let resp = update_tracker(&db, &date, today(), "steps", TrackerAction::Set(9_000.0)).unwrap();
        assert!(!resp.tracker.is_completed);
        assert_eq!(resp.burned_calories, 315);

        let stored = get_diary(&db, &date, today()).unwrap().unwrap();
        assert_eq!(stored.burned_calories, 315);
        assert_eq!(stored.remaining_calories, 1695 + 315);
        assert_eq!(stored.steps.current, 9_000);
    }

    #[test]
    fn test_binary_tracker() {
        let db = setup();
        let date = key(today());
        update_tracker(&db, &date, today(), "noSugar", TrackerAction::Increment).unwrap();
        let resp = update_tracker(&db, &date, today(), "no_sugar", TrackerAction::Increment).unwrap();
        assert_eq!(resp.tracker.current_value, 1.0);
        assert!(resp.tracker.is_completed);
    }

    #[test]
    fn test_weekly_progress() {
        let db = setup();
        for offset in 0..9 {
            let date = today() - Duration::days(offset);
            get_or_create_diary(&db, &key(date), date).unwrap();
            if offset % 2 == 0 {
                update_tracker(&db, &key(date), date, "fruit", TrackerAction::Increment).unwrap();
            }
        }

        let resp = weekly_progress(&db, today(), Some("fruit")).unwrap();
        assert_eq!(resp.trackers.len(), 1);
        let fruit = &resp.trackers[0];
        assert_eq!(fruit.total_days, 7);
        // offsets 0, 2, 4, 6
        assert_eq!(fruit.days_completed, 4);

        let all = weekly_progress(&db, today(), None).unwrap();
        assert_eq!(all.trackers.len(), TrackerType::ALL.len());

        let trackers = get_trackers(&db, &key(today()), today()).unwrap().unwrap();
        assert_eq!(trackers.len(), TrackerType::ALL.len());
    }
}
