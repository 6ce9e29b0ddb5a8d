//! Document store
//!
//! Diary documents keyed by `yyyy-MM-dd` and the single profile document.
//! Tracker saves touch only the changed paths through SQLite's `json_set`.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DbResult;
use crate::models::{date_key, parse_date_key, FoodDiaryDocument, ProfileDocument};

/// Partial tracker update: one element of `trackers` plus the scalar counters
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerPatch {
    pub index: usize,
    pub tracker: serde_json::Value,
    pub steps_current: u64,
    pub water_current: f64,
    pub burned_calories: i64,
    pub remaining_calories: i64,
}

pub fn get_diary(conn: &Connection, date: NaiveDate) -> DbResult<Option<FoodDiaryDocument>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT document FROM food_diaries WHERE date = ?1",
            params![date_key(date)],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Insert or replace a whole document
pub fn put_diary(conn: &Connection, date: NaiveDate, document: &FoodDiaryDocument) -> DbResult<()> {
    let json = serde_json::to_string(document)?;
    conn.execute(
        r#"
        INSERT INTO food_diaries (date, document)
        VALUES (?1, ?2)
        ON CONFLICT(date) DO UPDATE SET
            document = excluded.document,
            updated_at = datetime('now')
        "#,
        params![date_key(date), json],
    )?;
    Ok(())
}

/// Documents dated `from..=to`, oldest first. Rows with unreadable keys or
/// documents are skipped.
pub fn list_diaries(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> DbResult<Vec<(NaiveDate, FoodDiaryDocument)>> {
    let mut stmt = conn.prepare(
        "SELECT date, document FROM food_diaries WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC",
    )?;

    let rows = stmt.query_map(params![date_key(from), date_key(to)], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut diaries = Vec::new();
    for row in rows {
        let (key, json) = row?;
        let Some(date) = parse_date_key(&key) else {
            tracing::warn!("Skipping diary with bad key '{}'", key);
            continue;
        };
        match serde_json::from_str(&json) {
            Ok(doc) => diaries.push((date, doc)),
            Err(e) => tracing::warn!("Skipping unreadable diary {}: {}", key, e),
        }
    }
    Ok(diaries)
}

/// Most recent readable document dated before `date`
pub fn latest_before(conn: &Connection, date: NaiveDate) -> DbResult<Option<(NaiveDate, FoodDiaryDocument)>> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT date, document FROM food_diaries WHERE date < ?1 ORDER BY date DESC LIMIT 1",
            params![date_key(date)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((key, json)) => match parse_date_key(&key) {
            Some(found) => Ok(Some((found, serde_json::from_str(&json)?))),
            None => Ok(None),
        },
        None => Ok(None),
    }
}

/// Apply a tracker patch. Returns false when no document exists for the date.
pub fn patch_tracker(conn: &Connection, date: NaiveDate, patch: &TrackerPatch) -> DbResult<bool> {
    let tracker_path = format!("$.trackers[{}]", patch.index);
    let tracker_json = serde_json::to_string(&patch.tracker)?;

    let changed = conn.execute(
        r#"
        UPDATE food_diaries SET
            document = json_set(
                document,
                ?2, json(?3),
                '$.steps.current', ?4,
                '$.waterIntake.current', ?5,
                '$.burnedCalories', ?6,
                '$.remainingCalories', ?7
            ),
            updated_at = datetime('now')
        WHERE date = ?1
        "#,
        params![
            date_key(date),
            tracker_path,
            tracker_json,
            patch.steps_current as i64,
            patch.water_current,
            patch.burned_calories,
            patch.remaining_calories,
        ],
    )?;

    Ok(changed > 0)
}

pub fn get_profile(conn: &Connection) -> DbResult<Option<ProfileDocument>> {
    let raw: Option<String> = conn
        .query_row("SELECT document FROM user_profile WHERE id = 1", [], |row| row.get(0))
        .optional()?;

    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Set or replace the profile (upsert)
pub fn put_profile(conn: &Connection, document: &ProfileDocument) -> DbResult<()> {
    let json = serde_json::to_string(document)?;
    conn.execute(
        r#"
        INSERT INTO user_profile (id, document)
        VALUES (1, ?1)
        ON CONFLICT(id) DO UPDATE SET
            document = excluded.document,
            updated_at = datetime('now')
        "#,
        params![json],
    )?;
    Ok(())
}
