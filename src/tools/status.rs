//! EasyMeal Status Tool
//!
//! Runtime status of the service and the usage guide for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Food diary instructions for AI assistants
pub const DIARY_INSTRUCTIONS: &str = r#"
# EasyMeal Food Diary Instructions

## 1. Profile first

Call `set_profile` once with weight (kg), height (cm), age or birthday
(YYYY-MM-DD), gender (`male` / `female`) and goal (`lose` / `maintain` / `gain`).
The response shows the daily calorie target and how it splits over the day:

| Slot      | Share |
|-----------|-------|
| breakfast | 30%   |
| lunch     | 40%   |
| snack     | 5%    |
| dinner    | 25%   |

Use `preview_plan` to show a plan without saving it.

## 2. Dates

All diary tools take `date` as YYYY-MM-DD. Only today's diary can be changed;
earlier days are closed and read-only.

## 3. Logging food

`log_meal` takes a slot and a list of items. Each item carries calories,
protein, fat and carbs **for its declared portion** (e.g. per 100 g), and may
give the amount actually eaten as `quantity` + `unit`:

- weight: g, kg, oz, lb
- volume: ml, l, tsp, tbsp, cup, fl oz

Items are rejected when:
- protein + fat + carbs is more than the portion size
- calories differ from 4*protein + 9*fat + 4*carbs by more than 10 kcal

Going over a slot's budget is allowed; the response lists warnings.
Remove an entry with `remove_meal`, or a single item with `remove_food_item`.

## 4. Trackers

`update_tracker` with action `increment`, `decrement` or `set`:

| Tracker           | Step | Done at  |
|-------------------|------|----------|
| water (L)         | 0.25 | 2.0      |
| fruit, vegetable  | 1    | 1        |
| protein (g)       | 5    | 50       |
| steps             | 500  | 10000    |
| noSugar, noFastFood, noLateNightEating | 1 | 1 (yes/no) |

Saving steps also sets the day's burned calories (steps x 0.0005 x weight).
`weekly_progress` counts completed days over the last seven diaries.
"#;

/// Runtime status information
#[derive(Debug, Serialize)]
pub struct EasyMealStatus {
    pub build_number: u64,
    pub build_timestamp: String,
    pub version: String,
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service start time for the status tool
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self) -> EasyMealStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        EasyMealStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp.to_string(),
            version: build_info.version.to_string(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
