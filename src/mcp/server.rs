//! EasyMeal MCP Server Implementation
//!
//! Exposes the profile, diary and tracker tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};

use crate::db::Database;
use crate::models::{DiaryEvent, FoodItem, Nutrition};
use crate::tools::diary::{self, ItemInput};
use crate::tools::profile::{self, ProfileInput};
use crate::tools::status::StatusTracker;
use crate::tools::trackers::{self, TrackerAction};

/// Capacity of the diary event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A diary event together with the day it happened on
#[derive(Debug, Clone, Serialize)]
pub struct DatedEvent {
    pub date: String,
    pub event: DiaryEvent,
}

/// EasyMeal MCP Service
#[derive(Clone)]
pub struct EasyMealService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<EasyMealService>,
    /// Serializes read-modify-write of diary documents
    diary_lock: Arc<std::sync::Mutex<()>>,
    events: broadcast::Sender<DatedEvent>,
}

impl EasyMealService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
            diary_lock: Arc::new(std::sync::Mutex::new(())),
            events,
        }
    }

    /// Receive every diary event emitted by the tools
    pub fn subscribe(&self) -> broadcast::Receiver<DatedEvent> {
        self.events.subscribe()
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Run a diary change while holding the diary lock
    fn locked<T>(&self, f: impl FnOnce() -> Result<T, String>) -> Result<T, McpError> {
        let _guard = self
            .diary_lock
            .lock()
            .map_err(|_| McpError::internal_error("Diary lock poisoned", None))?;
        f().map_err(|e| McpError::internal_error(e, None))
    }

    fn publish(&self, date: &str, events: &[DiaryEvent]) {
        for event in events {
            // No receivers is fine
            let _ = self.events.send(DatedEvent {
                date: date.to_string(),
                event: event.clone(),
            });
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    /// Current weight in kg
    pub weight: f64,
    /// Target weight in kg (defaults to current weight)
    pub target_weight: Option<f64>,
    /// Height in cm
    pub height: f64,
    /// Age in years (or give birthday)
    pub age: Option<u32>,
    /// Birthday in ISO format: YYYY-MM-DD
    pub birthday: Option<String>,
    /// Gender: male or female
    pub gender: String,
    /// Goal: lose, maintain or gain
    pub goal: String,
}

impl From<ProfileParams> for ProfileInput {
    fn from(p: ProfileParams) -> Self {
        ProfileInput {
            weight_kg: p.weight,
            target_weight_kg: p.target_weight,
            height_cm: p.height,
            age: p.age,
            birthday: p.birthday,
            gender: p.gender,
            goal: p.goal,
        }
    }
}

// ============================================================================
// Diary Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
}

/// One food item as eaten
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodItemParams {
    pub name: String,
    /// Calories for the declared portion
    pub calories: f64,
    /// Protein grams for the declared portion
    pub protein: f64,
    /// Fat grams for the declared portion
    pub fat: f64,
    /// Carb grams for the declared portion
    pub carbs: f64,
    /// Declared portion size (default 100)
    #[serde(default = "default_portion_size")]
    pub portion_size: f64,
    /// Declared portion unit (default "g")
    #[serde(default = "default_portion_unit")]
    pub portion_unit: String,
    /// Amount actually eaten (optional; defaults to the declared portion)
    pub quantity: Option<f64>,
    /// Unit of quantity (defaults to portion_unit)
    pub unit: Option<String>,
}

fn default_portion_size() -> f64 { 100.0 }
fn default_portion_unit() -> String { "g".to_string() }

impl From<FoodItemParams> for ItemInput {
    fn from(p: FoodItemParams) -> Self {
        ItemInput {
            item: FoodItem {
                name: p.name,
                nutrition: Nutrition::new(p.calories, p.protein, p.fat, p.carbs),
                portion_size: p.portion_size,
                portion_unit: p.portion_unit,
            },
            quantity: p.quantity,
            unit: p.unit,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Meal slot: breakfast, lunch, snack or dinner
    pub slot: String,
    /// Items eaten
    pub items: Vec<FoodItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveMealParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Meal slot the entry was logged in
    pub slot: String,
    /// Meal entry ID
    pub meal_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveFoodItemParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Meal entry ID
    pub meal_id: String,
    /// Zero-based index of the item within the entry
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetWeightParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Weight in kg
    pub weight: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BurnedCaloriesParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Total calories burned that day (replaces the previous value)
    pub calories: f64,
}

// ============================================================================
// Tracker Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateTrackerParams {
    /// Date in ISO format: YYYY-MM-DD
    pub date: String,
    /// Tracker: water, fruit, vegetable, protein, steps, noSugar, noFastFood, noLateNightEating
    pub tracker_type: String,
    /// Action: increment, decrement or set
    pub action: String,
    /// Value for the set action
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeeklyProgressParams {
    /// Tracker type (optional; all trackers when omitted)
    pub tracker_type: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl EasyMealService {
    // --- Status ---

    #[tool(description = "Get the current status of the EasyMeal service including build info, database status, and process information")]
    async fn easymeal_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for setting up a profile, logging food and using trackers. Call this when starting a session or when unsure how to use the diary tools.")]
    fn diary_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::DIARY_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(DIARY_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Save the user profile and return the daily calorie, macro and meal-slot plan derived from it")]
    fn set_profile(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let input = ProfileInput::from(p);
        let result = profile::set_profile(&self.database, &input, Self::today())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the stored profile and its plan")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database, Self::today())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(resp) => to_json(&resp),
            None => Ok(CallToolResult::success(vec![Content::text(
                r#"{"error": "No profile set"}"#,
            )])),
        }
    }

    #[tool(description = "Compute the plan for a profile without saving it")]
    fn preview_plan(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let input = ProfileInput::from(p);
        let result = profile::preview_plan(&input, Self::today())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Diary ---

    #[tool(description = "Get the food diary for a date, creating it from the profile if it does not exist")]
    fn get_or_create_diary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = self.locked(|| diary::get_or_create_diary(&self.database, &p.date, Self::today()))?;
        to_json(&result)
    }

    #[tool(description = "Get the food diary for a date without creating it")]
    fn get_diary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = diary::get_diary(&self.database, &p.date, Self::today())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(view) => to_json(&view),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Diary not found", "date": "{}"}}"#,
                p.date
            ))])),
        }
    }

    #[tool(description = "Log a meal entry in a slot (breakfast, lunch, snack, dinner). Items are validated; slot budget overages are returned as warnings.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let items = p.items.into_iter().map(ItemInput::from).collect();
        let result = self.locked(|| diary::log_meal(&self.database, &p.date, Self::today(), &p.slot, items))?;
        self.publish(&p.date, &result.events);
        to_json(&result)
    }

    #[tool(description = "Remove a meal entry from a slot")]
    fn remove_meal(&self, Parameters(p): Parameters<RemoveMealParams>) -> Result<CallToolResult, McpError> {
        let result = self.locked(|| {
            diary::remove_meal(&self.database, &p.date, Self::today(), &p.slot, &p.meal_id)
        })?;
        self.publish(&p.date, &result.events);
        to_json(&result)
    }

    #[tool(description = "Remove one item from a meal entry; an entry left empty is removed")]
    fn remove_food_item(&self, Parameters(p): Parameters<RemoveFoodItemParams>) -> Result<CallToolResult, McpError> {
        let result = self.locked(|| {
            diary::remove_food_item(&self.database, &p.date, Self::today(), &p.meal_id, p.index)
        })?;
        self.publish(&p.date, &result.events);
        to_json(&result)
    }

    #[tool(description = "Set the current weight (kg) for a day")]
    fn set_weight(&self, Parameters(p): Parameters<SetWeightParams>) -> Result<CallToolResult, McpError> {
        let result = self.locked(|| diary::set_weight(&self.database, &p.date, Self::today(), p.weight))?;
        self.publish(&p.date, &result.events);
        to_json(&result)
    }

    #[tool(description = "Set the total calories burned for a day")]
    fn record_burned_calories(&self, Parameters(p): Parameters<BurnedCaloriesParams>) -> Result<CallToolResult, McpError> {
        let result = self.locked(|| {
            diary::record_burned_calories(&self.database, &p.date, Self::today(), p.calories)
        })?;
        self.publish(&p.date, &result.events);
        to_json(&result)
    }

    #[tool(description = "Rescale a food item to the amount eaten (e.g. 250 g of a per-100 g item) without logging it")]
    fn scale_food(&self, Parameters(p): Parameters<FoodItemParams>) -> Result<CallToolResult, McpError> {
        let result = diary::scale_food(ItemInput::from(p))
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Trackers ---

    #[tool(description = "Increment, decrement or set a tracker for a day. Saving steps also updates burned calories.")]
    fn update_tracker(&self, Parameters(p): Parameters<UpdateTrackerParams>) -> Result<CallToolResult, McpError> {
        let action = TrackerAction::parse(&p.action, p.value)
            .map_err(|e| McpError::invalid_params(e, None))?;
        let result = self.locked(|| {
            trackers::update_tracker(&self.database, &p.date, Self::today(), &p.tracker_type, action)
        })?;
        self.publish(&p.date, &result.events);
        to_json(&result)
    }

    #[tool(description = "Get the trackers of a stored diary")]
    fn get_trackers(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = trackers::get_trackers(&self.database, &p.date, Self::today())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(list) => to_json(&list),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Diary not found", "date": "{}"}}"#,
                p.date
            ))])),
        }
    }

    #[tool(description = "Days each tracker was completed over the last seven days")]
    fn weekly_progress(&self, Parameters(p): Parameters<WeeklyProgressParams>) -> Result<CallToolResult, McpError> {
        let result = trackers::weekly_progress(&self.database, Self::today(), p.tracker_type.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for EasyMealService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "easymeal".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("EasyMeal".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "EasyMeal - calorie budgets, food diary and habit trackers. \
                 IMPORTANT: Call diary_instructions first. \
                 Profile: set_profile/get_profile/preview_plan. \
                 Diary: get_or_create_diary/get_diary, log_meal/remove_meal/remove_food_item, \
                 set_weight, record_burned_calories, scale_food. \
                 Trackers: update_tracker/get_trackers, weekly_progress. \
                 Only today's diary can be changed."
                    .into(),
            ),
        }
    }
}
