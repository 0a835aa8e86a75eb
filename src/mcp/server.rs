//! SnapCal MCP Server Implementation
//!
//! Implements the MCP server with all SnapCal tools.

use std::path::PathBuf;
use std::sync::{Arc, MutexGuard};

use chrono::{Local, Utc};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::SessionContext;
use crate::db::Database;
use crate::tools::logging::FoodInput;
use crate::tools::profiles::{LimitsUpdate, OnboardingInput, PreferencesUpdate, ProfileUpdate};
use crate::tools::status::{StatusTracker, USAGE_INSTRUCTIONS};
use crate::tools::{analysis, awards, logging, profiles, progress, Session};
use crate::vision::FoodAnalyzer;

/// SnapCal MCP Service
#[derive(Clone)]
pub struct SnapCalService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Cached profile and day log for the one session this process serves
    session: Arc<std::sync::Mutex<Session>>,
    analyzer: Arc<dyn FoodAnalyzer>,
    tool_router: ToolRouter<SnapCalService>,
}

impl SnapCalService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        session: SessionContext,
        analyzer: Arc<dyn FoodAnalyzer>,
        vision_configured: bool,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, vision_configured))),
            database,
            session: Arc::new(std::sync::Mutex::new(Session::new(session))),
            analyzer,
            tool_router: Self::tool_router(),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>, McpError> {
        self.session
            .lock()
            .map_err(|_| McpError::internal_error("Session state is unavailable", None))
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CompleteOnboardingParams {
    /// Display name (optional)
    pub name: Option<String>,
    /// Age in years
    pub age: i64,
    /// Male, Female or Other
    pub sex: String,
    /// Height in centimeters
    pub height_cm: f64,
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Lose Weight, Maintain or Gain Muscle
    pub goal: String,
    /// Sedentary, Lightly Active, Moderately Active or Very Active
    pub activity_level: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetNutrientLimitsParams {
    /// Daily fiber target in grams
    pub fiber: Option<i64>,
    /// Daily added sugar limit in grams
    pub sugar: Option<i64>,
    /// Daily sodium limit in milligrams
    pub sodium: Option<i64>,
    /// Daily cholesterol limit in milligrams
    pub cholesterol: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetPreferencesParams {
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
    pub weekly_reports: Option<bool>,
    pub health_sync: Option<bool>,
}

// ============================================================================
// Logging Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeFoodPhotoParams {
    /// Base64 image data, with or without a data:image/...;base64, prefix
    pub image_base64: Option<String>,
    /// Path to an image file on this machine
    pub image_path: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub name: String,
    /// kcal
    pub calories: f64,
    /// grams
    pub protein: f64,
    /// grams
    pub carbs: f64,
    /// grams
    pub fat: f64,
    /// grams
    pub fiber: Option<f64>,
    /// grams
    pub sugar: Option<f64>,
    /// milligrams
    pub sodium: Option<f64>,
    /// milligrams
    pub cholesterol: Option<f64>,
    pub image_url: Option<String>,
    /// Confidence from the photo analysis, 0-100
    pub confidence: Option<i64>,
    /// Capture time in epoch milliseconds (default: now)
    pub captured_at_ms: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWaterParams {
    /// Amount in milliliters
    pub amount_ml: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// Date (YYYY-MM-DD), default today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFoodEntryParams {
    /// Food entry ID to delete
    pub id: i64,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl SnapCalService {
    // --- Status ---

    #[tool(description = "Get the current status of the SnapCal service including build info, session, database status, and process information")]
    async fn snapcal_status(&self) -> Result<CallToolResult, McpError> {
        let ctx = self.session()?.ctx.clone();
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status(&ctx))
    }

    // --- Profile ---

    #[tool(description = "Get the user's profile, daily targets, preferences and which screen they should land on")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = profiles::get_profile(&self.database, &mut session)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Finish onboarding with body stats, goal and activity level. Calculates daily calorie and macro targets.")]
    fn complete_onboarding(&self, Parameters(p): Parameters<CompleteOnboardingParams>) -> Result<CallToolResult, McpError> {
        let input = OnboardingInput {
            name: p.name,
            age: p.age,
            sex: p.sex,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            goal: p.goal,
            activity_level: p.activity_level,
        };
        let mut session = self.session()?;
        let result = profiles::complete_onboarding(&self.database, &mut session, input)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update profile fields. Changing age, sex, height, weight, goal or activity level recalculates targets.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let update = ProfileUpdate {
            name: p.name,
            age: p.age,
            sex: p.sex,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            goal: p.goal,
            activity_level: p.activity_level,
        };
        let mut session = self.session()?;
        let result = profiles::update_profile(&self.database, &mut session, update)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set the fiber target and the sugar, sodium and cholesterol limits")]
    fn set_nutrient_limits(&self, Parameters(p): Parameters<SetNutrientLimitsParams>) -> Result<CallToolResult, McpError> {
        let update = LimitsUpdate {
            fiber: p.fiber,
            sugar: p.sugar,
            sodium: p.sodium,
            cholesterol: p.cholesterol,
        };
        let mut session = self.session()?;
        let result = profiles::set_nutrient_limits(&self.database, &mut session, update)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change app preferences (dark mode, notifications, weekly reports, health sync)")]
    fn set_preferences(&self, Parameters(p): Parameters<SetPreferencesParams>) -> Result<CallToolResult, McpError> {
        let update = PreferencesUpdate {
            dark_mode: p.dark_mode,
            notifications: p.notifications,
            weekly_reports: p.weekly_reports,
            health_sync: p.health_sync,
        };
        let mut session = self.session()?;
        let result = profiles::set_preferences(&self.database, &mut session, update)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Activate premium for an onboarded user")]
    fn subscribe(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = profiles::subscribe(&self.database, &mut session)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Logging ---

    #[tool(description = "Estimate calories and nutrients from a food photo. Returns an estimate to review; nothing is logged until log_food is called.")]
    async fn analyze_food_photo(&self, Parameters(p): Parameters<AnalyzeFoodPhotoParams>) -> Result<CallToolResult, McpError> {
        let result = analysis::analyze_food_photo(
            self.analyzer.as_ref(),
            p.image_base64.as_deref(),
            p.image_path.as_deref(),
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Log a food item. The meal slot is derived from the capture time. Returns the day's new totals and any achievements unlocked.")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let captured_at = p.captured_at_ms.unwrap_or_else(now_ms);
        let input = FoodInput {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            fiber: p.fiber,
            sugar: p.sugar,
            sodium: p.sodium,
            cholesterol: p.cholesterol,
            image_url: p.image_url,
            confidence: p.confidence,
        };
        let mut session = self.session()?;
        let result = logging::log_food(&self.database, &mut session, input, captured_at, &Local)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add water intake for today in milliliters")]
    fn add_water(&self, Parameters(p): Parameters<AddWaterParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = logging::add_water(&self.database, &mut session, p.amount_ml, now_ms(), &Local)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a day's food entries grouped by meal, water intake and totals")]
    fn get_day_log(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = logging::get_day_log(&self.database, &mut session, p.date.as_deref(), now_ms(), &Local)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a logged food entry. Achievements already unlocked are kept.")]
    fn delete_food_entry(&self, Parameters(p): Parameters<DeleteFoodEntryParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = logging::delete_food_entry(&self.database, &mut session, p.id, now_ms(), &Local)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Progress ---

    #[tool(description = "Compare a day's totals with the user's targets: macro gauges, targets to reach, limits to stay under, and water")]
    fn get_progress(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = progress::get_progress(&self.database, &mut session, p.date.as_deref(), now_ms(), &Local)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Achievements ---

    #[tool(description = "List every achievement and whether it is unlocked")]
    fn list_achievements(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = awards::list_achievements(&self.database, &mut session)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Evaluate today's log for newly earned achievements and record them")]
    fn check_achievements(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = awards::check_achievements(&self.database, &mut session, now_ms(), &Local)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for SnapCalService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "snapcal".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("SnapCal".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(USAGE_INSTRUCTIONS.into()),
        }
    }
}
