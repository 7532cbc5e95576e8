//! NutriScan MCP Server Implementation
//!
//! Implements the MCP server with all NutriScan tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::analysis::HazardTable;
use crate::config::Settings;
use crate::db::Database;
use crate::models::UserUpdate;
use crate::tools::scanner::{self, ScanContext, ScanOptions};
use crate::tools::status::StatusTracker;
use crate::tools::{dashboard, history, profile, reports};

/// NutriScan MCP Service
#[derive(Clone)]
pub struct NutriscanService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    hazards: Arc<HazardTable>,
    settings: Arc<Settings>,
    tool_router: ToolRouter<NutriscanService>,
}

impl NutriscanService {
    pub fn new(settings: Settings, database: Database) -> Self {
        let hazards = HazardTable::builtin();
        let tracker = StatusTracker::new(
            settings.database_path.clone(),
            settings.report_dir.clone(),
            settings.history_limit,
            hazards.len(),
        );

        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            database,
            hazards: Arc::new(hazards),
            settings: Arc::new(settings),
            tool_router: Self::tool_router(),
        }
    }

    fn scan_context(&self) -> ScanContext<'_> {
        ScanContext {
            database: &self.database,
            hazards: &self.hazards,
            history_limit: self.settings.history_limit,
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: &str) -> Result<CallToolResult, McpError> {
    let body = serde_json::json!({ "error": format!("{} not found", what), "id": id });
    json_result(&body)
}

// ============================================================================
// Scan Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeIngredientsParams {
    /// Ingredient list, separated by commas or newlines
    pub text: String,
    /// Language code of the text (default "en"); see list_languages
    pub language: Option<String>,
    /// Signed-in user to save the scan for (optional)
    pub user_id: Option<String>,
    /// Product name shown in history and reports (optional)
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScanUploadParams {
    /// Uploaded image file name
    pub file_name: String,
    /// MIME type, must be image/*
    pub content_type: String,
    /// File size in bytes (max 10 MB)
    pub size_bytes: u64,
    pub language: Option<String>,
    pub user_id: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScanSourceParams {
    pub language: Option<String>,
    pub user_id: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScanVoiceParams {
    /// Transcribed speech listing the ingredients
    pub transcript: String,
    pub language: Option<String>,
    pub user_id: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RiskAssessmentParams {
    /// Ingredient list, separated by commas or newlines
    pub text: String,
    /// Language code of the text (default "en")
    pub language: Option<String>,
}

fn scan_options(
    language: Option<String>,
    user_id: Option<String>,
    product_name: Option<String>,
) -> ScanOptions {
    ScanOptions {
        language,
        user_id,
        product_name,
    }
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    /// User ID returned by sign_in
    pub user_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    /// User ID to update
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Preferred language code
    pub language: Option<String>,
    pub notifications: Option<bool>,
    pub public_profile: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ToggleRestrictionParams {
    pub user_id: String,
    /// One of: Gluten-Free, Dairy-Free, Vegan, Vegetarian, Keto, Low-Sodium
    pub restriction: String,
}

// ============================================================================
// History Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScanHistoryParams {
    pub user_id: String,
    /// Maximum scans to return (default 20, max 200)
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetScanParams {
    /// Scan ID
    pub scan_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportReportParams {
    /// Stored scan to export
    pub scan_id: String,
    /// Output PDF path (default: report directory with a generated name)
    pub output_path: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutriscanService {
    // --- Status ---

    #[tool(description = "Get the current status of the NutriScan service including build info, database status, and process information")]
    async fn nutriscan_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(&status)
    }

    #[tool(description = "Get instructions for scanning ingredients and reading the results. Call this when unsure which scan tool to use.")]
    fn scan_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::SCAN_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SCAN_INSTRUCTIONS)]))
    }

    // --- Scanning ---

    #[tool(description = "Analyze an ingredient list: flags harmful additives and returns nutrition score, grade, risk level and health alerts. Saved to history when user_id is given.")]
    fn analyze_ingredients(&self, Parameters(p): Parameters<AnalyzeIngredientsParams>) -> Result<CallToolResult, McpError> {
        let options = scan_options(p.language, p.user_id, p.product_name);
        let result = scanner::analyze_ingredients(&self.scan_context(), &p.text, &options)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Scan an uploaded label image. Validates type (image/*) and size (max 10 MB), reads the label and analyzes it.")]
    fn scan_upload(&self, Parameters(p): Parameters<ScanUploadParams>) -> Result<CallToolResult, McpError> {
        let options = scan_options(p.language, p.user_id, p.product_name);
        let result = scanner::scan_upload(&self.scan_context(), &p.file_name, &p.content_type, p.size_bytes, &options)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Scan a label with the camera")]
    fn scan_camera(&self, Parameters(p): Parameters<ScanSourceParams>) -> Result<CallToolResult, McpError> {
        let options = scan_options(p.language, p.user_id, p.product_name);
        let result = scanner::scan_camera(&self.scan_context(), &options)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Scan a product barcode and analyze its ingredient list")]
    fn scan_barcode(&self, Parameters(p): Parameters<ScanSourceParams>) -> Result<CallToolResult, McpError> {
        let options = scan_options(p.language, p.user_id, p.product_name);
        let result = scanner::scan_barcode(&self.scan_context(), &options)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Analyze a spoken ingredient list from its transcript")]
    fn scan_voice(&self, Parameters(p): Parameters<ScanVoiceParams>) -> Result<CallToolResult, McpError> {
        let options = scan_options(p.language, p.user_id, p.product_name);
        let result = scanner::scan_voice(&self.scan_context(), &p.transcript, &options)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Risk score (0-10) and level (EXCELLENT to DANGEROUS) for an ingredient list. Nothing is saved.")]
    fn risk_assessment(&self, Parameters(p): Parameters<RiskAssessmentParams>) -> Result<CallToolResult, McpError> {
        let result = scanner::risk_assessment(&self.hazards, &p.text, p.language.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List every known harmful ingredient with severity, category, health impact, alternatives and regulatory status")]
    fn list_hazards(&self) -> Result<CallToolResult, McpError> {
        json_result(&scanner::list_hazards(&self.hazards))
    }

    #[tool(description = "List supported language codes for ingredient text")]
    fn list_languages(&self) -> Result<CallToolResult, McpError> {
        json_result(&scanner::list_languages())
    }

    // --- Profile ---

    #[tool(description = "Sign in with a demo account. Returns the user_id to pass to scan and history tools.")]
    fn sign_in(&self) -> Result<CallToolResult, McpError> {
        let result = profile::sign_in(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a user profile with preferences and scan stats")]
    fn get_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database, &p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(user) => json_result(&user),
            None => not_found("User", &p.user_id),
        }
    }

    #[tool(description = "Update profile name, email, language, notifications or public profile setting")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = UserUpdate {
            name: p.name,
            email: p.email,
            language: p.language,
            notifications: p.notifications,
            public_profile: p.public_profile,
        };
        let result = profile::update_profile(&self.database, &p.user_id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(user) => json_result(&user),
            None => not_found("User", &p.user_id),
        }
    }

    #[tool(description = "Turn a dietary restriction on or off for a user")]
    fn toggle_dietary_restriction(&self, Parameters(p): Parameters<ToggleRestrictionParams>) -> Result<CallToolResult, McpError> {
        let result = profile::toggle_dietary_restriction(&self.database, &p.user_id, &p.restriction)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(user) => json_result(&user),
            None => not_found("User", &p.user_id),
        }
    }

    #[tool(description = "Sign out and remove the account. Scan history is kept until clear_user_data.")]
    fn sign_out(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = profile::sign_out(&self.database, &p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- History ---

    #[tool(description = "List a user's saved scans, newest first")]
    fn get_scan_history(&self, Parameters(p): Parameters<ScanHistoryParams>) -> Result<CallToolResult, McpError> {
        let result = history::get_scan_history(&self.database, &p.user_id, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get full details of a saved scan including every ingredient result")]
    fn get_scan(&self, Parameters(p): Parameters<GetScanParams>) -> Result<CallToolResult, McpError> {
        let result = history::get_scan(&self.database, &p.scan_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(scan) => json_result(&scan),
            None => not_found("Scan", &p.scan_id),
        }
    }

    #[tool(description = "Delete a user's scan history and profile")]
    fn clear_user_data(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = history::clear_user_data(&self.database, &p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Analytics over a user's saved scans: average score, harmful categories, improvement trend and monthly breakdown")]
    fn get_dashboard(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = dashboard::get_dashboard(&self.database, &p.user_id, self.settings.history_limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Export a saved scan as a PDF analysis report")]
    fn export_scan_report(&self, Parameters(p): Parameters<ExportReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::export_scan_report(
            &self.database,
            &p.scan_id,
            &self.settings.report_dir,
            p.output_path.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for NutriscanService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutriscan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NutriScan Ingredient Analyzer".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriScan - food ingredient analysis. Call scan_instructions first. \
                 Scan: analyze_ingredients, scan_upload, scan_camera, scan_barcode, scan_voice, risk_assessment. \
                 Reference: list_hazards, list_languages. \
                 Profile: sign_in, get_profile, update_profile, toggle_dietary_restriction, sign_out. \
                 History: get_scan_history, get_scan, clear_user_data, get_dashboard, export_scan_report."
                    .into(),
            ),
        }
    }
}
