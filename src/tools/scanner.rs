//! Scan MCP Tools
//!
//! Turns each input source into ingredient text, runs the analysis and
//! stores the result in the user's history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::{
    analyze, health_alerts, score, AnalysisResult, HazardListing, HazardTable, RiskAssessment,
};
use crate::db::Database;
use crate::intake::{
    self, mock_ocr, translate_text, validate_upload, IntakeError, ScanSource, BARCODE_INGREDIENTS,
    CAMERA_CAPTURE_NAME, CAMERA_CAPTURE_TYPE, DEFAULT_LANGUAGE,
};
use crate::models::{format_timestamp, new_scan_id, Scan, User, NO_INGREDIENTS_TEXT};

/// Shared state every scan needs
pub struct ScanContext<'a> {
    pub database: &'a Database,
    pub hazards: &'a HazardTable,
    pub history_limit: usize,
}

/// Options common to every scan tool
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub language: Option<String>,
    pub user_id: Option<String>,
    pub product_name: Option<String>,
}

/// Response for every scan tool
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    #[serde(flatten)]
    pub scan: Scan,
    pub grade: Option<&'static str>,
    pub harmful_count: usize,
    pub safe_count: usize,
    /// Whether the scan was saved to the user's history
    pub stored: bool,
}

/// Response for risk_assessment
#[derive(Debug, Serialize)]
pub struct RiskAssessmentResponse {
    #[serde(flatten)]
    pub risk: RiskAssessment,
    pub harmful_ingredients: Vec<String>,
    pub total_ingredients: usize,
}

/// Response for list_hazards
#[derive(Debug, Serialize)]
pub struct ListHazardsResponse {
    pub hazards: Vec<HazardListing>,
    pub total: usize,
}

/// Analyze ingredient text and assemble a scan without storing it.
///
/// Text in a language other than English is translated first. Input that
/// yields no ingredients produces a scan with no results and no score.
pub fn build_scan(
    hazards: &HazardTable,
    source: ScanSource,
    text: &str,
    options: &ScanOptions,
    now: DateTime<Utc>,
) -> Result<Scan, IntakeError> {
    let language = options.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);
    let english = translate_text(text, language, DEFAULT_LANGUAGE)?;

    let results = analyze(&english, hazards);
    let (extracted_text, nutrition_score) = if results.is_empty() {
        (NO_INGREDIENTS_TEXT.to_string(), None)
    } else {
        (text.trim().to_string(), Some(score(&results)))
    };

    Ok(Scan {
        id: new_scan_id(now),
        user_id: options.user_id.clone(),
        source,
        language: language.to_string(),
        product_name: options.product_name.clone(),
        extracted_text,
        risk: RiskAssessment::from_results(&results),
        alerts: health_alerts(&results),
        score: nutrition_score,
        results,
        created_at: format_timestamp(now),
    })
}

/// Build a scan and, for a signed-in user, save it to their history
fn run_scan(
    ctx: &ScanContext,
    source: ScanSource,
    text: &str,
    options: &ScanOptions,
) -> Result<ScanResponse, String> {
    let scan = build_scan(ctx.hazards, source, text, options, Utc::now()).map_err(|e| e.to_string())?;

    let mut stored = false;
    if let Some(user_id) = options.user_id.as_deref() {
        if !scan.found_nothing() {
            let evicted = ctx
                .database
                .with_conn_mut(|conn| {
                    if User::get_by_id(conn, user_id)?.is_none() {
                        return Ok(None);
                    }
                    let evicted = Scan::save(conn, user_id, &scan, ctx.history_limit)?;
                    User::refresh_stats(conn, user_id)?;
                    Ok(Some(evicted))
                })
                .map_err(|e| format!("Failed to store scan: {}", e))?
                .ok_or_else(|| format!("User not found: {}", user_id))?;

            if evicted > 0 {
                info!(user_id, evicted, "Evicted oldest scans from history");
            }
            stored = true;
        }
    }

    info!(
        scan_id = %scan.id,
        source = scan.source.as_str(),
        ingredients = scan.results.len(),
        harmful = scan.harmful_count(),
        stored,
        "Scan complete"
    );

    Ok(ScanResponse {
        grade: scan.score.as_ref().map(|s| s.grade()),
        harmful_count: scan.harmful_count(),
        safe_count: scan.safe_count(),
        stored,
        scan,
    })
}

// ============================================================================
// Scan Tools
// ============================================================================

/// Analyze an ingredient list typed or pasted as text
pub fn analyze_ingredients(ctx: &ScanContext, text: &str, options: &ScanOptions) -> Result<ScanResponse, String> {
    run_scan(ctx, ScanSource::Text, text, options)
}

/// Validate an uploaded label image and analyze its recognized text
pub fn scan_upload(
    ctx: &ScanContext,
    file_name: &str,
    content_type: &str,
    size_bytes: u64,
    options: &ScanOptions,
) -> Result<ScanResponse, String> {
    validate_upload(file_name, content_type, size_bytes).map_err(|e| e.to_string())?;
    let text = mock_ocr(file_name);
    run_scan(ctx, ScanSource::Upload, &text, options)
}

/// Analyze a camera capture
pub fn scan_camera(ctx: &ScanContext, options: &ScanOptions) -> Result<ScanResponse, String> {
    validate_upload(CAMERA_CAPTURE_NAME, CAMERA_CAPTURE_TYPE, 0).map_err(|e| e.to_string())?;
    let text = mock_ocr(CAMERA_CAPTURE_NAME);
    run_scan(ctx, ScanSource::Camera, &text, options)
}

/// Analyze the ingredient list behind a barcode
pub fn scan_barcode(ctx: &ScanContext, options: &ScanOptions) -> Result<ScanResponse, String> {
    run_scan(ctx, ScanSource::Barcode, BARCODE_INGREDIENTS, options)
}

/// Analyze a spoken ingredient list
pub fn scan_voice(ctx: &ScanContext, transcript: &str, options: &ScanOptions) -> Result<ScanResponse, String> {
    run_scan(ctx, ScanSource::Voice, transcript, options)
}

/// Risk score and level only, nothing stored
pub fn risk_assessment(
    hazards: &HazardTable,
    text: &str,
    language: Option<&str>,
) -> Result<RiskAssessmentResponse, String> {
    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    let english = translate_text(text, language, DEFAULT_LANGUAGE).map_err(|e| e.to_string())?;
    let results = analyze(&english, hazards);

    Ok(RiskAssessmentResponse {
        risk: RiskAssessment::from_results(&results),
        harmful_ingredients: results
            .iter()
            .filter(|r| r.is_harmful())
            .map(AnalysisResult::ingredient)
            .map(str::to_string)
            .collect(),
        total_ingredients: results.len(),
    })
}

pub fn list_hazards(hazards: &HazardTable) -> ListHazardsResponse {
    let listings = hazards.listings();
    ListHazardsResponse {
        total: listings.len(),
        hazards: listings,
    }
}

pub fn list_languages() -> &'static [intake::Language] {
    intake::supported_languages()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RiskLevel;
    use crate::db::migrations::run_migrations;
    use chrono::TimeZone;

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_build_scan_scores_text() {
        let hazards = HazardTable::builtin();
        let scan = build_scan(
            &hazards,
            ScanSource::Text,
            "Water, High Fructose Corn Syrup, Red Dye 40",
            &ScanOptions::default(),
            now(),
        )
        .unwrap();

        assert_eq!(scan.results.len(), 3);
        assert_eq!(scan.harmful_count(), 2);
        assert_eq!(scan.score.as_ref().map(|s| s.overall), Some(75));
        assert_eq!(scan.risk.score, 6);
        assert_eq!(scan.risk.level, RiskLevel::Poor);
        assert_eq!(scan.language, "en");
        assert!(scan.alerts.is_empty());
    }

    #[test]
    fn test_build_scan_translates_before_matching() {
        let hazards = HazardTable::builtin();
        let options = ScanOptions {
            language: Some("es".to_string()),
            ..Default::default()
        };
        let scan = build_scan(
            &hazards,
            ScanSource::Text,
            "Agua, Jarabe de Maíz Alto en Fructosa",
            &options,
            now(),
        )
        .unwrap();

        assert_eq!(scan.harmful_count(), 1);
        assert_eq!(scan.results[1].ingredient(), "high fructose corn syrup");
        assert_eq!(scan.extracted_text, "Agua, Jarabe de Maíz Alto en Fructosa");
        assert_eq!(scan.language, "es");
    }

    #[test]
    fn test_build_scan_with_no_ingredients() {
        let hazards = HazardTable::builtin();
        let scan = build_scan(&hazards, ScanSource::Upload, "", &ScanOptions::default(), now()).unwrap();

        assert!(scan.found_nothing());
        assert!(scan.score.is_none());
        assert_eq!(scan.extracted_text, NO_INGREDIENTS_TEXT);
        assert_eq!(scan.risk.level, RiskLevel::Excellent);
    }

    #[test]
    fn test_unknown_language_is_an_error() {
        let hazards = HazardTable::builtin();
        let options = ScanOptions {
            language: Some("tlh".to_string()),
            ..Default::default()
        };
        let err = build_scan(&hazards, ScanSource::Text, "water", &options, now()).unwrap_err();
        assert_eq!(err, IntakeError::UnsupportedLanguage("tlh".to_string()));
    }

    #[test]
    fn test_scan_is_stored_for_signed_in_user() {
        let db = test_db();
        let hazards = HazardTable::builtin();
        let user = db.with_conn(|conn| User::create_demo(conn, now())).unwrap();
        let ctx = ScanContext { database: &db, hazards: &hazards, history_limit: 50 };
        let options = ScanOptions {
            user_id: Some(user.id.clone()),
            product_name: Some("Cola".to_string()),
            ..Default::default()
        };

        let response = analyze_ingredients(&ctx, "Water, Trans Fat", &options).unwrap();
        assert!(response.stored);
        assert_eq!(response.harmful_count, 1);
        assert_eq!(response.scan.alerts.len(), 1);

        let stats = db
            .with_conn(|conn| User::get_by_id(conn, &user.id))
            .unwrap()
            .unwrap()
            .stats;
        assert_eq!(stats.total_scans, 1);
        assert_eq!(stats.avg_score, 82);
        assert_eq!(stats.streak, 1);
    }

    #[test]
    fn test_empty_scan_is_not_stored() {
        let db = test_db();
        let hazards = HazardTable::builtin();
        let user = db.with_conn(|conn| User::create_demo(conn, now())).unwrap();
        let ctx = ScanContext { database: &db, hazards: &hazards, history_limit: 50 };
        let options = ScanOptions {
            user_id: Some(user.id.clone()),
            ..Default::default()
        };

        let response = scan_voice(&ctx, "   ", &options).unwrap();
        assert!(!response.stored);
        assert!(response.grade.is_none());
        assert_eq!(db.with_conn(|conn| Scan::count_for_user(conn, &user.id)).unwrap(), 0);
    }

    #[test]
    fn test_scan_for_unknown_user_fails() {
        let db = test_db();
        let hazards = HazardTable::builtin();
        let ctx = ScanContext { database: &db, hazards: &hazards, history_limit: 50 };
        let options = ScanOptions {
            user_id: Some("user_404".to_string()),
            ..Default::default()
        };

        let err = scan_barcode(&ctx, &options).unwrap_err();
        assert!(err.contains("User not found"));
    }

    #[test]
    fn test_upload_rules() {
        let db = test_db();
        let hazards = HazardTable::builtin();
        let ctx = ScanContext { database: &db, hazards: &hazards, history_limit: 50 };
        let options = ScanOptions::default();

        let err = scan_upload(&ctx, "label.pdf", "application/pdf", 100, &options).unwrap_err();
        assert!(err.contains("valid image"));

        let err = scan_upload(&ctx, "label.jpg", "image/jpeg", 11 * 1024 * 1024, &options).unwrap_err();
        assert!(err.contains("10MB"));

        let ok = scan_upload(&ctx, "junk-food-label.jpg", "image/jpeg", 2048, &options).unwrap();
        assert!(ok.harmful_count > 0);

        let screenshot = scan_upload(&ctx, "screenshot-food.png", "image/png", 2048, &options).unwrap();
        assert!(screenshot.scan.found_nothing());
    }

    #[test]
    fn test_barcode_and_camera() {
        let db = test_db();
        let hazards = HazardTable::builtin();
        let ctx = ScanContext { database: &db, hazards: &hazards, history_limit: 50 };

        let barcode = scan_barcode(&ctx, &ScanOptions::default()).unwrap();
        assert_eq!(barcode.scan.source, ScanSource::Barcode);
        assert_eq!(barcode.scan.results.len(), 6);
        assert_eq!(barcode.harmful_count, 1);

        let camera = scan_camera(&ctx, &ScanOptions::default()).unwrap();
        assert_eq!(camera.scan.source, ScanSource::Camera);
        assert!(camera.scan.found_nothing());
    }

    #[test]
    fn test_risk_assessment_lists_harmful_names() {
        let hazards = HazardTable::builtin();
        let response = risk_assessment(&hazards, "Sugar, BHA, Aspartame", None).unwrap();

        assert_eq!(response.risk.score, 5);
        assert_eq!(response.risk.level, RiskLevel::Poor);
        assert_eq!(response.harmful_ingredients, vec!["bha", "aspartame"]);
        assert_eq!(response.total_ingredients, 3);
    }

    #[test]
    fn test_list_hazards_and_languages() {
        let hazards = HazardTable::builtin();
        assert_eq!(list_hazards(&hazards).total, 15);
        assert_eq!(list_languages().len(), 12);
    }
}
