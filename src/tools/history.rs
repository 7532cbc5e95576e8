//! Scan History MCP Tools

use serde::Serialize;
use tracing::info;

use crate::analysis::RiskLevel;
use crate::db::Database;
use crate::intake::ScanSource;
use crate::models::{Scan, User};

/// Scan summary for listing
#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub id: String,
    pub source: ScanSource,
    pub product_name: Option<String>,
    pub overall_score: Option<u32>,
    pub grade: Option<&'static str>,
    pub risk_level: RiskLevel,
    pub total_ingredients: usize,
    pub harmful_count: usize,
    pub created_at: String,
}

impl From<&Scan> for ScanSummary {
    fn from(scan: &Scan) -> Self {
        Self {
            id: scan.id.clone(),
            source: scan.source,
            product_name: scan.product_name.clone(),
            overall_score: scan.score.as_ref().map(|s| s.overall),
            grade: scan.score.as_ref().map(|s| s.grade()),
            risk_level: scan.risk.level,
            total_ingredients: scan.results.len(),
            harmful_count: scan.harmful_count(),
            created_at: scan.created_at.clone(),
        }
    }
}

/// Response for get_scan_history
#[derive(Debug, Serialize)]
pub struct ScanHistoryResponse {
    pub user_id: String,
    pub scans: Vec<ScanSummary>,
    pub total: i64,
    pub limit: i64,
}

/// Response for clear_user_data
#[derive(Debug, Serialize)]
pub struct ClearUserDataResponse {
    pub user_id: String,
    pub scans_deleted: usize,
    pub profile_deleted: bool,
}

/// List a user's scans, newest first
pub fn get_scan_history(db: &Database, user_id: &str, limit: i64) -> Result<ScanHistoryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let limit = limit.clamp(1, 200);

    let scans = Scan::list_for_user(&conn, user_id, limit)
        .map_err(|e| format!("Failed to list scans: {}", e))?;
    let total = Scan::count_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to count scans: {}", e))?;

    Ok(ScanHistoryResponse {
        user_id: user_id.to_string(),
        scans: scans.iter().map(ScanSummary::from).collect(),
        total,
        limit,
    })
}

/// Full details of one stored scan
pub fn get_scan(db: &Database, scan_id: &str) -> Result<Option<Scan>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Scan::get_by_id(&conn, scan_id).map_err(|e| format!("Failed to get scan: {}", e))
}

/// Delete a user's scan history and profile
pub fn clear_user_data(db: &Database, user_id: &str) -> Result<ClearUserDataResponse, String> {
    let (scans_deleted, profile_deleted) = db
        .with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let scans = Scan::delete_for_user(&tx, user_id)?;
            let profile = User::delete(&tx, user_id)?;
            tx.commit()?;
            Ok((scans, profile))
        })
        .map_err(|e| format!("Failed to clear user data: {}", e))?;

    info!(user_id, scans_deleted, profile_deleted, "Cleared user data");

    Ok(ClearUserDataResponse {
        user_id: user_id.to_string(),
        scans_deleted,
        profile_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HazardTable;
    use crate::db::migrations::run_migrations;
    use crate::tools::scanner::{analyze_ingredients, ScanContext, ScanOptions};

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    #[test]
    fn test_history_and_clear() {
        let db = test_db();
        let hazards = HazardTable::builtin();
        let user = crate::tools::profile::sign_in(&db).unwrap();
        let ctx = ScanContext { database: &db, hazards: &hazards, history_limit: 50 };
        let options = ScanOptions {
            user_id: Some(user.id.clone()),
            ..Default::default()
        };

        let first = analyze_ingredients(&ctx, "Water, Salt", &options).unwrap();
        let second = analyze_ingredients(&ctx, "Sugar, MSG", &options).unwrap();

        let history = get_scan_history(&db, &user.id, 20).unwrap();
        assert_eq!(history.total, 2);
        assert_eq!(history.scans[0].id, second.scan.id);
        assert_eq!(history.scans[1].id, first.scan.id);
        assert_eq!(history.scans[0].harmful_count, 1);
        assert_eq!(history.scans[1].grade, Some("A+"));

        let full = get_scan(&db, &first.scan.id).unwrap().unwrap();
        assert_eq!(full.results.len(), 2);

        let cleared = clear_user_data(&db, &user.id).unwrap();
        assert_eq!(cleared.scans_deleted, 2);
        assert!(cleared.profile_deleted);
        assert_eq!(get_scan_history(&db, &user.id, 20).unwrap().total, 0);
    }

    #[test]
    fn test_get_missing_scan() {
        let db = test_db();
        assert!(get_scan(&db, "scan_0_000000000").unwrap().is_none());
    }
}
