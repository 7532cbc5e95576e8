//! Scan model
//!
//! One analyzed product: the input, its analysis results and scores.
//! Stored per user, newest first, with the oldest scans evicted beyond the
//! history limit.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AnalysisResult, NutritionScore, RiskAssessment};
use crate::db::DbResult;
use crate::intake::ScanSource;

/// Extracted text shown when the input held no ingredients
pub const NO_INGREDIENTS_TEXT: &str = "No food ingredients detected in this image.";

/// A completed scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: String,
    pub user_id: Option<String>,
    pub source: ScanSource,
    pub language: String,
    pub product_name: Option<String>,
    pub extracted_text: String,
    pub results: Vec<AnalysisResult>,
    /// None when no ingredients were found
    pub score: Option<NutritionScore>,
    pub risk: RiskAssessment,
    pub alerts: Vec<String>,
    pub created_at: String,
}

/// Raw column values before JSON decoding
struct ScanRow {
    id: String,
    user_id: String,
    source: String,
    language: String,
    product_name: Option<String>,
    extracted_text: String,
    results_json: String,
    score_json: Option<String>,
    risk_score: u32,
    alerts_json: String,
    created_at: String,
}

impl ScanRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            source: row.get("source")?,
            language: row.get("language")?,
            product_name: row.get("product_name")?,
            extracted_text: row.get("extracted_text")?,
            results_json: row.get("results_json")?,
            score_json: row.get("score_json")?,
            risk_score: row.get("risk_score")?,
            alerts_json: row.get("alerts_json")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_scan(self) -> DbResult<Scan> {
        let results: Vec<AnalysisResult> = serde_json::from_str(&self.results_json)?;
        let score = self
            .score_json
            .as_deref()
            .map(serde_json::from_str::<NutritionScore>)
            .transpose()?;
        let alerts: Vec<String> = serde_json::from_str(&self.alerts_json)?;
        let risk = RiskAssessment::from_score(self.risk_score);

        Ok(Scan {
            id: self.id,
            user_id: Some(self.user_id),
            source: ScanSource::from_str(&self.source),
            language: self.language,
            product_name: self.product_name,
            extracted_text: self.extracted_text,
            results,
            score,
            risk,
            alerts,
            created_at: self.created_at,
        })
    }
}

/// `scan_<millis>_<9 hex chars>`
pub fn new_scan_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("scan_{}_{}", now.timestamp_millis(), &suffix[..9])
}

/// Timestamp format used for `created_at`; sorts lexicographically
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Scan {
    pub fn harmful_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_harmful()).count()
    }

    pub fn safe_count(&self) -> usize {
        self.results.len() - self.harmful_count()
    }

    /// Whether the input yielded no ingredient tokens at all
    pub fn found_nothing(&self) -> bool {
        self.results.is_empty()
    }

    /// Millisecond part of the scan id, used in report file names
    pub fn id_millis(&self) -> Option<&str> {
        self.id.split('_').nth(1)
    }

    /// Store a scan for `user_id` and evict that user's oldest scans beyond `limit`.
    ///
    /// Returns the number of evicted scans.
    pub fn save(conn: &mut Connection, user_id: &str, scan: &Scan, limit: usize) -> DbResult<usize> {
        let results_json = serde_json::to_string(&scan.results)?;
        let score_json = scan.score.as_ref().map(serde_json::to_string).transpose()?;
        let alerts_json = serde_json::to_string(&scan.alerts)?;
        let overall = scan.score.as_ref().map(|s| s.overall);

        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO scans (
                id, user_id, source, language, product_name, extracted_text,
                results_json, score_json, overall_score, harmful_count,
                risk_score, risk_level, alerts_json, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                scan.id,
                user_id,
                scan.source.as_str(),
                scan.language,
                scan.product_name,
                scan.extracted_text,
                results_json,
                score_json,
                overall,
                scan.harmful_count() as i64,
                scan.risk.score,
                scan.risk.level.as_str(),
                alerts_json,
                scan.created_at,
            ],
        )?;

        let evicted = tx.execute(
            r#"
            DELETE FROM scans
            WHERE user_id = ?1
              AND id NOT IN (
                  SELECT id FROM scans
                  WHERE user_id = ?1
                  ORDER BY created_at DESC, rowid DESC
                  LIMIT ?2
              )
            "#,
            params![user_id, limit as i64],
        )?;
        tx.commit()?;

        Ok(evicted)
    }

    /// Get a stored scan by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM scans WHERE id = ?1")?;

        let result = stmt.query_row([id], ScanRow::from_row);
        match result {
            Ok(row) => Ok(Some(row.into_scan()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A user's scans, newest first
    pub fn list_for_user(conn: &Connection, user_id: &str, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM scans WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![user_id, limit], ScanRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ScanRow::into_scan).collect()
    }

    pub fn count_for_user(conn: &Connection, user_id: &str) -> DbResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM scans WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete all of a user's scans, returning how many were removed
    pub fn delete_for_user(conn: &Connection, user_id: &str) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM scans WHERE user_id = ?1", [user_id])?)
    }
}
