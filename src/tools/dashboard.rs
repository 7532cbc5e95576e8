//! Dashboard MCP Tool
//!
//! Aggregates a user's stored scans into analytics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::Database;
use crate::models::Scan;

use super::history::ScanSummary;

/// Scans compared at each end of the history for the improvement trend
const TREND_WINDOW: usize = 5;

/// Recent scans listed on the dashboard
const RECENT_SCANS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`
    pub month: String,
    pub scans: usize,
    pub avg_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total_scans: usize,
    pub avg_nutrition_score: i64,
    pub harmful_ingredients_count: usize,
    /// Harmful ingredient count per hazard category
    pub category_frequency: BTreeMap<String, usize>,
    /// Average of the newest scans minus average of the oldest
    pub improvement_trend: i64,
    pub monthly_trend: Vec<MonthlyTrend>,
}

/// Response for get_dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user_id: String,
    /// None until the user has stored a scan
    pub analytics: Option<Analytics>,
    pub recent_scans: Vec<ScanSummary>,
}

/// Round half toward positive infinity
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn overall(scan: &Scan) -> u32 {
    scan.score.as_ref().map(|s| s.overall).unwrap_or(0)
}

/// Compute analytics over a history ordered newest first
pub fn analytics(history: &[Scan]) -> Option<Analytics> {
    if history.is_empty() {
        return None;
    }

    let total_scans = history.len();
    let score_sum: u32 = history.iter().map(overall).sum();

    let mut category_frequency = BTreeMap::new();
    let mut harmful_ingredients_count = 0;
    for result in history.iter().flat_map(|scan| &scan.results) {
        if let Some(category) = result.category() {
            harmful_ingredients_count += 1;
            *category_frequency.entry(category.as_str().to_string()).or_insert(0) += 1;
        }
    }

    Some(Analytics {
        total_scans,
        avg_nutrition_score: round_half_up(score_sum as f64 / total_scans as f64),
        harmful_ingredients_count,
        category_frequency,
        improvement_trend: improvement_trend(history),
        monthly_trend: monthly_trend(history),
    })
}

/// Sum of the newest five scores over five, minus the same for the oldest
/// five. Shorter histories still divide by five.
pub fn improvement_trend(history: &[Scan]) -> i64 {
    if history.len() < 2 {
        return 0;
    }

    let window = TREND_WINDOW.min(history.len());
    let newest: u32 = history[..window].iter().map(overall).sum();
    let oldest: u32 = history[history.len() - window..].iter().map(overall).sum();

    round_half_up(newest as f64 / TREND_WINDOW as f64 - oldest as f64 / TREND_WINDOW as f64)
}

/// Scan count and average score per calendar month, oldest month first
pub fn monthly_trend(history: &[Scan]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<&str, (usize, u32)> = BTreeMap::new();
    for scan in history {
        let month = scan.created_at.get(..7).unwrap_or(&scan.created_at);
        let entry = months.entry(month).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += overall(scan);
    }

    months
        .into_iter()
        .map(|(month, (scans, sum))| MonthlyTrend {
            month: month.to_string(),
            scans,
            avg_score: round_half_up(sum as f64 / scans as f64),
        })
        .collect()
}

pub fn get_dashboard(db: &Database, user_id: &str, history_limit: usize) -> Result<DashboardResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let history = Scan::list_for_user(&conn, user_id, history_limit as i64)
        .map_err(|e| format!("Failed to load scan history: {}", e))?;

    Ok(DashboardResponse {
        user_id: user_id.to_string(),
        analytics: analytics(&history),
        recent_scans: history.iter().take(RECENT_SCANS).map(ScanSummary::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, score, HazardTable, RiskAssessment};
    use crate::intake::ScanSource;
    use crate::models::format_timestamp;
    use chrono::{TimeZone, Utc};

    fn scan_with(text: &str, year: i32, month: u32, day: u32) -> Scan {
        let at = Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap();
        let results = analyze(text, &HazardTable::builtin());
        Scan {
            id: format!("scan_{}_abcdef012", at.timestamp_millis()),
            user_id: Some("user_1".to_string()),
            source: ScanSource::Text,
            language: "en".to_string(),
            product_name: None,
            extracted_text: text.to_string(),
            score: Some(score(&results)),
            risk: RiskAssessment::from_results(&results),
            alerts: Vec::new(),
            results,
            created_at: format_timestamp(at),
        }
    }

    fn with_score(overall: u32, month: u32) -> Scan {
        let mut scan = scan_with("water", 2026, month, 1);
        if let Some(s) = scan.score.as_mut() {
            s.overall = overall;
        }
        scan
    }

    #[test]
    fn test_empty_history_has_no_analytics() {
        assert!(analytics(&[]).is_none());
    }

    #[test]
    fn test_counts_and_categories() {
        // newest first
        let history = vec![
            scan_with("Water, Red Dye 40, Yellow 5", 2026, 2, 3),
            scan_with("Sugar, Aspartame", 2026, 1, 15),
        ];
        let a = analytics(&history).unwrap();

        assert_eq!(a.total_scans, 2);
        assert_eq!(a.harmful_ingredients_count, 3);
        assert_eq!(a.category_frequency.get("Food Coloring"), Some(&2));
        assert_eq!(a.category_frequency.get("Sweetener"), Some(&1));
        // 80 and 96
        assert_eq!(a.avg_nutrition_score, 88);
    }

    #[test]
    fn test_improvement_trend_divides_by_five() {
        assert_eq!(improvement_trend(&[with_score(90, 1)]), 0);

        // Two scans: both windows hold both scans
        assert_eq!(improvement_trend(&[with_score(90, 2), with_score(40, 1)]), 0);

        // Newest five average 90, oldest five average 50
        let mut history: Vec<Scan> = (0..5).map(|_| with_score(90, 3)).collect();
        history.extend((0..5).map(|_| with_score(50, 1)));
        assert_eq!(improvement_trend(&history), 40);

        // Seven scans: windows overlap in the middle three
        let history = vec![
            with_score(100, 3),
            with_score(100, 3),
            with_score(70, 2),
            with_score(70, 2),
            with_score(70, 2),
            with_score(40, 1),
            with_score(40, 1),
        ];
        // (410 - 290) / 5 = 24
        assert_eq!(improvement_trend(&history), 24);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn test_monthly_trend_groups_by_month() {
        let history = vec![with_score(80, 3), with_score(70, 3), with_score(50, 1)];
        let trend = monthly_trend(&history);

        assert_eq!(
            trend,
            vec![
                MonthlyTrend { month: "2026-01".to_string(), scans: 1, avg_score: 50 },
                MonthlyTrend { month: "2026-03".to_string(), scans: 2, avg_score: 75 },
            ]
        );
    }
}
