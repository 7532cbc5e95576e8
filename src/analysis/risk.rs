//! Severity-sum risk score
//!
//! A 0-10 score independent of the nutrition score: each harmful
//! ingredient adds points by severity, and the sum maps to a risk level.

use serde::{Deserialize, Serialize};

use super::hazards::Severity;
use super::matcher::AnalysisResult;

pub const MAX_RISK_SCORE: u32 = 10;

/// Discrete risk level for a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Excellent,
    Good,
    Moderate,
    Poor,
    Dangerous,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => RiskLevel::Excellent,
            1..=2 => RiskLevel::Good,
            3..=4 => RiskLevel::Moderate,
            5..=7 => RiskLevel::Poor,
            _ => RiskLevel::Dangerous,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Excellent => "EXCELLENT",
            RiskLevel::Good => "GOOD",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::Poor => "POOR",
            RiskLevel::Dangerous => "DANGEROUS",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Excellent => "No harmful ingredients detected",
            RiskLevel::Good => "Minimal harmful ingredients",
            RiskLevel::Moderate => "Some concerning ingredients present",
            RiskLevel::Poor => "Multiple harmful ingredients detected",
            RiskLevel::Dangerous => "High concentration of harmful ingredients",
        }
    }
}

fn severity_points(severity: Severity) -> u32 {
    match severity {
        Severity::High => 3,
        Severity::Medium => 2,
        Severity::Low => 1,
    }
}

/// Sum severity points over harmful results, capped at 10
pub fn risk_score(results: &[AnalysisResult]) -> u32 {
    let sum: u32 = results
        .iter()
        .filter_map(AnalysisResult::severity)
        .map(severity_points)
        .sum();
    sum.min(MAX_RISK_SCORE)
}

/// Risk score together with its level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub description: String,
}

impl RiskAssessment {
    pub fn from_results(results: &[AnalysisResult]) -> Self {
        Self::from_score(risk_score(results))
    }

    pub fn from_score(score: u32) -> Self {
        let score = score.min(MAX_RISK_SCORE);
        let level = RiskLevel::from_score(score);
        Self {
            score,
            level,
            description: level.description().to_string(),
        }
    }
}
