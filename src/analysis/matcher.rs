//! Ingredient matcher
//!
//! Splits free ingredient text into tokens and flags every token that
//! contains a hazard dictionary key.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::hazards::{HazardCategory, HazardTable, Severity};

/// Score delta carried by every ingredient that matched no hazard
pub const SAFE_INGREDIENT_IMPACT: i32 = 2;

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("parenthesis pattern is valid"));

/// Outcome of matching one ingredient token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisResult {
    Harmful {
        ingredient: String,
        /// Dictionary key that matched
        matched: String,
        severity: Severity,
        reason: String,
        category: HazardCategory,
        health_impact: String,
        alternatives: Vec<String>,
        regulatory_status: String,
        studies_count: u32,
        impact: i32,
    },
    Safe {
        ingredient: String,
        impact: i32,
    },
}

impl AnalysisResult {
    /// Token text as entered (lowercased, before parenthesis stripping)
    pub fn ingredient(&self) -> &str {
        match self {
            AnalysisResult::Harmful { ingredient, .. } | AnalysisResult::Safe { ingredient, .. } => {
                ingredient
            }
        }
    }

    pub fn is_harmful(&self) -> bool {
        matches!(self, AnalysisResult::Harmful { .. })
    }

    pub fn impact(&self) -> i32 {
        match self {
            AnalysisResult::Harmful { impact, .. } | AnalysisResult::Safe { impact, .. } => *impact,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            AnalysisResult::Harmful { severity, .. } => Some(*severity),
            AnalysisResult::Safe { .. } => None,
        }
    }

    pub fn category(&self) -> Option<HazardCategory> {
        match self {
            AnalysisResult::Harmful { category, .. } => Some(*category),
            AnalysisResult::Safe { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            AnalysisResult::Harmful { reason, .. } => Some(reason),
            AnalysisResult::Safe { .. } => None,
        }
    }
}

/// Lowercase, split on commas and newlines, trim, and drop empty pieces
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// Remove parenthesized groups, e.g. "sugar (organic)" -> "sugar"
pub fn clean_token(token: &str) -> String {
    PARENTHESIZED.replace_all(token, "").trim().to_string()
}

/// Match a single, already tokenized ingredient
pub fn match_token(token: &str, table: &HazardTable) -> AnalysisResult {
    let cleaned = clean_token(token);

    match table.first_contained_in(&cleaned) {
        Some((key, entry)) => AnalysisResult::Harmful {
            ingredient: token.to_string(),
            matched: key.to_string(),
            severity: entry.severity,
            reason: entry.reason.to_string(),
            category: entry.category,
            health_impact: entry.health_impact.to_string(),
            alternatives: entry.alternatives.iter().map(|a| a.to_string()).collect(),
            regulatory_status: entry.regulatory_status.to_string(),
            studies_count: entry.studies_count,
            impact: entry.nutrition_impact,
        },
        None => AnalysisResult::Safe {
            ingredient: token.to_string(),
            impact: SAFE_INGREDIENT_IMPACT,
        },
    }
}

/// Analyze free ingredient text, one result per token in input order.
///
/// An empty result means no ingredients were found, which is not the same
/// as finding no harmful ones.
pub fn analyze(text: &str, table: &HazardTable) -> Vec<AnalysisResult> {
    let results: Vec<AnalysisResult> = tokenize(text)
        .iter()
        .map(|token| match_token(token, table))
        .collect();

    debug!(
        tokens = results.len(),
        harmful = results.iter().filter(|r| r.is_harmful()).count(),
        "Analyzed ingredient text"
    );

    results
}
