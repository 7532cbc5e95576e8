//! Ingredient analysis
//!
//! Hazard dictionary, ingredient matching and the two scoring schemes.

pub mod alerts;
pub mod hazards;
pub mod matcher;
pub mod risk;
pub mod score;

pub use alerts::health_alerts;
pub use hazards::{HazardCategory, HazardEntry, HazardListing, HazardTable, Severity};
pub use matcher::{analyze, clean_token, tokenize, AnalysisResult, SAFE_INGREDIENT_IMPACT};
pub use risk::{risk_score, RiskAssessment, RiskLevel};
pub use score::{score, CategoryScores, NutritionScore};
