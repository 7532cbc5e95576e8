//! Nutrition score aggregation
//!
//! Reduces a list of analysis results to a 0-100 nutrition score with
//! category sub-scores, a description and canned recommendations.

use serde::{Deserialize, Serialize};

use super::hazards::HazardCategory;
use super::matcher::AnalysisResult;

/// Score of a product with no ingredient effects
pub const BASE_SCORE: i32 = 100;

const PRESERVATIVE_WEIGHT: u32 = 20;
const SWEETENER_WEIGHT: u32 = 15;
const COLORING_WEIGHT: u32 = 25;
const ADDITIVE_WEIGHT: u32 = 10;
const MAX_SUB_SCORE: u32 = 100;

/// Concern level per ingredient category, each 0-100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub preservatives: u32,
    pub sweeteners: u32,
    pub colorings: u32,
    /// Every other harmful category
    pub additives: u32,
}

impl CategoryScores {
    fn add(&mut self, category: HazardCategory) {
        match category {
            HazardCategory::Preservative => self.preservatives += PRESERVATIVE_WEIGHT,
            HazardCategory::Sweetener => self.sweeteners += SWEETENER_WEIGHT,
            HazardCategory::FoodColoring => self.colorings += COLORING_WEIGHT,
            _ => self.additives += ADDITIVE_WEIGHT,
        }
    }

    fn clamped(self) -> Self {
        Self {
            preservatives: self.preservatives.min(MAX_SUB_SCORE),
            sweeteners: self.sweeteners.min(MAX_SUB_SCORE),
            colorings: self.colorings.min(MAX_SUB_SCORE),
            additives: self.additives.min(MAX_SUB_SCORE),
        }
    }
}

/// Aggregate nutrition quality of one analyzed product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionScore {
    /// 0-100, higher is better
    pub overall: u32,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub categories: CategoryScores,
    pub description: String,
    pub recommendations: Vec<String>,
}

impl NutritionScore {
    /// Letter grade for the overall score
    pub fn grade(&self) -> &'static str {
        match self.overall {
            90.. => "A+",
            80..=89 => "A",
            70..=79 => "B",
            60..=69 => "C",
            50..=59 => "D",
            _ => "F",
        }
    }
}

/// Description for an overall score
pub fn describe(overall: u32) -> &'static str {
    match overall {
        90.. => "Excellent nutritional quality with minimal processing",
        80..=89 => "Good choice with few concerning ingredients",
        70..=79 => "Acceptable but could be improved",
        60..=69 => "Moderate concerns with several harmful ingredients",
        50..=59 => "Poor nutritional quality with many harmful additives",
        _ => "Avoid - contains numerous harmful ingredients",
    }
}

fn recommendations(overall: u32, harmful: &[&AnalysisResult]) -> Vec<String> {
    let mut recs = Vec::new();
    let has_category =
        |category: HazardCategory| harmful.iter().any(|r| r.category() == Some(category));

    if !harmful.is_empty() {
        recs.push("Look for products with fewer artificial additives".to_string());
    }
    if overall < 70 {
        recs.push("Consider organic or natural alternatives".to_string());
    }
    if has_category(HazardCategory::FoodColoring) {
        recs.push("Avoid artificial food dyes".to_string());
    }
    if has_category(HazardCategory::Preservative) {
        recs.push("Choose products with natural preservatives".to_string());
    }
    recs
}

/// Compute the nutrition score for a list of analysis results.
///
/// Never fails; an empty list scores 100.
pub fn score(results: &[AnalysisResult]) -> NutritionScore {
    let total = results.len();
    let harmful: Vec<&AnalysisResult> = results.iter().filter(|r| r.is_harmful()).collect();

    let total_impact: i32 = results.iter().map(AnalysisResult::impact).sum();
    let overall = (BASE_SCORE + total_impact).clamp(0, 100) as u32;

    let positive = total - harmful.len();
    let negative = harmful.len();
    // fixed offset of two
    let neutral = total.saturating_sub(positive).saturating_sub(2);

    let mut categories = CategoryScores::default();
    for result in &harmful {
        if let Some(category) = result.category() {
            categories.add(category);
        }
    }

    NutritionScore {
        overall,
        positive,
        negative,
        neutral,
        categories: categories.clamped(),
        description: describe(overall).to_string(),
        recommendations: recommendations(overall, &harmful),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::hazards::HazardTable;
    use crate::analysis::matcher::analyze;

    fn score_text(text: &str) -> NutritionScore {
        score(&analyze(text, &HazardTable::builtin()))
    }

    #[test]
    fn test_empty_results_score_excellent() {
        let s = score(&[]);
        assert_eq!(s.overall, 100);
        assert_eq!((s.positive, s.negative, s.neutral), (0, 0, 0));
        assert_eq!(s.description, "Excellent nutritional quality with minimal processing");
        assert!(s.recommendations.is_empty());
        assert_eq!(s.categories, CategoryScores::default());
        assert_eq!(s.grade(), "A+");
    }

    #[test]
    fn test_two_harmful_ingredients() {
        let s = score_text("High Fructose Corn Syrup, Red Dye 40");
        assert_eq!(s.overall, 73);
        assert_eq!(s.negative, 2);
        assert_eq!(s.positive, 0);
        assert_eq!(s.neutral, 0);
        assert_eq!(s.categories.sweeteners, 15);
        assert_eq!(s.categories.colorings, 25);
        assert_eq!(s.description, "Acceptable but could be improved");
        assert_eq!(
            s.recommendations,
            vec![
                "Look for products with fewer artificial additives",
                "Avoid artificial food dyes",
            ]
        );
        assert_eq!(s.grade(), "B");
    }

    #[test]
    fn test_safe_ingredients_cannot_exceed_hundred() {
        let s = score_text("water, salt, oats, honey");
        assert_eq!(s.overall, 100);
        assert_eq!(s.positive, 4);
        assert_eq!(s.negative, 0);
    }

    #[test]
    fn test_many_harmful_clamps_to_zero() {
        let text = vec!["bha"; 20].join(", ");
        let s = score_text(&text);
        assert_eq!(s.overall, 0);
        assert_eq!(s.negative, 20);
        assert_eq!(s.categories.preservatives, 100);
        assert_eq!(s.description, "Avoid - contains numerous harmful ingredients");
        assert_eq!(s.grade(), "F");
    }

    #[test]
    fn test_neutral_uses_fixed_offset() {
        // 5 harmful, 1 safe: total - positive - 2 = 3
        let s = score_text("bha, bht, msg, carrageenan, trans fat, water");
        assert_eq!(s.positive, 1);
        assert_eq!(s.negative, 5);
        assert_eq!(s.neutral, 3);
    }

    #[test]
    fn test_other_categories_count_as_additives() {
        let s = score_text("msg, carrageenan, trans fat, artificial vanilla");
        assert_eq!(s.categories.additives, 40);
        assert_eq!(s.categories.preservatives, 0);
    }

    #[test]
    fn test_recommendation_order() {
        // 100 - 8 - 18 - 12 - 10 = 52
        let s = score_text("sodium benzoate, bha, red dye 40, yellow 5");
        assert_eq!(s.overall, 52);
        assert_eq!(
            s.recommendations,
            vec![
                "Look for products with fewer artificial additives",
                "Consider organic or natural alternatives",
                "Avoid artificial food dyes",
                "Choose products with natural preservatives",
            ]
        );
    }

    #[test]
    fn test_description_thresholds() {
        assert_eq!(describe(90), "Excellent nutritional quality with minimal processing");
        assert_eq!(describe(89), "Good choice with few concerning ingredients");
        assert_eq!(describe(70), "Acceptable but could be improved");
        assert_eq!(describe(60), "Moderate concerns with several harmful ingredients");
        assert_eq!(describe(50), "Poor nutritional quality with many harmful additives");
        assert_eq!(describe(49), "Avoid - contains numerous harmful ingredients");
    }
}
