//! Health alerts for recently banned ingredients

use super::matcher::AnalysisResult;

const RECENTLY_BANNED: &[&str] = &["potassium bromate", "trans fat", "partially hydrogenated"];

/// One alert line per harmful result naming a recently banned ingredient
pub fn health_alerts(results: &[AnalysisResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.is_harmful())
        .filter(|r| {
            let ingredient = r.ingredient().to_lowercase();
            RECENTLY_BANNED.iter().any(|banned| ingredient.contains(banned))
        })
        .map(|r| {
            format!(
                "ALERT: {} has been recently banned in several countries!",
                r.ingredient()
            )
        })
        .collect()
}
