//! End-to-end checks of the analysis pipeline through the public API.

use nutriscan::analysis::{
    analyze, score, HazardCategory, HazardTable, RiskAssessment, RiskLevel, Severity,
};

#[test]
fn result_count_matches_tokens() {
    let hazards = HazardTable::builtin();
    let text = "Water,\nSugar, , Salt\n\nRed Dye 40 (color),  ";
    assert_eq!(analyze(text, &hazards).len(), 4);
    assert!(analyze("", &hazards).is_empty());
    assert!(analyze("   ", &hazards).is_empty());
}

#[test]
fn label_with_one_sweetener() {
    let hazards = HazardTable::builtin();
    let results = analyze("Water, High Fructose Corn Syrup, Salt", &hazards);

    assert!(results[1].is_harmful());
    assert_eq!(results[1].severity(), Some(Severity::High));
    assert_eq!(results[1].category(), Some(HazardCategory::Sweetener));

    let oats = analyze("Organic Oats", &hazards);
    assert!(!oats[0].is_harmful());
    assert_eq!(oats[0].severity(), None);
}

#[test]
fn nutrition_score_examples() {
    let hazards = HazardTable::builtin();

    let empty = score(&[]);
    assert_eq!(empty.overall, 100);
    assert_eq!(empty.description, "Excellent nutritional quality with minimal processing");

    let two = score(&analyze("High Fructose Corn Syrup, Red Dye 40", &hazards));
    assert_eq!(two.overall, 73);
    assert_eq!(two.negative, 2);
    assert_eq!(two.positive, 0);

    let worst = score(&analyze(&vec!["Potassium Bromate"; 20].join(", "), &hazards));
    assert_eq!(worst.overall, 0);
}

#[test]
fn risk_levels_from_labels() {
    let hazards = HazardTable::builtin();
    let level = |text: &str| RiskAssessment::from_results(&analyze(text, &hazards)).level;

    // medium
    assert_eq!(level("Water, Sodium Benzoate"), RiskLevel::Good);
    // high + medium
    assert_eq!(level("BHA, Aspartame"), RiskLevel::Poor);
    // four highs, capped at ten
    assert_eq!(level("BHA, BHT, Trans Fat, Sodium Nitrite"), RiskLevel::Dangerous);
    assert_eq!(RiskAssessment::from_results(&analyze("BHA, BHT, Trans Fat, Sodium Nitrite", &hazards)).score, 10);
}
