//! Hazard dictionary
//!
//! Known harmful ingredients with their health metadata. Entries are matched
//! in declaration order, so the order of `HAZARDS` decides which entry wins
//! when several keys are contained in the same ingredient.

use serde::{Deserialize, Serialize};

/// How concerning a harmful ingredient is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Ingredient category of a hazard entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardCategory {
    Sweetener,
    Preservative,
    #[serde(rename = "Food Coloring")]
    FoodColoring,
    #[serde(rename = "Flavor Enhancer")]
    FlavorEnhancer,
    Fat,
    Thickener,
    #[serde(rename = "Flour Treatment")]
    FlourTreatment,
    Flavoring,
}

impl HazardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardCategory::Sweetener => "Sweetener",
            HazardCategory::Preservative => "Preservative",
            HazardCategory::FoodColoring => "Food Coloring",
            HazardCategory::FlavorEnhancer => "Flavor Enhancer",
            HazardCategory::Fat => "Fat",
            HazardCategory::Thickener => "Thickener",
            HazardCategory::FlourTreatment => "Flour Treatment",
            HazardCategory::Flavoring => "Flavoring",
        }
    }
}

impl std::fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health metadata for one harmful ingredient
#[derive(Debug, Clone, Serialize)]
pub struct HazardEntry {
    pub severity: Severity,
    pub reason: &'static str,
    pub category: HazardCategory,
    pub health_impact: &'static str,
    pub alternatives: &'static [&'static str],
    pub regulatory_status: &'static str,
    pub studies_count: u32,
    /// Signed delta applied to the nutrition score
    pub nutrition_impact: i32,
}

const HAZARDS: &[(&str, HazardEntry)] = &[
    (
        "high fructose corn syrup",
        HazardEntry {
            severity: Severity::High,
            reason: "Linked to obesity, diabetes, and metabolic disorders. Processed differently than regular sugar, leading to increased fat storage.",
            category: HazardCategory::Sweetener,
            health_impact: "Increases risk of obesity, type 2 diabetes, heart disease, and fatty liver disease",
            alternatives: &["Organic cane sugar", "Maple syrup", "Honey", "Stevia"],
            regulatory_status: "FDA approved but restricted in some countries",
            studies_count: 150,
            nutrition_impact: -15,
        },
    ),
    (
        "sodium benzoate",
        HazardEntry {
            severity: Severity::Medium,
            reason: "May form benzene (a carcinogen) when combined with vitamin C. Can cause hyperactivity in children and allergic reactions.",
            category: HazardCategory::Preservative,
            health_impact: "Potential carcinogen formation, hyperactivity, allergic reactions",
            alternatives: &["Vitamin E (tocopherols)", "Rosemary extract", "Citric acid"],
            regulatory_status: "FDA approved with usage limits",
            studies_count: 89,
            nutrition_impact: -8,
        },
    ),
    (
        "red dye 40",
        HazardEntry {
            severity: Severity::High,
            reason: "Artificial food coloring linked to hyperactivity, allergic reactions, and potential carcinogenic effects. Banned in several European countries.",
            category: HazardCategory::FoodColoring,
            health_impact: "ADHD symptoms, allergic reactions, potential cancer risk",
            alternatives: &["Beet juice", "Paprika extract", "Annatto", "Turmeric"],
            regulatory_status: "Banned in Norway, Finland, France for children's products",
            studies_count: 67,
            nutrition_impact: -12,
        },
    ),
    (
        "yellow 5",
        HazardEntry {
            severity: Severity::Medium,
            reason: "May cause allergic reactions, hyperactivity in children, and has been linked to behavioral issues. Contains benzene compounds.",
            category: HazardCategory::FoodColoring,
            health_impact: "Hyperactivity, allergic reactions, behavioral changes",
            alternatives: &["Turmeric", "Saffron", "Beta-carotene", "Annatto"],
            regulatory_status: "Requires warning labels in EU",
            studies_count: 45,
            nutrition_impact: -10,
        },
    ),
    (
        "bha",
        HazardEntry {
            severity: Severity::High,
            reason: "Butylated hydroxyanisole is classified as a possible human carcinogen and endocrine disruptor. Accumulates in body tissues.",
            category: HazardCategory::Preservative,
            health_impact: "Potential cancer risk, hormone disruption, liver damage",
            alternatives: &["Vitamin E", "Rosemary extract", "Green tea extract"],
            regulatory_status: "Banned in Japan and parts of EU",
            studies_count: 112,
            nutrition_impact: -18,
        },
    ),
    (
        "bht",
        HazardEntry {
            severity: Severity::High,
            reason: "Butylated hydroxytoluene may cause liver damage, thyroid problems, and is a possible carcinogen. Bioaccumulates in fatty tissues.",
            category: HazardCategory::Preservative,
            health_impact: "Liver toxicity, thyroid disruption, potential cancer risk",
            alternatives: &["Mixed tocopherols", "Ascorbic acid", "Citric acid"],
            regulatory_status: "Restricted in several countries",
            studies_count: 98,
            nutrition_impact: -16,
        },
    ),
    (
        "aspartame",
        HazardEntry {
            severity: Severity::Medium,
            reason: "Artificial sweetener that may cause headaches, dizziness, and has been linked to various neurological symptoms in sensitive individuals.",
            category: HazardCategory::Sweetener,
            health_impact: "Headaches, dizziness, mood changes, potential neurological effects",
            alternatives: &["Stevia", "Monk fruit", "Erythritol", "Xylitol"],
            regulatory_status: "FDA approved but controversial",
            studies_count: 200,
            nutrition_impact: -6,
        },
    ),
    (
        "monosodium glutamate",
        HazardEntry {
            severity: Severity::Low,
            reason: "May cause headaches, nausea, and other symptoms in sensitive individuals (MSG syndrome). Generally recognized as safe for most people.",
            category: HazardCategory::FlavorEnhancer,
            health_impact: "MSG syndrome symptoms in sensitive individuals",
            alternatives: &["Yeast extract", "Mushroom powder", "Seaweed extract"],
            regulatory_status: "FDA approved, GRAS status",
            studies_count: 156,
            nutrition_impact: -4,
        },
    ),
    (
        "msg",
        HazardEntry {
            severity: Severity::Low,
            reason: "May cause headaches, nausea, and other symptoms in sensitive individuals (MSG syndrome). Generally recognized as safe for most people.",
            category: HazardCategory::FlavorEnhancer,
            health_impact: "MSG syndrome symptoms in sensitive individuals",
            alternatives: &["Yeast extract", "Mushroom powder", "Seaweed extract"],
            regulatory_status: "FDA approved, GRAS status",
            studies_count: 156,
            nutrition_impact: -4,
        },
    ),
    (
        "sodium nitrite",
        HazardEntry {
            severity: Severity::High,
            reason: "Can form nitrosamines, which are carcinogenic compounds, especially when heated. Commonly found in processed meats.",
            category: HazardCategory::Preservative,
            health_impact: "Cancer risk, particularly colorectal cancer",
            alternatives: &["Celery powder", "Sea salt", "Vitamin C + salt"],
            regulatory_status: "FDA approved with strict limits",
            studies_count: 134,
            nutrition_impact: -14,
        },
    ),
    (
        "potassium bromate",
        HazardEntry {
            severity: Severity::High,
            reason: "Banned in many countries due to carcinogenic properties. Still used in some US baked goods as a flour treatment agent.",
            category: HazardCategory::FlourTreatment,
            health_impact: "Strong carcinogen, kidney and nervous system damage",
            alternatives: &["Ascorbic acid", "Enzyme-based improvers", "Vital wheat gluten"],
            regulatory_status: "Banned in EU, Canada, Brazil, China",
            studies_count: 78,
            nutrition_impact: -20,
        },
    ),
    (
        "trans fat",
        HazardEntry {
            severity: Severity::High,
            reason: "Increases bad cholesterol, decreases good cholesterol, and significantly raises risk of heart disease and stroke.",
            category: HazardCategory::Fat,
            health_impact: "Heart disease, stroke, diabetes, inflammation",
            alternatives: &["Coconut oil", "Avocado oil", "Olive oil", "Grass-fed butter"],
            regulatory_status: "Banned in many countries, being phased out in US",
            studies_count: 300,
            nutrition_impact: -20,
        },
    ),
    (
        "partially hydrogenated oil",
        HazardEntry {
            severity: Severity::High,
            reason: "Contains trans fats which are linked to heart disease, stroke, and diabetes. No safe level of consumption.",
            category: HazardCategory::Fat,
            health_impact: "Cardiovascular disease, diabetes, inflammation",
            alternatives: &["Cold-pressed oils", "Coconut oil", "Palm oil", "Butter"],
            regulatory_status: "FDA banned in US as of 2021",
            studies_count: 250,
            nutrition_impact: -18,
        },
    ),
    (
        "artificial vanilla",
        HazardEntry {
            severity: Severity::Low,
            reason: "Vanillin derived from wood pulp or petroleum. While generally safe, may cause allergic reactions in sensitive individuals.",
            category: HazardCategory::Flavoring,
            health_impact: "Rare allergic reactions, no major health concerns",
            alternatives: &["Pure vanilla extract", "Vanilla beans", "Natural vanilla flavoring"],
            regulatory_status: "FDA approved, GRAS status",
            studies_count: 23,
            nutrition_impact: -2,
        },
    ),
    (
        "carrageenan",
        HazardEntry {
            severity: Severity::Medium,
            reason: "May cause digestive inflammation and has been linked to intestinal damage in animal studies. Controversial ingredient.",
            category: HazardCategory::Thickener,
            health_impact: "Digestive inflammation, potential gut health issues",
            alternatives: &["Agar", "Guar gum", "Xanthan gum", "Arrowroot"],
            regulatory_status: "FDA approved but under review",
            studies_count: 67,
            nutrition_impact: -7,
        },
    ),
];

/// Ordered, immutable hazard dictionary
#[derive(Debug, Clone)]
pub struct HazardTable {
    entries: Vec<(&'static str, HazardEntry)>,
}

impl HazardTable {
    /// The built-in dictionary, in its declaration order
    pub fn builtin() -> Self {
        Self {
            entries: HAZARDS.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &HazardEntry)> + '_ {
        self.entries.iter().map(|(key, entry)| (*key, entry))
    }

    pub fn get(&self, key: &str) -> Option<&HazardEntry> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, entry)| entry)
    }

    /// First entry whose key is a substring of `ingredient`.
    ///
    /// `ingredient` must already be lowercase.
    pub fn first_contained_in(&self, ingredient: &str) -> Option<(&'static str, &HazardEntry)> {
        self.iter().find(|(key, _)| ingredient.contains(key))
    }
}

impl Default for HazardTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Serializable view of one dictionary entry
#[derive(Debug, Serialize)]
pub struct HazardListing {
    pub key: &'static str,
    #[serde(flatten)]
    pub entry: HazardEntry,
}

impl HazardTable {
    pub fn listings(&self) -> Vec<HazardListing> {
        self.iter()
            .map(|(key, entry)| HazardListing {
                key,
                entry: entry.clone(),
            })
            .collect()
    }
}
