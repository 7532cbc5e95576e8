//! Image upload validation and simulated label recognition
//!
//! No pixels are read: the recognized text is chosen from canned ingredient
//! lists based on the file name alone.

use tracing::debug;

use super::IntakeError;

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const NON_FOOD_INDICATORS: &[&str] = &[
    "app", "login", "password", "secure", "interface", "ui", "screen", "mobile", "iphone",
    "android", "software", "tech", "digital", "dashboard", "profile", "settings", "menu",
    "button", "form",
];

const SCREENSHOT_MARKERS: &[&str] = &["screenshot", "screen", "capture"];

const FOOD_KEYWORDS: &[&str] = &[
    "ingredient", "nutrition", "label", "food", "snack", "cereal", "drink", "candy", "package",
    "product", "brand", "organic",
];

const HEALTHY_LABELS: &[&str] = &[
    "Organic Rolled Oats, Water, Sea Salt, Natural Vanilla Extract, Organic Cane Sugar, Vitamin E (Mixed Tocopherols)",
    "Organic Wheat Flour, Water, Organic Sunflower Oil, Sea Salt, Organic Yeast, Organic Sugar",
    "Almonds, Organic Dates, Organic Coconut, Sea Salt, Natural Vanilla Flavor",
];

const MODERATE_LABELS: &[&str] = &[
    "Water, Wheat Flour, Sugar, Vegetable Oil, Salt, Yeast, Natural Flavoring, Calcium Propionate",
    "Milk, Sugar, Cocoa, Natural Vanilla Flavor, Lecithin, Salt",
];

const HARMFUL_LABELS: &[&str] = &[
    "Water, High Fructose Corn Syrup, Wheat Flour, Sugar, Vegetable Oil, Salt, Sodium Benzoate, Red Dye 40, BHA",
    "Sugar, Corn Syrup, Artificial Flavors, Red Dye 40, Yellow 6, BHT, Aspartame",
];

/// Reject anything that is not an image or is larger than 10 MiB
pub fn validate_upload(file_name: &str, content_type: &str, size_bytes: u64) -> Result<(), IntakeError> {
    if !content_type.starts_with("image/") {
        return Err(IntakeError::NotAnImage(content_type.to_string()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(IntakeError::FileTooLarge(size_bytes));
    }
    debug!(file_name, size_bytes, "Upload accepted");
    Ok(())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Simulated label recognition.
///
/// Returns an empty string when the file name suggests a non-food image,
/// a screenshot, or carries no food keyword.
pub fn mock_ocr(file_name: &str) -> String {
    let name = file_name.to_lowercase();

    if contains_any(&name, NON_FOOD_INDICATORS) || contains_any(&name, SCREENSHOT_MARKERS) {
        return String::new();
    }
    if !contains_any(&name, FOOD_KEYWORDS) {
        return String::new();
    }

    let labels = if contains_any(&name, &["organic", "natural", "healthy"]) {
        HEALTHY_LABELS
    } else if contains_any(&name, &["processed", "junk", "harmful"]) {
        HARMFUL_LABELS
    } else {
        MODERATE_LABELS
    };

    let pick = name.bytes().map(usize::from).sum::<usize>() % labels.len();
    labels[pick].to_string()
}
