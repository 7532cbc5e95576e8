//! Ingredient text intake
//!
//! Turns the supported input sources into ingredient text. Image text
//! recognition, barcode lookup and translation are simulated with canned data.

pub mod translation;
pub mod upload;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use translation::{supported_languages, translate_text, Language, DEFAULT_LANGUAGE};
pub use upload::{mock_ocr, validate_upload, MAX_UPLOAD_BYTES};

/// Ingredient list returned for every simulated barcode scan
pub const BARCODE_INGREDIENTS: &str =
    "Water, Sugar, Citric Acid, Natural Flavors, Sodium Benzoate, Artificial Colors";

/// File name given to camera captures
pub const CAMERA_CAPTURE_NAME: &str = "camera-capture.jpg";
pub const CAMERA_CAPTURE_TYPE: &str = "image/jpeg";

/// Where the ingredient text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    Text,
    Upload,
    Camera,
    Voice,
    Barcode,
}

impl ScanSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanSource::Text => "text",
            ScanSource::Upload => "upload",
            ScanSource::Camera => "camera",
            ScanSource::Voice => "voice",
            ScanSource::Barcode => "barcode",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "upload" => ScanSource::Upload,
            "camera" => ScanSource::Camera,
            "voice" => ScanSource::Voice,
            "barcode" => ScanSource::Barcode,
            _ => ScanSource::Text,
        }
    }
}

/// Input rejected before analysis
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Please select a valid image file (got content type '{0}')")]
    NotAnImage(String),

    #[error("File size must be less than 10MB (got {0} bytes)")]
    FileTooLarge(u64),

    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parsing() {
        for source in [
            ScanSource::Text,
            ScanSource::Upload,
            ScanSource::Camera,
            ScanSource::Voice,
            ScanSource::Barcode,
        ] {
            assert_eq!(ScanSource::from_str(source.as_str()), source);
        }
        assert_eq!(ScanSource::from_str("fax"), ScanSource::Text);
    }

    #[test]
    fn test_camera_capture_passes_validation() {
        assert!(validate_upload(CAMERA_CAPTURE_NAME, CAMERA_CAPTURE_TYPE, 2048).is_ok());
    }
}
