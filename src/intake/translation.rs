//! Supported languages and simulated translation

use serde::Serialize;

use super::IntakeError;

pub const DEFAULT_LANGUAGE: &str = "en";

/// A language the scanner accepts ingredient text in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Español" },
    Language { code: "fr", name: "Français" },
    Language { code: "de", name: "Deutsch" },
    Language { code: "it", name: "Italiano" },
    Language { code: "pt", name: "Português" },
    Language { code: "ru", name: "Русский" },
    Language { code: "ja", name: "日本語" },
    Language { code: "ko", name: "한국어" },
    Language { code: "zh", name: "中文" },
    Language { code: "ar", name: "العربية" },
    Language { code: "hi", name: "हिन्दी" },
];

// (english text, target language, translation)
const CANNED_TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("Water, High Fructose Corn Syrup", "es", "Agua, Jarabe de Maíz Alto en Fructosa"),
    ("Water, High Fructose Corn Syrup", "fr", "Eau, Sirop de Maïs à Haute Teneur en Fructose"),
    ("Water, High Fructose Corn Syrup", "de", "Wasser, Maissirup mit hohem Fruktosegehalt"),
];

pub fn supported_languages() -> &'static [Language] {
    LANGUAGES
}

pub fn find_language(code: &str) -> Result<&'static Language, IntakeError> {
    LANGUAGES
        .iter()
        .find(|lang| lang.code == code)
        .ok_or_else(|| IntakeError::UnsupportedLanguage(code.to_string()))
}

/// Translate `text` between two supported languages.
///
/// Only a handful of canned phrases are known; anything else comes back
/// unchanged.
pub fn translate_text(text: &str, from: &str, to: &str) -> Result<String, IntakeError> {
    find_language(from)?;
    find_language(to)?;

    if from == to {
        return Ok(text.to_string());
    }

    let translated = CANNED_TRANSLATIONS.iter().find_map(|(english, lang, translation)| {
        if from == DEFAULT_LANGUAGE && *english == text && *lang == to {
            Some(*translation)
        } else if to == DEFAULT_LANGUAGE && *translation == text && *lang == from {
            Some(*english)
        } else {
            None
        }
    });

    Ok(translated.unwrap_or(text).to_string())
}
