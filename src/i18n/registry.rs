//! Language registry: single source of truth for the site's languages.
//!
//! Initialized once with `OnceLock` and immutable thereafter.

use super::strings::{LanguageStrings, ENGLISH_STRINGS, RUSSIAN_STRINGS};
use serde::Serialize;
use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "ru", "en")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Native name of the language (e.g., "Русский")
    pub native_name: &'static str,

    /// Whether this is the canonical language (exactly one is)
    pub is_canonical: bool,

    /// Whether this language is offered to visitors
    #[serde(skip)]
    pub enabled: bool,

    #[serde(skip)]
    pub strings: &'static LanguageStrings,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    canonical: usize,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry::new(default_languages()))
    }

    fn new(languages: Vec<LanguageConfig>) -> Self {
        let canonical = languages
            .iter()
            .position(|lang| lang.is_canonical)
            .unwrap_or(0);
        Self {
            languages,
            canonical,
        }
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// The canonical language: the default for visitors and the admin panel.
    pub fn canonical(&self) -> &LanguageConfig {
        &self.languages[self.canonical]
    }
}

/// Russian (canonical) and English.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_canonical: true,
            enabled: true,
            strings: &RUSSIAN_STRINGS,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: false,
            enabled: true,
            strings: &ENGLISH_STRINGS,
        },
    ]
}
