//! `Language`: a site language validated against the registry.

use super::registry::{LanguageConfig, LanguageRegistry};
use super::strings::LanguageStrings;
use anyhow::{bail, Result};
use std::fmt;

/// A validated, enabled site language.
#[derive(Clone, Copy)]
pub struct Language {
    config: &'static LanguageConfig,
}

impl Language {
    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is registered and enabled
    /// * `Err` if the code is unknown or disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let code = code.trim().to_ascii_lowercase();
        match LanguageRegistry::get().get_by_code(&code) {
            Some(config) if config.enabled => Ok(Language { config }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    pub fn canonical() -> Language {
        Language {
            config: LanguageRegistry::get().canonical(),
        }
    }

    /// Pick the first registered language named in an `Accept-Language`
    /// header, in header order. Quality weights are ignored.
    pub fn from_accept_language(header: &str) -> Language {
        header
            .split(',')
            .filter_map(|entry| entry.split(';').next())
            .filter_map(|tag| tag.trim().split('-').next())
            .find_map(|primary| Language::from_code(primary).ok())
            .unwrap_or_else(Language::canonical)
    }

    pub fn code(&self) -> &'static str {
        self.config.code
    }

    pub fn strings(&self) -> &'static LanguageStrings {
        self.config.strings
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for Language {}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Language").field(&self.code()).finish()
    }
}
