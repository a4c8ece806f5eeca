//! File-backed content store: one JSON document per language code, at
//! `<root>/<lang>/common.json`.
//!
//! Writes go to a temporary file next to the target and are renamed into
//! place, so a failed write never leaves a half-written document behind.
//! Concurrent writers for the same language race; the last rename wins.

use super::document::ContentDocument;
use super::error::ContentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const DOCUMENT_FILE: &str = "common.json";

/// A syntactically valid language code used as a store key.
///
/// Two to eight ASCII letters with an optional `-`-separated subtag,
/// lower-cased. Rejecting anything else keeps codes from escaping the
/// store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn parse(raw: &str) -> Result<LanguageCode, ContentError> {
        let code = raw.trim().to_ascii_lowercase();
        let mut parts = code.split('-');
        let primary = parts.next().unwrap_or_default();
        let subtag = parts.next();

        let primary_ok = (2..=8).contains(&primary.len())
            && primary.bytes().all(|b| b.is_ascii_lowercase());
        let subtag_ok = subtag.map_or(true, |tag| {
            (1..=8).contains(&tag.len()) && tag.bytes().all(|b| b.is_ascii_alphanumeric())
        });

        if primary_ok && subtag_ok && parts.next().is_none() {
            Ok(LanguageCode(code))
        } else {
            Err(ContentError::InvalidLanguage(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LanguageCode::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> String {
        code.0
    }
}

/// Persistence boundary mapping a language code to a content document.
pub trait ContentStore: Send + Sync {
    /// Load the document for `lang`.
    fn read(&self, lang: &LanguageCode) -> Result<ContentDocument, ContentError>;

    /// Replace the document for `lang`, creating its location if needed.
    fn write(&self, lang: &LanguageCode, document: &ContentDocument) -> Result<(), ContentError>;

    /// Language codes that currently have a stored document, sorted.
    fn languages(&self) -> Result<Vec<LanguageCode>, ContentError>;
}

#[derive(Debug, Clone)]
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn document_path(&self, lang: &LanguageCode) -> PathBuf {
        self.root.join(lang.as_str()).join(DOCUMENT_FILE)
    }

    fn io_error(lang: &LanguageCode, source: std::io::Error) -> ContentError {
        ContentError::Io {
            lang: lang.to_string(),
            source,
        }
    }
}

impl ContentStore for FileContentStore {
    fn read(&self, lang: &LanguageCode) -> Result<ContentDocument, ContentError> {
        let path = self.document_path(lang);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContentError::NotFound(lang.to_string()))
            }
            Err(e) => return Err(Self::io_error(lang, e)),
        };

        debug!("Read {} bytes of content for '{}'", bytes.len(), lang);

        serde_json::from_slice(&bytes).map_err(|e| ContentError::Corrupt {
            lang: lang.to_string(),
            reason: e.to_string(),
        })
    }

    fn write(&self, lang: &LanguageCode, document: &ContentDocument) -> Result<(), ContentError> {
        let path = self.document_path(lang);

        let content = serde_json::to_string_pretty(document).map_err(|e| ContentError::Corrupt {
            lang: lang.to_string(),
            reason: format!("cannot serialize document: {}", e),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(lang, e))?;
        }

        write_atomically(&path, content.as_bytes()).map_err(|e| Self::io_error(lang, e))?;

        info!("Stored content for '{}' ({} bytes)", lang, content.len());
        Ok(())
    }

    fn languages(&self) -> Result<Vec<LanguageCode>, ContentError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ContentError::Io {
                    lang: "*".to_string(),
                    source: e,
                })
            }
        };

        let mut codes: Vec<LanguageCode> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().join(DOCUMENT_FILE).is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter_map(|name| LanguageCode::parse(&name).ok())
            .collect();
        codes.sort();
        Ok(codes)
    }
}

/// Write to a uniquely named sibling temp file, sync it, then rename it
/// over `path`. The temp file is removed if any step fails.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
