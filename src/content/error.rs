use thiserror::Error;

/// Failures of the content store, the path resolver and the editor buffer.
///
/// Store errors are passed through the editor unmodified so callers can tell
/// a missing language apart from a corrupt file or a disk failure.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no content document stored for language '{0}'")]
    NotFound(String),

    #[error("content document for '{lang}' is corrupt: {reason}")]
    Corrupt { lang: String, reason: String },

    #[error("storage failure for '{lang}': {source}")]
    Io {
        lang: String,
        #[source]
        source: std::io::Error,
    },

    #[error("index {index} is out of range for '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("unknown content path '{path}': {reason}")]
    UnknownPath { path: String, reason: String },

    #[error("invalid value for '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("invalid language code '{0}'")]
    InvalidLanguage(String),

    #[error("no content document is loaded in the editor")]
    NoActiveDocument,

    #[error("the editor buffer for '{0}' has unsaved changes")]
    UnsavedChanges(String),
}

impl ContentError {
    pub(crate) fn unknown_path(path: &str, reason: impl Into<String>) -> Self {
        ContentError::UnknownPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_value(path: &str, reason: impl Into<String>) -> Self {
        ContentError::InvalidValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
