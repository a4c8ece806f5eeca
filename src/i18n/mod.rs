//! Site languages and localized user-facing strings.
//!
//! - `registry`: single source of truth for supported languages
//! - `language`: validated `Language` handle, `Accept-Language` negotiation
//! - `strings`: localized messages for lead forms, admin and adventure
//!
//! The registry decides which languages visitors are offered. The content
//! store is keyed separately by any well-formed language code.

mod language;
mod registry;
mod strings;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::LanguageStrings;
