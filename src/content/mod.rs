//! Bilingual site content: the document shape, the file store that persists
//! one document per language, path-addressed edits and the editor buffer.

pub mod document;
pub mod editor;
pub mod error;
pub mod path;
pub mod store;

pub use document::{
    ContactLabels, ContentDocument, Footer, Hero, ModuleItem, Modules, Plan, PlanKey, Plans,
    Pricing, Rating, Testimonial, Testimonials,
};
pub use editor::{ContentEditor, EditorError};
pub use error::ContentError;
pub use path::{ContentPath, ListPath};
pub use store::{ContentStore, FileContentStore, LanguageCode};
