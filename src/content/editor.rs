//! In-memory editing buffer over one language's content document.
//!
//! Edits stage in the buffer until `save` writes the whole document back.
//! Loading another language replaces the buffer and drops unsaved edits.

use super::document::ContentDocument;
use super::error::ContentError;
use super::path::{ContentPath, ListPath};
use super::store::{ContentStore, LanguageCode};
use crate::publish::{PublishError, PublishOutcome, PublishTrigger};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Editor failures, keeping content and publish problems apart.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),
}

#[derive(Debug)]
struct ActiveDocument {
    lang: LanguageCode,
    document: ContentDocument,
    dirty: bool,
}

pub struct ContentEditor {
    store: Arc<dyn ContentStore>,
    publisher: Arc<dyn PublishTrigger>,
    active: Option<ActiveDocument>,
}

impl ContentEditor {
    pub fn new(store: Arc<dyn ContentStore>, publisher: Arc<dyn PublishTrigger>) -> Self {
        Self {
            store,
            publisher,
            active: None,
        }
    }

    /// Make the stored document for `lang` the active buffer.
    ///
    /// On failure the previous buffer, if any, stays active.
    pub fn load(&mut self, lang: &LanguageCode) -> Result<&ContentDocument, ContentError> {
        let document = self.store.read(lang)?;

        if let Some(previous) = &self.active {
            if previous.dirty {
                warn!(
                    "Discarding unsaved edits for '{}' while loading '{}'",
                    previous.lang, lang
                );
            }
        }

        info!("Editor loaded content for '{}'", lang);
        let active = self.active.insert(ActiveDocument {
            lang: lang.clone(),
            document,
            dirty: false,
        });
        Ok(&active.document)
    }

    pub fn language(&self) -> Option<&LanguageCode> {
        self.active.as_ref().map(|active| &active.lang)
    }

    pub fn document(&self) -> Option<&ContentDocument> {
        self.active.as_ref().map(|active| &active.document)
    }

    pub fn is_dirty(&self) -> bool {
        self.active.as_ref().is_some_and(|active| active.dirty)
    }

    /// Current value at a dotted path of the active buffer.
    pub fn get(&self, path: &str) -> Result<Value, ContentError> {
        let path = ContentPath::parse(path)?;
        path.get(&self.active()?.document)
    }

    /// Replace the value at a dotted path such as `pricing.plans.start.price`.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), ContentError> {
        let path = ContentPath::parse(path)?;
        let active = self.active_mut()?;
        path.set(&mut active.document, value)?;
        active.dirty = true;
        debug!("Set '{}' in '{}' buffer", path, active.lang);
        Ok(())
    }

    /// Replace one field of one element of a list, e.g. the rating of the
    /// second testimonial.
    pub fn set_list_item_field(
        &mut self,
        list_path: &str,
        index: usize,
        field: &str,
        value: Value,
    ) -> Result<(), ContentError> {
        let list = ListPath::parse(list_path)?;
        let active = self.active_mut()?;

        let len = list.len(&active.document);
        if index >= len {
            return Err(ContentError::IndexOutOfRange {
                path: list.to_string(),
                index,
                len,
            });
        }

        let path = list.item(index, field)?;
        path.set(&mut active.document, value)?;
        active.dirty = true;
        debug!("Set '{}' in '{}' buffer", path, active.lang);
        Ok(())
    }

    /// Append an element to a list, returning its index.
    pub fn add_list_item(&mut self, list_path: &str, value: Value) -> Result<usize, ContentError> {
        let list = ListPath::parse(list_path)?;
        let active = self.active_mut()?;
        let index = list.push(&mut active.document, value)?;
        active.dirty = true;
        debug!("Added item {} to '{}' in '{}' buffer", index, list, active.lang);
        Ok(index)
    }

    pub fn remove_list_item(&mut self, list_path: &str, index: usize) -> Result<(), ContentError> {
        let list = ListPath::parse(list_path)?;
        let active = self.active_mut()?;
        list.remove(&mut active.document, index)?;
        active.dirty = true;
        debug!("Removed item {} from '{}' in '{}' buffer", index, list, active.lang);
        Ok(())
    }

    /// Write the whole buffer back to the store for its language.
    pub fn save(&mut self) -> Result<(), ContentError> {
        let store = Arc::clone(&self.store);
        let active = self.active_mut()?;
        store.write(&active.lang, &active.document)?;
        active.dirty = false;
        info!("Editor saved content for '{}'", active.lang);
        Ok(())
    }

    /// Fails with `UnsavedChanges` while the buffer has edits that `save`
    /// has not written yet.
    pub fn ensure_saved(&self) -> Result<(), ContentError> {
        match self.active.as_ref().filter(|active| active.dirty) {
            Some(active) => Err(ContentError::UnsavedChanges(active.lang.to_string())),
            None => Ok(()),
        }
    }

    /// Publish the persisted content. Refused while the buffer is dirty.
    pub async fn publish(&self) -> Result<PublishOutcome, EditorError> {
        self.ensure_saved()?;

        match self.publisher.publish().await {
            Ok(outcome) => {
                info!("Publish finished: {}", outcome.message());
                Ok(outcome)
            }
            Err(e) => {
                warn!("Publish failed: {}", e);
                Err(e.into())
            }
        }
    }

    fn active(&self) -> Result<&ActiveDocument, ContentError> {
        self.active.as_ref().ok_or(ContentError::NoActiveDocument)
    }

    fn active_mut(&mut self) -> Result<&mut ActiveDocument, ContentError> {
        self.active.as_mut().ok_or(ContentError::NoActiveDocument)
    }
}
