//! HTTP surface: public site endpoints and the authenticated admin API.

mod admin;
mod error;
mod site;

pub use admin::AdminSession;
pub use error::ApiError;

use crate::adventure::NarrativeGenerator;
use crate::config::Config;
use crate::content::{ContentEditor, ContentStore, FileContentStore};
use crate::i18n::Language;
use crate::openai::narrator_from_config;
use crate::publish::{GitPublisher, PublishTrigger};
use crate::security::SessionStore;
use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, MutexGuard};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ContentStore>,
    pub publisher: Arc<dyn PublishTrigger>,
    pub narrator: Arc<dyn NarrativeGenerator>,
    pub sessions: Arc<SessionStore>,
    /// One editor buffer per live admin session token
    pub editors: Arc<Mutex<HashMap<String, SharedEditor>>>,
}

/// An editor buffer, locked only for the duration of one edit.
pub type SharedEditor = Arc<std::sync::Mutex<ContentEditor>>;

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ContentStore>,
        publisher: Arc<dyn PublishTrigger>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new(config.admin_session_ttl));
        Self {
            config: Arc::new(config),
            store,
            publisher,
            narrator,
            sessions,
            editors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Production wiring: file store, git publisher and the configured narrator.
    pub fn from_config(config: Config) -> Self {
        let store = Arc::new(FileContentStore::new(&config.locales_dir));
        let publisher = Arc::new(GitPublisher::from_config(&config));
        let narrator = narrator_from_config(&config);
        Self::new(config, store, publisher, narrator)
    }

    /// The editor owned by `token`, created on first use. Editors of
    /// expired sessions are dropped on the way.
    pub(crate) async fn session_editor(&self, token: &str) -> SharedEditor {
        let mut editors = self.live_editors().await;
        let editor = editors.entry(token.to_string()).or_insert_with(|| {
            Arc::new(std::sync::Mutex::new(ContentEditor::new(
                Arc::clone(&self.store),
                Arc::clone(&self.publisher),
            )))
        });
        Arc::clone(editor)
    }

    /// The editor owned by `token`, if it has one.
    pub(crate) async fn existing_editor(&self, token: &str) -> Option<SharedEditor> {
        let editors = self.live_editors().await;
        editors.get(token).cloned()
    }

    async fn live_editors(&self) -> tokio::sync::MutexGuard<'_, HashMap<String, SharedEditor>> {
        let mut editors = self.editors.lock().await;
        let before = editors.len();
        editors.retain(|token, _| self.sessions.validate(token));
        if editors.len() < before {
            debug!("Dropped {} editors of expired sessions", before - editors.len());
        }
        editors
    }
}

pub(crate) fn lock_editor(editor: &SharedEditor) -> MutexGuard<'_, ContentEditor> {
    // A panic mid-edit leaves a buffer that is still well-typed.
    editor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Run blocking store work off the async runtime.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error").with_details(e.to_string())
    })?
}

/// The visitor's language, negotiated from `Accept-Language`.
#[derive(Debug, Clone, Copy)]
pub struct Negotiated(pub Language);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Negotiated {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Negotiated(negotiate(parts)))
    }
}

pub(crate) fn negotiate(parts: &Parts) -> Language {
    parts
        .headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_else(Language::canonical)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Public site
        .route("/health", get(site::health))
        .route("/api/languages", get(site::languages))
        .route("/api/content/:lang", get(site::content))
        .route("/api/contact", post(site::contact))
        .route("/api/quick-consultation", post(site::quick_consultation))
        .route("/api/adventure/start", post(site::adventure_start))
        .route("/api/adventure/action", post(site::adventure_action))
        // Admin
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route(
            "/api/admin/content",
            get(admin::read_content).post(admin::write_content),
        )
        .route("/api/admin/languages", get(admin::stored_languages))
        .route("/api/admin/deploy", post(admin::deploy))
        .route("/api/admin/editor", get(admin::editor_state))
        .route("/api/admin/editor/load", post(admin::editor_load))
        .route("/api/admin/editor/field", post(admin::editor_set_field))
        .route("/api/admin/editor/item", post(admin::editor_set_item))
        .route("/api/admin/editor/item/add", post(admin::editor_add_item))
        .route("/api/admin/editor/item/remove", post(admin::editor_remove_item))
        .route("/api/admin/editor/save", post(admin::editor_save))
        .route("/api/admin/editor/publish", post(admin::editor_publish))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
