//! Admin API. Every route except login requires a bearer session token.

use super::{blocking, lock_editor, negotiate, ApiError, AppState, Negotiated, SharedEditor};
use crate::content::{ContentDocument, ContentEditor, LanguageCode};
use crate::i18n::{Language, LanguageStrings};
use crate::publish::PublishTrigger;
use crate::security::constant_time_compare;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// A validated admin session, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        match token {
            Some(token) if state.sessions.validate(token) => Ok(AdminSession {
                token: token.to_string(),
            }),
            _ => Err(ApiError::unauthorized(
                negotiate(parts).strings().admin_session_required,
            )),
        }
    }
}

/// Body extractor result, turning a malformed body into an `ApiError`.
fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value).map_err(ApiError::from)
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    #[serde(default)]
    password: String,
}

pub(super) async fn login(
    State(state): State<AppState>,
    Negotiated(language): Negotiated,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;

    if !constant_time_compare(&request.password, &state.config.admin_password) {
        warn!("Rejected admin login attempt");
        return Err(ApiError::unauthorized(language.strings().admin_login_invalid));
    }

    let token = state.sessions.issue();
    Ok(Json(json!({
        "success": true,
        "token": token,
        "expiresIn": state.sessions.ttl().as_secs(),
    })))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    session: AdminSession,
) -> Json<Value> {
    state.sessions.revoke(&session.token);
    state.editors.lock().await.remove(&session.token);
    Json(json!({ "success": true }))
}

#[derive(Debug, Deserialize)]
pub(super) struct ContentQuery {
    lang: Option<String>,
}

/// Store language from an optional code, canonical if absent.
fn store_language(code: Option<&str>) -> Result<LanguageCode, ApiError> {
    let code = code.unwrap_or_else(|| Language::canonical().code());
    Ok(LanguageCode::parse(code)?)
}

pub(super) async fn read_content(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<ContentQuery>,
) -> Result<Json<ContentDocument>, ApiError> {
    let lang = store_language(query.lang.as_deref())?;
    let store = Arc::clone(&state.store);
    let document = blocking(move || Ok(store.read(&lang)?)).await?;
    Ok(Json(document))
}

#[derive(Debug, Deserialize)]
pub(super) struct WriteContentRequest {
    language: String,
    content: ContentDocument,
}

pub(super) async fn write_content(
    State(state): State<AppState>,
    _session: AdminSession,
    Negotiated(language): Negotiated,
    request: Result<Json<WriteContentRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;
    let lang = LanguageCode::parse(&request.language)?;

    let store = Arc::clone(&state.store);
    let stored = lang.clone();
    blocking(move || Ok(store.write(&stored, &request.content)?)).await?;
    info!("Admin replaced content for '{}'", lang);

    Ok(Json(json!({
        "success": true,
        "message": language.strings().admin_content_saved,
    })))
}

/// Language codes that have a stored document, including ones the public
/// language switcher does not offer yet.
pub(super) async fn stored_languages(
    State(state): State<AppState>,
    _session: AdminSession,
) -> Result<Json<Value>, ApiError> {
    let store = Arc::clone(&state.store);
    let languages = blocking(move || Ok(store.languages()?)).await?;
    Ok(Json(json!({
        "success": true,
        "languages": languages,
    })))
}

/// Run the publisher and shape its outcome for the admin panel.
async fn run_publish(
    publisher: &dyn PublishTrigger,
    strings: &LanguageStrings,
) -> Result<Json<Value>, ApiError> {
    match publisher.publish().await {
        Ok(outcome) => {
            info!("Publish finished: {}", outcome.message());
            Ok(Json(json!({
                "success": true,
                "message": outcome.message(),
            })))
        }
        Err(e) => Err(ApiError::publish_failed(&e, strings.admin_deploy_failed)),
    }
}

pub(super) async fn deploy(
    State(state): State<AppState>,
    _session: AdminSession,
    Negotiated(language): Negotiated,
) -> Result<Json<Value>, ApiError> {
    run_publish(state.publisher.as_ref(), language.strings()).await
}

// ==================== Editor Sessions ====================

fn editor_view(editor: Option<&ContentEditor>) -> Json<Value> {
    Json(json!({
        "success": true,
        "language": editor.and_then(ContentEditor::language),
        "dirty": editor.is_some_and(ContentEditor::is_dirty),
        "document": editor.and_then(ContentEditor::document),
    }))
}

/// Run `edit` against the session's editor on the blocking pool, creating
/// the editor on first use. Only that editor is locked while it runs.
async fn with_editor<T, F>(
    state: &AppState,
    session: &AdminSession,
    edit: F,
) -> Result<(T, Json<Value>), ApiError>
where
    F: FnOnce(&mut ContentEditor) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let editor: SharedEditor = state.session_editor(&session.token).await;
    blocking(move || {
        let mut editor = lock_editor(&editor);
        let result = edit(&mut *editor)?;
        Ok((result, editor_view(Some(&*editor))))
    })
    .await
}

pub(super) async fn editor_state(
    State(state): State<AppState>,
    session: AdminSession,
) -> Json<Value> {
    match state.existing_editor(&session.token).await {
        Some(editor) => {
            let editor = lock_editor(&editor);
            editor_view(Some(&*editor))
        }
        None => editor_view(None),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LoadRequest {
    language: String,
}

pub(super) async fn editor_load(
    State(state): State<AppState>,
    session: AdminSession,
    request: Result<Json<LoadRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;
    let lang = LanguageCode::parse(&request.language)?;
    let (_, view) = with_editor(&state, &session, move |editor| {
        editor.load(&lang)?;
        Ok(())
    })
    .await?;
    Ok(view)
}

#[derive(Debug, Deserialize)]
pub(super) struct SetFieldRequest {
    path: String,
    value: Value,
}

pub(super) async fn editor_set_field(
    State(state): State<AppState>,
    session: AdminSession,
    request: Result<Json<SetFieldRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;
    let (_, view) = with_editor(&state, &session, move |editor| {
        Ok(editor.set_field(&request.path, request.value)?)
    })
    .await?;
    Ok(view)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SetItemRequest {
    list_path: String,
    index: usize,
    #[serde(default)]
    field: String,
    value: Value,
}

pub(super) async fn editor_set_item(
    State(state): State<AppState>,
    session: AdminSession,
    request: Result<Json<SetItemRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;
    let (_, view) = with_editor(&state, &session, move |editor| {
        Ok(editor.set_list_item_field(
            &request.list_path,
            request.index,
            &request.field,
            request.value,
        )?)
    })
    .await?;
    Ok(view)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddItemRequest {
    list_path: String,
    value: Value,
}

pub(super) async fn editor_add_item(
    State(state): State<AppState>,
    session: AdminSession,
    request: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;
    let (index, Json(mut view)) = with_editor(&state, &session, move |editor| {
        Ok(editor.add_list_item(&request.list_path, request.value)?)
    })
    .await?;
    view["index"] = json!(index);
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemoveItemRequest {
    list_path: String,
    index: usize,
}

pub(super) async fn editor_remove_item(
    State(state): State<AppState>,
    session: AdminSession,
    request: Result<Json<RemoveItemRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = body(request)?;
    let (_, view) = with_editor(&state, &session, move |editor| {
        Ok(editor.remove_list_item(&request.list_path, request.index)?)
    })
    .await?;
    Ok(view)
}

pub(super) async fn editor_save(
    State(state): State<AppState>,
    session: AdminSession,
) -> Result<Json<Value>, ApiError> {
    let (_, view) = with_editor(&state, &session, |editor| Ok(editor.save()?)).await?;
    Ok(view)
}

/// Publish the persisted content, refusing while this session's buffer has
/// unsaved edits. No editor lock is held while git runs.
pub(super) async fn editor_publish(
    State(state): State<AppState>,
    session: AdminSession,
    Negotiated(language): Negotiated,
) -> Result<Json<Value>, ApiError> {
    if let Some(editor) = state.existing_editor(&session.token).await {
        lock_editor(&editor).ensure_saved()?;
    }
    run_publish(state.publisher.as_ref(), language.strings()).await
}
