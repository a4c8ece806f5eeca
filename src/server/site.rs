use super::{blocking, ApiError, AppState, Negotiated};
use crate::adventure::{self, ACTION_FALLBACK_STORY, OPENING_FALLBACK_STORY};
use crate::content::{ContentDocument, LanguageCode};
use crate::i18n::{LanguageConfig, LanguageRegistry};
use crate::leads::{self, ContactRequest, QuickConsultationRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn languages() -> Json<Vec<&'static LanguageConfig>> {
    Json(LanguageRegistry::get().list_enabled())
}

/// Read contract of the public renderer.
pub(super) async fn content(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Result<Json<ContentDocument>, ApiError> {
    let lang = LanguageCode::parse(&lang)?;
    let store = Arc::clone(&state.store);
    let document = blocking(move || Ok(store.read(&lang)?)).await?;
    Ok(Json(document))
}

pub(super) async fn contact(
    State(state): State<AppState>,
    Negotiated(negotiated): Negotiated,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Ok(Json(request)) = body else {
        return Err(ApiError::bad_request(negotiated.strings().lead_processing_error));
    };
    let strings = leads::response_language(request.language.as_deref(), negotiated).strings();

    leads::validate_contact(&request).map_err(|e| ApiError::bad_request(e.localized(strings)))?;
    leads::log_contact(&request);

    tokio::time::sleep(state.config.contact_delay).await;

    Ok(Json(json!({
        "success": true,
        "message": strings.contact_success,
    })))
}

pub(super) async fn quick_consultation(
    State(state): State<AppState>,
    Negotiated(negotiated): Negotiated,
    body: Result<Json<QuickConsultationRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Ok(Json(request)) = body else {
        return Err(ApiError::bad_request(negotiated.strings().lead_processing_error));
    };
    let strings = leads::response_language(request.language.as_deref(), negotiated).strings();

    leads::validate_quick_consultation(&request)
        .map_err(|e| ApiError::bad_request(e.localized(strings)))?;
    leads::log_quick_consultation(&request);

    tokio::time::sleep(state.config.quick_consultation_delay).await;

    Ok(Json(json!({
        "success": true,
        "message": strings.quick_consultation_success,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ActionRequest {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    previous_scene: Option<String>,
}

pub(super) async fn adventure_start(
    State(state): State<AppState>,
    Negotiated(language): Negotiated,
) -> Response {
    match adventure::start(state.narrator.as_ref()).await {
        Ok(scene) => scene_response(scene),
        Err(e) => {
            error!("Error starting adventure: {}", e);
            fallback_response(language.strings().adventure_start_failed, OPENING_FALLBACK_STORY)
        }
    }
}

pub(super) async fn adventure_action(
    State(state): State<AppState>,
    Negotiated(language): Negotiated,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let strings = language.strings();
    let request = body.map(|Json(request)| request).ok();
    let command = request
        .as_ref()
        .and_then(|r| r.command.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request(strings.adventure_command_required))?;
    let previous_scene = request
        .as_ref()
        .and_then(|r| r.previous_scene.as_deref())
        .unwrap_or_default();

    let response = match adventure::act(state.narrator.as_ref(), previous_scene, command).await {
        Ok(scene) => scene_response(scene),
        Err(e) => {
            error!("Error processing adventure action: {}", e);
            fallback_response(strings.adventure_action_failed, ACTION_FALLBACK_STORY)
        }
    };
    Ok(response)
}

fn scene_response(scene: adventure::Scene) -> Response {
    Json(json!({
        "success": true,
        "story": scene.story,
        "imageUrl": scene.image_url,
    }))
    .into_response()
}

fn fallback_response(message: &str, story: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": message,
            "story": story,
            "imageUrl": "",
        })),
    )
        .into_response()
}
