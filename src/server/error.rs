use crate::content::ContentError;
use crate::publish::PublishError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// Error response body: `{"success": false, "error": ..., "details": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// A failed publish, with the localized `message` and the failing git
    /// step as details.
    pub fn publish_failed(err: &PublishError, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message).with_details(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        let status = match &err {
            ContentError::NotFound(_) => StatusCode::NOT_FOUND,
            ContentError::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
            ContentError::IndexOutOfRange { .. }
            | ContentError::UnknownPath { .. }
            | ContentError::InvalidValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ContentError::NoActiveDocument | ContentError::UnsavedChanges(_) => StatusCode::CONFLICT,
            ContentError::Corrupt { .. } | ContentError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), "Invalid request body").with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = self.status.as_u16(),
                details = self.details.as_deref(),
                "{}",
                self.message
            );
        } else {
            warn!(status = self.status.as_u16(), "{}", self.message);
        }

        let mut body = json!({
            "success": false,
            "error": self.message,
        });
        if let Some(details) = self.details {
            body["details"] = json!(details);
        }
        (self.status, Json(body)).into_response()
    }
}
