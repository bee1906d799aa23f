//! Error-to-response mapping for pages and the JSON API.

use super::forms::{FieldErrors, domain_field_errors};
use crate::task::services::TaskLifecycleError;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum WebError {
    /// A page lookup missed; carries the rendered not-found page.
    #[error("page not found")]
    PageNotFound(String),

    /// JSON input failed validation.
    #[error("invalid task input")]
    InvalidInput(FieldErrors),

    /// The lifecycle service failed.
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),

    /// The configured owner header name is not a valid HTTP header name.
    #[error("invalid owner header name '{0}'")]
    InvalidOwnerHeader(String),

    /// A template could not be compiled or rendered.
    #[error("failed to render template '{template}': {reason}")]
    Template {
        /// Template name.
        template: String,
        /// Renderer message.
        reason: String,
    },
}

impl WebError {
    pub(super) fn template(name: &str, error: &minijinja::Error) -> Self {
        Self::Template {
            template: name.to_owned(),
            reason: error.to_string(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::PageNotFound(page) => (StatusCode::NOT_FOUND, Html(page)).into_response(),
            Self::InvalidInput(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            Self::Lifecycle(error) if error.is_not_found() => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
            }
            Self::Lifecycle(TaskLifecycleError::Domain(error)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": domain_field_errors(&error) })),
            )
                .into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
