//! Owner authentication seam.
//!
//! Authentication happens upstream: a fronting proxy verifies the user and
//! forwards their UUID in a configured header. Requests without a valid
//! header are sent to the login page, or refused outright on the JSON API.

use super::{error::WebError, state::AppState};
use crate::task::{domain::OwnerId, ports::TaskRepository};
use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderName, StatusCode, Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::json;

const API_PREFIX: &str = "/api/";

/// Characters escaped in the `next` query parameter; path separators stay
/// readable.
const NEXT_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Where the owner identity comes from and where anonymous users go.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    owner_header: HeaderName,
    login_url: String,
}

impl AuthSettings {
    /// Validates the header name and stores the login location.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::InvalidOwnerHeader`] when `owner_header` is not a
    /// valid header name.
    pub fn new(owner_header: &str, login_url: &str) -> Result<Self, WebError> {
        let header = HeaderName::from_bytes(owner_header.as_bytes())
            .map_err(|_| WebError::InvalidOwnerHeader(owner_header.to_owned()))?;
        Ok(Self {
            owner_header: header,
            login_url: login_url.to_owned(),
        })
    }

    /// Returns the header carrying the owner UUID.
    #[must_use]
    pub const fn owner_header(&self) -> &HeaderName {
        &self.owner_header
    }

    /// Builds `{login_url}?next={path}` for the request being refused.
    #[must_use]
    pub fn login_redirect(&self, uri: &Uri) -> String {
        let next = uri
            .path_and_query()
            .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str());
        format!(
            "{}?next={}",
            self.login_url,
            utf8_percent_encode(next, NEXT_ESCAPES)
        )
    }
}

/// The authenticated owner of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentOwner(pub OwnerId);

/// Response for requests without an authenticated owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// Page request; redirect to this login location.
    Login(String),
    /// API request; answer 401.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Login(location) => Redirect::to(&location).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "authentication required" })),
            )
                .into_response(),
        }
    }
}

impl<R> FromRequestParts<AppState<R>> for CurrentOwner
where
    R: TaskRepository + 'static,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let auth = state.auth();
        let owner = parts
            .headers
            .get(auth.owner_header())
            .and_then(|value| value.to_str().ok())
            .and_then(|value| OwnerId::parse(value.trim()).ok());

        owner.map(Self).ok_or_else(|| {
            tracing::debug!(path = %parts.uri.path(), "request without owner identity");
            if parts.uri.path().starts_with(API_PREFIX) {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::Login(auth.login_redirect(&parts.uri))
            }
        })
    }
}
