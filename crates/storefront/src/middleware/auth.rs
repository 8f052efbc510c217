//! Admin authentication extractor.
//!
//! Editor routes take [`RequireAdmin`] as an argument; requests without the
//! admin flag in their session never reach the handler.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::services::auth::is_admin;

/// Extractor that requires an admin session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_admin: RequireAdmin) -> impl IntoResponse {
///     "editor"
/// }
/// ```
pub struct RequireAdmin;

/// Rejection when the admin flag is missing.
pub struct AdminRejection;

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Admin login required" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminRejection)?;

        if is_admin(session).await {
            Ok(Self)
        } else {
            tracing::debug!(path = %parts.uri.path(), "admin route without admin session");
            Err(AdminRejection)
        }
    }
}
