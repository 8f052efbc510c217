//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Error bodies are JSON: `{"error": "..."}`, plus `"fields"` for validation
//! failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use preforma_core::{
    CatalogError, DraftError, EditorError, ImageError, QuoteFormError, SubmissionError,
};

use crate::services::auth::AuthError;
use crate::services::quote_delivery::DeliveryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog storage operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Admin editor rejected the operation.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Quote request was refused.
    #[error("Quote error: {0}")]
    Submission(#[from] SubmissionError),

    /// Quote request could not be handed over.
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<&'static str>,
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Catalog(CatalogError::Storage(_))
                | Self::Editor(EditorError::Catalog(CatalogError::Storage(_)))
                | Self::Delivery(_)
                | Self::Session(_)
                | Self::Auth(AuthError::Session(_))
                | Self::Internal(_)
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => catalog_status(err),
            Self::Editor(err) => match err {
                EditorError::Draft(_) => StatusCode::UNPROCESSABLE_ENTITY,
                EditorError::Image(ImageError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
                EditorError::Image(_) => StatusCode::BAD_REQUEST,
                EditorError::EditIdMismatch { .. } => StatusCode::CONFLICT,
                EditorError::UnknownProduct(_) => StatusCode::NOT_FOUND,
                EditorError::Catalog(err) => catalog_status(err),
            },
            Self::Submission(err) => match err {
                SubmissionError::EmptyCart => StatusCode::BAD_REQUEST,
                SubmissionError::AlreadySubmitted => StatusCode::CONFLICT,
                SubmissionError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(AuthError::IncorrectPassword) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(AuthError::Session(_)) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Field names for validation failures.
    fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::Editor(EditorError::Draft(DraftError::MissingFields(fields)))
            | Self::Submission(SubmissionError::Form(QuoteFormError::MissingFields(fields))) => {
                fields.clone()
            }
            Self::Editor(EditorError::Draft(DraftError::InvalidWeight(_))) => vec!["gramaje"],
            Self::Submission(SubmissionError::Form(QuoteFormError::InvalidEmail(_))) => {
                vec!["email"]
            }
            _ => Vec::new(),
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn message(&self) -> String {
        match self {
            _ if self.is_server_error() => match self {
                Self::Delivery(_) => "Quote request could not be sent".to_string(),
                _ => "Internal server error".to_string(),
            },
            Self::Auth(AuthError::IncorrectPassword) => "Incorrect password".to_string(),
            Self::Catalog(err) => err.to_string(),
            Self::Editor(err) => err.to_string(),
            Self::Submission(err) => err.to_string(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest(why) => why.clone(),
            _ => self.to_string(),
        }
    }
}

const fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CatalogError::DuplicateId(_) => StatusCode::CONFLICT,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.message(),
            fields: self.fields(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
