//! Admin panel handlers: login gate and the catalog record editor.
//!
//! Everything past `/admin/login` takes [`RequireAdmin`]. The editor's mode,
//! draft and any pending deletion are kept in the admin's session; the
//! catalog itself is shared and mutated under the write lock.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use preforma_core::{
    DeletionOutcome, EditorMode, PendingDeletion, ProductDraft, ProductEditor, ProductId,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::session::{load_or_default, store};
use crate::models::session_keys;
use crate::models::views::{AdminProductView, EditorView};
use crate::services::auth;
use crate::state::AppState;

/// Multipart field carrying the product image.
const IMAGE_FIELD: &str = "image";

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_editor(session: &Session) -> ProductEditor {
    load_or_default(session, session_keys::PRODUCT_EDITOR).await
}

async fn load_pending(session: &Session) -> Option<PendingDeletion> {
    load_or_default(session, session_keys::PENDING_DELETION).await
}

async fn save_editor(session: &Session, editor: &ProductEditor) -> Result<()> {
    store(session, session_keys::PRODUCT_EDITOR, editor).await?;
    Ok(())
}

fn editor_json(editor: &ProductEditor, pending: Option<&PendingDeletion>) -> Result<Json<Value>> {
    serde_json::to_value(EditorView::new(editor, pending))
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Drop all admin-only session state.
async fn end_admin_session(session: &Session) -> Result<()> {
    auth::logout(session).await?;
    session
        .remove::<ProductEditor>(session_keys::PRODUCT_EDITOR)
        .await?;
    session
        .remove::<PendingDeletion>(session_keys::PENDING_DELETION)
        .await?;
    Ok(())
}

// =============================================================================
// Gate
// =============================================================================

/// Login body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Enter the admin panel.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    state.admin().login(&session, &body.password).await?;
    Ok(Json(json!({ "admin": true })))
}

/// Leave the admin panel.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    end_admin_session(&session).await?;
    Ok(Json(json!({ "admin": false })))
}

/// Leave the admin panel and go back to the catalog.
#[instrument(skip(session))]
pub async fn exit(session: Session) -> Result<Json<Value>> {
    end_admin_session(&session).await?;
    Ok(Json(json!({ "admin": false, "location": "/products" })))
}

// =============================================================================
// Records
// =============================================================================

/// Every catalog record, marking the admin-created ones.
#[instrument(skip_all)]
pub async fn products(_admin: RequireAdmin, State(state): State<AppState>) -> Result<Json<Value>> {
    let catalog = state.catalog().read().await;
    let views: Vec<_> = catalog
        .list()
        .iter()
        .map(|product| AdminProductView {
            custom: catalog.is_custom(&product.id),
            product,
        })
        .collect();
    serde_json::to_value(views)
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}

// =============================================================================
// Editor
// =============================================================================

/// Current editor mode, draft and pending deletion.
#[instrument(skip_all)]
pub async fn editor(_admin: RequireAdmin, session: Session) -> Result<Json<Value>> {
    let editor = load_editor(&session).await;
    let pending = load_pending(&session).await;
    editor_json(&editor, pending.as_ref())
}

/// Merge form fields into the draft.
#[instrument(skip_all)]
pub async fn update_draft(
    _admin: RequireAdmin,
    session: Session,
    Json(patch): Json<ProductDraft>,
) -> Result<Json<Value>> {
    let mut editor = load_editor(&session).await;
    editor.update_draft(patch);
    save_editor(&session, &editor).await?;
    editor_json(&editor, None)
}

/// Attach an uploaded image to the draft.
#[instrument(skip_all)]
pub async fn upload_image(
    _admin: RequireAdmin,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut editor = load_editor(&session).await;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        editor
            .attach_image(&content_type, &bytes)
            .map_err(preforma_core::EditorError::from)?;
        tracing::info!(%content_type, size = bytes.len(), "draft image attached");
        save_editor(&session, &editor).await?;
        return editor_json(&editor, None);
    }

    Err(AppError::BadRequest(format!(
        "missing multipart field '{IMAGE_FIELD}'"
    )))
}

/// Load an existing record into the draft.
#[instrument(skip(_admin, state, session))]
pub async fn start_edit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut editor = load_editor(&session).await;
    editor.start_edit(&product);
    save_editor(&session, &editor).await?;
    editor_json(&editor, None)
}

/// Discard the draft and return to create mode.
#[instrument(skip_all)]
pub async fn reset(_admin: RequireAdmin, session: Session) -> Result<Json<Value>> {
    let editor = ProductEditor::new();
    save_editor(&session, &editor).await?;
    editor_json(&editor, None)
}

/// Create or update a record from the draft.
///
/// Responds `201 Created` for new records and `200 OK` for edits. On
/// validation failure the draft is kept for correction.
#[instrument(skip_all)]
pub async fn submit(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
) -> Result<(StatusCode, Json<Value>)> {
    let mut editor = load_editor(&session).await;
    let status = match editor.mode() {
        EditorMode::Create => StatusCode::CREATED,
        EditorMode::Edit(_) => StatusCode::OK,
    };

    let product = {
        let mut catalog = state.catalog().write().await;
        editor.submit(&mut *catalog, Utc::now())?
    };
    save_editor(&session, &editor).await?;

    let custom = state.catalog().read().await.is_custom(&product.id);
    let view = AdminProductView {
        product: &product,
        custom,
    };
    let body = serde_json::to_value(view).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((status, Json(body)))
}

// =============================================================================
// Deletion
// =============================================================================

/// Confirmation body.
#[derive(Debug, Deserialize)]
pub struct ConfirmDeleteRequest {
    pub confirm: bool,
}

/// Ask to delete a record. Nothing is removed until confirmed.
#[instrument(skip(_admin, state, session))]
pub async fn request_delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let pending = {
        let catalog = state.catalog().read().await;
        ProductEditor::request_delete(&*catalog, &ProductId::new(id))?
    };
    store(&session, session_keys::PENDING_DELETION, &pending).await?;

    let editor = load_editor(&session).await;
    editor_json(&editor, Some(&pending))
}

/// Answer a pending deletion.
#[instrument(skip(_admin, state, session))]
pub async fn confirm_delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(body): Json<ConfirmDeleteRequest>,
) -> Result<Json<Value>> {
    let id = ProductId::new(id);
    let pending = load_pending(&session)
        .await
        .filter(|pending| pending.id == id)
        .ok_or_else(|| AppError::BadRequest(format!("no deletion pending for {id}")))?;

    let outcome = {
        let mut catalog = state.catalog().write().await;
        pending.resolve(body.confirm, &mut *catalog)?
    };
    session
        .remove::<PendingDeletion>(session_keys::PENDING_DELETION)
        .await?;

    let outcome = match outcome {
        DeletionOutcome::Deleted(_) => {
            let mut editor = load_editor(&session).await;
            editor.forget(&id);
            save_editor(&session, &editor).await?;
            "deleted"
        }
        DeletionOutcome::Cancelled => "cancelled",
        DeletionOutcome::NotFound => "not_found",
    };
    Ok(Json(json!({ "id": id, "outcome": outcome })))
}
