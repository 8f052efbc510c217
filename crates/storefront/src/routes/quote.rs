//! Quote cart and quote request handlers.
//!
//! The cart and the quote form live in the visitor's session. Every handler
//! first applies a due submission (see [`load_quote`]) so a sent quote clears
//! the cart on the first interaction after its delay, never earlier.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use preforma_core::{ProductId, Quantity, QuoteCart, QuoteForm, QuoteSubmission};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session::{load_or_default, store};
use crate::models::session_keys;
use crate::models::views::CartView;
use crate::state::AppState;

// =============================================================================
// Session Helpers
// =============================================================================

/// Cart plus quote form, as stored in the session.
pub struct QuoteState {
    pub cart: QuoteCart,
    pub submission: QuoteSubmission,
}

/// Load the visitor's quote state and complete a submission whose delay has
/// elapsed.
async fn load_quote(session: &Session) -> Result<QuoteState> {
    let mut state = QuoteState {
        cart: load_or_default(session, session_keys::QUOTE_CART).await,
        submission: load_or_default(session, session_keys::QUOTE_SUBMISSION).await,
    };
    if state.submission.poll(&mut state.cart, Utc::now()) {
        tracing::info!("sent quote cleared from cart");
        save_quote(session, &state).await?;
    }
    Ok(state)
}

async fn save_quote(session: &Session, state: &QuoteState) -> Result<()> {
    store(session, session_keys::QUOTE_CART, &state.cart).await?;
    store(session, session_keys::QUOTE_SUBMISSION, &state.submission).await?;
    Ok(())
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add-to-quote body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    /// Thousands of units. Defaults to 1.
    pub quantity: Option<i64>,
}

/// Quantity update body. Zero or below removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// Current cart and form state.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<serde_json::Value>> {
    let quote = load_quote(&session).await?;
    respond(&quote)
}

/// Add a product to the cart and open the panel.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<serde_json::Value>> {
    let quantity = Quantity::new(body.quantity.unwrap_or(1))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let product = state
        .catalog()
        .read()
        .await
        .get(&body.product_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    let mut quote = load_quote(&session).await?;
    add_breadcrumb(
        "quote",
        "Added to quote",
        Some(&[("product_id", product.id.as_str())]),
    );
    quote.cart.add_item(product, quantity);
    save_quote(&session, &quote).await?;
    respond(&quote)
}

/// Set a line's quantity.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(id): Path<String>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<serde_json::Value>> {
    let mut quote = load_quote(&session).await?;
    quote.cart.update_quantity(&ProductId::new(id), body.quantity);
    save_quote(&session, &quote).await?;
    respond(&quote)
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(id): Path<String>) -> Result<Json<serde_json::Value>> {
    let mut quote = load_quote(&session).await?;
    quote.cart.remove_item(&ProductId::new(id));
    save_quote(&session, &quote).await?;
    respond(&quote)
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<serde_json::Value>> {
    mutate(&session, QuoteCart::clear).await
}

/// Show the cart panel.
#[instrument(skip(session))]
pub async fn open(session: Session) -> Result<Json<serde_json::Value>> {
    mutate(&session, QuoteCart::open).await
}

/// Hide the cart panel.
#[instrument(skip(session))]
pub async fn close(session: Session) -> Result<Json<serde_json::Value>> {
    mutate(&session, QuoteCart::close).await
}

async fn mutate(
    session: &Session,
    apply: fn(&mut QuoteCart),
) -> Result<Json<serde_json::Value>> {
    let mut quote = load_quote(session).await?;
    apply(&mut quote.cart);
    save_quote(session, &quote).await?;
    respond(&quote)
}

// =============================================================================
// Quote Request
// =============================================================================

/// Show the quote request form.
#[instrument(skip(session))]
pub async fn open_request(session: Session) -> Result<Json<serde_json::Value>> {
    let mut quote = load_quote(&session).await?;
    quote.submission.open();
    save_quote(&session, &quote).await?;
    respond(&quote)
}

/// Hide the form. A sent quote is completed on the spot.
#[instrument(skip(session))]
pub async fn close_request(session: Session) -> Result<Json<serde_json::Value>> {
    let mut quote = load_quote(&session).await?;
    quote.submission.close(&mut quote.cart);
    save_quote(&session, &quote).await?;
    respond(&quote)
}

/// Validate, deliver and accept a quote request.
///
/// Responds `202 Accepted`: the cart stays as it is until the submission
/// delay has passed.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<QuoteForm>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let mut quote = load_quote(&session).await?;

    let mut submission = quote.submission.clone();
    let request = submission.submit(form, &quote.cart, Utc::now(), state.submission_delay())?;
    state.delivery().deliver(&request).await?;

    add_breadcrumb("quote", "Quote request sent", None);
    quote.submission = submission;
    save_quote(&session, &quote).await?;
    Ok((StatusCode::ACCEPTED, respond(&quote)?))
}

fn respond(quote: &QuoteState) -> Result<Json<serde_json::Value>> {
    serde_json::to_value(CartView::new(&quote.cart, quote.submission.state()))
        .map(Json)
        .map_err(|e| AppError::Internal(e.to_string()))
}
