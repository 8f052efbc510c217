//! Session-stored visitor state.
//!
//! Each value lives under its own key so a handler only loads what it
//! touches. Missing or unreadable values fall back to their defaults.

use serde::{Serialize, de::DeserializeOwned};
use tower_sessions::Session;

/// Session keys for visitor state.
pub mod keys {
    pub use preforma_core::storage::keys::ADMIN_SESSION;

    /// The visitor's quote cart.
    pub const QUOTE_CART: &str = "quote_cart";

    /// Quote request form state.
    pub const QUOTE_SUBMISSION: &str = "quote_submission";

    /// Admin editor mode and draft.
    pub const PRODUCT_EDITOR: &str = "product_editor";

    /// Deletion awaiting confirmation.
    pub const PENDING_DELETION: &str = "pending_deletion";
}

/// Read a value, falling back to its default when absent or unreadable.
pub async fn load_or_default<T>(session: &Session, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match session.get::<T>(key).await {
        Ok(value) => value.unwrap_or_default(),
        Err(error) => {
            tracing::warn!(%error, key, "session value unreadable, using default");
            T::default()
        }
    }
}

/// Store a value under `key`.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store<T>(
    session: &Session,
    key: &str,
    value: &T,
) -> Result<(), tower_sessions::session::Error>
where
    T: Serialize + Send + Sync,
{
    session.insert(key, value).await
}
