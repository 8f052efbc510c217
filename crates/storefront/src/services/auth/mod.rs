//! Admin panel access.
//!
//! The panel is guarded by a single shared password. A successful login sets
//! the `admin_session` flag in the visitor's session; logout and "exit to
//! site" both clear it. Every editor route requires the flag.

mod error;

pub use error::AuthError;

use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;

use preforma_core::storage::keys;

/// Password check for the admin panel.
#[derive(Clone)]
pub struct AdminGate {
    password: SecretString,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl AdminGate {
    #[must_use]
    pub const fn new(password: SecretString) -> Self {
        Self { password }
    }

    /// Compare a submitted password against the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::IncorrectPassword`] on mismatch.
    pub fn verify(&self, attempt: &str) -> Result<(), AuthError> {
        if constant_time_eq(attempt.as_bytes(), self.password.expose_secret().as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::IncorrectPassword)
        }
    }

    /// Verify the password and mark the session as admin.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::IncorrectPassword`] on mismatch, leaving the
    /// session untouched, or [`AuthError::Session`] if the flag cannot be
    /// stored.
    pub async fn login(&self, session: &Session, attempt: &str) -> Result<(), AuthError> {
        if let Err(err) = self.verify(attempt) {
            tracing::warn!("admin login rejected");
            return Err(err);
        }
        // New session id on privilege change
        session.cycle_id().await?;
        session.insert(keys::ADMIN_SESSION, true).await?;
        tracing::info!("admin session started");
        Ok(())
    }
}

/// Whether the session carries the admin flag.
pub async fn is_admin(session: &Session) -> bool {
    session
        .get::<bool>(keys::ADMIN_SESSION)
        .await
        .ok()
        .flatten()
        .unwrap_or(false)
}

/// Clear the admin flag.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout(session: &Session) -> Result<(), AuthError> {
    session.remove::<bool>(keys::ADMIN_SESSION).await?;
    tracing::info!("admin session ended");
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
