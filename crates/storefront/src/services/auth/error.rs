//! Authentication error types.

use thiserror::Error;

/// Errors that can occur while entering the admin panel.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The submitted password does not match.
    #[error("incorrect password")]
    IncorrectPassword,

    /// Session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}
