//! Session models and JSON views for the storefront.

pub mod session;
pub mod views;

pub use session::keys as session_keys;
