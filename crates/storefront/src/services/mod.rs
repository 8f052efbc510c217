//! Business services for the storefront.
//!
//! - `auth` - admin password gate and session flag
//! - `quote_delivery` - hand-off of accepted quote requests (log or SMTP)

pub mod auth;
pub mod quote_delivery;
