//! Product identifiers.
//!
//! Catalog ids are opaque strings. Built-in records use the `pf-NNN` scheme,
//! records created through the admin editor use `custom-<unix millis>`.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix carried by every admin-created product id.
pub const CUSTOM_ID_PREFIX: &str = "custom-";

/// Type-safe product identifier.
///
/// # Example
///
/// ```rust
/// # use preforma_core::ProductId;
/// let id = ProductId::new("pf-001");
/// assert_eq!(id.as_str(), "pf-001");
/// assert!(!id.is_custom());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh custom id from a timestamp.
    ///
    /// The id is `custom-<unix millis>`. If `taken` reports a collision the
    /// millisecond component is bumped until the id is free, so two records
    /// created within the same millisecond still get distinct ids.
    #[must_use]
    pub fn generate_custom(now: DateTime<Utc>, taken: impl Fn(&Self) -> bool) -> Self {
        let mut millis = now.timestamp_millis();
        loop {
            let candidate = Self(format!("{CUSTOM_ID_PREFIX}{millis}"));
            if !taken(&candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    /// Get the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id was minted by the admin editor.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.0.starts_with(CUSTOM_ID_PREFIX)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn test_generate_custom_uses_prefix_and_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = ProductId::generate_custom(now, |_| false);
        assert_eq!(id.as_str(), "custom-1700000000123");
        assert!(id.is_custom());
    }

    #[test]
    fn test_generate_custom_skips_taken_ids() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let taken = [ProductId::new("custom-1000"), ProductId::new("custom-1001")];
        let id = ProductId::generate_custom(now, |candidate| taken.contains(candidate));
        assert_eq!(id.as_str(), "custom-1002");
    }

    #[test]
    fn test_builtin_id_is_not_custom() {
        assert!(!ProductId::new("pf-003").is_custom());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::new("pf-001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"pf-001\"");
    }
}
