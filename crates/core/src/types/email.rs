//! Contact email address for quote requests.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Reasons a contact email is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Nothing was entered.
    #[error("email is required")]
    Empty,
    /// Longer than the SMTP path limit.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Not shaped like `local@domain.tld`.
    #[error("email must look like name@company.com")]
    Malformed,
}

/// A trimmed, lower-cased contact email.
///
/// Accepts the same shape a browser `type="email"` input does in practice:
/// one `@`, a non-empty local part, and a domain with at least one dot that
/// neither starts nor ends with it.
///
/// ```
/// use preforma_core::ContactEmail;
///
/// assert!(ContactEmail::parse("Compras@Envases.pe").is_ok());
/// assert!(ContactEmail::parse("compras@envases").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ContactEmail(String);

impl ContactEmail {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize a contact email.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the input is blank, too long, or malformed.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if normalized.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = normalized.split_once('@').ok_or(EmailError::Malformed)?;
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok || normalized.contains(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }

        Ok(Self(normalized))
    }

    /// The normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContactEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContactEmail {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContactEmail> for String {
    fn from(email: ContactEmail) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = ContactEmail::parse("  Ventas@Bebidas-Andinas.PE ").unwrap();
        assert_eq!(email.as_str(), "ventas@bebidas-andinas.pe");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(ContactEmail::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_missing_domain_dot() {
        assert_eq!(ContactEmail::parse("a@localhost"), Err(EmailError::Malformed));
        assert_eq!(ContactEmail::parse("a@.pe"), Err(EmailError::Malformed));
        assert_eq!(ContactEmail::parse("a@b."), Err(EmailError::Malformed));
    }

    #[test]
    fn test_parse_rejects_double_at_and_empty_local() {
        assert_eq!(ContactEmail::parse("a@b@c.pe"), Err(EmailError::Malformed));
        assert_eq!(ContactEmail::parse("@c.pe"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            ContactEmail::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let bad: Result<ContactEmail, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
        let good: ContactEmail = serde_json::from_str("\"a@b.pe\"").unwrap();
        assert_eq!(good.as_str(), "a@b.pe");
    }
}
