//! Quote quantities, counted in thousands of units ("millares").

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error for a quantity below one thousand units.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be at least 1 (got {0})")]
pub struct InvalidQuantity(pub i64);

/// A positive quantity in thousands of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// One thousand units, the stepper's starting value.
    pub const ONE: Self = Self(1);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidQuantity`] for zero or negative values.
    pub fn new(millares: i64) -> Result<Self, InvalidQuantity> {
        if millares < 1 {
            return Err(InvalidQuantity(millares));
        }
        u32::try_from(millares)
            .map(Self)
            .map_err(|_| InvalidQuantity(millares))
    }

    /// Clamp raw stepper input to a valid quantity (minimum 1).
    #[must_use]
    pub fn clamped(millares: i64) -> Self {
        Self(u32::try_from(millares.max(1)).unwrap_or(u32::MAX))
    }

    /// The quantity in thousands.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities, saturating at the representable maximum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = InvalidQuantity;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mil", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(InvalidQuantity(0)));
        assert_eq!(Quantity::new(-5), Err(InvalidQuantity(-5)));
        assert_eq!(Quantity::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_clamped_has_floor_of_one() {
        assert_eq!(Quantity::clamped(0), Quantity::ONE);
        assert_eq!(Quantity::clamped(-10), Quantity::ONE);
        assert_eq!(Quantity::clamped(7).get(), 7);
        assert_eq!(Quantity::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("4").unwrap().get(), 4);
    }
}
