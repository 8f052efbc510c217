//! Catalog product record and its classification enums.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::image::ProductImage;

/// Error returned when a classification value cannot be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Market sector a preform is sold into.
///
/// Serialized with the Spanish slugs used by the persisted catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "bebidas")]
    Beverage,
    #[serde(rename = "alimentacion")]
    Food,
    #[serde(rename = "limpieza")]
    Cleaning,
    #[serde(rename = "higiene")]
    Hygiene,
}

impl Sector {
    /// All sectors in catalog tab order.
    pub const ALL: [Self; 4] = [Self::Beverage, Self::Food, Self::Cleaning, Self::Hygiene];

    /// Serialized slug (`bebidas`, `alimentacion`, ...).
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Beverage => "bebidas",
            Self::Food => "alimentacion",
            Self::Cleaning => "limpieza",
            Self::Hygiene => "higiene",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beverage => "Bebidas",
            Self::Food => "Alimentación",
            Self::Cleaning => "Limpieza",
            Self::Hygiene => "Higiene",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Sector {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sector| sector.slug() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "sector",
                value: s.to_owned(),
            })
    }
}

/// Neck finish of a preform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeckType {
    #[serde(rename = "PCO")]
    Pco,
    #[serde(rename = "30/25")]
    ThirtyTwentyFive,
    #[serde(rename = "28mm")]
    Mm28,
    #[serde(rename = "38mm")]
    Mm38,
}

impl NeckType {
    /// All neck finishes in filter order.
    pub const ALL: [Self; 4] = [Self::Pco, Self::ThirtyTwentyFive, Self::Mm28, Self::Mm38];

    /// Serialized code (`PCO`, `30/25`, `28mm`, `38mm`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pco => "PCO",
            Self::ThirtyTwentyFive => "30/25",
            Self::Mm28 => "28mm",
            Self::Mm38 => "38mm",
        }
    }
}

impl fmt::Display for NeckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for NeckType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|neck| neck.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEnumError {
                kind: "neck type",
                value: s.to_owned(),
            })
    }
}

/// Error for a weight that is zero, negative, or not a number.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("weight must be a positive number of grams (got {0})")]
pub struct InvalidWeight(pub f64);

/// Preform weight ("gramaje") in grams. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Grams(f64);

impl Grams {
    /// Create a weight.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidWeight`] unless `grams` is finite and greater than zero.
    pub fn new(grams: f64) -> Result<Self, InvalidWeight> {
        if grams.is_finite() && grams > 0.0 {
            Ok(Self(grams))
        } else {
            Err(InvalidWeight(grams))
        }
    }

    /// Weight from a literal known to be positive (fixtures).
    pub(crate) const fn from_literal(grams: f64) -> Self {
        Self(grams)
    }

    /// The weight in grams.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Grams {
    type Error = InvalidWeight;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grams> for f64 {
    fn from(grams: Grams) -> Self {
        grams.0
    }
}

impl fmt::Display for Grams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}g", self.0)
    }
}

/// A catalog entry.
///
/// Field names on the wire match the persisted `custom_products` collection
/// (`gramaje`, `tipoCuello`), so records written by earlier versions load
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sector: Sector,
    #[serde(rename = "gramaje")]
    pub weight: Grams,
    #[serde(rename = "tipoCuello")]
    pub neck: NeckType,
    pub image: ProductImage,
    pub description: String,
}
