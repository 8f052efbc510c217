//! Catalog filtering by sector, weight range and neck type.
//!
//! [`filter_products`] is a plain function of its inputs: the three
//! predicates are ANDed, results keep the input order, and nothing is cached
//! between calls.

use serde::{Deserialize, Serialize};

use crate::types::{NeckType, Product, Sector};

/// Inclusive weight range in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    /// The preset ranges offered by the catalog filter panel.
    pub const PRESETS: [Self; 3] = [
        Self::new(15.0, 25.0),
        Self::new(26.0, 35.0),
        Self::new(36.0, 50.0),
    ];

    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `grams` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, grams: f64) -> bool {
        grams >= self.min && grams <= self.max
    }

    /// Label such as `26g - 35g`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}g - {}g", self.min, self.max)
    }
}

/// Sector selection: every sector, or exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorFilter {
    #[default]
    All,
    Only(Sector),
}

impl SectorFilter {
    #[must_use]
    pub fn matches(self, sector: Sector) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == sector,
        }
    }
}

/// The catalog's active filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub sector: SectorFilter,
    pub weight: Option<WeightRange>,
    pub neck: Option<NeckType>,
}

impl FilterCriteria {
    /// Whether any filter narrows the list.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.sector, SectorFilter::All) || self.weight.is_some() || self.neck.is_some()
    }

    /// Reset to "show everything".
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether one product passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.sector.matches(product.sector)
            && self
                .weight
                .is_none_or(|range| range.contains(product.weight.get()))
            && self.neck.is_none_or(|neck| neck == product.neck)
    }
}

/// The products passing `criteria`, in input order.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], criteria: &FilterCriteria) -> Vec<&'a Product> {
    products.iter().filter(|p| criteria.matches(p)).collect()
}
