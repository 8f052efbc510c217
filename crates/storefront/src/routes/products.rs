//! Catalog route handlers.
//!
//! Listing is filtered per request: the criteria come from the query string
//! and nothing is cached between requests.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use preforma_core::{
    FilterCriteria, NeckType, Product, ProductId, Sector, SectorFilter, WeightRange,
    filter_products,
};

use crate::error::{AppError, Result};
use crate::models::views::{FilterOptions, ProductListView};
use crate::state::AppState;

/// Value meaning "every sector" in `?sector=`.
const ALL_SECTORS: &str = "todos";

/// Catalog query string.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub sector: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub neck: Option<String>,
}

impl ProductQuery {
    /// Turn the query into filter criteria.
    ///
    /// A lone `min` or `max` leaves the other bound open.
    fn criteria(&self) -> Result<FilterCriteria> {
        let sector = match self.sector.as_deref().map(str::trim) {
            None | Some("" | ALL_SECTORS) => SectorFilter::All,
            Some(slug) => SectorFilter::Only(
                slug.parse::<Sector>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            ),
        };

        if [self.min, self.max].into_iter().flatten().any(|b| !b.is_finite()) {
            return Err(AppError::BadRequest(
                "weight bounds must be finite numbers".to_string(),
            ));
        }

        let weight = match (self.min, self.max) {
            (None, None) => None,
            (min, max) => {
                let range = WeightRange::new(min.unwrap_or(0.0), max.unwrap_or(f64::INFINITY));
                if range.min > range.max {
                    return Err(AppError::BadRequest(format!(
                        "weight range is empty ({} > {})",
                        range.min, range.max
                    )));
                }
                Some(range)
            }
        };

        let neck = match self.neck.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(
                code.parse::<NeckType>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            ),
        };

        Ok(FilterCriteria {
            sector,
            weight,
            neck,
        })
    }
}

/// List products matching the query.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<serde_json::Value>> {
    let criteria = query.criteria()?;
    let catalog = state.catalog().read().await;
    let products = filter_products(catalog.list(), &criteria);

    tracing::debug!(matched = products.len(), total = catalog.len(), "catalog filtered");
    let view = ProductListView {
        total: products.len(),
        filters_active: criteria.is_active(),
        products,
    };
    Ok(Json(serde_json::to_value(view).map_err(|e| AppError::Internal(e.to_string()))?))
}

/// Options for the filter panel.
pub async fn filters() -> Json<FilterOptions> {
    Json(FilterOptions::catalog())
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    let catalog = state.catalog().read().await;
    catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
