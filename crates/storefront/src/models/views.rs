//! JSON response shapes.

use serde::Serialize;

use preforma_core::{
    EditorMode, NeckType, PendingDeletion, Product, ProductDraft, ProductEditor, QuoteCart,
    QuoteItem, Sector, SubmissionState, WeightRange,
};

/// A catalog record with its origin, for the admin list.
#[derive(Debug, Serialize)]
pub struct AdminProductView<'a> {
    #[serde(flatten)]
    pub product: &'a Product,
    /// Created through the admin editor rather than built in.
    pub custom: bool,
}

/// Filtered catalog listing.
#[derive(Debug, Serialize)]
pub struct ProductListView<'a> {
    pub products: Vec<&'a Product>,
    pub total: usize,
    pub filters_active: bool,
}

/// The cart panel plus the quote form state.
#[derive(Debug, Serialize)]
pub struct CartView<'a> {
    pub items: &'a [QuoteItem],
    pub total_items: u64,
    pub line_count: usize,
    pub is_open: bool,
    pub submission: SubmissionState,
}

impl<'a> CartView<'a> {
    #[must_use]
    pub fn new(cart: &'a QuoteCart, submission: SubmissionState) -> Self {
        Self {
            items: cart.items(),
            total_items: cart.total_items(),
            line_count: cart.line_count(),
            is_open: cart.is_open(),
            submission,
        }
    }
}

/// Admin editor state.
#[derive(Debug, Serialize)]
pub struct EditorView<'a> {
    #[serde(flatten)]
    pub mode: &'a EditorMode,
    pub draft: &'a ProductDraft,
    pub pending_deletion: Option<&'a PendingDeletion>,
}

impl<'a> EditorView<'a> {
    #[must_use]
    pub const fn new(editor: &'a ProductEditor, pending: Option<&'a PendingDeletion>) -> Self {
        Self {
            mode: editor.mode(),
            draft: editor.draft(),
            pending_deletion: pending,
        }
    }
}

/// One sector tab.
#[derive(Debug, Serialize)]
pub struct SectorOption {
    pub slug: &'static str,
    pub label: &'static str,
}

/// One weight preset.
#[derive(Debug, Serialize)]
pub struct WeightOption {
    pub min: f64,
    pub max: f64,
    pub label: String,
}

/// Everything the filter panel offers.
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub sectors: Vec<SectorOption>,
    pub weight_ranges: Vec<WeightOption>,
    pub necks: Vec<&'static str>,
}

impl FilterOptions {
    #[must_use]
    pub fn catalog() -> Self {
        Self {
            sectors: Sector::ALL
                .iter()
                .map(|s| SectorOption {
                    slug: s.slug(),
                    label: s.label(),
                })
                .collect(),
            weight_ranges: WeightRange::PRESETS
                .iter()
                .map(|r| WeightOption {
                    min: r.min,
                    max: r.max,
                    label: r.label(),
                })
                .collect(),
            necks: NeckType::ALL.iter().map(|n| n.code()).collect(),
        }
    }
}
