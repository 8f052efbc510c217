//! The visitor's quote cart.
//!
//! Lines are keyed by product id: adding a product that is already in the
//! cart grows its line instead of adding a second one. The cart is not
//! persisted anywhere; it lives as long as the visitor's session.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Product, ProductId, Quantity};

/// One cart line: a product and how many thousands of units are wanted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub product: Product,
    pub quantity: Quantity,
}

/// Quote cart plus the open/closed state of its side panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteCart {
    items: Vec<QuoteItem>,
    is_open: bool,
}

impl QuoteCart {
    /// An empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[QuoteItem] {
        &self.items
    }

    /// Add `quantity` of `product`, merging with an existing line. Opens the
    /// panel.
    pub fn add_item(&mut self, product: Product, quantity: Quantity) {
        self.is_open = true;
        if let Some(line) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            debug!(product_id = %product.id, quantity = %line.quantity, "cart line increased");
        } else {
            debug!(product_id = %product.id, %quantity, "cart line added");
            self.items.push(QuoteItem { product, quantity });
        }
    }

    /// Drop the line for `product_id`. Unknown ids are ignored.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product.id != product_id);
    }

    /// Set a line's quantity. Zero or below removes the line; values past
    /// the largest quantity saturate.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|i| &i.product.id == product_id) {
            line.quantity = Quantity::clamped(quantity);
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all line quantities, in thousands.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items
            .iter()
            .map(|i| u64::from(i.quantity.get()))
            .sum()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the cart panel is showing.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    pub fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::builtin_products;

    fn product(index: usize) -> Product {
        builtin_products().into_iter().nth(index).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let mut cart = QuoteCart::new();
        for n in [1, 4, 2, 10] {
            cart.add_item(product(0), qty(n));
        }

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity.get(), 17);
    }

    #[test]
    fn test_lines_keep_first_insertion_order() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(2), qty(1));
        cart.add_item(product(0), qty(1));
        cart.add_item(product(2), qty(1));

        let ids: Vec<_> = cart.items().iter().map(|i| i.product.id.as_str()).collect();
        assert_eq!(ids, ["pf-003", "pf-001"]);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes_line() {
        for quantity in [0, -5] {
            let mut updated = QuoteCart::new();
            updated.add_item(product(0), qty(3));
            updated.add_item(product(1), qty(2));

            let mut removed = updated.clone();
            updated.update_quantity(&ProductId::new("pf-001"), quantity);
            removed.remove_item(&ProductId::new("pf-001"));

            assert_eq!(updated, removed);
            assert_eq!(updated.line_count(), 1);
        }
    }

    #[test]
    fn test_update_quantity_sets_absolute_value() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(0), qty(3));
        cart.update_quantity(&ProductId::new("pf-001"), 8);
        assert_eq!(cart.total_items(), 8);
    }

    #[test]
    fn test_update_quantity_past_max_saturates() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(0), qty(3));
        cart.update_quantity(&ProductId::new("pf-001"), i64::from(u32::MAX) + 1);

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.items()[0].quantity.get(), u32::MAX);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(0), qty(3));
        cart.update_quantity(&ProductId::new("pf-999"), 8);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_total_items_tracks_removals() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(0), qty(3));
        cart.add_item(product(1), qty(2));
        assert_eq!(cart.total_items(), 5);

        cart.remove_item(&ProductId::new("pf-001"));
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(0), qty(1));
        cart.remove_item(&ProductId::new("pf-404"));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = QuoteCart::new();
        cart.clear();
        assert!(cart.is_empty());

        cart.add_item(product(0), qty(1));
        cart.clear();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_panel_flag() {
        let mut cart = QuoteCart::new();
        assert!(!cart.is_open());
        cart.open();
        assert!(cart.is_open());
        cart.set_open(false);
        assert!(!cart.is_open());
    }

    #[test]
    fn test_add_item_opens_panel() {
        let mut cart = QuoteCart::new();
        cart.add_item(product(4), qty(1));
        assert!(cart.is_open());

        cart.close();
        cart.update_quantity(&ProductId::new("pf-005"), 2);
        assert!(!cart.is_open());
    }
}
