//! Memoized cart totals.
//!
//! Both selectors key their cache on the `Arc`s they read: `total_items` on
//! the line items, `total_price` on the catalog and the line items. Replacing
//! the catalog recomputes the price even if no line item refers to the
//! products that changed.

use crate::app::AppState;
use crate::money::Money;
use crate::types::{Catalog, LineItems};
use std::sync::Arc;
use storefront_core::selector::Selector;

/// Selector of the total quantity in the cart
pub type TotalItems = Selector<AppState, Arc<LineItems>, i64>;

/// Selector of the cart's total price, formatted with two decimals
pub type TotalPrice = Selector<AppState, (Arc<Catalog>, Arc<LineItems>), String>;

/// Sum of all quantities
#[must_use]
pub fn sum_quantities(items: &LineItems) -> i64 {
    items.values().fold(0, |total, quantity| total.saturating_add(*quantity))
}

/// Sum of price times quantity over the line items, unrounded
///
/// A line item whose product is not in the catalog contributes nothing.
/// Lines are summed in id order so the result does not depend on hash order.
#[must_use]
pub fn price_lines(catalog: &Catalog, items: &LineItems) -> Money {
    let mut lines: Vec<_> = items.iter().collect();
    lines.sort_unstable_by_key(|(id, _)| *id);

    lines
        .into_iter()
        .map(|(id, quantity)| match catalog.get(id) {
            Some(product) => product.price * *quantity,
            None => {
                tracing::warn!(%id, quantity, "Line item has no product in the catalog, priced at zero");
                Money::ZERO
            },
        })
        .sum()
}

/// Builds the total items selector
#[must_use]
pub fn total_items() -> TotalItems {
    Selector::new(
        "total_items",
        |state: &AppState| Arc::clone(&state.cart.items),
        |items: &Arc<LineItems>| sum_quantities(items),
    )
}

/// Builds the total price selector
#[must_use]
pub fn total_price() -> TotalPrice {
    Selector::new(
        "total_price",
        |state: &AppState| (Arc::clone(&state.products.products), Arc::clone(&state.cart.items)),
        |(catalog, items): &(Arc<Catalog>, Arc<LineItems>)| price_lines(catalog, items).to_string(),
    )
}

/// The storefront's selector instances
///
/// Each instance owns its cache, so two `CartSelectors` never share results.
#[derive(Debug)]
pub struct CartSelectors {
    /// Total quantity
    pub total_items: TotalItems,
    /// Total price
    pub total_price: TotalPrice,
}

impl CartSelectors {
    /// Creates fresh selectors with empty caches
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_items: total_items(),
            total_price: total_price(),
        }
    }
}

impl Default for CartSelectors {
    fn default() -> Self {
        Self::new()
    }
}
