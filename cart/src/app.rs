//! Root state, action and reducer of the storefront.
//!
//! Each slice reducer is scoped onto its field of [`AppState`] and its variant
//! of [`AppAction`], then the scoped reducers are combined.

use crate::api::StoreApi;
use crate::cart::CartReducer;
use crate::products::ProductsReducer;
use crate::types::{CartAction, CartState, ProductsAction, ProductsState};
use std::sync::Arc;
use storefront_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use storefront_runtime::Store;

/// Dependencies injected into the reducers
#[derive(Clone)]
pub struct StorefrontEnvironment {
    /// Remote store
    pub api: Arc<dyn StoreApi>,
}

impl StorefrontEnvironment {
    /// Creates a new `StorefrontEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for StorefrontEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontEnvironment").finish_non_exhaustive()
    }
}

/// Whole storefront state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Product catalog slice
    pub products: ProductsState,
    /// Cart slice
    pub cart: CartState,
}

/// Every action the storefront store accepts
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    /// Product catalog action
    Products(ProductsAction),
    /// Cart action
    Cart(CartAction),
}

impl From<ProductsAction> for AppAction {
    fn from(action: ProductsAction) -> Self {
        Self::Products(action)
    }
}

impl From<CartAction> for AppAction {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

/// Root reducer type
pub type AppReducer = CombinedReducer<AppState, AppAction, StorefrontEnvironment>;

/// Store running the storefront
pub type AppStore = Store<AppState, AppAction, StorefrontEnvironment, AppReducer>;

/// Build the root reducer from the slice reducers
#[must_use]
pub fn app_reducer() -> AppReducer {
    combine_reducers(vec![
        Box::new(scope_reducer(
            ProductsReducer::new(),
            |state: &mut AppState| &mut state.products,
            |action| match action {
                AppAction::Products(action) => Some(action),
                AppAction::Cart(_) => None,
            },
            AppAction::Products,
        )),
        Box::new(scope_reducer(
            CartReducer::new(),
            |state: &mut AppState| &mut state.cart,
            |action| match action {
                AppAction::Cart(action) => Some(action),
                AppAction::Products(_) => None,
            },
            AppAction::Cart,
        )),
    ])
}
