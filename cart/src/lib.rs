//! # Storefront Cart
//!
//! Client-side state of a small shopping cart application: the product
//! catalog, the cart's line items, the asynchronous checkout workflow and
//! memoized totals.
//!
//! - [`products`]: catalog slice, bulk loads merged last-write-wins
//! - [`cart`]: line item edits and the checkout state machine
//! - [`selectors`]: `total_items` and `total_price`, recomputed only when
//!   their inputs are replaced
//! - [`api`]: the remote store the effects call, and an in-process mock
//! - [`storefront`]: facade owning the store and the selectors
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use storefront_cart::api::MockStoreApi;
//! use storefront_cart::products::{BUNDLED_CATALOG, parse_catalog};
//! use storefront_cart::storefront::Storefront;
//! use storefront_cart::types::CheckoutStatus;
//!
//! # tokio_test::block_on(async {
//! let catalog = parse_catalog(BUNDLED_CATALOG)?;
//! let storefront = Storefront::new(Arc::new(MockStoreApi::new(catalog.clone())));
//! storefront.load_products(catalog).await?;
//!
//! storefront.add_to_cart("207").await?;
//! storefront.add_to_cart("207").await?;
//! assert_eq!(storefront.total_items().await, 2);
//! assert_eq!(storefront.total_price().await, "2.18");
//!
//! let status = storefront.checkout_and_wait().await?;
//! assert_eq!(status, CheckoutStatus::Ready);
//! assert_eq!(storefront.total_items().await, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

pub mod api;
pub mod app;
pub mod cart;
pub mod config;
pub mod money;
pub mod products;
pub mod selectors;
pub mod storefront;
pub mod types;

pub use api::{ApiError, MockStoreApi, StoreApi};
pub use app::{AppAction, AppState, AppStore, StorefrontEnvironment, app_reducer};
pub use config::{ConfigError, StorefrontConfig};
pub use money::Money;
pub use storefront::Storefront;
pub use types::{
    CartAction, CartState, CheckoutPhase, CheckoutReceipt, CheckoutStatus, LineItems, Product,
    ProductId, ProductsAction, ProductsState,
};
