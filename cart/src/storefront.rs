//! The storefront facade.
//!
//! [`Storefront`] owns the store and the selector caches and is handed to
//! whatever drives the UI. It is cheap to clone; clones share everything.

use crate::api::StoreApi;
use crate::app::{AppAction, AppState, AppStore, StorefrontEnvironment, app_reducer};
use crate::config::StorefrontConfig;
use crate::selectors::CartSelectors;
use crate::types::{
    CartAction, CartState, CheckoutPhase, CheckoutStatus, Product, ProductId, ProductsAction,
    ProductsState,
};
use std::sync::Arc;
use std::time::Duration;
use storefront_runtime::{EffectHandle, Store, StoreConfig, StoreError};
use tokio::sync::broadcast;

/// Default wait of [`Storefront::checkout_and_wait`]
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shopping cart front end over an [`AppStore`]
#[derive(Clone)]
pub struct Storefront {
    store: AppStore,
    selectors: Arc<CartSelectors>,
    checkout_timeout: Duration,
}

impl Storefront {
    /// Creates a storefront with an empty catalog and cart
    #[must_use]
    pub fn new(api: Arc<dyn StoreApi>) -> Self {
        Self::build(api, StoreConfig::default(), DEFAULT_CHECKOUT_TIMEOUT)
    }

    /// Creates a storefront using `config` for the runtime settings
    #[must_use]
    pub fn with_config(api: Arc<dyn StoreApi>, config: &StorefrontConfig) -> Self {
        Self::build(api, config.store_config(), config.checkout_timeout())
    }

    fn build(api: Arc<dyn StoreApi>, store_config: StoreConfig, checkout_timeout: Duration) -> Self {
        let store = Store::with_config(
            AppState::default(),
            app_reducer(),
            StorefrontEnvironment::new(api),
            store_config,
        );

        Self {
            store,
            selectors: Arc::new(CartSelectors::new()),
            checkout_timeout,
        }
    }

    async fn send(&self, action: impl Into<AppAction>) -> Result<EffectHandle, StoreError> {
        self.store.send(action.into()).await
    }

    /// Merge `products` into the catalog
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn load_products(&self, products: Vec<Product>) -> Result<(), StoreError> {
        self.send(ProductsAction::LoadProducts { products }).await?;
        Ok(())
    }

    /// Fetch the catalog from the remote store
    ///
    /// The returned handle completes once the result has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn fetch_products(&self) -> Result<EffectHandle, StoreError> {
        self.send(ProductsAction::FetchProducts).await
    }

    /// Add one unit of `id`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn add_to_cart(&self, id: impl Into<ProductId>) -> Result<(), StoreError> {
        self.send(CartAction::AddToCart { id: id.into() }).await?;
        Ok(())
    }

    /// Remove the line item of `id`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn remove_from_cart(&self, id: impl Into<ProductId>) -> Result<(), StoreError> {
        self.send(CartAction::RemoveFromCart { id: id.into() }).await?;
        Ok(())
    }

    /// Set the quantity of `id`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn update_quantity(
        &self,
        id: impl Into<ProductId>,
        quantity: i64,
    ) -> Result<(), StoreError> {
        self.send(CartAction::UpdateQuantity {
            id: id.into(),
            quantity,
        })
        .await?;
        Ok(())
    }

    /// Start a checkout
    ///
    /// The status is `LOADING` when this returns. The handle completes once
    /// the outcome has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Storefront::shutdown`].
    pub async fn checkout(&self) -> Result<EffectHandle, StoreError> {
        self.send(CartAction::Checkout).await
    }

    /// Check out and wait for the outcome
    ///
    /// If a checkout is already in flight, waits for that one instead.
    ///
    /// The outcome is observed on the action broadcast. A caller that falls
    /// more than the broadcast capacity behind can miss it; once the timeout
    /// elapses the settled status is returned anyway.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] when the checkout is still `LOADING`
    /// after the configured checkout timeout. The status then stays
    /// `LOADING` until the remote store answers.
    pub async fn checkout_and_wait(&self) -> Result<CheckoutStatus, StoreError> {
        let outcome = self
            .store
            .send_and_wait_for(
                CartAction::Checkout.into(),
                |action| {
                    matches!(
                        action,
                        AppAction::Cart(CartAction::CheckoutProgress(
                            CheckoutPhase::Fulfilled(_) | CheckoutPhase::Rejected(_)
                        ))
                    )
                },
                self.checkout_timeout,
            )
            .await
            .map(|_| ());

        settle(outcome, self.checkout_status().await)
    }

    /// Total quantity in the cart
    pub async fn total_items(&self) -> i64 {
        self.store
            .state(|state| self.selectors.total_items.select(state))
            .await
    }

    /// Total price of the cart with two decimals, e.g. `"23.25"`
    pub async fn total_price(&self) -> String {
        self.store
            .state(|state| self.selectors.total_price.select(state))
            .await
    }

    /// Snapshot of the cart
    pub async fn cart(&self) -> CartState {
        self.store.state(|state| state.cart.clone()).await
    }

    /// Snapshot of the catalog
    pub async fn products(&self) -> ProductsState {
        self.store.state(|state| state.products.clone()).await
    }

    /// Status of the most recent checkout
    pub async fn checkout_status(&self) -> CheckoutStatus {
        self.store.state(|state| state.cart.checkout_status).await
    }

    /// Observe every action applied to the store
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppAction> {
        self.store.subscribe_actions()
    }

    /// Selector instances, e.g. to read recomputation counts
    #[must_use]
    pub fn selectors(&self) -> &CartSelectors {
        &self.selectors
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Stop accepting actions and wait for in-flight remote calls
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if calls are still running
    /// after the store's shutdown timeout.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.store
            .shutdown(self.store.config().default_shutdown_timeout)
            .await
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("selectors", &self.selectors)
            .field("checkout_timeout", &self.checkout_timeout)
            .finish_non_exhaustive()
    }
}

/// Status a finished wait reports. A timed-out wait on a checkout that has
/// already settled reports the settled status.
fn settle(
    outcome: Result<(), StoreError>,
    status: CheckoutStatus,
) -> Result<CheckoutStatus, StoreError> {
    match outcome {
        Ok(()) => Ok(status),
        Err(StoreError::Timeout) if status != CheckoutStatus::Loading => {
            tracing::warn!(?status, "Checkout outcome missed, using settled status");
            Ok(status)
        },
        Err(error) => Err(error),
    }
}
