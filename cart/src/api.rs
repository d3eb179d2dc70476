//! Remote store collaborator.
//!
//! The reducers never talk to the network; they return effects that call a
//! [`StoreApi`] taken from the environment. [`MockStoreApi`] is the in-process
//! stand-in used by the demo binary and the tests.

use crate::types::{CheckoutReceipt, LineItems, Product, ProductId};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

/// Failures reported by the remote store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request was refused, e.g. an empty cart
    #[error("{0}")]
    Validation(String),

    /// The request did not reach the store or the reply was unreadable
    #[error("transport error: {0}")]
    Transport(String),

    /// The call failed without saying why
    #[error("request failed")]
    Unknown,
}

impl ApiError {
    /// Human-readable message carried by the failure, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Validation(message) | Self::Transport(message) if !message.is_empty() => {
                Some(message.as_str())
            },
            Self::Validation(_) | Self::Transport(_) | Self::Unknown => None,
        }
    }
}

/// Future returned by [`StoreApi`] calls
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Remote store operations the storefront depends on
///
/// Methods return boxed futures so the API can be held as `Arc<dyn StoreApi>`.
pub trait StoreApi: Send + Sync {
    /// Fetch the full catalog
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the catalog cannot be fetched.
    fn get_products(&self) -> ApiFuture<'_, Vec<Product>>;

    /// Submit an order for `items`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the order is refused or the call fails. A
    /// business decline is not an error: it is a receipt with `success: false`.
    fn checkout(&self, items: LineItems) -> ApiFuture<'_, CheckoutReceipt>;
}

/// Message returned by [`MockStoreApi`] for an empty cart
pub const EMPTY_CART_MESSAGE: &str = "Cart must not be empty";

/// In-process remote store
///
/// Checkout rules, checked in order:
/// 1. no line items: `Validation("Cart must not be empty")`
/// 2. a positive quantity of a failing item: `Unknown`
/// 3. a positive quantity of a declined item: `success: false`
/// 4. otherwise `success: true`
///
/// Clones share the record of checkout calls.
///
/// ```
/// use storefront_cart::api::{MockStoreApi, StoreApi};
/// use storefront_cart::types::LineItems;
///
/// # tokio_test::block_on(async {
/// let api = MockStoreApi::new(Vec::new()).decline_item("badItem");
///
/// let items = LineItems::from([("badItem".into(), 4)]);
/// let receipt = api.checkout(items).await.unwrap();
/// assert!(!receipt.success);
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockStoreApi {
    catalog: Arc<Vec<Product>>,
    latency: Duration,
    declined: HashSet<ProductId>,
    failing: HashSet<ProductId>,
    fetch_error: Option<ApiError>,
    gate: Option<Arc<Notify>>,
    checkouts: Arc<Mutex<Vec<LineItems>>>,
}

impl MockStoreApi {
    /// Creates a mock serving `catalog`
    #[must_use]
    pub fn new(catalog: Vec<Product>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            ..Self::default()
        }
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Decline orders containing `id`
    #[must_use]
    pub fn decline_item(mut self, id: impl Into<String>) -> Self {
        self.declined.insert(ProductId::new(id));
        self
    }

    /// Fail orders containing `id` with [`ApiError::Unknown`]
    #[must_use]
    pub fn fail_item(mut self, id: impl Into<String>) -> Self {
        self.failing.insert(ProductId::new(id));
        self
    }

    /// Fail catalog fetches with `error`
    #[must_use]
    pub fn fail_fetch(mut self, error: ApiError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    /// Hold every response until `gate` is notified once per call
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Line items of every checkout call received so far, oldest first
    #[must_use]
    pub fn checkout_calls(&self) -> Vec<LineItems> {
        self.checkouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn respond(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn contains_any(items: &LineItems, ids: &HashSet<ProductId>) -> bool {
        ids.iter()
            .any(|id| items.get(id).is_some_and(|quantity| *quantity > 0))
    }

    fn judge(&self, items: &LineItems) -> Result<CheckoutReceipt, ApiError> {
        if items.is_empty() {
            return Err(ApiError::Validation(EMPTY_CART_MESSAGE.to_string()));
        }
        if Self::contains_any(items, &self.failing) {
            return Err(ApiError::Unknown);
        }
        Ok(CheckoutReceipt {
            success: !Self::contains_any(items, &self.declined),
        })
    }
}

impl StoreApi for MockStoreApi {
    fn get_products(&self) -> ApiFuture<'_, Vec<Product>> {
        Box::pin(async move {
            self.respond().await;

            if let Some(error) = &self.fetch_error {
                tracing::debug!(%error, "Mock catalog fetch failing");
                return Err(error.clone());
            }

            tracing::debug!(products = self.catalog.len(), "Mock catalog served");
            Ok(self.catalog.to_vec())
        })
    }

    fn checkout(&self, items: LineItems) -> ApiFuture<'_, CheckoutReceipt> {
        Box::pin(async move {
            self.checkouts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(items.clone());

            self.respond().await;

            let outcome = self.judge(&items);
            tracing::debug!(lines = items.len(), ?outcome, "Mock checkout answered");
            outcome
        })
    }
}
