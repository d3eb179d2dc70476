//! Domain types for the storefront.
//!
//! Two feature slices share these types: the product catalog and the cart.
//! Collections that selectors derive values from are held behind `Arc` and
//! replaced, never mutated in place, so a new `Arc` means new content.

use crate::api::ApiError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a product in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a `ProductId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A product record, immutable once loaded
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog key
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Longer description shown on the product card
    #[serde(default)]
    pub description: String,
    /// Image location
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Product {
    /// Creates a product with no description or image
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            price,
            description: String::new(),
            image_url: None,
        }
    }
}

/// Cart line items: product id to quantity
///
/// Quantities are stored as given; zero and negative values are kept.
pub type LineItems = HashMap<ProductId, i64>;

/// Product catalog keyed by id
pub type Catalog = HashMap<ProductId, Product>;

/// Lifecycle of the most recent checkout attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    /// No checkout in flight; the last one (if any) succeeded
    #[default]
    Ready,
    /// A checkout request is in flight
    Loading,
    /// The last checkout was declined or failed
    Error,
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Ready => "READY",
            Self::Loading => "LOADING",
            Self::Error => "ERROR",
        })
    }
}

/// Response of the remote checkout call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    /// False when the remote store declined the order
    pub success: bool,
}

/// State of the product catalog slice
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductsState {
    /// All loaded products
    pub products: Arc<Catalog>,
    /// Message of the last failed catalog fetch, cleared by the next load
    pub last_fetch_error: Option<String>,
}

impl ProductsState {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding `products` (later duplicates win)
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Arc::new(products.into_iter().map(|p| (p.id.clone(), p)).collect()),
            last_fetch_error: None,
        }
    }

    /// Looks up a product
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Number of products loaded
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True when no product has been loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// State of the cart slice
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    /// Line items
    pub items: Arc<LineItems>,
    /// Status of the most recent checkout
    pub checkout_status: CheckoutStatus,
    /// Message of the last failed checkout; empty when there is none
    pub error_message: String,
}

impl CartState {
    /// Creates an empty cart, ready for checkout
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ready cart holding `items`
    #[must_use]
    pub fn with_items<I, K>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<ProductId>,
    {
        Self {
            items: Arc::new(items.into_iter().map(|(id, q)| (id.into(), q)).collect()),
            ..Self::default()
        }
    }

    /// Quantity stored for `id`, zero when absent
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> i64 {
        self.items.get(id).copied().unwrap_or(0)
    }

    /// True when the cart has no line items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Phases of one checkout attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Request sent, waiting for the response
    Pending,
    /// Remote store answered
    Fulfilled(CheckoutReceipt),
    /// Remote call failed
    Rejected(ApiError),
}

/// Actions of the cart slice
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product
    AddToCart {
        /// Product to add
        id: ProductId,
    },

    /// Drop a line item whatever its quantity
    RemoveFromCart {
        /// Product to remove
        id: ProductId,
    },

    /// Set the quantity of a line item
    UpdateQuantity {
        /// Product to update
        id: ProductId,
        /// New quantity, stored as given
        quantity: i64,
    },

    /// Submit the current line items to the remote store
    Checkout,

    /// A checkout attempt moved to a new phase
    CheckoutProgress(CheckoutPhase),
}

/// Actions of the product catalog slice
#[derive(Clone, Debug, PartialEq)]
pub enum ProductsAction {
    /// Merge products into the catalog, last write wins
    LoadProducts {
        /// Products to merge
        products: Vec<Product>,
    },

    /// Fetch the full catalog from the remote store
    FetchProducts,

    /// The catalog fetch failed
    FetchFailed {
        /// Failure reported by the remote store
        error: ApiError,
    },
}
