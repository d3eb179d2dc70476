//! Product catalog slice.
//!
//! Holds every product the storefront knows about, keyed by id. Batches are
//! merged in, so the catalog can be filled incrementally and a product that
//! is missing from a later batch is kept.

use crate::app::StorefrontEnvironment;
use crate::types::{Product, ProductsAction, ProductsState};
use std::path::Path;
use std::sync::Arc;
use storefront_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};
use thiserror::Error;

/// Catalog bundled with the crate
pub const BUNDLED_CATALOG: &str = include_str!("../data/products.json");

/// Errors reading a catalog file
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The file could not be read
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// File that was read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The content is not a JSON array of products
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON array of products
///
/// # Errors
///
/// Returns [`CatalogError::Parse`] if `json` is not an array of products.
pub fn parse_catalog(json: &str) -> Result<Vec<Product>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Read a catalog file, or the bundled catalog when `path` is `None`
///
/// # Errors
///
/// Returns [`CatalogError`] if the file cannot be read or parsed.
pub fn load_catalog(path: Option<&Path>) -> Result<Vec<Product>, CatalogError> {
    let Some(path) = path else {
        return parse_catalog(BUNDLED_CATALOG);
    };

    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let products = parse_catalog(&json)?;

    tracing::info!(path = %path.display(), products = products.len(), "Catalog file loaded");
    Ok(products)
}

/// Reducer for the product catalog
#[derive(Clone, Debug, Default)]
pub struct ProductsReducer;

impl ProductsReducer {
    /// Creates a new `ProductsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn merge(state: &mut ProductsState, products: Vec<Product>) {
        state.last_fetch_error = None;

        if products.is_empty() {
            return;
        }

        let batch = products.len();
        let mut catalog = (*state.products).clone();
        for product in products {
            catalog.insert(product.id.clone(), product);
        }
        state.products = Arc::new(catalog);

        tracing::info!(batch, total = state.products.len(), "Products loaded");
    }
}

impl Reducer for ProductsReducer {
    type State = ProductsState;
    type Action = ProductsAction;
    type Environment = StorefrontEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ProductsAction::LoadProducts { products } => {
                Self::merge(state, products);
                SmallVec::new()
            },

            ProductsAction::FetchProducts => {
                tracing::debug!("Fetching catalog");
                let api = Arc::clone(&env.api);

                smallvec![async_effect! {
                    Some(match api.get_products().await {
                        Ok(products) => ProductsAction::LoadProducts { products },
                        Err(error) => ProductsAction::FetchFailed { error },
                    })
                }]
            },

            ProductsAction::FetchFailed { error } => {
                tracing::warn!(%error, "Catalog fetch failed");
                state.last_fetch_error = Some(error.to_string());
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::api::{ApiError, MockStoreApi};
    use crate::money::Money;
    use crate::types::ProductId;
    use storefront_testing::{ReducerTest, assertions, effects::resolve_effects};

    fn env(api: MockStoreApi) -> StorefrontEnvironment {
        StorefrontEnvironment::new(Arc::new(api))
    }

    fn bundled() -> Vec<Product> {
        parse_catalog(BUNDLED_CATALOG).unwrap()
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let products = bundled();
        assert!(products.len() >= 4);
        assert_eq!(products[0].name, "Bananas");
        assert_eq!(products[0].price, Money::from_cents(109));
        assert_eq!(products[1].price, Money::from_cents(999));
    }

    #[test]
    fn test_load_converts_list_to_map() {
        let products = bundled();
        let expected = products.clone();

        ReducerTest::new(ProductsReducer::new())
            .with_env(env(MockStoreApi::default()))
            .given_state(ProductsState::new())
            .when_action(ProductsAction::LoadProducts { products })
            .then_state(move |state| {
                assert_eq!(state.len(), expected.len());
                for product in &expected {
                    assert_eq!(state.get(&product.id), Some(product));
                }
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_same_product_is_not_added_twice() {
        let products = bundled();
        let count = products.len();

        ReducerTest::new(ProductsReducer::new())
            .with_env(env(MockStoreApi::default()))
            .given_state(ProductsState::new())
            .when_action(ProductsAction::LoadProducts { products: products.clone() })
            .when_action(ProductsAction::LoadProducts { products })
            .then_state(move |state| assert_eq!(state.len(), count))
            .run();
    }

    #[test]
    fn test_batches_received_at_different_times() {
        let products = bundled();

        ReducerTest::new(ProductsReducer::new())
            .with_env(env(MockStoreApi::default()))
            .given_state(ProductsState::new())
            .when_action(ProductsAction::LoadProducts { products: products[0..2].to_vec() })
            .then_state(|state| assert_eq!(state.len(), 2))
            .run();

        let state = ReducerTest::new(ProductsReducer::new())
            .with_env(env(MockStoreApi::default()))
            .given_state(ProductsState::with_products(products[0..2].to_vec()))
            .when_action(ProductsAction::LoadProducts { products: products[2..4].to_vec() })
            .run();
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_last_write_wins() {
        let mut renamed = Product::new("207", "Organic Bananas", Money::from_cents(129));
        renamed.description = "Fair trade".into();

        let state = ReducerTest::new(ProductsReducer::new())
            .with_env(env(MockStoreApi::default()))
            .given_state(ProductsState::with_products(bundled()))
            .when_action(ProductsAction::LoadProducts { products: vec![renamed.clone()] })
            .run();

        assert_eq!(state.get(&ProductId::new("207")), Some(&renamed));
        assert_eq!(state.len(), bundled().len());
    }

    #[test]
    fn test_empty_batch_keeps_reference() {
        let initial = ProductsState::with_products(bundled());
        let before = Arc::clone(&initial.products);

        let state = ReducerTest::new(ProductsReducer::new())
            .with_env(env(MockStoreApi::default()))
            .given_state(initial)
            .when_action(ProductsAction::LoadProducts { products: Vec::new() })
            .run();

        assert!(Arc::ptr_eq(&before, &state.products));
    }

    #[tokio::test]
    async fn test_fetch_feeds_back_load() {
        let catalog = bundled();
        let mut state = ProductsState::new();
        let effects = ProductsReducer.reduce(
            &mut state,
            ProductsAction::FetchProducts,
            &env(MockStoreApi::new(catalog.clone())),
        );

        assert!(state.is_empty());
        let feedback = resolve_effects(effects).await;
        assert_eq!(feedback, vec![ProductsAction::LoadProducts { products: catalog }]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_recorded_then_cleared() {
        let api = MockStoreApi::default().fail_fetch(ApiError::Transport("offline".into()));
        let env = env(api);
        let mut state = ProductsState::new();

        let effects = ProductsReducer.reduce(&mut state, ProductsAction::FetchProducts, &env);
        for action in resolve_effects(effects).await {
            ProductsReducer.reduce(&mut state, action, &env);
        }
        assert_eq!(state.last_fetch_error.as_deref(), Some("transport error: offline"));

        ProductsReducer.reduce(
            &mut state,
            ProductsAction::LoadProducts { products: bundled() },
            &env,
        );
        assert_eq!(state.last_fetch_error, None);
    }

    #[test]
    fn test_load_catalog_reports_missing_file() {
        let error = load_catalog(Some(Path::new("/nonexistent/products.json"))).unwrap_err();
        assert!(matches!(error, CatalogError::Io { .. }));
        assert!(error.to_string().contains("/nonexistent/products.json"));
    }

    #[test]
    fn test_parse_catalog_rejects_garbage() {
        assert!(matches!(parse_catalog("{\"id\": 1}"), Err(CatalogError::Parse(_))));
        assert_eq!(load_catalog(None).unwrap(), bundled());
    }
}
