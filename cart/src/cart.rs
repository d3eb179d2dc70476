//! Cart slice: line items and the checkout workflow.
//!
//! Line item edits are plain state transitions. Checkout is a small state
//! machine driven by [`CheckoutPhase`]:
//!
//! ```text
//!            Checkout                  Fulfilled { success: true }
//!   READY ─────────────► LOADING ───────────────────────────────► READY (cart cleared)
//!   ERROR ─────────────►    │
//!                           ├── Fulfilled { success: false } ───► ERROR (message kept)
//!                           └── Rejected(error) ────────────────► ERROR (message = error's)
//! ```

use crate::app::StorefrontEnvironment;
use crate::types::{CartAction, CartState, CheckoutPhase, CheckoutStatus, LineItems, ProductId};
use std::sync::Arc;
use storefront_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the cart
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Replace the line items with an edited copy
    fn edit_items(state: &mut CartState, edit: impl FnOnce(&mut LineItems)) {
        let mut items = LineItems::clone(&state.items);
        edit(&mut items);
        state.items = Arc::new(items);
    }

    fn add(state: &mut CartState, id: ProductId) {
        Self::edit_items(state, |items| {
            items
                .entry(id)
                .and_modify(|quantity| *quantity = quantity.saturating_add(1))
                .or_insert(1);
        });
    }

    fn remove(state: &mut CartState, id: &ProductId) {
        if !state.items.contains_key(id) {
            tracing::debug!(%id, "Remove of a product not in the cart");
            return;
        }
        Self::edit_items(state, |items| {
            items.remove(id);
        });
    }

    fn set_quantity(state: &mut CartState, id: ProductId, quantity: i64) {
        if state.items.get(&id) == Some(&quantity) {
            return;
        }
        Self::edit_items(state, |items| {
            items.insert(id, quantity);
        });
    }

    /// Applies a checkout phase to state
    fn apply_phase(state: &mut CartState, phase: &CheckoutPhase) {
        match phase {
            CheckoutPhase::Pending => {
                state.checkout_status = CheckoutStatus::Loading;
                metrics::counter!("cart.checkout.started").increment(1);
                tracing::info!(lines = state.items.len(), "Checkout pending");
            },
            CheckoutPhase::Fulfilled(receipt) if receipt.success => {
                state.checkout_status = CheckoutStatus::Ready;
                state.items = Arc::new(LineItems::new());
                // A message from an earlier failure does not outlive a success
                state.error_message.clear();
                metrics::counter!("cart.checkout.succeeded").increment(1);
                tracing::info!("Checkout succeeded, cart cleared");
            },
            CheckoutPhase::Fulfilled(_) => {
                // Declined: the previous message stays
                state.checkout_status = CheckoutStatus::Error;
                metrics::counter!("cart.checkout.declined").increment(1);
                tracing::warn!("Checkout declined by the store");
            },
            CheckoutPhase::Rejected(error) => {
                state.checkout_status = CheckoutStatus::Error;
                state.error_message = error.message().unwrap_or_default().to_owned();
                metrics::counter!("cart.checkout.failed").increment(1);
                tracing::warn!(%error, "Checkout failed");
            },
        }
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = StorefrontEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CartAction::AddToCart { id } => {
                Self::add(state, id);
                SmallVec::new()
            },

            CartAction::RemoveFromCart { id } => {
                Self::remove(state, &id);
                SmallVec::new()
            },

            CartAction::UpdateQuantity { id, quantity } => {
                Self::set_quantity(state, id, quantity);
                SmallVec::new()
            },

            CartAction::Checkout => {
                if state.checkout_status == CheckoutStatus::Loading {
                    tracing::warn!("Checkout already in flight, ignoring");
                    metrics::counter!("cart.checkout.ignored").increment(1);
                    return SmallVec::new();
                }

                Self::apply_phase(state, &CheckoutPhase::Pending);

                let items = LineItems::clone(&state.items);
                let api = Arc::clone(&env.api);

                smallvec![async_effect! {
                    let phase = match api.checkout(items).await {
                        Ok(receipt) => CheckoutPhase::Fulfilled(receipt),
                        Err(error) => CheckoutPhase::Rejected(error),
                    };
                    Some(CartAction::CheckoutProgress(phase))
                }]
            },

            CartAction::CheckoutProgress(phase) => {
                Self::apply_phase(state, &phase);
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
    use crate::types::CheckoutReceipt;
    use storefront_testing::{ReducerTest, assertions, effects::resolve_effects};

    fn env() -> StorefrontEnvironment {
        StorefrontEnvironment::new(Arc::new(
            MockStoreApi::default()
                .decline_item("badItem")
                .fail_item("evilItem"),
        ))
    }

    fn add(id: &str) -> CartAction {
        CartAction::AddToCart { id: id.into() }
    }

    fn items(pairs: &[(&str, i64)]) -> LineItems {
        pairs.iter().map(|(id, q)| (ProductId::new(*id), *q)).collect()
    }

    /// Reduce `Checkout`, run the remote call and reduce its outcome
    async fn run_checkout(state: &mut CartState) {
        let env = env();
        let effects = CartReducer.reduce(state, CartAction::Checkout, &env);
        assert_eq!(state.checkout_status, CheckoutStatus::Loading);

        for action in resolve_effects(effects).await {
            CartReducer.reduce(state, action, &env);
        }
    }

    #[test]
    fn test_add_to_empty_cart() {
        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(CartState::new())
            .when_action(add("abc"))
            .then_state(|state| {
                assert_eq!(*state.items, items(&[("abc", 1)]));
                assert_eq!(state.checkout_status, CheckoutStatus::Ready);
                assert_eq!(state.error_message, "");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_increments() {
        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(CartState::new())
            .when_actions([add("abc"), add("abc"), add("abc")])
            .then_state(|state| assert_eq!(*state.items, items(&[("abc", 3)])))
            .run();
    }

    #[test]
    fn test_remove_drops_whole_line() {
        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(CartState::with_items([("abc", 1), ("efd", 4)]))
            .when_action(CartAction::RemoveFromCart { id: "abc".into() })
            .then_state(|state| assert_eq!(*state.items, items(&[("efd", 4)])))
            .run();
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let initial = CartState::with_items([("efd", 4)]);
        let before = Arc::clone(&initial.items);
        let expected = initial.clone();

        let state = ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(initial)
            .when_action(CartAction::RemoveFromCart { id: "abc".into() })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert_eq!(state, expected);
        assert!(Arc::ptr_eq(&before, &state.items));
    }

    #[test]
    fn test_update_quantity_stores_any_value() {
        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(CartState::with_items([("abc", 1)]))
            .when_actions([
                CartAction::UpdateQuantity { id: "abc".into(), quantity: 4 },
                CartAction::UpdateQuantity { id: "zero".into(), quantity: 0 },
                CartAction::UpdateQuantity { id: "neg".into(), quantity: -2 },
            ])
            .then_state(|state| {
                assert_eq!(*state.items, items(&[("abc", 4), ("zero", 0), ("neg", -2)]));
            })
            .run();
    }

    #[test]
    fn test_update_to_same_quantity_keeps_reference() {
        let initial = CartState::with_items([("abc", 4)]);
        let before = Arc::clone(&initial.items);

        let state = ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(initial)
            .when_action(CartAction::UpdateQuantity { id: "abc".into(), quantity: 4 })
            .run();

        assert!(Arc::ptr_eq(&before, &state.items));
    }

    #[test]
    fn test_edits_replace_reference() {
        let initial = CartState::with_items([("abc", 1)]);
        let before = Arc::clone(&initial.items);

        let state = ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(initial)
            .when_action(add("abc"))
            .run();

        assert!(!Arc::ptr_eq(&before, &state.items));
        assert_eq!(*before, items(&[("abc", 1)]));
    }

    #[test]
    fn test_checkout_sets_pending_and_returns_call() {
        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(CartState::with_items([("abc", 3)]))
            .when_action(CartAction::Checkout)
            .then_state(|state| {
                assert_eq!(state.checkout_status, CheckoutStatus::Loading);
                assert_eq!(*state.items, items(&[("abc", 3)]));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_checkout_while_loading_is_ignored() {
        let mut initial = CartState::with_items([("abc", 3)]);
        initial.checkout_status = CheckoutStatus::Loading;

        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(initial)
            .when_action(CartAction::Checkout)
            .then_state(|state| assert_eq!(state.checkout_status, CheckoutStatus::Loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn test_checkout_feeds_back_fulfilled() {
        let mut state = CartState::with_items([("abc", 3)]);
        let effects = CartReducer.reduce(&mut state, CartAction::Checkout, &env());

        let feedback = resolve_effects(effects).await;
        assert_eq!(
            feedback,
            vec![CartAction::CheckoutProgress(CheckoutPhase::Fulfilled(CheckoutReceipt {
                success: true
            }))]
        );
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart() {
        let mut state = CartState::with_items([("testItem", 4)]);
        run_checkout(&mut state).await;

        assert_eq!(state.checkout_status, CheckoutStatus::Ready);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_rejected() {
        let mut state = CartState::new();
        run_checkout(&mut state).await;

        assert_eq!(state.checkout_status, CheckoutStatus::Error);
        assert_eq!(state.error_message, "Cart must not be empty");
    }

    #[tokio::test]
    async fn test_checkout_decline_keeps_items_and_message() {
        let mut state = CartState::with_items([("badItem", 4)]);
        run_checkout(&mut state).await;

        assert_eq!(state.checkout_status, CheckoutStatus::Error);
        assert_eq!(*state.items, items(&[("badItem", 4)]));
        assert_eq!(state.error_message, "");
    }

    #[tokio::test]
    async fn test_checkout_decline_after_failure_keeps_old_message() {
        let mut state = CartState::new();
        run_checkout(&mut state).await;

        let env = env();
        CartReducer.reduce(&mut state, add("badItem"), &env);
        run_checkout(&mut state).await;

        assert_eq!(state.checkout_status, CheckoutStatus::Error);
        assert_eq!(state.error_message, "Cart must not be empty");
    }

    #[tokio::test]
    async fn test_checkout_failure_without_message() {
        let mut state = CartState::with_items([("evilItem", 1)]);
        state.error_message = "stale".into();
        run_checkout(&mut state).await;

        assert_eq!(state.checkout_status, CheckoutStatus::Error);
        assert_eq!(state.error_message, "");
    }

    #[test]
    fn test_rejected_phase_uses_error_message() {
        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(CartState::new())
            .when_action(CartAction::CheckoutProgress(CheckoutPhase::Rejected(
                ApiError::Transport("connection reset".into()),
            )))
            .then_state(|state| {
                assert_eq!(state.checkout_status, CheckoutStatus::Error);
                assert_eq!(state.error_message, "connection reset");
            })
            .run();
    }

    #[test]
    fn test_success_after_failure_clears_message() {
        let mut initial = CartState::with_items([("abc", 1)]);
        initial.checkout_status = CheckoutStatus::Error;
        initial.error_message = "Cart must not be empty".into();

        ReducerTest::new(CartReducer::new())
            .with_env(env())
            .given_state(initial)
            .when_action(CartAction::CheckoutProgress(CheckoutPhase::Fulfilled(
                CheckoutReceipt { success: true },
            )))
            .then_state(|state| {
                assert_eq!(state.checkout_status, CheckoutStatus::Ready);
                assert_eq!(state.error_message, "");
                assert!(state.is_empty());
            })
            .run();
    }
}
