//! Memoized selectors for derived state.
//!
//! A [`Selector`] extracts its inputs from the state, and recomputes its
//! output only when those inputs are not the *same* as on the previous call.
//! Inputs are compared by identity rather than by content: an `Arc` input
//! counts as unchanged only while it points at the same allocation.
//!
//! Reducers that want selectors to notice a change must therefore replace the
//! `Arc` (copy-on-write), and reducers that leave content untouched should keep
//! the old `Arc` so selectors skip the work.
//!
//! ```
//! use std::sync::Arc;
//! use storefront_core::selector::Selector;
//!
//! struct State {
//!     prices: Arc<Vec<u64>>,
//! }
//!
//! let total = Selector::new(
//!     "total",
//!     |s: &State| Arc::clone(&s.prices),
//!     |prices: &Arc<Vec<u64>>| prices.iter().sum::<u64>(),
//! );
//!
//! let mut state = State { prices: Arc::new(vec![1, 2, 3]) };
//! assert_eq!(total.select(&state), 6);
//! assert_eq!(total.select(&state), 6);
//! assert_eq!(total.recomputations(), 1);
//!
//! state.prices = Arc::new(vec![4]);
//! assert_eq!(total.select(&state), 4);
//! assert_eq!(total.recomputations(), 2);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Input of a [`Selector`], compared by identity.
pub trait SelectorInput: Clone {
    /// Returns true if `other` is the same input as `self`
    fn same_as(&self, other: &Self) -> bool;
}

impl<T: ?Sized> SelectorInput for Arc<T> {
    fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<A: SelectorInput, B: SelectorInput> SelectorInput for (A, B) {
    fn same_as(&self, other: &Self) -> bool {
        self.0.same_as(&other.0) && self.1.same_as(&other.1)
    }
}

impl<A: SelectorInput, B: SelectorInput, C: SelectorInput> SelectorInput for (A, B, C) {
    fn same_as(&self, other: &Self) -> bool {
        self.0.same_as(&other.0) && self.1.same_as(&other.1) && self.2.same_as(&other.2)
    }
}

/// A memoized derived value over state `S`.
///
/// Caches the last input and output. Safe to share between tasks; the cache
/// is guarded by a mutex that is only held for the duration of one `select`.
pub struct Selector<S, I, T> {
    name: &'static str,
    input: fn(&S) -> I,
    compute: fn(&I) -> T,
    cache: Mutex<Option<(I, T)>>,
    recomputations: AtomicUsize,
}

impl<S, I, T> Selector<S, I, T>
where
    I: SelectorInput,
    T: Clone,
{
    /// Create a selector from an input extractor and a compute function
    #[must_use]
    pub const fn new(name: &'static str, input: fn(&S) -> I, compute: fn(&I) -> T) -> Self {
        Self {
            name,
            input,
            compute,
            cache: Mutex::new(None),
            recomputations: AtomicUsize::new(0),
        }
    }

    /// Derive the value for `state`, reusing the cached value when the
    /// inputs are identical to the previous call.
    pub fn select(&self, state: &S) -> T {
        let input = (self.input)(state);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((cached_input, value)) = cache.as_ref() {
            if cached_input.same_as(&input) {
                return value.clone();
            }
        }

        let value = (self.compute)(&input);
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *cache = Some((input, value.clone()));
        value
    }

    /// Number of times the compute function has run
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }

    /// Reset the recomputation counter (the cache is kept)
    pub fn reset_recomputations(&self) {
        self.recomputations.store(0, Ordering::Relaxed);
    }

    /// Name given at construction, used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, I, T> std::fmt::Debug for Selector<S, I, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("name", &self.name)
            .field("recomputations", &self.recomputations.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Clone)]
    struct TestState {
        left: Arc<HashMap<String, i64>>,
        right: Arc<Vec<i64>>,
    }

    fn state() -> TestState {
        TestState {
            left: Arc::new(HashMap::from([("a".to_string(), 2), ("b".to_string(), 3)])),
            right: Arc::new(vec![10]),
        }
    }

    fn sum_left() -> Selector<TestState, Arc<HashMap<String, i64>>, i64> {
        Selector::new("sum_left", |s| Arc::clone(&s.left), |m| m.values().sum())
    }

    fn sum_both() -> Selector<TestState, (Arc<HashMap<String, i64>>, Arc<Vec<i64>>), i64> {
        Selector::new(
            "sum_both",
            |s| (Arc::clone(&s.left), Arc::clone(&s.right)),
            |(l, r)| l.values().sum::<i64>() + r.iter().sum::<i64>(),
        )
    }

    #[test]
    fn computes_once_for_identical_input() {
        let selector = sum_left();
        let state = state();

        for _ in 0..5 {
            assert_eq!(selector.select(&state), 5);
        }
        assert_eq!(selector.recomputations(), 1);
    }

    #[test]
    fn clone_of_state_shares_inputs() {
        let selector = sum_left();
        let state = state();
        let copy = state.clone();

        selector.select(&state);
        selector.select(&copy);
        assert_eq!(selector.recomputations(), 1);
    }

    #[test]
    fn equal_content_in_new_allocation_recomputes() {
        let selector = sum_left();
        let mut state = state();

        selector.select(&state);
        state.left = Arc::new((*state.left).clone());
        selector.select(&state);

        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn tuple_input_tracks_each_member() {
        let selector = sum_both();
        let mut state = state();

        assert_eq!(selector.select(&state), 15);
        state.right = Arc::new(vec![1, 1]);
        assert_eq!(selector.select(&state), 7);
        state.left = Arc::new(HashMap::new());
        assert_eq!(selector.select(&state), 2);
        assert_eq!(selector.select(&state), 2);

        assert_eq!(selector.recomputations(), 3);
    }

    #[test]
    fn reset_keeps_cache() {
        let selector = sum_left();
        let state = state();

        selector.select(&state);
        selector.reset_recomputations();
        selector.select(&state);

        assert_eq!(selector.recomputations(), 0);
        assert_eq!(selector.name(), "sum_left");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn running_sum() -> Selector<Arc<Vec<i64>>, Arc<Vec<i64>>, i64> {
            Selector::new("running_sum", |s| Arc::clone(s), |v| v.iter().sum())
        }

        proptest! {
            /// Property: the selected value always matches a fresh computation,
            /// and the compute function runs once per replaced input only.
            #[test]
            fn recomputes_only_when_input_is_replaced(
                edits in prop::collection::vec(prop::option::of(-100i64..100), 1..50),
            ) {
                let selector = running_sum();
                let mut state = Arc::new(Vec::new());
                let mut replacements = 1;
                selector.select(&state);

                for edit in edits {
                    if let Some(value) = edit {
                        let mut next = (*state).clone();
                        next.push(value);
                        state = Arc::new(next);
                        replacements += 1;
                    }
                    prop_assert_eq!(selector.select(&state), state.iter().sum::<i64>());
                }

                prop_assert_eq!(selector.recomputations(), replacements);
            }
        }
    }
}
