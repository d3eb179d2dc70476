//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers:
//! - **`scope_reducer`**: Focus a feature reducer on one field of the root state
//!   and one variant of the root action
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//!
//! A root reducer is typically built by scoping each feature slice and then
//! combining the scoped reducers:
//!
//! ```
//! use storefront_core::composition::{combine_reducers, scope_reducer};
//! use storefront_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct BadgeState {
//!     count: u32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum BadgeAction {
//!     Bump,
//! }
//!
//! struct BadgeReducer;
//!
//! impl Reducer for BadgeReducer {
//!     type State = BadgeState;
//!     type Action = BadgeAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut BadgeState, _action: BadgeAction, _env: &()) -> SmallVec<[Effect<BadgeAction>; 4]> {
//!         state.count += 1;
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! #[derive(Clone, Debug, Default)]
//! struct AppState {
//!     left: BadgeState,
//!     right: BadgeState,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Left(BadgeAction),
//!     Right(BadgeAction),
//! }
//!
//! let app = combine_reducers(vec![
//!     Box::new(scope_reducer(
//!         BadgeReducer,
//!         |s: &mut AppState| &mut s.left,
//!         |a| match a { AppAction::Left(a) => Some(a), AppAction::Right(_) => None },
//!         AppAction::Left,
//!     )),
//!     Box::new(scope_reducer(
//!         BadgeReducer,
//!         |s: &mut AppState| &mut s.right,
//!         |a| match a { AppAction::Right(a) => Some(a), AppAction::Left(_) => None },
//!         AppAction::Right,
//!     )),
//! ]);
//!
//! let mut state = AppState::default();
//! app.reduce(&mut state, AppAction::Right(BadgeAction::Bump), &());
//! assert_eq!(state.left.count, 0);
//! assert_eq!(state.right.count, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;

/// Boxed reducer that can be shared with the runtime's effect tasks
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E>
where
    A: Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a feature reducer to one field of a larger state.
///
/// - `state_lens` borrows the feature's state out of the root state
/// - `to_child` extracts the feature's action from a root action, or `None`
///   when the action belongs to another feature (the reducer is then skipped)
/// - `to_parent` wraps the feature's feedback actions back into root actions
pub fn scope_reducer<S, SubS, A, SubA, E, R>(
    reducer: R,
    state_lens: fn(&mut S) -> &mut SubS,
    to_child: fn(A) -> Option<SubA>,
    to_parent: fn(SubA) -> A,
) -> ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    ScopedReducer {
        reducer,
        state_lens,
        to_child,
        to_parent,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
{
    reducer: R,
    state_lens: fn(&mut S) -> &mut SubS,
    to_child: fn(A) -> Option<SubA>,
    to_parent: fn(SubA) -> A,
    _phantom: std::marker::PhantomData<fn(E)>,
}

impl<S, SubS, A, SubA, E, R> Reducer for ScopedReducer<S, SubS, A, SubA, E, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = E>,
    A: 'static,
    SubA: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(child_action) = (self.to_child)(action) else {
            return SmallVec::new();
        };

        let to_parent = self.to_parent;
        self.reducer
            .reduce((self.state_lens)(state), child_action, env)
            .into_iter()
            .map(|effect| effect.map(to_parent))
            .collect()
    }
}
