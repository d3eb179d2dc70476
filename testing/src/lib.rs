//! # Storefront Testing
//!
//! Testing utilities and helpers for the storefront state layer.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`assertions`]: Assertion helpers for returned effects
//! - [`effects`]: Drives effect descriptions to the actions they feed back,
//!   without a Store
//! - [`init_test_tracing`]: Log capture for test runs
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{ReducerTest, effects::resolve_effects};
//!
//! #[tokio::test]
//! async fn checkout_settles() {
//!     let mut state = CartState::default();
//!     let effects = CartReducer.reduce(&mut state, CartAction::Checkout, &env);
//!
//!     let feedback = resolve_effects(effects).await;
//!     assert!(matches!(feedback[..], [CartAction::CheckoutProgress(_)]));
//! }
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Run effect descriptions outside of a Store
///
/// Reducer tests use this to observe what an effect would feed back without
/// standing up the runtime.
pub mod effects {
    use futures::future::join_all;
    use std::future::Future;
    use std::pin::Pin;
    use storefront_core::effect::Effect;

    /// Boxed future returned by [`resolve_effect`]
    pub type Resolution<A> = Pin<Box<dyn Future<Output = Vec<A>> + Send>>;

    /// Execute one effect and collect every action it feeds back
    ///
    /// `Parallel` children run concurrently and their actions are returned in
    /// declaration order; `Sequential` children run one after another.
    /// Actions fed back are NOT reduced, so effects they would trigger are
    /// not followed.
    #[must_use]
    pub fn resolve_effect<A>(effect: Effect<A>) -> Resolution<A>
    where
        A: Send + 'static,
    {
        Box::pin(async move {
            match effect {
                Effect::None => Vec::new(),
                Effect::Future(fut) => fut.await.into_iter().collect(),
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    vec![*action]
                },
                Effect::Parallel(effects) => join_all(effects.into_iter().map(resolve_effect))
                    .await
                    .into_iter()
                    .flatten()
                    .collect(),
                Effect::Sequential(effects) => {
                    let mut actions = Vec::new();
                    for effect in effects {
                        actions.extend(resolve_effect(effect).await);
                    }
                    actions
                },
            }
        })
    }

    /// Execute a reducer's effects in order and collect the fed back actions
    pub async fn resolve_effects<A, I>(effects: I) -> Vec<A>
    where
        A: Send + 'static,
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        for effect in effects {
            actions.extend(resolve_effect(effect).await);
        }
        actions
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG` and falls back to `debug`. Safe to call from every test;
/// only the first call installs the subscriber.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .ok();
}
