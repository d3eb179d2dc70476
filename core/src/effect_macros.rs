//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// The block evaluates to `Option<Action>`; `Some` is fed back into the store.
///
/// # Example
///
/// ```rust,ignore
/// use storefront_core::async_effect;
///
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     let products = api.get_products().await.ok()?;
///     Some(ProductsAction::LoadProducts { products })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
