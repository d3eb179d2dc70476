//! Storefront demo binary
//!
//! Runs the cart against the in-process remote store: fetches the catalog,
//! fills the cart, checks out, then tries to check out an empty cart.

use anyhow::Context;
use std::sync::Arc;
use storefront_cart::api::MockStoreApi;
use storefront_cart::config::StorefrontConfig;
use storefront_cart::products::load_catalog;
use storefront_cart::storefront::Storefront;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StorefrontConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = load_catalog(config.catalog_path.as_deref()).context("loading catalog")?;
    let api = MockStoreApi::new(catalog).with_latency(config.api_latency());
    let storefront = Storefront::with_config(Arc::new(api), &config);

    println!("=== Storefront ===\n");

    let mut handle = storefront.fetch_products().await?;
    handle.wait_with_timeout(config.checkout_timeout()).await?;

    let products = storefront.products().await;
    if let Some(error) = &products.last_fetch_error {
        anyhow::bail!("catalog fetch failed: {error}");
    }

    let mut listing: Vec<_> = products.products.values().collect();
    listing.sort_by(|a, b| a.id.cmp(&b.id));
    println!("Catalog ({} products):", listing.len());
    for product in &listing {
        println!("  {:>4}  {:<20} {:>8}", product.id, product.name, product.price);
    }

    let mut picks = listing.iter().map(|product| product.id.clone());
    if let (Some(first), Some(second)) = (picks.next(), picks.next()) {
        println!("\n>>> Adding 3 x {first} and 2 x {second}");
        for _ in 0..3 {
            storefront.add_to_cart(first.clone()).await?;
        }
        storefront.update_quantity(second, 2).await?;
    }

    println!(
        "Cart: {} items, total {}",
        storefront.total_items().await,
        storefront.total_price().await
    );

    println!("\n>>> Checking out");
    let status = storefront.checkout_and_wait().await?;
    println!(
        "Status: {status}, cart now holds {} items",
        storefront.total_items().await
    );

    println!("\n>>> Checking out an empty cart");
    let status = storefront.checkout_and_wait().await?;
    let cart = storefront.cart().await;
    println!("Status: {status}, message: {:?}", cart.error_message);

    storefront.shutdown().await?;
    println!("\n=== Done ===");
    Ok(())
}
