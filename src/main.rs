//! Demo session: exercises the anonymous cart path end to end.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use storefront_sync::{AuthSession, CartStore, HttpApi, MemoryStore, ProductSnapshot, WishlistStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("STOREFRONT_API_URL").unwrap_or_else(|_| "http://localhost:8083".to_string());
    let auth = Arc::new(AuthSession::new());
    let api = Arc::new(HttpApi::new(base_url, auth.clone()));
    let storage = Arc::new(MemoryStore::new());

    let mut cart = CartStore::new(api.clone(), auth.clone(), storage.clone());
    cart.subscribe(|event| tracing::info!(?event, "cart event"));
    let mut wishlist = WishlistStore::new(api, auth, storage);
    wishlist.subscribe(|event| tracing::info!(?event, "wishlist event"));

    let widget = ProductSnapshot {
        id: "demo-widget".into(),
        name: "Demo Widget".into(),
        description: "A widget for demonstration purposes".into(),
        price: Decimal::new(1999, 2),
        sale_price: Some(Decimal::new(1499, 2)),
        image: None,
        in_stock: true,
    };

    cart.add_item(&widget, 1).await?;
    cart.add_item(&widget, 1).await?;
    wishlist.add_item(&widget).await.ok();

    let summary = cart.summary();
    tracing::info!(
        total_items = summary.total_items,
        subtotal = %summary.totals.subtotal,
        total = %summary.totals.total,
        "anonymous session ready"
    );
    Ok(())
}
