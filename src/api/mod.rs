//! REST boundary consumed by the reconciliation stores.

mod http;

pub use http::HttpApi;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::cart::CartItem;
use crate::domain::promo::AppliedPromo;
use crate::domain::wishlist::WishlistItem;
use crate::Result;

/// Authoritative cart as decoded from a server response.
#[derive(Clone, Debug, Default)]
pub struct CartPayload {
    /// Server-side cart handle; never persisted locally.
    pub id: Option<String>,
    pub items: Vec<CartItem>,
    pub applied_promo: Option<AppliedPromo>,
}

#[derive(Clone, Debug, Default)]
pub struct WishlistPayload {
    pub items: Vec<WishlistItem>,
}

/// Outcome of anonymous coupon validation. A `success: false` body is a
/// normal negative outcome, not a transport failure.
#[derive(Clone, Debug)]
pub enum CouponOutcome {
    Valid(AppliedPromo),
    Rejected(String),
}

#[async_trait]
pub trait CartApi: Send + Sync {
    async fn fetch(&self) -> Result<CartPayload>;
    async fn add_item(&self, product_id: &str, quantity: u32) -> Result<CartPayload>;
    async fn set_quantity(&self, product_id: &str, quantity: u32) -> Result<CartPayload>;
    async fn remove_item(&self, product_id: &str) -> Result<CartPayload>;
    async fn clear(&self) -> Result<CartPayload>;
    /// Applies a promo to the server cart (authenticated path).
    async fn apply_promo(&self, code: &str) -> Result<AppliedPromo>;
    async fn remove_promo(&self) -> Result<()>;
    /// Validates a coupon against the current subtotal (anonymous path).
    async fn validate_coupon(&self, code: &str, order_amount: Decimal) -> Result<CouponOutcome>;
}

#[async_trait]
pub trait WishlistApi: Send + Sync {
    async fn fetch(&self) -> Result<WishlistPayload>;
    async fn add_item(&self, product_id: &str) -> Result<WishlistPayload>;
    async fn remove_item(&self, product_id: &str) -> Result<WishlistPayload>;
    async fn clear(&self) -> Result<WishlistPayload>;
}
