//! Shared fakes and fixtures for store tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::api::{CartApi, CartPayload, CouponOutcome, WishlistApi, WishlistPayload};
use crate::domain::cart::{CartItem, ProductSnapshot, PLACEHOLDER_IMAGE};
use crate::domain::promo::AppliedPromo;
use crate::domain::wishlist::WishlistItem;
use crate::error::StoreError;
use crate::Result;

pub(crate) fn product(id: &str, price: i64) -> ProductSnapshot {
    ProductSnapshot {
        id: id.into(),
        name: format!("Product {id}"),
        description: String::new(),
        price: Decimal::new(price, 0),
        sale_price: None,
        image: None,
        in_stock: true,
    }
}

pub(crate) fn cart_item(id: &str, price: i64, quantity: u32) -> CartItem {
    CartItem {
        id: id.into(),
        name: format!("Product {id}"),
        description: String::new(),
        price: Decimal::new(price, 0),
        original_price: Decimal::new(price, 0),
        image: PLACEHOLDER_IMAGE.into(),
        quantity,
    }
}

pub(crate) fn cart_payload(items: Vec<CartItem>) -> CartPayload {
    CartPayload { id: Some("cart-1".into()), items, applied_promo: None }
}

pub(crate) fn wishlist_item(id: &str, price: i64) -> WishlistItem {
    WishlistItem::from_product(&product(id, price), Utc::now())
}

/// Scripted [`CartApi`]: tests queue replies, every call pops the next one.
#[derive(Default)]
pub(crate) struct FakeCartApi {
    cart_replies: Mutex<VecDeque<Result<CartPayload>>>,
    promo_replies: Mutex<VecDeque<Result<AppliedPromo>>>,
    remove_promo_replies: Mutex<VecDeque<Result<()>>>,
    coupon_replies: Mutex<VecDeque<Result<CouponOutcome>>>,
}

impl FakeCartApi {
    pub(crate) fn push_cart(&self, reply: Result<CartPayload>) {
        self.cart_replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_promo(&self, reply: Result<AppliedPromo>) {
        self.promo_replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_remove_promo(&self, reply: Result<()>) {
        self.remove_promo_replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_coupon(&self, reply: Result<CouponOutcome>) {
        self.coupon_replies.lock().unwrap().push_back(reply);
    }

    fn next_cart(&self) -> Result<CartPayload> {
        self.cart_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Remote("unexpected cart call".into())))
    }
}

#[async_trait]
impl CartApi for FakeCartApi {
    async fn fetch(&self) -> Result<CartPayload> {
        self.next_cart()
    }

    async fn add_item(&self, _product_id: &str, _quantity: u32) -> Result<CartPayload> {
        self.next_cart()
    }

    async fn set_quantity(&self, _product_id: &str, _quantity: u32) -> Result<CartPayload> {
        self.next_cart()
    }

    async fn remove_item(&self, _product_id: &str) -> Result<CartPayload> {
        self.next_cart()
    }

    async fn clear(&self) -> Result<CartPayload> {
        self.next_cart()
    }

    async fn apply_promo(&self, _code: &str) -> Result<AppliedPromo> {
        self.promo_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Remote("unexpected promo call".into())))
    }

    async fn remove_promo(&self) -> Result<()> {
        self.remove_promo_replies.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn validate_coupon(&self, _code: &str, _order_amount: Decimal) -> Result<CouponOutcome> {
        self.coupon_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Remote("unexpected coupon call".into())))
    }
}

#[derive(Default)]
pub(crate) struct FakeWishlistApi {
    replies: Mutex<VecDeque<Result<WishlistPayload>>>,
}

impl FakeWishlistApi {
    pub(crate) fn push(&self, reply: Result<WishlistPayload>) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl WishlistApi for FakeWishlistApi {
    async fn fetch(&self) -> Result<WishlistPayload> {
        self.next()
    }

    async fn add_item(&self, _product_id: &str) -> Result<WishlistPayload> {
        self.next()
    }

    async fn remove_item(&self, _product_id: &str) -> Result<WishlistPayload> {
        self.next()
    }

    async fn clear(&self) -> Result<WishlistPayload> {
        self.next()
    }
}

impl FakeWishlistApi {
    fn next(&self) -> Result<WishlistPayload> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Remote("unexpected wishlist call".into())))
    }
}
