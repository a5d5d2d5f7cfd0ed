//! HTTP implementation of the cart/wishlist API traits.
//!
//! Responses are decoded into explicit envelope types and fail closed: a
//! body that does not match the expected shape is a remote fault, never a
//! silently-missing field. A 401 status maps to the authentication fault
//! regardless of body.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::api::{CartApi, CartPayload, CouponOutcome, WishlistApi, WishlistPayload};
use crate::auth::AuthSession;
use crate::domain::cart::{CartItem, PLACEHOLDER_IMAGE};
use crate::domain::promo::AppliedPromo;
use crate::domain::wishlist::WishlistItem;
use crate::error::StoreError;
use crate::Result;

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<AuthSession>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, auth: Arc<AuthSession>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http: reqwest::Client::new(), base_url, auth }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.auth.token() {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, default_msg: &str) -> Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(StoreError::AuthExpired);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| default_msg.to_string());
            return Err(StoreError::Remote(message));
        }
        serde_json::from_str(&body).map_err(|err| StoreError::BadResponse(err.to_string()))
    }
}

#[async_trait]
impl CartApi for HttpApi {
    async fn fetch(&self) -> Result<CartPayload> {
        let env: CartEnvelope = self
            .send(self.request(Method::GET, "/api/cart"), "Failed to load cart")
            .await?;
        unwrap_cart(env, "Failed to load cart")
    }

    async fn add_item(&self, product_id: &str, quantity: u32) -> Result<CartPayload> {
        let req = self
            .request(Method::POST, "/api/cart")
            .json(&json!({ "productId": product_id, "quantity": quantity }));
        let env: CartEnvelope = self.send(req, "Failed to add item to cart").await?;
        unwrap_cart(env, "Failed to add item to cart")
    }

    async fn set_quantity(&self, product_id: &str, quantity: u32) -> Result<CartPayload> {
        let req = self
            .request(Method::PUT, &format!("/api/cart/{product_id}"))
            .json(&json!({ "quantity": quantity }));
        let env: CartEnvelope = self.send(req, "Failed to update cart").await?;
        unwrap_cart(env, "Failed to update cart")
    }

    async fn remove_item(&self, product_id: &str) -> Result<CartPayload> {
        let req = self.request(Method::DELETE, &format!("/api/cart/{product_id}"));
        let env: CartEnvelope = self.send(req, "Failed to remove item from cart").await?;
        unwrap_cart(env, "Failed to remove item from cart")
    }

    async fn clear(&self) -> Result<CartPayload> {
        let req = self.request(Method::DELETE, "/api/cart/clear");
        let env: CartEnvelope = self.send(req, "Failed to clear cart").await?;
        unwrap_cart(env, "Failed to clear cart")
    }

    async fn apply_promo(&self, code: &str) -> Result<AppliedPromo> {
        let req = self
            .request(Method::POST, "/api/cart/apply-promo")
            .json(&json!({ "promoCode": code }));
        let env: PromoEnvelope = self.send(req, "Failed to apply promo code").await?;
        if env.success == Some(false) {
            let message = env.message.unwrap_or_else(|| "Failed to apply promo code".into());
            return Err(StoreError::Remote(message));
        }
        env.promo
            .map(PromoDto::into_promo)
            .ok_or_else(|| StoreError::BadResponse("missing promo in response".into()))
    }

    async fn remove_promo(&self) -> Result<()> {
        let req = self.request(Method::DELETE, "/api/cart/remove-promo");
        let env: AckEnvelope = self.send(req, "Failed to remove promo code").await?;
        if env.success == Some(false) {
            let message = env.message.unwrap_or_else(|| "Failed to remove promo code".into());
            return Err(StoreError::Remote(message));
        }
        Ok(())
    }

    async fn validate_coupon(&self, code: &str, order_amount: Decimal) -> Result<CouponOutcome> {
        let req = self
            .request(Method::POST, "/api/coupons/validate")
            .json(&json!({ "code": code, "orderAmount": order_amount }));
        let env: CouponEnvelope = self.send(req, "Failed to validate promo code").await?;
        Ok(coupon_outcome(code, env))
    }
}

#[async_trait]
impl WishlistApi for HttpApi {
    async fn fetch(&self) -> Result<WishlistPayload> {
        let env: WishlistEnvelope = self
            .send(self.request(Method::GET, "/api/wishlist"), "Failed to load wishlist")
            .await?;
        unwrap_wishlist(env, "Failed to load wishlist")
    }

    async fn add_item(&self, product_id: &str) -> Result<WishlistPayload> {
        let req = self
            .request(Method::POST, "/api/wishlist")
            .json(&json!({ "productId": product_id }));
        let env: WishlistEnvelope = self.send(req, "Failed to add item to wishlist").await?;
        unwrap_wishlist(env, "Failed to add item to wishlist")
    }

    async fn remove_item(&self, product_id: &str) -> Result<WishlistPayload> {
        let req = self.request(Method::DELETE, &format!("/api/wishlist/{product_id}"));
        let env: WishlistEnvelope = self.send(req, "Failed to remove item from wishlist").await?;
        unwrap_wishlist(env, "Failed to remove item from wishlist")
    }

    async fn clear(&self) -> Result<WishlistPayload> {
        let req = self.request(Method::DELETE, "/api/wishlist/clear");
        let env: WishlistEnvelope = self.send(req, "Failed to clear wishlist").await?;
        unwrap_wishlist(env, "Failed to clear wishlist")
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartEnvelope {
    success: Option<bool>,
    message: Option<String>,
    cart: Option<CartDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartDto {
    id: Option<String>,
    items: Vec<CartItemDto>,
    applied_promo: Option<PromoDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartItemDto {
    #[serde(alias = "productId")]
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    price: Decimal,
    original_price: Option<Decimal>,
    image: Option<String>,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromoDto {
    code: String,
    #[serde(default)]
    discount: Decimal,
    discount_amount: Option<Decimal>,
}

impl PromoDto {
    fn into_promo(self) -> AppliedPromo {
        AppliedPromo {
            code: self.code,
            discount: self.discount,
            discount_amount: self.discount_amount,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromoEnvelope {
    success: Option<bool>,
    message: Option<String>,
    promo: Option<PromoDto>,
}

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: Option<bool>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CouponEnvelope {
    success: bool,
    message: Option<String>,
    discount: Option<Decimal>,
    discount_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistEnvelope {
    success: Option<bool>,
    message: Option<String>,
    wishlist: Option<WishlistDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistDto {
    items: Vec<WishlistItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WishlistItemDto {
    #[serde(alias = "productId")]
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    price: Decimal,
    original_price: Option<Decimal>,
    image: Option<String>,
    in_stock: Option<bool>,
    added_at: Option<DateTime<Utc>>,
}

impl From<CartItemDto> for CartItem {
    fn from(dto: CartItemDto) -> Self {
        CartItem {
            price: dto.price,
            original_price: dto.original_price.unwrap_or(dto.price),
            image: dto.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            id: dto.id,
            name: dto.name,
            description: dto.description,
            quantity: dto.quantity,
        }
    }
}

impl From<CartDto> for CartPayload {
    fn from(dto: CartDto) -> Self {
        CartPayload {
            id: dto.id,
            items: dto.items.into_iter().map(CartItem::from).collect(),
            applied_promo: dto.applied_promo.map(PromoDto::into_promo),
        }
    }
}

impl From<WishlistItemDto> for WishlistItem {
    fn from(dto: WishlistItemDto) -> Self {
        WishlistItem {
            price: dto.price,
            original_price: dto.original_price.unwrap_or(dto.price),
            image: dto.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            in_stock: dto.in_stock.unwrap_or(true),
            added_at: dto.added_at.unwrap_or_else(Utc::now),
            id: dto.id,
            name: dto.name,
            description: dto.description,
        }
    }
}

fn unwrap_cart(env: CartEnvelope, default_msg: &str) -> Result<CartPayload> {
    if env.success == Some(false) {
        return Err(StoreError::Remote(env.message.unwrap_or_else(|| default_msg.to_string())));
    }
    env.cart
        .map(CartPayload::from)
        .ok_or_else(|| StoreError::BadResponse("missing cart in response".into()))
}

fn unwrap_wishlist(env: WishlistEnvelope, default_msg: &str) -> Result<WishlistPayload> {
    if env.success == Some(false) {
        return Err(StoreError::Remote(env.message.unwrap_or_else(|| default_msg.to_string())));
    }
    env.wishlist
        .map(|dto| WishlistPayload { items: dto.items.into_iter().map(WishlistItem::from).collect() })
        .ok_or_else(|| StoreError::BadResponse("missing wishlist in response".into()))
}

fn coupon_outcome(code: &str, env: CouponEnvelope) -> CouponOutcome {
    if !env.success {
        return CouponOutcome::Rejected(env.message.unwrap_or_else(|| "Invalid promo code".into()));
    }
    CouponOutcome::Valid(AppliedPromo {
        code: code.to_string(),
        discount: env.discount.unwrap_or(Decimal::ZERO),
        discount_amount: env.discount_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_envelope_decodes_camel_case() {
        let env: CartEnvelope = serde_json::from_str(
            r#"{"success":true,"cart":{"id":"c1","items":[
                {"id":"p1","name":"Widget","price":12.5,"originalPrice":15,"quantity":2}
            ],"appliedPromo":{"code":"SAVE10","discount":10}}}"#,
        )
        .unwrap();
        let payload = unwrap_cart(env, "x").unwrap();
        assert_eq!(payload.id.as_deref(), Some("c1"));
        assert_eq!(payload.items[0].price, Decimal::new(125, 1));
        assert_eq!(payload.items[0].original_price, Decimal::new(15, 0));
        assert_eq!(payload.items[0].image, PLACEHOLDER_IMAGE);
        assert_eq!(payload.applied_promo.as_ref().unwrap().code, "SAVE10");
    }

    #[test]
    fn test_missing_cart_fails_closed() {
        let env: CartEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(unwrap_cart(env, "x"), Err(StoreError::BadResponse(_))));
    }

    #[test]
    fn test_success_false_carries_server_message() {
        let env: CartEnvelope =
            serde_json::from_str(r#"{"success":false,"message":"Out of stock"}"#).unwrap();
        match unwrap_cart(env, "default") {
            Err(StoreError::Remote(msg)) => assert_eq!(msg, "Out of stock"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_coupon_rejection_is_not_an_error() {
        let env: CouponEnvelope =
            serde_json::from_str(r#"{"success":false,"message":"Code expired"}"#).unwrap();
        match coupon_outcome("OLD", env) {
            CouponOutcome::Rejected(msg) => assert_eq!(msg, "Code expired"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_coupon_amount_and_percentage_both_decode() {
        let env: CouponEnvelope =
            serde_json::from_str(r#"{"success":true,"discount":1000,"discountAmount":150}"#)
                .unwrap();
        match coupon_outcome("FLAT", env) {
            CouponOutcome::Valid(promo) => {
                assert_eq!(promo.discount, Decimal::new(1000, 0));
                assert_eq!(promo.discount_amount, Some(Decimal::new(150, 0)));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_wishlist_item_defaults() {
        let env: WishlistEnvelope = serde_json::from_str(
            r#"{"success":true,"wishlist":{"items":[{"id":"p1","name":"Widget","price":9}]}}"#,
        )
        .unwrap();
        let payload = unwrap_wishlist(env, "x").unwrap();
        assert!(payload.items[0].in_stock);
        assert_eq!(payload.items[0].image, PLACEHOLDER_IMAGE);
    }
}
