//! Cart state: the item list, applied promotion, and derived totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::promo::{AppliedPromo, CartTotals};

/// Display fallback when a product carries no image.
pub const PLACEHOLDER_IMAGE: &str = "/images/product-placeholder.png";

/// Product data captured at the moment an item is added.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    /// List price.
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image: Option<String>,
    pub in_stock: bool,
}

impl ProductSnapshot {
    /// Effective unit price: sale price when present, list price otherwise.
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    pub fn image_url(&self) -> String {
        self.image.clone().unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Effective unit price used for totals.
    pub price: Decimal,
    /// List price, retained for display only.
    pub original_price: Decimal,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Read-only view combining the numbers presentation layers care about.
#[derive(Clone, Debug, PartialEq)]
pub struct CartSummary {
    pub total_items: u32,
    pub unique_items: usize,
    pub totals: CartTotals,
    pub has_promo: bool,
    pub promo_code: Option<String>,
}

/// In-memory cart for the current session. Items are unique by id; totals
/// are recomputed after every mutation.
#[derive(Clone, Debug, Default)]
pub struct CartState {
    items: Vec<CartItem>,
    applied_promo: Option<AppliedPromo>,
    server_cart: Option<String>,
    totals: CartTotals,
}

impl CartState {
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn totals(&self) -> &CartTotals { &self.totals }
    pub fn applied_promo(&self) -> Option<&AppliedPromo> { self.applied_promo.as_ref() }
    pub fn server_cart(&self) -> Option<&str> { self.server_cart.as_deref() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn total_items(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }
    pub fn unique_items(&self) -> usize { self.items.len() }
    pub fn item(&self, id: &str) -> Option<&CartItem> { self.items.iter().find(|i| i.id == id) }
    pub fn contains(&self, id: &str) -> bool { self.item(id).is_some() }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            total_items: self.total_items(),
            unique_items: self.unique_items(),
            totals: self.totals.clone(),
            has_promo: self.applied_promo.is_some(),
            promo_code: self.applied_promo.as_ref().map(|p| p.code.clone()),
        }
    }

    /// Anonymous-path add: an existing line is bumped by exactly 1, a new
    /// line starts at quantity 1. The requested quantity only matters on the
    /// remote path, where the server list is taken literally.
    pub fn add_local(&mut self, product: &ProductSnapshot) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == product.id) {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem {
                id: product.id.clone(),
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.effective_price(),
                original_price: product.price,
                image: product.image_url(),
                quantity: 1,
            });
        }
        self.recalculate();
    }

    /// Sets the quantity for a matching id in place; unknown ids are a no-op.
    /// Callers must route non-positive quantities to removal instead.
    pub fn set_quantity_local(&mut self, id: &str, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
        self.recalculate();
    }

    pub fn remove_local(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
        self.recalculate();
    }

    pub fn clear_local(&mut self) {
        self.items.clear();
        self.applied_promo = None;
        self.recalculate();
    }

    pub fn set_promo(&mut self, promo: AppliedPromo) {
        self.applied_promo = Some(promo);
        self.recalculate();
    }

    pub fn clear_promo(&mut self) {
        self.applied_promo = None;
        self.recalculate();
    }

    /// Post-write replacement: the server list is authoritative after every
    /// remote mutation. The applied promotion is left as-is.
    pub fn replace_items(&mut self, server_cart: Option<String>, items: Vec<CartItem>) {
        self.server_cart = server_cart;
        self.items = items;
        self.recalculate();
    }

    /// Wholesale replacement from a server fetch: items and promotion both.
    pub fn replace_all(
        &mut self,
        server_cart: Option<String>,
        items: Vec<CartItem>,
        promo: Option<AppliedPromo>,
    ) {
        self.server_cart = server_cart;
        self.items = items;
        self.applied_promo = promo;
        self.recalculate();
    }

    /// Logout transition: server-linked references go, the item array stays
    /// visible until the next mutation or reload.
    pub fn drop_server_links(&mut self) {
        self.server_cart = None;
        self.applied_promo = None;
        self.recalculate();
    }

    /// Rehydration from persisted local state; totals are recomputed rather
    /// than trusted.
    pub fn restore(&mut self, items: Vec<CartItem>, promo: Option<AppliedPromo>) {
        self.items = items;
        self.applied_promo = promo;
        self.recalculate();
    }

    pub fn recalculate(&mut self) {
        let subtotal = self
            .items
            .iter()
            .fold(Decimal::ZERO, |acc, i| acc + i.line_total());
        self.totals = CartTotals::derive(subtotal, self.applied_promo.as_ref());
    }
}
