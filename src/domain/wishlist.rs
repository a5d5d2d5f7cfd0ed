//! Wishlist state: saved items, unique by id, no quantities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::ProductSnapshot;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Decimal,
    pub image: String,
    /// Advisory stock flag copied from the product snapshot at fetch time.
    pub in_stock: bool,
    /// Set once on insertion, never mutated.
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    pub fn from_product(product: &ProductSnapshot, added_at: DateTime<Utc>) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.effective_price(),
            original_price: product.price,
            image: product.image_url(),
            in_stock: product.in_stock,
            added_at,
        }
    }

    /// Snapshot used when moving a saved item into the cart.
    pub fn as_product(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            sale_price: None,
            image: Some(self.image.clone()),
            in_stock: self.in_stock,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct WishlistState {
    items: Vec<WishlistItem>,
}

impl WishlistState {
    pub fn items(&self) -> &[WishlistItem] { &self.items }
    pub fn count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn item(&self, id: &str) -> Option<&WishlistItem> { self.items.iter().find(|i| i.id == id) }
    pub fn contains(&self, id: &str) -> bool { self.item(id).is_some() }

    /// Returns false without modifying the list when the id is already
    /// present; a duplicate add is a rejection, not a merge.
    pub fn add_local(&mut self, product: &ProductSnapshot, added_at: DateTime<Utc>) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(WishlistItem::from_product(product, added_at));
        true
    }

    pub fn remove_local(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn clear_local(&mut self) {
        self.items.clear();
    }

    pub fn replace(&mut self, items: Vec<WishlistItem>) {
        self.items = items;
    }
}
