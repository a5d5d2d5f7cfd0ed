//! Cart reconciliation store.
//!
//! Every mutation is routed through one of two write strategies chosen per
//! call by the current authentication state: the local strategy mutates the
//! in-memory list synchronously and persists it; the remote strategy issues
//! the server call and takes the response list as authoritative.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{CartApi, CouponOutcome};
use crate::auth::AuthSession;
use crate::domain::cart::{CartItem, CartState, CartSummary, ProductSnapshot};
use crate::domain::events::StoreEvent;
use crate::domain::promo::{AppliedPromo, CartTotals};
use crate::error::StoreError;
use crate::storage::{LocalStore, CART_NAMESPACE};
use crate::store::AuthAware;
use crate::Result;

/// Local copy of the cart persisted for the anonymous path. The server cart
/// handle is deliberately absent.
#[derive(Serialize, Deserialize)]
struct PersistedCart {
    items: Vec<CartItem>,
    applied_promo: Option<AppliedPromo>,
    totals: CartTotals,
}

#[async_trait]
trait CartWrite: Send + Sync {
    async fn add_item(
        &self,
        state: &mut CartState,
        product: &ProductSnapshot,
        quantity: u32,
    ) -> Result<()>;
    async fn set_quantity(&self, state: &mut CartState, product_id: &str, quantity: u32)
        -> Result<()>;
    async fn remove_item(&self, state: &mut CartState, product_id: &str) -> Result<()>;
    async fn clear(&self, state: &mut CartState) -> Result<()>;
    async fn apply_promo(&self, state: &mut CartState, code: &str) -> Result<()>;
    async fn remove_promo(&self, state: &mut CartState) -> Result<()>;
}

/// Anonymous path: synchronous in-memory mutation. The only remote touch is
/// coupon validation, which needs the server even without an account.
struct LocalWrite {
    api: Arc<dyn CartApi>,
}

#[async_trait]
impl CartWrite for LocalWrite {
    async fn add_item(
        &self,
        state: &mut CartState,
        product: &ProductSnapshot,
        _quantity: u32,
    ) -> Result<()> {
        state.add_local(product);
        Ok(())
    }

    async fn set_quantity(
        &self,
        state: &mut CartState,
        product_id: &str,
        quantity: u32,
    ) -> Result<()> {
        state.set_quantity_local(product_id, quantity);
        Ok(())
    }

    async fn remove_item(&self, state: &mut CartState, product_id: &str) -> Result<()> {
        state.remove_local(product_id);
        Ok(())
    }

    async fn clear(&self, state: &mut CartState) -> Result<()> {
        state.clear_local();
        Ok(())
    }

    async fn apply_promo(&self, state: &mut CartState, code: &str) -> Result<()> {
        match self.api.validate_coupon(code, state.totals().subtotal).await? {
            CouponOutcome::Valid(promo) => {
                state.set_promo(promo);
                Ok(())
            }
            CouponOutcome::Rejected(message) => Err(StoreError::Rejected(message)),
        }
    }

    async fn remove_promo(&self, state: &mut CartState) -> Result<()> {
        state.clear_promo();
        Ok(())
    }
}

/// Authenticated path: the server is the source of truth after every write,
/// so the local list is replaced wholesale from each response.
struct RemoteWrite {
    api: Arc<dyn CartApi>,
}

#[async_trait]
impl CartWrite for RemoteWrite {
    async fn add_item(
        &self,
        state: &mut CartState,
        product: &ProductSnapshot,
        quantity: u32,
    ) -> Result<()> {
        let payload = self.api.add_item(&product.id, quantity).await?;
        state.replace_items(payload.id, payload.items);
        Ok(())
    }

    async fn set_quantity(
        &self,
        state: &mut CartState,
        product_id: &str,
        quantity: u32,
    ) -> Result<()> {
        let payload = self.api.set_quantity(product_id, quantity).await?;
        state.replace_items(payload.id, payload.items);
        Ok(())
    }

    async fn remove_item(&self, state: &mut CartState, product_id: &str) -> Result<()> {
        let payload = self.api.remove_item(product_id).await?;
        state.replace_items(payload.id, payload.items);
        Ok(())
    }

    async fn clear(&self, state: &mut CartState) -> Result<()> {
        let payload = self.api.clear().await?;
        state.replace_all(payload.id, payload.items, None);
        Ok(())
    }

    async fn apply_promo(&self, state: &mut CartState, code: &str) -> Result<()> {
        let promo = self.api.apply_promo(code).await?;
        state.set_promo(promo);
        Ok(())
    }

    // Server first; the local promotion survives only an authentication
    // fault, any other outcome clears it.
    async fn remove_promo(&self, state: &mut CartState) -> Result<()> {
        match self.api.remove_promo().await {
            Ok(()) => {
                state.clear_promo();
                Ok(())
            }
            Err(StoreError::AuthExpired) => Err(StoreError::AuthExpired),
            Err(err) => {
                state.clear_promo();
                Err(err)
            }
        }
    }
}

pub struct CartStore {
    state: CartState,
    api: Arc<dyn CartApi>,
    local: Arc<LocalWrite>,
    remote: Arc<RemoteWrite>,
    auth: Arc<AuthSession>,
    storage: Arc<dyn LocalStore>,
    subscribers: Vec<Box<dyn Fn(&StoreEvent) + Send + Sync>>,
    sync_error: Option<String>,
}

impl CartStore {
    pub fn new(api: Arc<dyn CartApi>, auth: Arc<AuthSession>, storage: Arc<dyn LocalStore>) -> Self {
        let local = Arc::new(LocalWrite { api: api.clone() });
        let remote = Arc::new(RemoteWrite { api: api.clone() });
        let mut store = Self {
            state: CartState::default(),
            api,
            local,
            remote,
            auth,
            storage,
            subscribers: Vec::new(),
            sync_error: None,
        };
        store.rehydrate();
        store
    }

    /// Registers an observer for transient notices and sync signals.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    // --- queries -----------------------------------------------------------

    pub fn items(&self) -> &[CartItem] { self.state.items() }
    pub fn totals(&self) -> &CartTotals { self.state.totals() }
    pub fn applied_promo(&self) -> Option<&AppliedPromo> { self.state.applied_promo() }
    pub fn server_cart(&self) -> Option<&str> { self.state.server_cart() }
    pub fn total_items(&self) -> u32 { self.state.total_items() }
    pub fn item(&self, id: &str) -> Option<&CartItem> { self.state.item(id) }
    pub fn contains(&self, id: &str) -> bool { self.state.contains(id) }
    pub fn summary(&self) -> CartSummary { self.state.summary() }

    /// Last background refresh failure, until the next successful fetch.
    pub fn sync_error(&self) -> Option<&str> { self.sync_error.as_deref() }

    // --- mutations ---------------------------------------------------------

    pub async fn add_item(&mut self, product: &ProductSnapshot, quantity: u32) -> Result<()> {
        let strategy = self.write_strategy();
        let res = strategy.add_item(&mut self.state, product, quantity).await;
        self.finish(res, format!("{} added to cart", product.name))
    }

    /// A non-positive quantity is a removal, never stored.
    pub async fn update_quantity(&mut self, product_id: &str, quantity: i32) -> Result<()> {
        if quantity <= 0 {
            return self.remove_item(product_id).await;
        }
        let strategy = self.write_strategy();
        let res = strategy
            .set_quantity(&mut self.state, product_id, quantity as u32)
            .await;
        self.finish(res, "Cart updated".to_string())
    }

    pub async fn remove_item(&mut self, product_id: &str) -> Result<()> {
        let strategy = self.write_strategy();
        let res = strategy.remove_item(&mut self.state, product_id).await;
        self.finish(res, "Item removed from cart".to_string())
    }

    pub async fn clear(&mut self) -> Result<()> {
        let strategy = self.write_strategy();
        let res = strategy.clear(&mut self.state).await;
        self.finish(res, "Cart cleared".to_string())
    }

    pub async fn apply_promo(&mut self, code: &str) -> Result<()> {
        let strategy = self.write_strategy();
        let res = strategy.apply_promo(&mut self.state, code).await;
        self.finish(res, format!("Promo code {code} applied"))
    }

    pub async fn remove_promo(&mut self) -> Result<()> {
        let strategy = self.write_strategy();
        let res = strategy.remove_promo(&mut self.state).await;
        self.finish(res, "Promo code removed".to_string())
    }

    /// No-op when anonymous. Otherwise replaces items and promotion from the
    /// server; failures land in [`CartStore::sync_error`] instead of a
    /// transient notice.
    pub async fn fetch(&mut self) -> Result<()> {
        if !self.auth.is_authenticated() {
            return Ok(());
        }
        match self.api.fetch().await {
            Ok(payload) => {
                self.state
                    .replace_all(payload.id, payload.items, payload.applied_promo);
                self.sync_error = None;
                Ok(())
            }
            Err(StoreError::AuthExpired) => {
                self.emit(&StoreEvent::SessionExpired);
                self.auth.force_logout();
                Err(StoreError::AuthExpired)
            }
            Err(err) => {
                let message = err.to_string();
                self.sync_error = Some(message.clone());
                self.emit(&StoreEvent::SyncFailed { message });
                Err(err)
            }
        }
    }

    /// Login pulls the server cart (no merge of anonymous items); logout
    /// drops the server-linked references but keeps the visible item array.
    pub async fn handle_auth_change(&mut self, is_authenticated: bool) -> Result<()> {
        if is_authenticated {
            self.fetch().await
        } else {
            self.state.drop_server_links();
            self.sync_error = None;
            Ok(())
        }
    }

    // --- internals ---------------------------------------------------------

    fn write_strategy(&self) -> Arc<dyn CartWrite> {
        if self.auth.is_authenticated() {
            Arc::clone(&self.remote) as Arc<dyn CartWrite>
        } else {
            Arc::clone(&self.local) as Arc<dyn CartWrite>
        }
    }

    fn finish(&mut self, res: Result<()>, success_msg: String) -> Result<()> {
        match res {
            Ok(()) => {
                self.persist();
                self.emit(&StoreEvent::success(success_msg));
                Ok(())
            }
            Err(StoreError::AuthExpired) => {
                self.emit(&StoreEvent::SessionExpired);
                self.auth.force_logout();
                Err(StoreError::AuthExpired)
            }
            Err(err) => {
                self.emit(&StoreEvent::error(err.to_string()));
                Err(err)
            }
        }
    }

    fn emit(&self, event: &StoreEvent) {
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }

    fn rehydrate(&mut self) {
        let raw = match self.storage.load(CART_NAMESPACE) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted cart");
                return;
            }
        };
        match serde_json::from_str::<PersistedCart>(&raw) {
            Ok(saved) => self.state.restore(saved.items, saved.applied_promo),
            Err(err) => tracing::warn!(error = %err, "discarding unreadable persisted cart"),
        }
    }

    fn persist(&self) {
        if self.auth.is_authenticated() {
            return;
        }
        let saved = PersistedCart {
            items: self.state.items().to_vec(),
            applied_promo: self.state.applied_promo().cloned(),
            totals: self.state.totals().clone(),
        };
        let result = serde_json::to_string(&saved)
            .map_err(StoreError::from)
            .and_then(|raw| self.storage.save(CART_NAMESPACE, &raw));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist cart");
        }
    }
}

#[async_trait]
impl AuthAware for CartStore {
    async fn handle_auth_change(&mut self, is_authenticated: bool) -> Result<()> {
        CartStore::handle_auth_change(self, is_authenticated).await
    }
}
