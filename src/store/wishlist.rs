//! Wishlist reconciliation store.
//!
//! Reduced form of the cart store: entries are binary present/absent, no
//! quantities and no promotions, and a duplicate add is rejected outright.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{WishlistApi, WishlistPayload};
use crate::auth::AuthSession;
use crate::domain::cart::ProductSnapshot;
use crate::domain::events::StoreEvent;
use crate::domain::wishlist::{WishlistItem, WishlistState};
use crate::error::StoreError;
use crate::storage::{LocalStore, WISHLIST_NAMESPACE};
use crate::store::{AuthAware, CartStore};
use crate::Result;

#[derive(Serialize, Deserialize)]
struct PersistedWishlist {
    items: Vec<WishlistItem>,
}

/// Outcome of a bulk move. Succeeded items are removed from the wishlist
/// even when a later item fails; failed items stay saved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveReport {
    pub moved: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl MoveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct WishlistStore {
    state: WishlistState,
    api: Arc<dyn WishlistApi>,
    auth: Arc<AuthSession>,
    storage: Arc<dyn LocalStore>,
    subscribers: Vec<Box<dyn Fn(&StoreEvent) + Send + Sync>>,
    sync_error: Option<String>,
}

impl WishlistStore {
    pub fn new(
        api: Arc<dyn WishlistApi>,
        auth: Arc<AuthSession>,
        storage: Arc<dyn LocalStore>,
    ) -> Self {
        let mut store = Self {
            state: WishlistState::default(),
            api,
            auth,
            storage,
            subscribers: Vec::new(),
            sync_error: None,
        };
        store.rehydrate();
        store
    }

    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    // --- queries -----------------------------------------------------------

    pub fn items(&self) -> &[WishlistItem] { self.state.items() }
    pub fn count(&self) -> usize { self.state.count() }
    pub fn is_empty(&self) -> bool { self.state.is_empty() }
    pub fn item(&self, id: &str) -> Option<&WishlistItem> { self.state.item(id) }
    pub fn contains(&self, id: &str) -> bool { self.state.contains(id) }
    pub fn sync_error(&self) -> Option<&str> { self.sync_error.as_deref() }

    // --- mutations ---------------------------------------------------------

    pub async fn add_item(&mut self, product: &ProductSnapshot) -> Result<()> {
        if self.auth.is_authenticated() {
            let res = self.api.add_item(&product.id).await;
            return self.apply_remote(res, format!("{} added to wishlist", product.name));
        }
        if !self.state.add_local(product, Utc::now()) {
            let message = format!("{} is already in your wishlist", product.name);
            self.emit(&StoreEvent::error(message.clone()));
            return Err(StoreError::Rejected(message));
        }
        self.persist();
        self.emit(&StoreEvent::success(format!("{} added to wishlist", product.name)));
        Ok(())
    }

    pub async fn remove_item(&mut self, product_id: &str) -> Result<()> {
        if self.auth.is_authenticated() {
            let res = self.api.remove_item(product_id).await;
            return self.apply_remote(res, "Item removed from wishlist".to_string());
        }
        if !self.state.remove_local(product_id) {
            return Err(StoreError::NotFound);
        }
        self.persist();
        self.emit(&StoreEvent::success("Item removed from wishlist"));
        Ok(())
    }

    /// Add if absent, remove if present.
    pub async fn toggle_item(&mut self, product: &ProductSnapshot) -> Result<()> {
        if self.state.contains(&product.id) {
            self.remove_item(&product.id).await
        } else {
            self.add_item(product).await
        }
    }

    pub async fn clear(&mut self) -> Result<()> {
        if self.auth.is_authenticated() {
            let res = self.api.clear().await;
            return self.apply_remote(res, "Wishlist cleared".to_string());
        }
        self.state.clear_local();
        self.persist();
        self.emit(&StoreEvent::success("Wishlist cleared"));
        Ok(())
    }

    pub async fn fetch(&mut self) -> Result<()> {
        if !self.auth.is_authenticated() {
            return Ok(());
        }
        match self.api.fetch().await {
            Ok(payload) => {
                self.state.replace(payload.items);
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

    /// Same transition semantics as the cart: login pulls the server list,
    /// logout keeps the visible items.
    pub async fn handle_auth_change(&mut self, is_authenticated: bool) -> Result<()> {
        if is_authenticated {
            self.fetch().await
        } else {
            self.sync_error = None;
            Ok(())
        }
    }

    /// Adds the saved item to the cart with quantity 1, then removes it from
    /// the wishlist.
    pub async fn move_to_cart(&mut self, product_id: &str, cart: &mut CartStore) -> Result<()> {
        let item = self.state.item(product_id).cloned().ok_or(StoreError::NotFound)?;
        cart.add_item(&item.as_product(), 1).await?;
        self.remove_item(product_id).await
    }

    /// Moves every saved item, one sequential cart add per item. A failed
    /// item stays in the wishlist and the loop continues; there is no
    /// rollback of items already moved.
    pub async fn move_all_to_cart(&mut self, cart: &mut CartStore) -> MoveReport {
        let items = self.state.items().to_vec();
        let mut report = MoveReport::default();
        for item in items {
            match cart.add_item(&item.as_product(), 1).await {
                Ok(()) => match self.remove_item(&item.id).await {
                    Ok(()) => report.moved.push(item.id),
                    Err(err) => report.failed.push((item.id, err.to_string())),
                },
                Err(err) => report.failed.push((item.id, err.to_string())),
            }
        }
        report
    }

    // --- internals ---------------------------------------------------------

    fn apply_remote(&mut self, res: Result<WishlistPayload>, success_msg: String) -> Result<()> {
        match res {
            Ok(payload) => {
                self.state.replace(payload.items);
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
        let raw = match self.storage.load(WISHLIST_NAMESPACE) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read persisted wishlist");
                return;
            }
        };
        match serde_json::from_str::<PersistedWishlist>(&raw) {
            Ok(saved) => self.state.replace(saved.items),
            Err(err) => tracing::warn!(error = %err, "discarding unreadable persisted wishlist"),
        }
    }

    fn persist(&self) {
        if self.auth.is_authenticated() {
            return;
        }
        let saved = PersistedWishlist { items: self.state.items().to_vec() };
        let result = serde_json::to_string(&saved)
            .map_err(StoreError::from)
            .and_then(|raw| self.storage.save(WISHLIST_NAMESPACE, &raw));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to persist wishlist");
        }
    }
}

#[async_trait]
impl AuthAware for WishlistStore {
    async fn handle_auth_change(&mut self, is_authenticated: bool) -> Result<()> {
        WishlistStore::handle_auth_change(self, is_authenticated).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;
    use crate::store::test_support::{
        cart_item, cart_payload, product, wishlist_item, FakeCartApi, FakeWishlistApi,
    };

    fn setup() -> (
        Arc<FakeWishlistApi>,
        Arc<AuthSession>,
        WishlistStore,
        Arc<Mutex<Vec<StoreEvent>>>,
    ) {
        let api = Arc::new(FakeWishlistApi::default());
        let auth = Arc::new(AuthSession::new());
        let storage = Arc::new(MemoryStore::new());
        let mut store = WishlistStore::new(api.clone(), auth.clone(), storage);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        store.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        (api, auth, store, events)
    }

    fn anonymous_cart() -> CartStore {
        CartStore::new(
            Arc::new(FakeCartApi::default()),
            Arc::new(AuthSession::new()),
            Arc::new(MemoryStore::new()),
        )
    }

    #[tokio::test]
    async fn test_duplicate_add_is_rejected_with_notice() {
        let (_api, _auth, mut store, events) = setup();
        store.add_item(&product("p1", 10)).await.unwrap();
        let res = store.add_item(&product("p1", 10)).await;
        assert!(matches!(res, Err(StoreError::Rejected(_))));
        assert_eq!(store.count(), 1);
        assert!(events
            .lock()
            .unwrap()
            .contains(&StoreEvent::error("Product p1 is already in your wishlist")));
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let (_api, _auth, mut store, _events) = setup();
        store.toggle_item(&product("p1", 10)).await.unwrap();
        assert!(store.contains("p1"));
        store.toggle_item(&product("p1", 10)).await.unwrap();
        assert!(!store.contains("p1"));
    }

    #[tokio::test]
    async fn test_authenticated_add_replaces_from_server() {
        let (api, auth, mut store, _events) = setup();
        auth.login("tok");
        api.push(Ok(WishlistPayload {
            items: vec![wishlist_item("p1", 10), wishlist_item("p2", 20)],
        }));
        store.add_item(&product("p2", 20)).await.unwrap();
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn test_auth_fault_forces_logout() {
        let (api, auth, mut store, events) = setup();
        auth.login("tok");
        api.push(Err(StoreError::AuthExpired));
        let res = store.add_item(&product("p1", 10)).await;
        assert!(matches!(res, Err(StoreError::AuthExpired)));
        assert!(!auth.is_authenticated());
        assert!(events.lock().unwrap().contains(&StoreEvent::SessionExpired));
    }

    #[tokio::test]
    async fn test_move_to_cart_transfers_single_item() {
        let (_api, _auth, mut store, _events) = setup();
        let mut cart = anonymous_cart();
        store.add_item(&product("p1", 30)).await.unwrap();
        store.move_to_cart("p1", &mut cart).await.unwrap();
        assert!(!store.contains("p1"));
        assert_eq!(cart.item("p1").unwrap().quantity, 1);
        assert_eq!(cart.totals().subtotal, Decimal::new(30, 0));
    }

    #[tokio::test]
    async fn test_move_all_keeps_failed_items_saved() {
        // Anonymous wishlist feeding an authenticated cart whose server
        // rejects the middle add.
        let (_wapi, _wauth, mut store, _events) = setup();
        store.add_item(&product("w1", 10)).await.unwrap();
        store.add_item(&product("w2", 20)).await.unwrap();
        store.add_item(&product("w3", 30)).await.unwrap();

        let cart_api = Arc::new(FakeCartApi::default());
        let cart_auth = Arc::new(AuthSession::new());
        cart_auth.login("tok");
        let mut cart = CartStore::new(
            cart_api.clone(),
            cart_auth.clone(),
            Arc::new(MemoryStore::new()),
        );
        cart_api.push_cart(Ok(cart_payload(vec![cart_item("w1", 10, 1)])));
        cart_api.push_cart(Err(StoreError::Remote("Out of stock".into())));
        cart_api.push_cart(Ok(cart_payload(vec![
            cart_item("w1", 10, 1),
            cart_item("w3", 30, 1),
        ])));

        let report = store.move_all_to_cart(&mut cart).await;
        assert_eq!(report.moved, vec!["w1".to_string(), "w3".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "w2");
        assert!(!report.is_complete());

        assert!(store.contains("w2"));
        assert!(!store.contains("w1"));
        assert!(!store.contains("w3"));
        assert!(cart.contains("w1"));
        assert!(cart.contains("w3"));
    }

    #[tokio::test]
    async fn test_logout_retains_fetched_items() {
        let (api, auth, mut store, _events) = setup();
        auth.login("tok");
        api.push(Ok(WishlistPayload {
            items: vec![wishlist_item("p1", 10), wishlist_item("p2", 20)],
        }));
        store.fetch().await.unwrap();
        auth.logout();
        store.handle_auth_change(false).await.unwrap();
        assert_eq!(store.count(), 2);
    }

    #[tokio::test]
    async fn test_anonymous_state_rehydrates() {
        let api = Arc::new(FakeWishlistApi::default());
        let auth = Arc::new(AuthSession::new());
        let storage = Arc::new(MemoryStore::new());
        {
            let mut store = WishlistStore::new(api.clone(), auth.clone(), storage.clone());
            store.add_item(&product("p1", 10)).await.unwrap();
        }
        let store = WishlistStore::new(api, auth, storage);
        assert!(store.contains("p1"));
    }
}
