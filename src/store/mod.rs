//! Reconciliation stores: one consistent view of the session's selections,
//! whether or not an account is signed in.

pub mod cart;
pub mod wishlist;

#[cfg(test)]
pub(crate) mod test_support;

pub use cart::CartStore;
pub use wishlist::{MoveReport, WishlistStore};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};

use crate::Result;

/// Delay between a login transition and the follow-up fetch, so the
/// identity collaborator finishes settling its own state first.
pub const LOGIN_SETTLE_DELAY: Duration = Duration::from_millis(250);

/// Implemented by stores that react to authentication transitions.
#[async_trait]
pub trait AuthAware: Send {
    async fn handle_auth_change(&mut self, is_authenticated: bool) -> Result<()>;
}

/// Bridges [`crate::auth::AuthSession::subscribe`] to a store, invoking its
/// transition handler on every change until the sender side is dropped.
pub async fn watch_auth<S: AuthAware>(store: Arc<Mutex<S>>, mut changes: watch::Receiver<bool>) {
    while changes.changed().await.is_ok() {
        let is_authenticated = *changes.borrow_and_update();
        if is_authenticated {
            tokio::time::sleep(LOGIN_SETTLE_DELAY).await;
        }
        if let Err(err) = store.lock().await.handle_auth_change(is_authenticated).await {
            tracing::debug!(error = %err, "auth transition refresh failed");
        }
    }
}
