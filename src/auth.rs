//! Identity collaborator: session flag, bearer token, change notification.

use std::sync::RwLock;

use tokio::sync::watch;

/// Holds whether the current session belongs to a signed-in account. Stores
/// receive it by reference at construction; auth transitions are observed
/// through [`AuthSession::subscribe`].
pub struct AuthSession {
    state: watch::Sender<bool>,
    token: RwLock<Option<String>>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self { state, token: RwLock::new(None) }
    }

    pub fn is_authenticated(&self) -> bool {
        *self.state.borrow()
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn login(&self, token: impl Into<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.into());
        self.state.send_replace(true);
    }

    pub fn logout(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.state.send_replace(false);
    }

    /// Invoked on an authentication fault from the server; identical to a
    /// logout, logged so the forced transition is visible.
    pub fn force_logout(&self) {
        tracing::warn!("session no longer valid, forcing logout");
        self.logout();
    }

    /// Auth-change subscription for [`crate::store::watch_auth`] or any
    /// other observer.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout_roundtrip() {
        let auth = AuthSession::new();
        assert!(!auth.is_authenticated());
        auth.login("token-1");
        assert!(auth.is_authenticated());
        assert_eq!(auth.token().as_deref(), Some("token-1"));
        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(auth.token().is_none());
    }

    #[test]
    fn test_subscribers_observe_transitions() {
        let auth = AuthSession::new();
        let mut rx = auth.subscribe();
        auth.login("t");
        assert!(*rx.borrow_and_update());
        auth.force_logout();
        assert!(!*rx.borrow_and_update());
    }
}
