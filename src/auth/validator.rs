//! Reconciles a persisted-but-unconfirmed token with server truth.
//!
//! Holding a token is a claim, not proof: the profile is only set after
//! the current-user endpoint has accepted the token. A rejected token
//! collapses the whole session back to anonymous, silently - the user
//! experiences "logged out", not an error.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::AuthApi;

use super::session::SessionStore;

pub struct SessionValidator {
    store: Arc<SessionStore>,
    api: Arc<dyn AuthApi>,
}

impl SessionValidator {
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn AuthApi>) -> Self {
        Self { store, api }
    }

    /// Run a single validation pass against the server.
    ///
    /// Does nothing when no token is held: an unauthenticated call would
    /// come back 401 and be misread as invalidation. A failed check is
    /// decisive - no retry. A completion whose token is no longer the
    /// store's current token is discarded without touching state.
    pub async fn validate(&self) {
        let Some(token) = self.store.token() else {
            return;
        };

        self.store.set_loading(true);
        let result = self.api.current_user().await;
        self.store.set_loading(false);

        // The token may have been replaced or cleared while the request
        // was in flight; that result belongs to a dead session.
        if self.store.token().as_deref() != Some(token.as_str()) {
            debug!("Discarding validation result for superseded token");
            return;
        }

        match result {
            Ok(user) => {
                debug!(user_id = %user.id, "Session validated");
                self.store.set_user(Some(user));
            }
            Err(e) => {
                warn!(error = %e, "Session validation failed, dropping session");
                if let Err(e) = self.store.logout() {
                    warn!(error = %e, "Failed to clear persisted token");
                }
            }
        }
    }

    /// Spawn the watch-driven validation task: one pass for the token
    /// held at startup (rehydrated sessions), then one pass per observed
    /// token change. Passes run sequentially, so at most one validation
    /// is in flight at a time.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut rx = self.store.subscribe();
            let mut last_token = self.store.token();

            self.validate().await;

            loop {
                if rx.changed().await.is_err() {
                    return;
                }
                let token = rx.borrow_and_update().token.clone();
                if token == last_token {
                    continue;
                }
                last_token = token;
                self.validate().await;
            }
        })
    }
}
