//! The client-side session: the process-wide belief about who is logged
//! in, distinct from server truth until the validator has confirmed it.

use anyhow::Result;
use tokio::sync::watch;
use tracing::debug;

use crate::models::User;

use super::storage::TokenStorage;

/// Snapshot of the session state.
///
/// `token` is an opaque bearer credential and the only persisted field.
/// `user` is the server-confirmed profile; `is_authenticated` is derived
/// from it, so a held-but-unconfirmed token does not count as logged in.
/// `is_loading` is set while a validation call is in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

/// Single owner of the session state.
///
/// All writes go through the mutation methods below; everything else
/// takes snapshots or subscribes. Token changes are persisted
/// write-through inside the mutation call.
pub struct SessionStore {
    state: watch::Sender<Session>,
    storage: Box<dyn TokenStorage>,
}

impl SessionStore {
    /// Create the store, rehydrating a persisted token if one exists.
    ///
    /// The user always starts absent: a rehydrated token is unconfirmed
    /// until the validator has checked it against the server.
    pub fn new(storage: Box<dyn TokenStorage>) -> Result<Self> {
        let token = storage.load()?;
        debug!(has_token = token.is_some(), "Session store initialized");

        let (state, _) = watch::channel(Session {
            token,
            ..Default::default()
        });

        Ok(Self { state, storage })
    }

    /// Replace the token: the new state is published first, then written
    /// through to storage (store on `Some`, delete on `None`). The
    /// in-memory session always takes the token; a persistence failure
    /// is reported but does not block it. Does not touch the user
    /// profile.
    pub fn set_token(&self, token: Option<String>) -> Result<()> {
        self.state.send_modify(|s| s.token = token.clone());
        match &token {
            Some(t) => self.storage.store(t)?,
            None => self.storage.clear()?,
        }
        Ok(())
    }

    /// Replace the user profile; `is_authenticated` is derived from it.
    pub fn set_user(&self, user: Option<User>) {
        self.state.send_modify(|s| {
            s.is_authenticated = user.is_some();
            s.user = user;
        });
    }

    /// Drop the whole session and delete the persisted token.
    ///
    /// Idempotent: a second call finds nothing to clear and publishes no
    /// state change.
    pub fn logout(&self) -> Result<()> {
        self.state.send_if_modified(|s| {
            if *s == Session::default() {
                return false;
            }
            *s = Session::default();
            true
        });
        self.storage.clear()?;
        Ok(())
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            if s.is_loading == loading {
                return false;
            }
            s.is_loading = loading;
            true
        });
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Observe session changes (login, validation, logout).
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}
