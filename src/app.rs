//! The auth flows the terminal commands invoke.
//!
//! Each user-initiated action that can fail produces exactly one error
//! notice, already normalized; success paths produce at most one notice
//! before navigating away. Validation failures inside the session
//! validator never notice - they just leave the user logged out.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::AuthApi;
use crate::auth::{OauthRedirect, RedirectHandler, SessionStore};
use crate::messages;
use crate::ui::{Navigator, Notifier, Route};

pub struct App {
    pub store: Arc<SessionStore>,
    api: Arc<dyn AuthApi>,
}

impl App {
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn AuthApi>) -> Self {
        Self { store, api }
    }

    /// Password login: exchange credentials for a token and hand it to
    /// the store, which persists it and wakes the validator. Returns
    /// whether the exchange succeeded.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> bool {
        match self.api.login(email, password).await {
            Ok(token) => {
                if let Err(e) = self.store.set_token(Some(token)) {
                    warn!(error = %e, "Failed to persist token");
                }
                navigator.navigate(Route::Home);
                true
            }
            Err(e) => {
                debug!(error = %e, "Login failed");
                notifier.error(&messages::user_message(&e));
                false
            }
        }
    }

    /// Create a new account. On success the user still has to log in
    /// (the server wants the email verified first).
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) -> bool {
        match self.api.register(email, password).await {
            Ok(user) => {
                debug!(user_id = %user.id, "Account created");
                notifier.success(
                    "Account created successfully! Please check your email to verify your account.",
                );
                navigator.navigate(Route::Login);
                true
            }
            Err(e) => {
                debug!(error = %e, "Registration failed");
                notifier.error(&messages::user_message(&e));
                false
            }
        }
    }

    /// First half of the Google flow: fetch the provider authorization
    /// URL the user must visit.
    pub async fn google_authorize(&self, notifier: &dyn Notifier) -> Option<String> {
        match self.api.google_authorize_url().await {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(error = %e, "OAuth initiation failed");
                notifier.error("Failed to initiate Google sign-in. Please try again.");
                None
            }
        }
    }

    /// Second half of the Google flow: consume the redirect the provider
    /// sent the user back with. The handler guards exactly-once
    /// consumption per redirect instance.
    pub fn complete_google_login(
        &self,
        handler: &RedirectHandler,
        redirect: &OauthRedirect,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) {
        handler.complete(redirect, &self.store, notifier, navigator);
    }

    /// Drop the session and go back to the login entry point.
    pub fn logout(&self, navigator: &dyn Navigator) {
        if let Err(e) = self.store.logout() {
            warn!(error = %e, "Failed to clear persisted token");
        }
        navigator.navigate(Route::Login);
    }
}
