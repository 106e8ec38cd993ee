//! Completion of a third-party (Google) login redirect.
//!
//! The provider sends the user back to the client with either a bearer
//! credential or an error indicator in the query string. Each redirect
//! instance must be consumed exactly once.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Url;
use tracing::{debug, warn};

use crate::ui::{Navigator, Notifier, Route};

use super::session::SessionStore;

/// Query parameters carried by the provider redirect.
#[derive(Debug, Clone, Default)]
pub struct OauthRedirect {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub error: Option<String>,
}

impl OauthRedirect {
    /// Extract the redirect parameters from the callback URL's query.
    pub fn parse(url: &Url) -> Self {
        let mut redirect = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "access_token" => redirect.access_token = Some(value.into_owned()),
                "token_type" => redirect.token_type = Some(value.into_owned()),
                "error" => redirect.error = Some(value.into_owned()),
                _ => {}
            }
        }
        redirect
    }
}

/// One-shot guard tied to a single redirect instance.
///
/// The latch is monotonic: once a completion has run, re-running it for
/// the same redirect does nothing - no second token write, no second
/// notice, no second navigation.
#[derive(Default)]
pub struct RedirectHandler {
    consumed: AtomicBool,
}

impl RedirectHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the redirect: feed the credential into the session store
    /// (the validator picks it up asynchronously) and move the user to
    /// the right place.
    pub fn complete(
        &self,
        redirect: &OauthRedirect,
        store: &SessionStore,
        notifier: &dyn Notifier,
        navigator: &dyn Navigator,
    ) {
        if self.consumed.swap(true, Ordering::SeqCst) {
            debug!("Redirect already consumed, ignoring");
            return;
        }

        if redirect.error.is_some() {
            notifier.error("Google sign-in was cancelled or failed.");
            navigator.navigate(Route::Login);
            return;
        }

        let Some(token) = redirect.access_token.clone() else {
            notifier.error("Missing access token.");
            navigator.navigate(Route::Login);
            return;
        };

        if let Err(e) = store.set_token(Some(token)) {
            warn!(error = %e, "Failed to persist token from redirect");
        }
        notifier.success("Signed in with Google!");
        // Replace the history entry so back-navigation cannot land on
        // the spent redirect.
        navigator.replace(Route::Home);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::auth::storage::{MemoryTokenStorage, TokenStorage};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum UiEvent {
        Success(String),
        Error(String),
        Navigate(Route),
        Replace(Route),
    }

    /// Records every notice and navigation for assertions.
    #[derive(Default)]
    struct RecordingUi {
        events: Mutex<Vec<UiEvent>>,
    }

    impl RecordingUi {
        fn events(&self) -> Vec<UiEvent> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: UiEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl Notifier for RecordingUi {
        fn success(&self, message: &str) {
            self.push(UiEvent::Success(message.to_string()));
        }

        fn error(&self, message: &str) {
            self.push(UiEvent::Error(message.to_string()));
        }
    }

    impl Navigator for RecordingUi {
        fn navigate(&self, route: Route) {
            self.push(UiEvent::Navigate(route));
        }

        fn replace(&self, route: Route) {
            self.push(UiEvent::Replace(route));
        }
    }

    fn session_store() -> SessionStore {
        SessionStore::new(Box::new(MemoryTokenStorage::new()))
            .expect("Failed to create session store")
    }

    #[test]
    fn test_parse_success_redirect() {
        let url = Url::parse(
            "http://localhost:5173/auth/google/callback?access_token=tok456&token_type=bearer",
        )
        .unwrap();
        let redirect = OauthRedirect::parse(&url);
        assert_eq!(redirect.access_token.as_deref(), Some("tok456"));
        assert_eq!(redirect.token_type.as_deref(), Some("bearer"));
        assert!(redirect.error.is_none());
    }

    #[test]
    fn test_parse_error_redirect() {
        let url =
            Url::parse("http://localhost:5173/auth/google/callback?error=access_denied").unwrap();
        let redirect = OauthRedirect::parse(&url);
        assert_eq!(redirect.error.as_deref(), Some("access_denied"));
        assert!(redirect.access_token.is_none());
    }

    #[test]
    fn test_error_redirect_leaves_session_untouched() {
        let store = session_store();
        let ui = RecordingUi::default();
        let redirect = OauthRedirect {
            error: Some("access_denied".to_string()),
            ..Default::default()
        };

        RedirectHandler::new().complete(&redirect, &store, &ui, &ui);

        assert!(store.token().is_none());
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Error("Google sign-in was cancelled or failed.".to_string()),
                UiEvent::Navigate(Route::Login),
            ]
        );
    }

    #[test]
    fn test_malformed_redirect_goes_back_to_login() {
        let store = session_store();
        let ui = RecordingUi::default();
        let redirect = OauthRedirect::default();

        RedirectHandler::new().complete(&redirect, &store, &ui, &ui);

        assert!(store.token().is_none());
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Error("Missing access token.".to_string()),
                UiEvent::Navigate(Route::Login),
            ]
        );
    }

    #[test]
    fn test_success_redirect_sets_token_and_replaces_history() {
        let store = session_store();
        let ui = RecordingUi::default();
        let redirect = OauthRedirect {
            access_token: Some("tok456".to_string()),
            token_type: Some("bearer".to_string()),
            error: None,
        };

        RedirectHandler::new().complete(&redirect, &store, &ui, &ui);

        assert_eq!(store.token().as_deref(), Some("tok456"));
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Success("Signed in with Google!".to_string()),
                UiEvent::Replace(Route::Home),
            ]
        );
    }

    #[test]
    fn test_success_redirect_signs_in_despite_persistence_failure() {
        struct BrokenTokenStorage;

        impl TokenStorage for BrokenTokenStorage {
            fn load(&self) -> anyhow::Result<Option<String>> {
                Ok(None)
            }

            fn store(&self, _token: &str) -> anyhow::Result<()> {
                anyhow::bail!("storage unavailable")
            }

            fn clear(&self) -> anyhow::Result<()> {
                anyhow::bail!("storage unavailable")
            }
        }

        let store = SessionStore::new(Box::new(BrokenTokenStorage))
            .expect("Failed to create session store");
        let ui = RecordingUi::default();
        let redirect = OauthRedirect {
            access_token: Some("tok456".to_string()),
            token_type: Some("bearer".to_string()),
            error: None,
        };

        RedirectHandler::new().complete(&redirect, &store, &ui, &ui);

        // The session holds the token for this run even though the
        // write-through failed, so the success notice is truthful.
        assert_eq!(store.token().as_deref(), Some("tok456"));
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Success("Signed in with Google!".to_string()),
                UiEvent::Replace(Route::Home),
            ]
        );
    }

    #[test]
    fn test_redirect_is_consumed_exactly_once() {
        let store = session_store();
        let ui = RecordingUi::default();
        let redirect = OauthRedirect {
            access_token: Some("tok456".to_string()),
            token_type: Some("bearer".to_string()),
            error: None,
        };

        let handler = RedirectHandler::new();
        handler.complete(&redirect, &store, &ui, &ui);
        let after_first = ui.events();

        // A re-render of the same redirect must not re-process it
        handler.complete(&redirect, &store, &ui, &ui);

        assert_eq!(ui.events(), after_first);
        assert_eq!(store.token().as_deref(), Some("tok456"));
    }
}
