//! Terminal surface: routes, navigation history and transient notices.
//!
//! The auth flows only ever talk to the `Navigator` and `Notifier`
//! traits; this module's terminal implementation is one possible
//! collaborator, and tests substitute recording fakes.

use std::sync::Mutex;

/// Client-side destinations, mirroring the web client's routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    OauthCallback,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::OauthCallback => "/auth/google/callback",
        }
    }
}

/// Navigation facility: push a new history entry or replace the current one.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
    fn replace(&self, route: Route);
}

/// Transient success/error notices (the toasts of the web client).
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Terminal implementation. Notices print to the terminal; navigation
/// keeps a real history stack so "replace" has the same back-navigation
/// shape as the browser's.
pub struct TerminalUi {
    history: Mutex<Vec<Route>>,
}

impl TerminalUi {
    pub fn new(initial: Route) -> Self {
        Self {
            history: Mutex::new(vec![initial]),
        }
    }

    pub fn current_route(&self) -> Route {
        self.history
            .lock()
            .expect("history lock poisoned")
            .last()
            .copied()
            .unwrap_or(Route::Login)
    }
}

impl Navigator for TerminalUi {
    fn navigate(&self, route: Route) {
        self.history.lock().expect("history lock poisoned").push(route);
    }

    fn replace(&self, route: Route) {
        let mut history = self.history.lock().expect("history lock poisoned");
        history.pop();
        history.push(route);
    }
}

impl Notifier for TerminalUi {
    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_pushes_history() {
        let ui = TerminalUi::new(Route::Login);
        ui.navigate(Route::Home);
        assert_eq!(ui.current_route(), Route::Home);
    }

    #[test]
    fn test_replace_swaps_current_entry() {
        let ui = TerminalUi::new(Route::Login);
        ui.navigate(Route::OauthCallback);
        ui.replace(Route::Home);

        // The callback entry is gone; "back" would land on Login
        assert_eq!(ui.current_route(), Route::Home);
        let history = ui.history.lock().unwrap();
        assert_eq!(*history, vec![Route::Login, Route::Home]);
    }
}
