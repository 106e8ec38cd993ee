//! REST API client module for the Atlasnap service.
//!
//! This module provides the `ApiClient` for talking to the Atlasnap
//! backend: credential exchange, registration, OAuth authorization-URL
//! issuance, and the current-user lookup.
//!
//! The API uses JWT bearer token authentication; the token is read from
//! the session store on every outgoing request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

use futures::future::BoxFuture;

use crate::models::User;

/// Seam between the auth flows and the HTTP client.
///
/// The login/register flows and the session validator depend on this
/// trait rather than on `ApiClient` directly, so they can be exercised
/// against fakes without a server.
pub trait AuthApi: Send + Sync {
    /// Exchange email/password credentials for a bearer token.
    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<String, ApiError>>;

    /// Create a new account.
    fn register<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<User, ApiError>>;

    /// Fetch the provider URL that starts the Google OAuth flow.
    fn google_authorize_url(&self) -> BoxFuture<'_, Result<String, ApiError>>;

    /// Fetch the server's view of the current user. Authenticated with
    /// the session token held at call time.
    fn current_user(&self) -> BoxFuture<'_, Result<User, ApiError>>;
}

impl AuthApi for ApiClient {
    fn login<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<String, ApiError>> {
        Box::pin(self.login(email, password))
    }

    fn register<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<User, ApiError>> {
        Box::pin(self.register(email, password))
    }

    fn google_authorize_url(&self) -> BoxFuture<'_, Result<String, ApiError>> {
        Box::pin(self.google_authorize_url())
    }

    fn current_user(&self) -> BoxFuture<'_, Result<User, ApiError>> {
        Box::pin(self.current_user())
    }
}
