//! HTTP client for the Atlasnap REST API.
//!
//! Every outgoing request passes through `authorize`, which reads the
//! session store's token fresh at call time and attaches it as a bearer
//! credential when present.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::auth::SessionStore;
use crate::models::User;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default API base URL (local development server)
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct BearerResponse {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    authorization_url: String,
}

/// API client for the Atlasnap service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new API client bound to the given session store.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            session,
        })
    }

    /// Attach the current session token as a bearer credential.
    ///
    /// Reads the store on every call so that a token change between two
    /// requests is always picked up; nothing is cached here.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if the response is successful, classifying the body if not.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_response(status, &body))
        }
    }

    /// Exchange email/password credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/v1/auth/jwt/login", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;

        let response = Self::check(response).await?;
        let bearer: BearerResponse = response.json().await?;
        debug!("Credential exchange succeeded");

        Ok(bearer.access_token)
    }

    /// Create a new account. The server sends a verification email;
    /// the account cannot log in until it is verified.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let url = format!("{}/api/v1/auth/register", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check(response).await?;
        let user: User = response.json().await?;
        debug!(user_id = %user.id, "Account registered");

        Ok(user)
    }

    /// Fetch the provider URL that starts the Google OAuth flow.
    pub async fn google_authorize_url(&self) -> Result<String, ApiError> {
        let url = format!("{}/api/v1/auth/google/authorize", self.base_url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check(response).await?;
        let authorize: AuthorizeResponse = response.json().await?;

        Ok(authorize.authorization_url)
    }

    /// Fetch the server's view of the current user.
    ///
    /// Fails with `ApiError::Unauthorized` when the held token is stale
    /// or missing; the session validator treats that as decisive.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let url = format!("{}/api/v1/auth/me", self.base_url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;

        Ok(response.json().await?)
    }
}
