//! Session lifecycle for the Atlasnap client.
//!
//! This module provides:
//! - `SessionStore`: the persisted session state and its mutations
//! - `TokenStorage`: durable backends for the bearer token
//! - `SessionValidator`: reconciliation of a held token with server truth
//! - `RedirectHandler`: exactly-once completion of an OAuth redirect
//!
//! Only the token survives restarts; the user profile is re-derived from
//! the server on every fresh load.

pub mod oauth;
pub mod session;
pub mod storage;
pub mod validator;

pub use oauth::{OauthRedirect, RedirectHandler};
pub use session::{Session, SessionStore};
pub use storage::{FileTokenStorage, KeyringTokenStorage, MemoryTokenStorage, TokenStorage};
pub use validator::SessionValidator;
