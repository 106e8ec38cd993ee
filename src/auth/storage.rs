// Allow dead code: the backends not selected by config are still part
// of the storage surface
#![allow(dead_code)]

//! Durable client-side storage for the bearer token.
//!
//! The token is the only part of the session that survives a restart;
//! the user profile is always re-derived from the server. Each backend
//! holds at most one value under a single fixed key.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name
const SERVICE_NAME: &str = "atlasnap";

/// Keychain entry holding the bearer token
const TOKEN_ENTRY: &str = "access_token";

/// Token file name in the data directory
const TOKEN_FILE: &str = "token";

/// Storage for the persisted bearer token.
///
/// `SessionStore` writes through this synchronously inside its mutation
/// calls, so a crash right after `set_token` cannot lose the value.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn store(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl<S: TokenStorage> TokenStorage for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn store(&self, token: &str) -> Result<()> {
        (**self).store(token)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// Token file in the platform data directory. Default backend.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(TOKEN_FILE),
        }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read token file")?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token).context("Failed to write token file")
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to delete token file")?;
        }
        Ok(())
    }
}

/// Token entry in the OS keychain, opt-in via config.
pub struct KeyringTokenStorage;

impl KeyringTokenStorage {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_ENTRY).context("Failed to create keyring entry")
    }
}

impl TokenStorage for KeyringTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        match Self::entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read token from keychain"),
        }
    }

    fn store(&self, token: &str) -> Result<()> {
        Self::entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

/// In-memory backend for ephemeral sessions; nothing survives the process.
#[derive(Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.lock().expect("token lock poisoned").clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        *self.token.lock().expect("token lock poisoned") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().expect("token lock poisoned") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileTokenStorage::new(dir.path().to_path_buf());

        assert!(storage.load().unwrap().is_none());

        storage.store("tok123").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("tok123"));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileTokenStorage::new(dir.path().to_path_buf());

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_overwrites_previous_token() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileTokenStorage::new(dir.path().to_path_buf());

        storage.store("old").unwrap();
        storage.store("new").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryTokenStorage::new();

        storage.store("tok456").unwrap();
        assert_eq!(storage.load().unwrap().as_deref(), Some("tok456"));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
