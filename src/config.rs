//! Application configuration management.
//!
//! This module handles loading and saving the client configuration:
//! the API base URL, the last used email, and whether the token lives
//! in the OS keychain or in a file.
//!
//! Configuration is stored at `~/.config/atlasnap/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;
use crate::auth::{FileTokenStorage, KeyringTokenStorage, TokenStorage};

/// Application name used for config/data directory paths
const APP_NAME: &str = "atlasnap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub use_keyring: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn data_dir() -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Resolve the API base URL: env var wins, then config, then default.
    pub fn base_url(&self) -> String {
        std::env::var("ATLASNAP_API_URL")
            .ok()
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Build the configured token storage backend.
    pub fn token_storage(&self) -> Result<Box<dyn TokenStorage>> {
        if self.use_keyring {
            Ok(Box::new(KeyringTokenStorage))
        } else {
            Ok(Box::new(FileTokenStorage::new(Self::data_dir()?)))
        }
    }
}
