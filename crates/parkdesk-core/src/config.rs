//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the token store backend, and the last
//! used email address.
//!
//! Configuration is stored at `~/.config/parkdesk/config.json`. Environment
//! variables override the file:
//!
//! - `PARKDESK_API_URL`
//! - `PARKDESK_TOKEN_STORE` (`file`, `keyring` or `memory`)
//! - `PARKDESK_TIMEOUT_SECS`

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::auth::StoreKind;

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "parkdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API used when nothing is configured
const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub token_store: StoreKind,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_store: StoreKind::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
            log_to_file: false,
        }
    }
}

impl Config {
    /// Load from the default location only.
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Apply overrides from the process environment. Returns the rejected values.
    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    ///
    /// Values that cannot be used leave the setting unchanged and are returned as
    /// messages for the caller to report.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(url) = lookup("PARKDESK_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }

        if let Some(kind) = lookup("PARKDESK_TOKEN_STORE") {
            match kind.parse::<StoreKind>() {
                Ok(kind) => self.token_store = kind,
                Err(e) => rejected.push(format!("Ignoring PARKDESK_TOKEN_STORE: {}", e)),
            }
        }

        if let Some(secs) = lookup("PARKDESK_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => rejected.push(format!("Ignoring invalid PARKDESK_TIMEOUT_SECS '{}'", secs)),
            }
        }

        rejected
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the token file and logs.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
