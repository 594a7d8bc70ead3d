//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `~/.config/phonebook/config.toml` and applies
//! environment overrides.

use crate::paths::PhonebookPaths;
use phonebook_core::config::ClientConfig;
use phonebook_core::error::{PhonebookError, Result};
use std::path::{Path, PathBuf};

/// Overrides `base_url` when set.
pub const BASE_URL_ENV: &str = "PHONEBOOK_BASE_URL";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Uses the platform config directory.
    pub fn new() -> Self {
        let path = match PhonebookPaths::config_file() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("[ConfigService] {}; using defaults", e);
                None
            }
        };
        Self { path }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the configuration and applies environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let mut config = match &self.path {
            Some(path) => Self::load_file(path)?,
            None => ClientConfig::default(),
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.is_empty()
        {
            tracing::debug!("[ConfigService] base_url overridden by {}", BASE_URL_ENV);
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// Reads one TOML file; a missing file yields the defaults.
    fn load_file(path: &Path) -> Result<ClientConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("[ConfigService] {:?} not found, using defaults", path);
                return Ok(ClientConfig::default());
            }
            Err(e) => {
                return Err(PhonebookError::config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        toml::from_str(&content).map_err(|e| {
            PhonebookError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
